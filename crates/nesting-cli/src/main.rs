use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use nesting_core::{
    group_identical_bars, restock, withdraw_plan, BarSource, OptimizationRequest,
    OptimizationResult, Optimizer, StockItem,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nesting")]
#[command(about = "Bar Nesting Optimizer - Plan linear cuts from stock and purchased bars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Nest cut requests onto bars
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override blade width in mm
        #[arg(long)]
        kerf: Option<u32>,

        /// Override the reusable scrap threshold in mm
        #[arg(long)]
        max_scrap: Option<u32>,
    },

    /// Return a plan's offcuts to inventory
    Restock {
        /// Result file produced by `optimize` (JSON)
        #[arg(short, long)]
        result: PathBuf,

        /// Identifier recorded on every returned offcut
        #[arg(short, long)]
        plan_id: String,

        /// Output file for the new inventory (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Roll a plan back: remove its offcuts and return the bars it consumed
    Withdraw {
        /// Inventory file (YAML or JSON)
        #[arg(short, long)]
        stock: PathBuf,

        /// Result file of the plan being rolled back (JSON)
        #[arg(short, long)]
        result: PathBuf,

        #[arg(short, long)]
        plan_id: String,

        /// Output file for the new inventory (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            kerf,
            max_scrap,
        } => {
            optimize_command(input, output, kerf, max_scrap)?;
        }
        Commands::Restock {
            result,
            plan_id,
            output,
        } => {
            restock_command(result, plan_id, output)?;
        }
        Commands::Withdraw {
            stock,
            result,
            plan_id,
            output,
        } => {
            withdraw_command(stock, result, plan_id, output)?;
        }
    }

    Ok(())
}

/// Reads a YAML or JSON document, picked by file extension.
fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    );

    let value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

fn write_or_print<T: serde::Serialize>(value: &T, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        println!(
            "💾 Saved to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn optimize_command(
    input: PathBuf,
    output: Option<PathBuf>,
    kerf: Option<u32>,
    max_scrap: Option<u32>,
) -> Result<()> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let mut request: OptimizationRequest = load(&input)?;
    if let Some(kerf) = kerf {
        request.settings.kerf = kerf;
    }
    if let Some(max_scrap) = max_scrap {
        request.settings.max_scrap_length = max_scrap;
    }

    println!(
        "  {} cut requests",
        request.requests.len().to_string().bright_white().bold()
    );
    println!(
        "  {} stock items",
        request.stock.len().to_string().bright_white().bold()
    );
    println!();

    println!("{}", "🚀 Running optimization...".bright_blue());

    let optimizer = Optimizer::new(request)?;
    let result = optimizer.optimize()?;

    println!();
    println!("{}", "✅ Optimization complete!".bright_green().bold());
    println!();

    print_report(&result);
    println!();

    write_or_print(&result, output)
}

fn print_report(result: &OptimizationResult) {
    println!("{}", "📊 Results:".bright_yellow().bold());

    if result.purchase_list.is_empty() {
        println!("  Nothing to buy");
    } else {
        println!("  Purchase list:");
        for item in &result.purchase_list {
            let kind = if item.pre_cut { " (pre-cut)" } else { "" };
            println!(
                "    • {}: {} × {} mm{}",
                item.material.bright_white(),
                item.quantity,
                item.length,
                kind
            );
        }
    }
    println!();

    let totals = &result.totals;
    println!(
        "  Bars used: {} ({} from stock, {} new)",
        totals.total_bars_used.to_string().bright_white().bold(),
        totals.bars_from_stock,
        totals.bars_purchased
    );
    println!(
        "  True waste: {} mm ({:.1}%)",
        totals.total_true_waste.to_string().bright_white(),
        result.true_waste_percentage()
    );
    if totals.total_true_waste_kg > 0.0 {
        println!("  True waste mass: {:.3} kg", totals.total_true_waste_kg);
    }
    println!(
        "  Reusable scrap: {} mm",
        totals.total_reusable_scrap.to_string().bright_green()
    );

    for material in result.materials() {
        println!(
            "    • {}: {} bars, {} mm waste, {} mm scrap",
            material.material.bright_white(),
            material.bars,
            material.true_waste,
            material.reusable_scrap
        );
    }

    if !result.items_not_fit.is_empty() {
        println!();
        println!("  {}", "Pieces that fit no bar:".bright_red().bold());
        for item in &result.items_not_fit {
            println!(
                "    • {} {}: {} mm",
                item.id.bright_red(),
                item.material,
                item.length
            );
        }
    }

    println!();
    println!("  Cutting plan:");
    for group in group_identical_bars(&result.bars) {
        let source = match &group.bar.source {
            BarSource::Stock { stock_id } if group.bar.is_scrap_used => {
                format!("offcut {}", stock_id)
            }
            BarSource::Stock { stock_id } => format!("stock {}", stock_id),
            BarSource::NewStandard => "new".to_string(),
        };
        let cuts = group
            .bar
            .cuts
            .iter()
            .map(|c| c.length.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        let count = if group.count > 1 {
            format!("{}× ", group.count).bright_cyan().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "    • {}{} {} mm [{}]: {} | leftover {} mm",
            count,
            group.material.bright_white(),
            group.bar.length,
            source,
            cuts,
            group.bar.waste
        );
    }
}

fn restock_command(result: PathBuf, plan_id: String, output: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔍 Loading result...".bright_blue());

    let result: OptimizationResult = load(&result)?;
    let stock = restock(result.remaining_stock, &result.bars, &plan_id);

    let offcuts = stock
        .iter()
        .filter(|s| s.origin_plan_id.as_deref() == Some(plan_id.as_str()))
        .map(|s| s.quantity)
        .sum::<u32>();
    println!(
        "  {} offcuts returned to inventory",
        offcuts.to_string().bright_green().bold()
    );
    println!();

    write_or_print(&stock, output)
}

fn withdraw_command(
    stock: PathBuf,
    result: PathBuf,
    plan_id: String,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "🔍 Loading inventory...".bright_blue());

    let stock: Vec<StockItem> = load(&stock)?;
    let result: OptimizationResult = load(&result)?;
    let offcuts = stock
        .iter()
        .filter(|s| s.origin_plan_id.as_deref() == Some(plan_id.as_str()))
        .count();
    let returned = result
        .bars
        .iter()
        .filter(|b| !b.source.is_purchase())
        .count();
    let stock = withdraw_plan(stock, &result.bars, &plan_id);

    println!(
        "  {} offcut entries of plan {} removed, {} bars returned",
        offcuts.to_string().bright_white().bold(),
        plan_id,
        returned.to_string().bright_green().bold()
    );
    println!();

    write_or_print(&stock, output)
}

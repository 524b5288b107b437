use super::waste::round3;
use crate::material::MaterialKey;
use crate::types::*;
use std::collections::HashMap;

/// Computes waste, scrap and bar-count totals over every bar of a run.
pub(super) fn calculate_totals(bars: &[BarResult]) -> Totals {
    let mut totals = Totals::default();

    for bar in bars {
        totals.total_waste += bar.waste as u64;
        totals.total_true_waste += bar.true_waste as u64;
        totals.total_reusable_scrap += bar.reusable_scrap as u64;
        totals.total_true_waste_kg += bar.true_waste_kg.unwrap_or(0.0);
        totals.total_cut_length += bar.cut_length();
        totals.total_bars_used += 1;
        if bar.source.is_purchase() {
            totals.bars_purchased += 1;
        } else {
            totals.bars_from_stock += 1;
        }
    }

    totals.total_true_waste_kg = round3(totals.total_true_waste_kg);
    totals
}

impl OptimizationResult {
    /// Per-material breakdown of bars and leftovers, in order of first bar.
    pub fn materials(&self) -> Vec<MaterialSummary> {
        let mut summaries: Vec<MaterialSummary> = Vec::new();
        let mut index: HashMap<MaterialKey, usize> = HashMap::new();

        for bar in &self.bars {
            let idx = *index
                .entry(MaterialKey::new(&bar.material))
                .or_insert_with(|| {
                    summaries.push(MaterialSummary {
                        material: bar.material.clone(),
                        bars: 0,
                        purchased: 0,
                        waste: 0,
                        true_waste: 0,
                        reusable_scrap: 0,
                    });
                    summaries.len() - 1
                });

            let summary = &mut summaries[idx];
            summary.bars += 1;
            if bar.source.is_purchase() {
                summary.purchased += 1;
            }
            summary.waste += bar.waste as u64;
            summary.true_waste += bar.true_waste as u64;
            summary.reusable_scrap += bar.reusable_scrap as u64;
        }

        summaries
    }

    /// Share of bought or consumed material that ends up as true waste.
    pub fn true_waste_percentage(&self) -> f64 {
        let total_length: u64 = self.bars.iter().map(|b| b.length as u64).sum();
        if total_length > 0 {
            (self.totals.total_true_waste as f64 / total_length as f64) * 100.0
        } else {
            0.0
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default commercial bar length when a material has no explicit entry.
pub const DEFAULT_STANDARD_LENGTH: u32 = 6000;
/// Default blade width.
pub const DEFAULT_KERF: u32 = 3;
/// Leftovers at or above this length go back to inventory.
pub const DEFAULT_MAX_SCRAP_LENGTH: u32 = 1000;

/// One line of required pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRequest {
    pub id: String,
    pub material: String,
    /// Piece length in millimetres
    pub length: u32,
    pub quantity: u32,
    /// Linear weight in kg/m, used only for scrap mass reporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Bought pre-cut to exact size (plates); never nested
    #[serde(default)]
    pub skip_optimization: bool,
}

/// One inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: String,
    pub material: String,
    pub length: u32,
    pub quantity: u32,
    /// Offcut from an earlier job rather than a fresh factory bar
    #[serde(default)]
    pub is_scrap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    /// Plan that returned this offcut to inventory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_plan_id: Option<String>,
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Purchasable bar length per material
    #[serde(default)]
    pub standard_bar_lengths: BTreeMap<String, u32>,
    #[serde(default = "default_standard_length")]
    pub default_standard_length: u32,
    #[serde(default = "default_kerf")]
    pub kerf: u32,
    /// Leftovers shorter than this are true waste
    #[serde(default = "default_max_scrap_length")]
    pub max_scrap_length: u32,
    /// Break pieces longer than a standard bar into several bars
    #[serde(default = "default_true")]
    pub split_oversize: bool,
}

fn default_standard_length() -> u32 {
    DEFAULT_STANDARD_LENGTH
}

fn default_kerf() -> u32 {
    DEFAULT_KERF
}

fn default_max_scrap_length() -> u32 {
    DEFAULT_MAX_SCRAP_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            standard_bar_lengths: BTreeMap::new(),
            default_standard_length: DEFAULT_STANDARD_LENGTH,
            kerf: DEFAULT_KERF,
            max_scrap_length: DEFAULT_MAX_SCRAP_LENGTH,
            split_oversize: true,
        }
    }
}

/// Input: what the caller hands to the engine for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub requests: Vec<CutRequest>,
    /// Inventory snapshot, owned by the run
    #[serde(default)]
    pub stock: Vec<StockItem>,
    #[serde(default)]
    pub settings: OptimizerSettings,
}

/// A single piece cut from a bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where a bar came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarSource {
    Stock { stock_id: String },
    NewStandard,
}

impl BarSource {
    pub fn is_purchase(&self) -> bool {
        matches!(self, BarSource::NewStandard)
    }
}

/// One physical bar after all its cuts are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarResult {
    /// Position in the result list
    pub index: usize,
    pub material: String,
    /// Total bar length
    pub length: u32,
    pub cuts: Vec<Cut>,
    /// Remaining length after cuts and kerf
    pub waste: u32,
    pub reusable_scrap: u32,
    pub true_waste: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_waste_kg: Option<f64>,
    /// Material lost to the blade between cuts
    #[serde(default)]
    pub kerf_loss: u32,
    pub is_scrap_used: bool,
    pub source: BarSource,
    /// Full-length section of an oversize piece
    #[serde(default)]
    pub from_split: bool,
    /// Content signature shared by bars cut the same way
    pub pattern: String,
}

impl BarResult {
    pub fn cut_length(&self) -> u64 {
        self.cuts.iter().map(|c| c.length as u64).sum()
    }
}

/// Bars (or pre-cut pieces) that need to be bought
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub material: String,
    pub length: u32,
    pub quantity: u32,
    /// Bought at exact size, not as a standard bar
    #[serde(default)]
    pub pre_cut: bool,
}

/// Aggregate figures over every bar of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_waste: u64,
    pub total_true_waste: u64,
    pub total_true_waste_kg: f64,
    pub total_reusable_scrap: u64,
    pub total_bars_used: u32,
    pub bars_from_stock: u32,
    pub bars_purchased: u32,
    pub total_cut_length: u64,
}

/// Per-material breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub material: String,
    pub bars: u32,
    pub purchased: u32,
    pub waste: u64,
    pub true_waste: u64,
    pub reusable_scrap: u64,
}

/// Output: what the engine returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub bars: Vec<BarResult>,
    pub totals: Totals,
    /// Pieces no bar could hold, one entry per unit piece
    #[serde(default)]
    pub items_not_fit: Vec<CutRequest>,
    pub purchase_list: Vec<PurchaseItem>,
    /// Inventory after this plan's consumption
    #[serde(default)]
    pub remaining_stock: Vec<StockItem>,
}

/// Error type for optimization
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

//! One-dimensional bar nesting for fabrication shops.
//!
//! Turns a list of required piece lengths and an inventory snapshot into bar
//! assignments, a purchase list and scrap accounting.

pub mod grouping;
pub mod inventory;
pub mod material;
pub mod optimizer;
pub mod types;

pub use grouping::{group_identical_bars, BarGroup};
pub use inventory::{restock, withdraw_plan};
pub use material::MaterialKey;
pub use optimizer::Optimizer;
pub use types::*;

use crate::material::MaterialKey;
use crate::types::{BarSource, StockItem};
use tracing::debug;

/// A physical bar picked for a new bin.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SourcedBar {
    pub source: BarSource,
    pub length: u32,
    pub is_scrap: bool,
}

/// Local working copy of the inventory for one run.
pub(super) struct StockPool {
    items: Vec<StockItem>,
    keys: Vec<MaterialKey>,
}

impl StockPool {
    pub fn new(items: Vec<StockItem>) -> Self {
        let keys = items.iter().map(|s| MaterialKey::new(&s.material)).collect();
        Self { items, keys }
    }

    /// Takes one unit of the best inventory bar for a piece of `min_length`.
    ///
    /// Offcuts come before fresh bars; within the same kind the shortest
    /// sufficient length wins, then input order.
    pub fn take(&mut self, material: &MaterialKey, min_length: u32) -> Option<SourcedBar> {
        let (idx, _) = self
            .items
            .iter()
            .zip(&self.keys)
            .enumerate()
            .filter(|(_, (item, key))| {
                *key == material && item.quantity > 0 && item.length >= min_length
            })
            .min_by_key(|(idx, (item, _))| (!item.is_scrap, item.length, *idx))?;

        let item = &mut self.items[idx];
        item.quantity -= 1;

        debug!(
            material = %material,
            stock_id = %item.id,
            length = item.length,
            is_scrap = item.is_scrap,
            "bar taken from stock"
        );

        Some(SourcedBar {
            source: BarSource::Stock {
                stock_id: item.id.clone(),
            },
            length: item.length,
            is_scrap: item.is_scrap,
        })
    }

    /// Inventory first, then a newly purchased standard bar if that is long enough.
    pub fn acquire(
        &mut self,
        material: &MaterialKey,
        min_length: u32,
        standard_length: u32,
    ) -> Option<SourcedBar> {
        if let Some(bar) = self.take(material, min_length) {
            return Some(bar);
        }

        if standard_length >= min_length {
            debug!(material = %material, length = standard_length, "new standard bar");
            Some(SourcedBar {
                source: BarSource::NewStandard,
                length: standard_length,
                is_scrap: false,
            })
        } else {
            None
        }
    }

    pub fn into_items(self) -> Vec<StockItem> {
        self.items
    }
}

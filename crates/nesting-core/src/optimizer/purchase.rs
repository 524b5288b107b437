use crate::material::MaterialKey;
use crate::types::{BarResult, PurchaseItem};
use std::collections::HashMap;

/// Builds the shopping list.
///
/// Pre-cut items come first, exactly as requested. Purchased standard bars
/// follow, counted per material and length in order of first use.
pub(super) fn aggregate(bars: &[BarResult], direct_purchases: Vec<PurchaseItem>) -> Vec<PurchaseItem> {
    let mut list = direct_purchases;
    let mut index: HashMap<(MaterialKey, u32), usize> = HashMap::new();

    for bar in bars.iter().filter(|b| b.source.is_purchase()) {
        let key = (MaterialKey::new(&bar.material), bar.length);
        match index.get(&key) {
            Some(&idx) => list[idx].quantity += 1,
            None => {
                index.insert(key, list.len());
                list.push(PurchaseItem {
                    material: bar.material.clone(),
                    length: bar.length,
                    quantity: 1,
                    pre_cut: false,
                });
            }
        }
    }

    list
}

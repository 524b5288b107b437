use crate::material::MaterialKey;
use crate::types::{CutRequest, PurchaseItem, StockItem};
use std::collections::HashMap;

/// Requests of one material, in input order.
#[derive(Debug, Clone)]
pub(super) struct MaterialGroup {
    pub material: MaterialKey,
    pub requests: Vec<CutRequest>,
    /// Linear weight used for scrap mass, if any is known
    pub weight_kg_m: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub(super) struct Normalized {
    /// Groups in order of first appearance
    pub groups: Vec<MaterialGroup>,
    /// Requests bought pre-cut, passed through to the purchase list
    pub direct_purchases: Vec<PurchaseItem>,
}

/// Groups requests by material and sets aside the ones that skip nesting.
///
/// The weight of a material is the first non-zero weight among its requests,
/// falling back to the first non-zero weight listed for it in stock.
pub(super) fn normalize(requests: &[CutRequest], stock: &[StockItem]) -> Normalized {
    let mut normalized = Normalized::default();
    let mut index: HashMap<MaterialKey, usize> = HashMap::new();

    for req in requests {
        let material = MaterialKey::new(&req.material);

        if req.skip_optimization {
            normalized.direct_purchases.push(PurchaseItem {
                material: material.to_string(),
                length: req.length,
                quantity: req.quantity,
                pre_cut: true,
            });
            continue;
        }

        let idx = *index.entry(material.clone()).or_insert_with(|| {
            normalized.groups.push(MaterialGroup {
                material,
                requests: Vec::new(),
                weight_kg_m: None,
            });
            normalized.groups.len() - 1
        });

        let group = &mut normalized.groups[idx];
        if group.weight_kg_m.is_none() {
            group.weight_kg_m = req.weight_kg_m.filter(|w| *w > 0.0);
        }
        group.requests.push(req.clone());
    }

    for group in &mut normalized.groups {
        if group.weight_kg_m.is_none() {
            group.weight_kg_m = stock
                .iter()
                .filter(|s| group.material.matches(&s.material))
                .filter_map(|s| s.weight_kg_m)
                .find(|w| *w > 0.0);
        }
    }

    normalized
}

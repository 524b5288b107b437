//! Inventory bookkeeping around a finished plan.
//!
//! These helpers never touch storage; they take an inventory snapshot and
//! return the next one for the caller to persist.

use crate::material::MaterialKey;
use crate::types::{BarResult, BarSource, StockItem};
use std::collections::HashSet;

/// Returns reusable offcuts of a plan to inventory.
///
/// Exhausted entries are dropped. Every bar with reusable scrap adds one
/// offcut tagged with `plan_id`; offcuts of the same material and length from
/// the same plan share an entry. New offcut ids continue after the highest
/// `{plan_id}-offcut-N` already in `stock`, so restocking twice under one plan
/// never reuses an id.
pub fn restock(stock: Vec<StockItem>, bars: &[BarResult], plan_id: &str) -> Vec<StockItem> {
    let prefix = format!("{}-offcut-", plan_id);
    let mut last = stock
        .iter()
        .filter_map(|s| s.id.strip_prefix(&prefix)?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    let mut stock: Vec<StockItem> = stock.into_iter().filter(|s| s.quantity > 0).collect();

    for bar in bars.iter().filter(|b| b.reusable_scrap > 0) {
        let material = MaterialKey::new(&bar.material);
        let existing = stock.iter_mut().find(|s| {
            s.is_scrap
                && s.length == bar.reusable_scrap
                && s.origin_plan_id.as_deref() == Some(plan_id)
                && material.matches(&s.material)
        });

        match existing {
            Some(item) => item.quantity += 1,
            None => {
                last += 1;
                stock.push(StockItem {
                    id: format!("{}{}", prefix, last),
                    material: bar.material.clone(),
                    length: bar.reusable_scrap,
                    quantity: 1,
                    is_scrap: true,
                    weight_kg_m: None,
                    unit_price: None,
                    origin_plan_id: Some(plan_id.to_string()),
                });
            }
        }
    }

    stock
}

/// Rolls a plan back out of inventory.
///
/// Removes the offcuts the plan returned and gives back one unit of every
/// stock item one of its `bars` was cut from. Items [`restock`] dropped as
/// exhausted are re-created from the bar. Bars cut from the plan's own
/// offcuts give nothing back, since those offcuts are removed here.
pub fn withdraw_plan(stock: Vec<StockItem>, bars: &[BarResult], plan_id: &str) -> Vec<StockItem> {
    let (own, mut stock): (Vec<StockItem>, Vec<StockItem>) = stock
        .into_iter()
        .partition(|s| s.origin_plan_id.as_deref() == Some(plan_id));
    let own: HashSet<String> = own.into_iter().map(|s| s.id).collect();

    for bar in bars {
        let BarSource::Stock { stock_id } = &bar.source else {
            continue;
        };
        if own.contains(stock_id) {
            continue;
        }

        match stock.iter_mut().find(|s| &s.id == stock_id) {
            Some(item) => item.quantity += 1,
            None => stock.push(StockItem {
                id: stock_id.clone(),
                material: bar.material.clone(),
                length: bar.length,
                quantity: 1,
                is_scrap: bar.is_scrap_used,
                weight_kg_m: None,
                unit_price: None,
                origin_plan_id: None,
            }),
        }
    }

    stock
}

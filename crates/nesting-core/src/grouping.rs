use crate::material::MaterialKey;
use crate::types::BarResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bars cut the same way, for "cut N identical bars" instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub material: String,
    pub pattern: String,
    pub count: u32,
    /// Indices of the grouped bars in the result list
    pub bar_indices: Vec<usize>,
    /// First bar of the group
    pub bar: BarResult,
}

/// Groups bars by material and cut pattern, keeping first-seen order.
pub fn group_identical_bars(bars: &[BarResult]) -> Vec<BarGroup> {
    let mut groups: Vec<BarGroup> = Vec::new();
    let mut index: HashMap<(MaterialKey, &str), usize> = HashMap::new();

    for bar in bars {
        let key = (MaterialKey::new(&bar.material), bar.pattern.as_str());
        match index.get(&key) {
            Some(&idx) => {
                let group = &mut groups[idx];
                group.count += 1;
                group.bar_indices.push(bar.index);
            }
            None => {
                index.insert(key, groups.len());
                groups.push(BarGroup {
                    material: bar.material.clone(),
                    pattern: bar.pattern.clone(),
                    count: 1,
                    bar_indices: vec![bar.index],
                    bar: bar.clone(),
                });
            }
        }
    }

    groups
}

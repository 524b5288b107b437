use crate::material::MaterialKey;
use crate::types::*;
use std::collections::HashMap;
use tracing::debug;

mod bin;
mod normalize;
mod packer;
mod purchase;
mod split;
mod stock;
mod summary;
mod waste;

use bin::ClosedBin;
use stock::StockPool;

/// A single unit piece waiting to be placed on a bar.
#[derive(Debug, Clone)]
pub(crate) struct Piece {
    pub id: String,
    /// Material as spelled on the request
    pub material: String,
    pub length: u32,
    pub description: Option<String>,
}

/// Nests cut requests onto bars using a best-fit decreasing heuristic.
///
/// The optimizer owns its request, including the stock snapshot; the
/// adjusted snapshot comes back in [`OptimizationResult::remaining_stock`].
pub struct Optimizer {
    request: OptimizationRequest,
    standard_lengths: HashMap<MaterialKey, u32>,
}

impl Optimizer {
    /// Validates requests and settings and builds a new optimizer instance.
    pub fn new(request: OptimizationRequest) -> Result<Self> {
        let settings = &request.settings;

        if settings.default_standard_length == 0 {
            return Err(OptimizerError::InvalidSettings(
                "Default standard length must be positive".to_string(),
            ));
        }

        let mut standard_lengths = HashMap::new();
        for (material, &length) in &settings.standard_bar_lengths {
            let key = MaterialKey::new(material);
            if key.is_blank() {
                return Err(OptimizerError::InvalidSettings(
                    "Standard bar length configured for a blank material".to_string(),
                ));
            }
            if length == 0 {
                return Err(OptimizerError::InvalidSettings(format!(
                    "Standard length for '{}' must be positive",
                    key
                )));
            }
            if let Some(previous) = standard_lengths.insert(key.clone(), length) {
                if previous != length {
                    return Err(OptimizerError::InvalidSettings(format!(
                        "Conflicting standard lengths for '{}': {} and {}",
                        key, previous, length
                    )));
                }
            }
        }

        for req in &request.requests {
            if MaterialKey::new(&req.material).is_blank() {
                return Err(OptimizerError::InvalidInput(format!(
                    "Request '{}' has no material",
                    req.id
                )));
            }
            if req.length == 0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Request '{}' has zero length",
                    req.id
                )));
            }
            if req.quantity == 0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Request '{}' has zero quantity",
                    req.id
                )));
            }
            if let Some(weight) = req.weight_kg_m {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(OptimizerError::InvalidInput(format!(
                        "Request '{}' has an invalid linear weight",
                        req.id
                    )));
                }
            }
        }

        for item in &request.stock {
            if MaterialKey::new(&item.material).is_blank() {
                return Err(OptimizerError::InvalidInput(format!(
                    "Stock item '{}' has no material",
                    item.id
                )));
            }
            if item.length == 0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Stock item '{}' has zero length",
                    item.id
                )));
            }
            let amounts = [("linear weight", item.weight_kg_m), ("unit price", item.unit_price)];
            for (field, value) in amounts {
                if let Some(value) = value {
                    if !value.is_finite() || value < 0.0 {
                        return Err(OptimizerError::InvalidInput(format!(
                            "Stock item '{}' has an invalid {}",
                            item.id, field
                        )));
                    }
                }
            }
        }

        Ok(Self {
            request,
            standard_lengths,
        })
    }

    /// Runs the whole pipeline: normalize, split, pack, classify, aggregate.
    pub fn optimize(self) -> Result<OptimizationResult> {
        let Optimizer {
            request,
            standard_lengths,
        } = self;
        let OptimizationRequest {
            requests,
            stock,
            settings,
        } = request;

        let normalized = normalize::normalize(&requests, &stock);
        let mut pool = StockPool::new(stock);
        let mut bars: Vec<BarResult> = Vec::new();
        let mut items_not_fit: Vec<CutRequest> = Vec::new();

        for group in &normalized.groups {
            let standard_length = standard_lengths
                .get(&group.material)
                .copied()
                .unwrap_or(settings.default_standard_length);

            let split = split::split_oversize(
                &group.material,
                &group.requests,
                standard_length,
                settings.split_oversize,
                &mut pool,
            );

            debug!(
                material = %group.material,
                standard_length,
                pieces = split.pieces.len(),
                split_bars = split.bars.len(),
                "packing material"
            );

            let packed = packer::pack(
                &group.material,
                split.pieces,
                standard_length,
                settings.kerf,
                &mut pool,
            );

            for closed in split.bars.into_iter().chain(packed.bins) {
                let index = bars.len();
                bars.push(close_bar(
                    index,
                    closed,
                    settings.max_scrap_length,
                    group.weight_kg_m,
                ));
            }

            let not_fit = split.not_fit.into_iter().chain(packed.not_fit);
            items_not_fit.extend(not_fit.map(|piece| CutRequest {
                id: piece.id,
                material: piece.material,
                length: piece.length,
                quantity: 1,
                weight_kg_m: group.weight_kg_m,
                description: piece.description,
                skip_optimization: false,
            }));
        }

        let purchase_list = purchase::aggregate(&bars, normalized.direct_purchases);
        let totals = summary::calculate_totals(&bars);

        Ok(OptimizationResult {
            bars,
            totals,
            items_not_fit,
            purchase_list,
            remaining_stock: pool.into_items(),
        })
    }
}

/// Converts a closed bin into its reported form, classifying the leftover.
fn close_bar(
    index: usize,
    closed: ClosedBin,
    max_scrap_length: u32,
    weight_kg_m: Option<f64>,
) -> BarResult {
    let split = waste::classify(closed.remaining, max_scrap_length, weight_kg_m);
    let pattern = closed.pattern();

    BarResult {
        index,
        material: closed.material.to_string(),
        length: closed.source.length,
        waste: closed.remaining,
        reusable_scrap: split.reusable_scrap,
        true_waste: split.true_waste,
        true_waste_kg: split.true_waste_kg,
        kerf_loss: closed.kerf_loss,
        is_scrap_used: closed.source.is_scrap,
        source: closed.source.source,
        from_split: closed.from_split,
        pattern,
        cuts: closed.cuts,
    }
}

use super::bin::ClosedBin;
use super::stock::StockPool;
use super::Piece;
use crate::material::MaterialKey;
use crate::types::{Cut, CutRequest};
use tracing::warn;

const LONG_PIECE: &str = "Long piece";

/// Pieces left to pack plus the bars already consumed by oversize pieces.
#[derive(Debug, Default)]
pub(super) struct Split {
    pub pieces: Vec<Piece>,
    pub bars: Vec<ClosedBin>,
    /// Full-length sections no bar could be found for
    pub not_fit: Vec<Piece>,
}

/// Expands requests into unit pieces, breaking oversize ones into full bars.
///
/// A piece longer than `standard_length` consumes `length / standard_length`
/// whole bars right away; those bars never take part in best-fit packing.
/// The remainder, if any, joins the queue as an ordinary piece. With
/// splitting disabled oversize pieces are queued as they are.
pub(super) fn split_oversize(
    material: &MaterialKey,
    requests: &[CutRequest],
    standard_length: u32,
    enabled: bool,
    pool: &mut StockPool,
) -> Split {
    let mut split = Split::default();

    for req in requests {
        for _ in 0..req.quantity {
            if !enabled || req.length <= standard_length {
                split.pieces.push(Piece {
                    id: req.id.clone(),
                    material: req.material.clone(),
                    length: req.length,
                    description: req.description.clone(),
                });
                continue;
            }

            let label = req.description.as_deref().unwrap_or(LONG_PIECE);
            let full_bars = req.length / standard_length;
            let remainder = req.length % standard_length;

            for part in 0..full_bars {
                let description = format!("{} (part {})", label, part + 1);
                match pool.acquire(material, standard_length, standard_length) {
                    Some(source) => split.bars.push(ClosedBin::full_section(
                        material,
                        source,
                        Cut {
                            length: standard_length,
                            description: Some(description),
                        },
                    )),
                    None => {
                        warn!(
                            material = %material,
                            piece = %req.id,
                            standard_length,
                            "no bar for full-length section"
                        );
                        split.not_fit.push(Piece {
                            id: req.id.clone(),
                            material: req.material.clone(),
                            length: standard_length,
                            description: Some(description),
                        });
                    }
                }
            }

            if remainder > 0 {
                split.pieces.push(Piece {
                    id: format!("{}-remainder", req.id),
                    material: req.material.clone(),
                    length: remainder,
                    description: Some(format!("{} (final)", label)),
                });
            }
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BarSource, StockItem};

    fn request(length: u32, quantity: u32) -> CutRequest {
        CutRequest {
            id: "r1".into(),
            material: "Perfil".into(),
            length,
            quantity,
            weight_kg_m: None,
            description: None,
            skip_optimization: false,
        }
    }

    #[test]
    fn test_oversize_piece_becomes_full_bars_plus_remainder() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(Vec::new());

        let split = split_oversize(&material, &[request(13500, 1)], 6000, true, &mut pool);

        assert_eq!(split.bars.len(), 2);
        for bar in &split.bars {
            assert_eq!(bar.source.source, BarSource::NewStandard);
            assert_eq!(bar.cuts[0].length, 6000);
            assert_eq!(bar.remaining, 0);
            assert!(bar.from_split);
        }
        assert_eq!(split.bars[1].cuts[0].description.as_deref(), Some("Long piece (part 2)"));

        assert_eq!(split.pieces.len(), 1);
        assert_eq!(split.pieces[0].length, 1500);
        assert_eq!(split.pieces[0].id, "r1-remainder");
        assert!(split.not_fit.is_empty());
    }

    #[test]
    fn test_exact_multiple_has_no_remainder() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(Vec::new());

        let split = split_oversize(&material, &[request(12000, 2)], 6000, true, &mut pool);
        assert_eq!(split.bars.len(), 4);
        assert!(split.pieces.is_empty());
    }

    #[test]
    fn test_full_sections_use_long_enough_stock_first() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(vec![StockItem {
            id: "long".into(),
            material: "Perfil".into(),
            length: 6200,
            quantity: 1,
            is_scrap: false,
            weight_kg_m: None,
            unit_price: None,
            origin_plan_id: None,
        }]);

        let split = split_oversize(&material, &[request(12500, 1)], 6000, true, &mut pool);
        assert_eq!(
            split.bars[0].source.source,
            BarSource::Stock {
                stock_id: "long".into()
            }
        );
        assert_eq!(split.bars[0].remaining, 200);
        assert_eq!(split.bars[1].source.source, BarSource::NewStandard);
        assert_eq!(pool.into_items()[0].quantity, 0);
    }

    #[test]
    fn test_disabled_split_keeps_piece_whole() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(Vec::new());

        let split = split_oversize(&material, &[request(7000, 1)], 6000, false, &mut pool);
        assert!(split.bars.is_empty());
        assert_eq!(split.pieces[0].length, 7000);
    }
}

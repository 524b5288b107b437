use super::bin::{ClosedBin, OpenBin};
use super::stock::StockPool;
use super::Piece;
use crate::material::MaterialKey;
use tracing::warn;

#[derive(Debug, Default)]
pub(super) struct Packed {
    pub bins: Vec<ClosedBin>,
    /// Pieces longer than anything in stock or for sale
    pub not_fit: Vec<Piece>,
}

/// Best-fit decreasing over the pieces of one material.
///
/// Pieces go longest first. Each piece lands on the open bin it leaves the
/// smallest leftover on (first bin wins ties); when no open bin has room a
/// new one is opened from stock, or from a purchased standard bar.
pub(super) fn pack(
    material: &MaterialKey,
    mut pieces: Vec<Piece>,
    standard_length: u32,
    kerf: u32,
    pool: &mut StockPool,
) -> Packed {
    pieces.sort_by(|a, b| b.length.cmp(&a.length));

    let mut open: Vec<OpenBin> = Vec::new();
    let mut not_fit = Vec::new();

    for piece in pieces {
        let best = open
            .iter()
            .enumerate()
            .filter_map(|(idx, bin)| bin.fit(piece.length, kerf).map(|fit| (idx, fit)))
            .min_by_key(|&(idx, fit)| (fit.leftover, idx));

        if let Some((idx, fit)) = best {
            open[idx].place(piece, fit);
            continue;
        }

        match pool.acquire(material, piece.length, standard_length) {
            Some(source) => open.push(OpenBin::start(material, source, piece)),
            None => {
                warn!(
                    material = %material,
                    piece = %piece.id,
                    length = piece.length,
                    standard_length,
                    "piece does not fit any bar"
                );
                not_fit.push(piece);
            }
        }
    }

    Packed {
        bins: open.into_iter().map(OpenBin::close).collect(),
        not_fit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BarSource, StockItem};

    fn pieces(lengths: &[u32]) -> Vec<Piece> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &length)| Piece {
                id: format!("p{}", i),
                material: "Perfil".into(),
                length,
                description: None,
            })
            .collect()
    }

    fn scrap(id: &str, length: u32) -> StockItem {
        StockItem {
            id: id.into(),
            material: "Perfil".into(),
            length,
            quantity: 1,
            is_scrap: true,
            weight_kg_m: None,
            unit_price: None,
            origin_plan_id: None,
        }
    }

    #[test]
    fn test_packs_longest_first() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(Vec::new());

        let packed = pack(&material, pieces(&[1000, 3500, 2000]), 6000, 3, &mut pool);

        assert_eq!(packed.bins.len(), 2);
        let first: Vec<u32> = packed.bins[0].cuts.iter().map(|c| c.length).collect();
        assert_eq!(first, vec![3500, 2000]);
        assert_eq!(packed.bins[0].remaining, 6000 - 3500 - 2000 - 3);
        assert_eq!(packed.bins[1].cuts[0].length, 1000);
    }

    #[test]
    fn test_best_fit_picks_tightest_bin_not_first() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(vec![scrap("s1600", 1600), scrap("s1000", 1000)]);

        let packed = pack(&material, pieces(&[1400, 900, 50]), 6000, 3, &mut pool);

        assert_eq!(packed.bins.len(), 2);
        // 1600 bar keeps 200, 1000 bar keeps 100; the 50 goes to the tighter one
        assert_eq!(packed.bins[0].cuts.len(), 1);
        assert_eq!(packed.bins[1].cuts.len(), 2);
        assert_eq!(packed.bins[1].remaining, 100 - 53);
    }

    #[test]
    fn test_piece_closes_bar_flush_when_kerf_overflows() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(Vec::new());

        let packed = pack(&material, pieces(&[3000, 2999]), 6000, 3, &mut pool);

        assert_eq!(packed.bins.len(), 1);
        assert_eq!(packed.bins[0].remaining, 0);
        assert_eq!(packed.bins[0].kerf_loss, 1);
    }

    #[test]
    fn test_too_long_piece_is_reported_not_fit() {
        let material = MaterialKey::new("Perfil");
        let mut pool = StockPool::new(vec![scrap("short", 500)]);

        let packed = pack(&material, pieces(&[7000, 400]), 6000, 3, &mut pool);

        assert_eq!(packed.not_fit.len(), 1);
        assert_eq!(packed.not_fit[0].length, 7000);
        assert_eq!(packed.bins.len(), 1);
        assert_eq!(
            packed.bins[0].source.source,
            BarSource::Stock {
                stock_id: "short".into()
            }
        );
    }
}

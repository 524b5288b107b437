use super::stock::SourcedBar;
use super::Piece;
use crate::material::MaterialKey;
use crate::types::Cut;

/// A bar that has at least one cut and still accepts more.
#[derive(Debug, Clone)]
pub(super) struct OpenBin {
    material: MaterialKey,
    source: SourcedBar,
    cuts: Vec<Cut>,
    remaining: u32,
    kerf_loss: u32,
}

/// A bar whose cuts are final.
#[derive(Debug, Clone)]
pub(crate) struct ClosedBin {
    pub material: MaterialKey,
    pub source: SourcedBar,
    pub cuts: Vec<Cut>,
    pub remaining: u32,
    pub kerf_loss: u32,
    pub from_split: bool,
}

/// Outcome of offering a piece to a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Fit {
    /// Length left on the bar after the piece
    pub leftover: u32,
    /// Blade width charged for this cut
    pub kerf: u32,
}

/// Kerf rule for placing `length` on a bar with `remaining` free length.
///
/// No kerf before the first cut. When the piece fits but the blade would
/// overflow the bar, the piece closes the bar flush and the partial kerf is
/// absorbed by the bar's margin.
pub(super) fn fit(remaining: u32, length: u32, has_cuts: bool, kerf: u32) -> Option<Fit> {
    if remaining < length {
        return None;
    }
    if !has_cuts {
        return Some(Fit {
            leftover: remaining - length,
            kerf: 0,
        });
    }
    let needed = length.saturating_add(kerf);
    if remaining >= needed {
        Some(Fit {
            leftover: remaining - needed,
            kerf,
        })
    } else {
        Some(Fit {
            leftover: 0,
            kerf: remaining - length,
        })
    }
}

impl OpenBin {
    /// Starts a bar with its first piece. The source must be long enough.
    pub fn start(material: &MaterialKey, source: SourcedBar, piece: Piece) -> Self {
        debug_assert!(source.length >= piece.length);
        let first = Fit {
            leftover: source.length.saturating_sub(piece.length),
            kerf: 0,
        };
        let mut bin = Self {
            material: material.clone(),
            remaining: source.length,
            source,
            cuts: Vec::new(),
            kerf_loss: 0,
        };
        bin.place(piece, first);
        bin
    }

    pub fn fit(&self, length: u32, kerf: u32) -> Option<Fit> {
        fit(self.remaining, length, !self.cuts.is_empty(), kerf)
    }

    /// Places a piece with the [`Fit`] this bin reported for it.
    pub fn place(&mut self, piece: Piece, fit: Fit) {
        debug_assert!(fit.leftover + fit.kerf + piece.length <= self.remaining);
        self.cuts.push(Cut {
            length: piece.length,
            description: piece.description,
        });
        self.remaining = fit.leftover;
        self.kerf_loss += fit.kerf;
    }

    pub fn close(self) -> ClosedBin {
        ClosedBin {
            material: self.material,
            source: self.source,
            cuts: self.cuts,
            remaining: self.remaining,
            kerf_loss: self.kerf_loss,
            from_split: false,
        }
    }
}

impl ClosedBin {
    /// A bar consumed whole by one full-length section of an oversize piece.
    pub fn full_section(material: &MaterialKey, source: SourcedBar, cut: Cut) -> Self {
        let remaining = source.length.saturating_sub(cut.length);
        Self {
            material: material.clone(),
            source,
            cuts: vec![cut],
            remaining,
            kerf_loss: 0,
            from_split: true,
        }
    }

    /// Signature shared by bars cut the same way from the same kind of bar.
    pub fn pattern(&self) -> String {
        let cuts = self
            .cuts
            .iter()
            .map(|c| c.length.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}|{}|{}|{}",
            self.material.canonical(),
            self.source.length,
            if self.source.is_scrap { "scrap" } else { "new" },
            cuts
        )
    }
}

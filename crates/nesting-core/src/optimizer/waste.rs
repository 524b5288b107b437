/// Leftover of one bar, split into what goes back to inventory and what is lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct WasteSplit {
    pub reusable_scrap: u32,
    pub true_waste: u32,
    pub true_waste_kg: Option<f64>,
}

/// Classifies a bar's leftover against the reusable-scrap threshold.
///
/// A leftover exactly at the threshold is reusable. Mass is only reported
/// when the material's linear weight is known and non-zero.
pub(super) fn classify(waste: u32, max_scrap_length: u32, weight_kg_m: Option<f64>) -> WasteSplit {
    let (reusable_scrap, true_waste) = if waste >= max_scrap_length {
        (waste, 0)
    } else {
        (0, waste)
    };

    let true_waste_kg = weight_kg_m
        .filter(|w| *w > 0.0)
        .map(|w| round3(true_waste as f64 / 1000.0 * w));

    WasteSplit {
        reusable_scrap,
        true_waste,
        true_waste_kg,
    }
}

/// Rounds to grams so repeated runs report identical figures.
pub(super) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let split = classify(1000, 1000, None);
        assert_eq!(split.reusable_scrap, 1000);
        assert_eq!(split.true_waste, 0);

        let split = classify(999, 1000, None);
        assert_eq!(split.reusable_scrap, 0);
        assert_eq!(split.true_waste, 999);
    }

    #[test]
    fn test_parts_always_sum_to_waste() {
        for waste in [0, 1, 300, 999, 1000, 5700] {
            let split = classify(waste, 1000, Some(2.5));
            assert_eq!(split.reusable_scrap + split.true_waste, waste);
        }
    }

    #[test]
    fn test_mass_only_with_known_weight() {
        assert_eq!(classify(300, 1000, None).true_waste_kg, None);
        assert_eq!(classify(300, 1000, Some(0.0)).true_waste_kg, None);
        assert_eq!(classify(300, 1000, Some(4.19)).true_waste_kg, Some(1.257));
        assert_eq!(classify(1500, 1000, Some(4.19)).true_waste_kg, Some(0.0));
    }

    #[test]
    fn test_mass_rounded_to_three_decimals() {
        assert_eq!(classify(333, 1000, Some(1.0 / 3.0)).true_waste_kg, Some(0.111));
    }
}

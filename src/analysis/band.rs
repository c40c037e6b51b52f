//! Correlation banding.

use crate::domain::Band;

/// Strictly above this is a strong positive correlation.
pub const STRONG_THRESHOLD: f64 = 0.70;

/// Strictly below this is a weak correlation.
pub const WEAK_THRESHOLD: f64 = 0.30;

/// Classify a coefficient. Both comparisons are strict, so `0.70` and `0.30`
/// are neutral. An undefined coefficient satisfies neither comparison and is
/// neutral as well.
pub fn classify(correlation: Option<f64>) -> Band {
    match correlation {
        Some(r) if r > STRONG_THRESHOLD => Band::StrongPositive,
        Some(r) if r < WEAK_THRESHOLD => Band::Weak,
        _ => Band::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(classify(Some(0.70)), Band::Neutral);
        assert_eq!(classify(Some(0.30)), Band::Neutral);
        assert_eq!(classify(Some(0.71)), Band::StrongPositive);
        assert_eq!(classify(Some(0.29)), Band::Weak);
    }

    #[test]
    fn extremes_and_undefined() {
        assert_eq!(classify(Some(1.0)), Band::StrongPositive);
        assert_eq!(classify(Some(-1.0)), Band::Weak);
        assert_eq!(classify(Some(0.5)), Band::Neutral);
        assert_eq!(classify(None), Band::Neutral);
    }
}

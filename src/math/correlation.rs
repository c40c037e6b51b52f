//! Pearson product-moment correlation.
//!
//! Returns `None` instead of NaN when the coefficient is undefined, so callers
//! have to decide how "not computable" is shown.

/// Pearson correlation of paired samples.
///
/// `None` when fewer than 2 pairs are given, when any value is non-finite, or
/// when either column has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    if pairs.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }
    // Constant columns are checked on the raw values; after subtracting a
    // rounded mean their sums of squares can come out as tiny positives.
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|&(x, _)| x == x0) || pairs.iter().all(|&(_, y)| y == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    // Rounding can push |r| a hair past 1 for perfectly linear data.
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

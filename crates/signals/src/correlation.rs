//! Correlation between two equal-length daily sequences.
//!
//! Provides the Pearson coefficient with a single silent recovery: inputs
//! that make the coefficient undefined or numerically indistinguishable from
//! self-correlation report `0.0`, so a plotted trend never has a hole.

use contagion_core::{AnalysisError, Result};

/// Pearson correlation coefficient of `x` and `y`.
///
/// Returns `0.0` instead of NaN or an out-of-range value when:
/// - fewer than two points are given
/// - either sequence has zero variance
/// - the coefficient comes out `>= 1.0`
///
/// Any other result lies in `[-1.0, 1.0)`. The function is symmetric in
/// its arguments.
///
/// The `>= 1.0` check is exact. A perfectly linear pair whose coefficient
/// rounds to just below one (e.g. `0.99999999999999989`) is returned as is,
/// so callers must accept either `0.0` or a value within rounding of `1.0`.
///
/// # Errors
/// Returns `InvalidInput` if the lengths differ.
pub fn correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot correlate sequences of length {} and {}",
            x.len(),
            y.len()
        )));
    }

    let r = pearson_correlation(x, y);
    if r.is_nan() || r >= 1.0 {
        return Ok(0.0);
    }
    Ok(r.max(-1.0))
}

/// Correlation of each consecutive, non-overlapping block of `window` days.
///
/// A trailing block shorter than `window` is dropped. Each block follows
/// the same degenerate-input policy as [`correlation`], so a week without
/// any new cases reports `0.0`.
///
/// # Errors
/// Returns `InvalidInput` if the lengths differ or `window` is zero.
pub fn windowed_correlation(x: &[f64], y: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(AnalysisError::InvalidInput(
            "window must be at least one day".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot correlate sequences of length {} and {}",
            x.len(),
            y.len()
        )));
    }

    x.chunks_exact(window)
        .zip(y.chunks_exact(window))
        .map(|(xs, ys)| correlation(xs, ys))
        .collect()
}

/// Calculates the Pearson correlation coefficient between two series.
fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // price deltas can be tiny, so only an exact zero counts as no variance
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return f64::NAN;
    }

    covariance / denominator
}

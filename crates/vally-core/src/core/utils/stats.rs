use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CorrelationError {
    #[error("Sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("At least two points are required for a correlation (got {0})")]
    TooFewPoints(usize),

    #[error("The {0} sequence contains a non-finite value")]
    NonFiniteValue(&'static str),

    #[error("The {0} sequence has zero variance; correlation is undefined")]
    DegenerateInput(&'static str),
}

/// Pearson linear correlation coefficient of two equal-length sequences.
///
/// Computed as `cov / sqrt(var_x * var_y)`, so a sequence correlated with itself yields
/// exactly `1.0` and with its negation exactly `-1.0`. The result is clamped to `[-1, 1]`.
///
/// # Errors
///
/// Fails when the lengths differ, fewer than two points are given, a value is not
/// finite, or either sequence has (numerically) zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<f64, CorrelationError> {
    if x.len() != y.len() {
        return Err(CorrelationError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(CorrelationError::TooFewPoints(x.len()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(CorrelationError::NonFiniteValue("first"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(CorrelationError::NonFiniteValue("second"));
    }

    let mean_x = x.iter().sum::<f64>() / x.len() as f64;
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if is_negligible_variance(sxx, x) {
        return Err(CorrelationError::DegenerateInput("first"));
    }
    if is_negligible_variance(syy, y) {
        return Err(CorrelationError::DegenerateInput("second"));
    }

    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// Rounding in the mean leaves a residue of order eps * |x| for constant input.
fn is_negligible_variance(sum_sq_dev: f64, values: &[f64]) -> bool {
    let scale: f64 = values.iter().map(|v| v * v).sum();
    sum_sq_dev <= f64::EPSILON * scale
}

/// The `p`-th percentile (0–100) with linear interpolation between closest ranks.
///
/// Matches the default ("linear") method of NumPy's `percentile`. Returns `None` for an
/// empty slice or a `p` outside `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn identical_sequences_correlate_exactly() {
        let x = [0.31, 1.7, 0.02, 4.4, 2.25, 0.9];
        assert_eq!(pearson_correlation(&x, &x).unwrap(), 1.0);
    }

    #[test]
    fn negated_sequence_anticorrelates_exactly() {
        let x = [0.31, 1.7, 0.02, 4.4, 2.25, 0.9];
        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert_eq!(pearson_correlation(&x, &neg).unwrap(), -1.0);
    }

    #[test]
    fn correlation_is_symmetric() {
        let x = [1.0, 0.5, 0.8, 1.2, 0.6];
        let y = [1.1, 0.4, 0.9, 1.1, 0.7];
        let r_xy = pearson_correlation(&x, &y).unwrap();
        let r_yx = pearson_correlation(&y, &x).unwrap();
        assert!(f64_approx_equal(r_xy, r_yx));
        assert!(r_xy > 0.9);
    }

    #[test]
    fn correlation_is_invariant_under_positive_affine_transform() {
        let x = [1.0, 0.5, 0.8, 1.2, 0.6, 2.0];
        let y = [3.0, 0.1, 0.7, 2.2, 0.4, 1.9];
        let r = pearson_correlation(&x, &y).unwrap();

        let scaled: Vec<f64> = y.iter().map(|v| 7.5 * v - 120.0).collect();
        let shifted: Vec<f64> = x.iter().map(|v| 0.01 * v + 3.0).collect();
        assert!(f64_approx_equal(r, pearson_correlation(&x, &scaled).unwrap()));
        assert!(f64_approx_equal(r, pearson_correlation(&shifted, &y).unwrap()));
    }

    #[test]
    fn constant_sequence_is_degenerate() {
        let x = [1.0, 2.0, 3.0];
        let constant = [0.1, 0.1, 0.1];
        assert_eq!(
            pearson_correlation(&x, &constant),
            Err(CorrelationError::DegenerateInput("second"))
        );
        assert_eq!(
            pearson_correlation(&constant, &x),
            Err(CorrelationError::DegenerateInput("first"))
        );
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert_eq!(
            pearson_correlation(&[1.0, 2.0], &[1.0]),
            Err(CorrelationError::LengthMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            pearson_correlation(&[1.0], &[1.0]),
            Err(CorrelationError::TooFewPoints(1))
        );
        assert_eq!(
            pearson_correlation(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(CorrelationError::NonFiniteValue("first"))
        );
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert!(f64_approx_equal(percentile(&values, 85.0).unwrap(), 4.4));
    }

    #[test]
    fn percentile_rejects_empty_input_and_out_of_range_rank() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[1.0], 101.0), None);
        assert_eq!(percentile(&[1.0], -1.0), None);
        assert_eq!(percentile(&[7.0], 85.0), Some(7.0));
    }
}

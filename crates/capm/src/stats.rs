//! Sample statistics over paired return series.
//!
//! All estimators use the unbiased `N - 1` denominator. Callers are expected to
//! check lengths first; these helpers only guard against division by zero.

/// Arithmetic mean. Returns `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample covariance of two equal-length series.
///
/// Returns `NaN` when the series differ in length or have fewer than two points.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();

    sum / (n - 1) as f64
}

/// Unbiased sample variance.
pub fn sample_variance(values: &[f64]) -> f64 {
    sample_covariance(values, values)
}

/// The 2x2 sample covariance matrix of `(x, y)`, row-major.
///
/// `[[Var(x), Cov(x, y)], [Cov(y, x), Var(y)]]`
pub fn covariance_matrix(x: &[f64], y: &[f64]) -> [[f64; 2]; 2] {
    let cov = sample_covariance(x, y);
    [[sample_variance(x), cov], [cov, sample_variance(y)]]
}

/// Whether every value equals the first.
///
/// A constant series can still show a tiny non-zero sample variance because
/// the mean is rounded, so zero variance is detected on the values themselves.
pub fn is_constant(values: &[f64]) -> bool {
    values.split_first().is_none_or(|(first, rest)| rest.iter().all(|v| v == first))
}

/// Pearson correlation coefficient.
///
/// Returns `NaN` if either series is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if is_constant(x) || is_constant(y) {
        return f64::NAN;
    }
    let denom = (sample_variance(x) * sample_variance(y)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    sample_covariance(x, y) / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_sample_variance_uses_n_minus_one() {
        // Deviations from 2.5: -1.5, -0.5, 0.5, 1.5 -> squares sum to 5.0
        assert_relative_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0]), 5.0 / 3.0);
    }

    #[test]
    fn test_sample_covariance() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 7.0];
        // mean_x = 2, mean_y = 13/3
        let expected = ((-1.0) * (2.0 - 13.0 / 3.0) + 1.0 * (7.0 - 13.0 / 3.0)) / 2.0;
        assert_relative_eq!(sample_covariance(&x, &y), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_requires_two_points() {
        assert!(sample_covariance(&[1.0], &[2.0]).is_nan());
        assert!(sample_covariance(&[1.0, 2.0], &[2.0]).is_nan());
    }

    #[test]
    fn test_covariance_matrix_is_symmetric() {
        let m = covariance_matrix(&[0.1, 0.3, -0.2], &[0.05, 0.1, 0.0]);
        assert_eq!(m[0][1], m[1][0]);
        assert!(m[0][0] > 0.0);
        assert!(m[1][1] > 0.0);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[]));
        assert!(is_constant(&[0.003; 7]));
        assert!(!is_constant(&[0.003, 0.003, 0.004]));
    }

    #[test]
    fn test_constant_series_correlation_is_nan() {
        let ramp: Vec<f64> = (0..7).map(|i| i as f64 * 0.001).collect();
        assert!(pearson_correlation(&[0.003; 7], &ramp).is_nan());
        assert!(pearson_correlation(&[0.003; 7], &[0.003; 7]).is_nan());
    }

    #[test]
    fn test_pearson_correlation() {
        assert_relative_eq!(
            pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            pearson_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]),
            -1.0,
            epsilon = 1e-12
        );
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }
}

//! Shared numeric kernels used across the pipeline.
//!
//! Conventions used throughout the crate: standard deviation is the
//! *sample* deviation (n - 1 denominator); skewness and kurtosis are the
//! population moment ratios; quantiles use linear interpolation between
//! order statistics.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Zero for n <= 1.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Quantile of an ascending-sorted slice with linear interpolation.
pub fn quantile_sorted(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Median of an ascending-sorted slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    quantile_sorted(sorted, 0.5)
}

/// Median absolute deviation around a given median.
pub fn median_absolute_deviation(values: &[f64], median: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();
    deviations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    median_sorted(&deviations)
}

/// Population skewness, `m3 / sd^3`. Zero when the deviation is zero.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let sd = m2.sqrt();
    if sd == 0.0 {
        return 0.0;
    }
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    m3 / sd.powi(3)
}

/// Population kurtosis, `m4 / m2^2` (3.0 for a normal distribution).
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return 0.0;
    }
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / n;
    m4 / m2.powi(2)
}

/// Pearson correlation between two equal-length slices.
///
/// `None` when fewer than 3 observations or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 3 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Sort a copy of the values ascending, ignoring NaN ordering issues.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== central moments ====================

    #[test]
    fn test_mean_and_sample_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((mean(&values) - 3.0).abs() < 1e-12);
        // Sample variance = 10 / 4 = 2.5
        assert!((sample_std(&values) - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_degenerate() {
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(sample_std(&[5.0]), 0.0);
        assert_eq!(sample_std(&[5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_skewness_signs() {
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).abs() < 1e-9);
        assert!(skewness(&[1.0, 1.0, 1.0, 1.0, 10.0]) > 0.0);
        assert_eq!(skewness(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_kurtosis_of_two_point_mass() {
        // Symmetric two-point distribution has kurtosis exactly 1.
        let values = [-1.0, -1.0, 1.0, 1.0];
        assert!((kurtosis(&values) - 1.0).abs() < 1e-12);
    }

    // ==================== quantiles ====================

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&values, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&values, 0.25) - 1.75).abs() < 1e-12);
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 1.0), 4.0);
    }

    #[test]
    fn test_median_absolute_deviation() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let med = median_sorted(&values);
        assert_eq!(med, 3.0);
        // |deviations| = [2, 1, 0, 1, 97] -> median 1
        assert_eq!(median_absolute_deviation(&values, med), 1.0);
    }

    // ==================== correlation ====================

    #[test]
    fn test_pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_for_constant_side() {
        let x = [1.0, 2.0, 3.0];
        let y = [5.0, 5.0, 5.0];
        assert!(pearson(&x, &y).is_none());
    }

    #[test]
    fn test_pearson_requires_three_points() {
        assert!(pearson(&[1.0, 2.0], &[3.0, 4.0]).is_none());
    }
}

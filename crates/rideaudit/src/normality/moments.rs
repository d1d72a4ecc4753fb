//! Jarque-Bera moment test: measures how far sample skewness and kurtosis
//! stray from the normal values (0 and 3). The statistic is asymptotically
//! chi-squared with 2 degrees of freedom.

use crate::stats::{kurtosis, skewness};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Compute the JB statistic and p-value.
///
/// Preconditions (enforced by the battery): `n >= 3`, sample not constant.
pub(crate) fn jarque_bera(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len() as f64;
    let s = skewness(values);
    let k = kurtosis(values);

    let jb = n / 6.0 * (s.powi(2) + (k - 3.0).powi(2) / 4.0);
    let chi2 = ChiSquared::new(2.0).ok()?;
    let p = (1.0 - chi2.cdf(jb)).clamp(0.0, 1.0);
    Some((jb, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_mesokurtic_sample_low_statistic() {
        // Skewness ~0; mild platykurtosis for a uniform grid keeps JB small.
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let (jb, p) = jarque_bera(&values).unwrap();
        assert!(jb < 3.0, "JB = {jb}");
        assert!(p > 0.05, "p = {p}");
    }

    #[test]
    fn test_bimodal_sample_rejected() {
        // Two tight clusters: skewness 0, kurtosis ~1 -> JB = n/6.
        let mut values: Vec<f64> = (0..30).map(|i| i as f64 * 0.01).collect();
        values.extend((0..30).map(|i| 100.0 + i as f64 * 0.01));
        let (jb, p) = jarque_bera(&values).unwrap();
        assert!(jb > 9.0, "JB = {jb}");
        assert!(p < 0.05, "p = {p}");
    }

    #[test]
    fn test_skewed_sample_rejected() {
        let mut values = vec![1.0; 30];
        values.extend([50.0, 60.0, 70.0]);
        let (_, p) = jarque_bera(&values).unwrap();
        assert!(p < 0.01, "p = {p}");
    }
}

//! One-sample Kolmogorov-Smirnov test against a normal distribution fitted
//! to the sample (mean and sample standard deviation estimated from the
//! data, matching the usual exploratory usage).

use statrs::distribution::{ContinuousCDF, Normal};

/// Compute the D statistic and asymptotic p-value for an ascending-sorted
/// sample against `Normal(mean, std_dev)`.
///
/// Preconditions (enforced by the battery): `n >= 3`, `std_dev > 0`.
pub(crate) fn kolmogorov_smirnov(sorted: &[f64], mean: f64, std_dev: f64) -> Option<(f64, f64)> {
    let n = sorted.len();
    let nf = n as f64;
    let fitted = Normal::new(mean, std_dev).ok()?;

    let mut d = 0.0f64;
    for (i, x) in sorted.iter().enumerate() {
        let cdf = fitted.cdf(*x);
        let above = (i as f64 + 1.0) / nf - cdf;
        let below = cdf - i as f64 / nf;
        d = d.max(above).max(below);
    }

    Some((d, kolmogorov_p(d, nf)))
}

/// Asymptotic Kolmogorov distribution tail probability with the
/// Stephens small-sample correction to the effective sample size.
fn kolmogorov_p(d: f64, nf: f64) -> f64 {
    let sqrt_n = nf.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    if lambda <= 0.0 {
        return 1.0;
    }

    let mut sum = 0.0f64;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        if term < 1e-16 {
            break;
        }
        sum += if k % 2 == 1 { term } else { -term };
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

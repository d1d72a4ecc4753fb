//! Anderson-Darling test for normality with estimated parameters.
//!
//! Uses the D'Agostino-Stephens case-4 small-sample adjustment and p-value
//! approximation, so the decision can share the same `p > alpha` rule as
//! the other tests in the battery.

use statrs::distribution::{ContinuousCDF, Normal};

const CDF_EPS: f64 = 1e-12;

/// Compute the adjusted A² statistic and approximate p-value for an
/// ascending-sorted sample.
///
/// Preconditions (enforced by the battery): `n >= 8`, `std_dev > 0`.
pub(crate) fn anderson_darling(sorted: &[f64], mean: f64, std_dev: f64) -> Option<(f64, f64)> {
    let n = sorted.len();
    let nf = n as f64;
    let std_normal = Normal::new(0.0, 1.0).ok()?;

    let u: Vec<f64> = sorted
        .iter()
        .map(|x| {
            std_normal
                .cdf((x - mean) / std_dev)
                .clamp(CDF_EPS, 1.0 - CDF_EPS)
        })
        .collect();

    let mut sum = 0.0f64;
    for i in 0..n {
        let weight = (2 * (i + 1) - 1) as f64;
        sum += weight * (u[i].ln() + (1.0 - u[n - 1 - i]).ln());
    }
    let a_squared = -nf - sum / nf;

    // Adjustment for estimating both mean and variance from the sample.
    let adjusted = a_squared * (1.0 + 0.75 / nf + 2.25 / (nf * nf));
    Some((adjusted, p_value(adjusted)))
}

fn p_value(a: f64) -> f64 {
    let p = if a >= 0.6 {
        (1.2937 - 5.709 * a + 0.0186 * a * a).exp()
    } else if a >= 0.34 {
        (0.9177 - 4.279 * a - 1.38 * a * a).exp()
    } else if a >= 0.2 {
        1.0 - (-8.318 + 42.796 * a - 59.938 * a * a).exp()
    } else {
        1.0 - (-13.436 + 101.14 * a - 223.73 * a * a).exp()
    };
    p.clamp(0.0, 1.0)
}

//! Shapiro-Wilk W test, Royston's AS R94 approximation.
//!
//! Valid for sample sizes 3..=5000; the caller enforces the ceiling and
//! the non-constant precondition.

use statrs::distribution::{ContinuousCDF, Normal};

/// Compute the W statistic and p-value for an ascending-sorted sample.
///
/// Preconditions (enforced by the battery): `3 <= n <= 5000`, sample not
/// constant. `None` when the sum of squares degenerates anyway.
pub(crate) fn shapiro_wilk(sorted: &[f64]) -> Option<(f64, f64)> {
    let n = sorted.len();
    let nf = n as f64;
    let std_normal = Normal::new(0.0, 1.0).ok()?;

    // Expected values of standard normal order statistics (Blom scores).
    let mut m = vec![0.0; n];
    for (i, slot) in m.iter_mut().enumerate() {
        *slot = std_normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (nf + 0.25));
    }
    let m_sum_sq: f64 = m.iter().map(|v| v * v).sum();
    let rsqrt_m = 1.0 / m_sum_sq.sqrt();
    let u = 1.0 / nf.sqrt();

    // Weight vector with Royston's polynomial corrections for the tails.
    let mut a = vec![0.0; n];
    if n == 3 {
        a[2] = std::f64::consts::FRAC_1_SQRT_2;
        a[0] = -a[2];
    } else {
        let a_n = -2.706056 * u.powi(5) + 4.434685 * u.powi(4) - 2.071190 * u.powi(3)
            - 0.147981 * u.powi(2)
            + 0.221157 * u
            + m[n - 1] * rsqrt_m;

        if n <= 5 {
            let phi = (m_sum_sq - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
            a[n - 1] = a_n;
            a[0] = -a_n;
            let scale = phi.sqrt();
            for i in 1..n - 1 {
                a[i] = m[i] / scale;
            }
        } else {
            let a_n1 = -3.582633 * u.powi(5) + 5.682633 * u.powi(4) - 1.752461 * u.powi(3)
                - 0.293762 * u.powi(2)
                + 0.042981 * u
                + m[n - 2] * rsqrt_m;

            let phi = (m_sum_sq - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
                / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
            a[n - 1] = a_n;
            a[0] = -a_n;
            a[n - 2] = a_n1;
            a[1] = -a_n1;
            let scale = phi.sqrt();
            for i in 2..n - 2 {
                a[i] = m[i] / scale;
            }
        }
    }

    let mean = sorted.iter().sum::<f64>() / nf;
    let numerator: f64 = sorted
        .iter()
        .zip(a.iter())
        .map(|(x, w)| w * x)
        .sum::<f64>()
        .powi(2);
    let denominator: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
    if denominator <= 0.0 {
        return None;
    }
    let w = (numerator / denominator).min(1.0);

    let p = p_value(w, n, &std_normal);
    Some((w, p.clamp(0.0, 1.0)))
}

/// Normalizing transformation of W into an approximate standard normal,
/// per Royston (1995).
fn p_value(w: f64, n: usize, std_normal: &Normal) -> f64 {
    let nf = n as f64;

    if n == 3 {
        let p = 6.0 / std::f64::consts::PI
            * ((w.sqrt()).asin() - (0.75f64).sqrt().asin());
        return p.max(0.0);
    }

    let (z, valid) = if n <= 11 {
        let gamma = 0.459 * nf - 2.273;
        let arg = gamma - (1.0 - w).ln();
        if arg <= 0.0 {
            // W so close to 1 the transform degenerates; no evidence against
            // normality at this sample size.
            (0.0, false)
        } else {
            let wln = -arg.ln();
            let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf.powi(2) - 0.0006714 * nf.powi(3);
            let sigma =
                (1.3822 - 0.77857 * nf + 0.062767 * nf.powi(2) - 0.0020322 * nf.powi(3)).exp();
            ((wln - mu) / sigma, true)
        }
    } else {
        let ln_n = nf.ln();
        let wln = (1.0 - w).ln();
        let mu = -1.5861 - 0.31082 * ln_n - 0.083751 * ln_n.powi(2) + 0.0038915 * ln_n.powi(3);
        let sigma = (-0.4803 - 0.082676 * ln_n + 0.0030302 * ln_n.powi(2)).exp();
        ((wln - mu) / sigma, true)
    };

    if !valid {
        return 1.0;
    }
    1.0 - std_normal.cdf(z)
}

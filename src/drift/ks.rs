// Two-sample Kolmogorov-Smirnov test
//
// D = max |F_ref(x) - F_cur(x)| over the pooled sample, with ties handled by
// advancing both empirical CDFs past every copy of a value before measuring
// the gap. Up to EXACT_MAX_SAMPLE values per side the two-sided p-value is
// the exact probability that a uniformly random merge path of the two
// samples strays at least D from the diagonal. Above that it falls back to
// the asymptotic Kolmogorov distribution with the Stephens correction on
// the effective sample size.

use serde::{Deserialize, Serialize};

/// Name reported alongside every KS result
pub const KS_TEST_NAME: &str = "Kolmogorov-Smirnov";

/// Largest sample size (either side) that gets the exact p-value
pub const EXACT_MAX_SAMPLE: usize = 10_000;

/// Result of a two-sample KS test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KsTestResult {
    /// Maximum absolute gap between the two empirical CDFs
    pub statistic: f64,

    /// Two-sided p-value
    pub p_value: f64,

    /// `p_value < alpha`
    pub drift_detected: bool,

    /// Always "Kolmogorov-Smirnov"
    pub test: String,
}

/// Survival function of the Kolmogorov distribution, Q_KS(λ)
///
/// Q_KS(λ) = 2 Σ_{k≥1} (-1)^{k-1} exp(-2 k² λ²)
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    // The series is 1 to double precision below this point and converges slowly
    if lambda < 0.2 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut previous_term = 0.0f64;
    for k in 1..=100 {
        let k = f64::from(k);
        let term = sign * 2.0 * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() <= 1e-10 * previous_term.abs() || term.abs() <= 1e-12 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous_term = term;
    }
    1.0
}

/// Two-sample KS statistic on finite values
fn ks_statistic(reference: &[f64], current: &[f64]) -> f64 {
    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d_max = 0.0f64;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d_max = d_max.max((i as f64 / n1 - j as f64 / n2).abs());
    }

    d_max
}

/// Exact two-sided p-value P(D >= d) for sample sizes `m` and `n`
///
/// Walks the (m+1)x(n+1) lattice of merge paths keeping the probability
/// mass of paths that have stayed strictly inside |i/m - j/n| < d. Mass
/// leaving the band is accumulated directly, so small p-values keep their
/// precision. Distances are compared on the integer scale `i*n - j*m`.
fn exact_p_value(m: usize, n: usize, d: f64) -> f64 {
    let (mi, ni) = (m as i64, n as i64);
    let h = (d * (mi * ni) as f64).round() as i64;
    if h <= 0 {
        return 1.0;
    }
    let outside = |i: usize, j: usize| (i as i64 * ni - j as i64 * mi).abs() >= h;

    let mut row = vec![0.0f64; n + 1];
    let mut next = vec![0.0f64; n + 1];
    row[0] = 1.0;
    let mut escaped = 0.0f64;

    for i in 0..=m {
        next.fill(0.0);
        for j in 0..=n {
            let mass = row[j];
            let remaining = (m - i) + (n - j);
            if mass <= 0.0 || remaining == 0 {
                continue;
            }
            let remaining = remaining as f64;

            if i < m {
                let flow = mass * (m - i) as f64 / remaining;
                if outside(i + 1, j) {
                    escaped += flow;
                } else {
                    next[j] += flow;
                }
            }
            if j < n {
                let flow = mass * (n - j) as f64 / remaining;
                if outside(i, j + 1) {
                    escaped += flow;
                } else {
                    row[j + 1] += flow;
                }
            }
        }
        std::mem::swap(&mut row, &mut next);
    }

    escaped.clamp(0.0, 1.0)
}

/// Asymptotic p-value with the Stephens correction
fn asymptotic_p_value(m: usize, n: usize, d: f64) -> f64 {
    let (n1, n2) = (m as f64, n as f64);
    let en = (n1 * n2 / (n1 + n2)).sqrt();
    kolmogorov_survival((en + 0.12 + 0.11 / en) * d)
}

/// Run a two-sample KS test, dropping NaN values from each side first
///
/// Returns `None` when either side has no usable values.
///
/// # Example
/// ```
/// use deriva::drift::ks_2samp;
///
/// let reference: Vec<f64> = (0..200).map(f64::from).collect();
/// let result = ks_2samp(&reference, &reference, 0.05).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert!(!result.drift_detected);
/// ```
pub fn ks_2samp(reference: &[f64], current: &[f64], alpha: f64) -> Option<KsTestResult> {
    let reference: Vec<f64> = reference.iter().copied().filter(|v| !v.is_nan()).collect();
    let current: Vec<f64> = current.iter().copied().filter(|v| !v.is_nan()).collect();
    if reference.is_empty() || current.is_empty() {
        return None;
    }

    let statistic = ks_statistic(&reference, &current);

    let (m, n) = (reference.len(), current.len());
    let p_value = if m.max(n) <= EXACT_MAX_SAMPLE {
        exact_p_value(m, n, statistic)
    } else {
        asymptotic_p_value(m, n, statistic)
    };

    Some(KsTestResult {
        statistic,
        p_value,
        drift_detected: p_value < alpha,
        test: KS_TEST_NAME.to_string(),
    })
}

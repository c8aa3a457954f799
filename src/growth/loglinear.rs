//! Log-linear NHPP (Cox-Lewis) reliability growth
//!
//! The failure intensity is `ρ(t) = exp(γ₀ + γ₁ t)`, so `γ₁ < 0` means the
//! system is improving. With `N` failures at times `t_i` observed up to `T`
//!
//! ```text
//! Σ t_i + N/γ₁ − N T e^{γ₁T} / (e^{γ₁T} − 1) = 0
//! γ₀ = ln(N γ₁ / (e^{γ₁T} − 1))
//! ```
//!
//! The score in `γ₁` is strictly decreasing, equal to `Σ t_i − N T/2` at zero,
//! so its sign there picks the side of the bracket. Rows are fitted on growing
//! prefixes like [`crow_amsaa`](super::crow_amsaa()). Grouped counts are taken
//! as failures at their time point.

use nalgebra::Matrix2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{BoundedEstimate, GrowthOptions, GrowthSeries};
use crate::error::{DomainError, ReliabilityError};
use crate::optimize::solve_bracketed;
use crate::stats::{normalize_confidence, std_normal_quantile};

/// Below this `|γ₁ T|` the score and `γ₀` use their series expansions
const SMALL: f64 = 1e-6;

/// Below this `|γ₁ T|` the integral `F` and its derivatives are summed as power
/// series; the closed forms cancel badly near zero
const SERIES_LIMIT: f64 = 0.5;

/// Estimates using the data up to one time point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogLinearRow {
    pub time: f64,
    pub n_failures: u64,
    pub gamma0: BoundedEstimate,
    pub gamma1: BoundedEstimate,
    /// `exp(γ₀ + γ₁ T)` at the end of the window
    pub intensity: BoundedEstimate,
    pub mtbf: BoundedEstimate,
    /// Observed `T / N`
    pub cumulative_mtbf: f64,
    /// The score had no root and `γ₁` fell back to 0
    pub degenerate: bool,
}

impl LogLinearRow {
    /// Expected failures by time `t`, `e^{γ₀}(e^{γ₁t} − 1)/γ₁`
    pub fn expected_failures(&self, t: f64) -> f64 {
        self.gamma0.value.exp() * growth_integral(self.gamma1.value, t).0
    }
}

/// Sequential log-linear fit, one row per time point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLinearFit {
    pub confidence: f64,
    pub rows: Vec<LogLinearRow>,
}

impl LogLinearFit {
    pub fn final_row(&self) -> Option<&LogLinearRow> {
        self.rows.last()
    }
}

/// `F(γ) = (e^{γT} − 1)/γ` with its first two derivatives in `γ`
fn growth_integral(gamma: f64, end: f64) -> (f64, f64, f64) {
    let x = gamma * end;
    if x.abs() < SERIES_LIMIT {
        // F = T Σ x^j/(j+1)!, differentiated term by term
        let (mut f, mut f1, mut f2) = (0.0, 0.0, 0.0);
        let mut power = 1.0;
        let mut factorial = 1.0;
        for j in 0..25 {
            let j = j as f64;
            factorial *= j + 1.0;
            f += power / factorial;
            f1 += (j + 1.0) * power / (factorial * (j + 2.0));
            f2 += (j + 1.0) * power / (factorial * (j + 3.0));
            power *= x;
        }
        return (end * f, end * end * f1, end * end * end * f2);
    }
    let f = x.exp_m1() / gamma;
    let f1 = (end * x.exp() - f) / gamma;
    let f2 = (end * end * x.exp() - 2.0 * f1) / gamma;
    (f, f1, f2)
}

/// Score in `γ₁`, `Σ t_i + N (1/γ₁ − T/(1 − e^{−γ₁T}))`
fn score(gamma: f64, sum: f64, n: f64, end: f64) -> f64 {
    let x = gamma * end;
    let tail = if x.abs() < SMALL {
        -0.5 * end - gamma * end * end / 12.0
    } else {
        1.0 / gamma - end / -(-x).exp_m1()
    };
    sum + n * tail
}

/// `ln(γ₁ / (e^{γ₁T} − 1))`, finite for large `γ₁ T`
fn log_rate_factor(gamma: f64, end: f64) -> f64 {
    let x = gamma * end;
    if x.abs() < SMALL {
        -end.ln() - 0.5 * x
    } else if x > 30.0 {
        gamma.ln() - x - (-(-x).exp()).ln_1p()
    } else {
        (gamma / x.exp_m1()).ln()
    }
}

fn solve_gamma1(sum: f64, n: f64, end: f64, options: &GrowthOptions) -> Result<Option<f64>, ReliabilityError> {
    let f = |gamma: f64| score(gamma, sum, n, end);
    let at_zero = f(0.0);
    if at_zero == 0.0 {
        return Ok(Some(0.0));
    }

    let step = if at_zero > 0.0 { 1.0 / end } else { -1.0 / end };
    let mut far = step;
    for _ in 0..60 {
        if f(far).signum() != at_zero.signum() {
            let (lo, hi) = if step > 0.0 { (0.0, far) } else { (far, 0.0) };
            let root = solve_bracketed(
                "log-linear gamma1",
                f,
                lo,
                hi,
                options.tolerance,
                options.max_iterations,
            )?;
            return Ok(Some(root));
        }
        far *= 2.0;
    }
    Ok(None)
}

fn fit_row(series: &GrowthSeries, k: usize, options: &GrowthOptions, z: f64) -> Result<LogLinearRow, ReliabilityError> {
    let times = &series.times()[..=k];
    let counts = &series.counts()[..=k];
    let end = if k + 1 == series.len() && !options.grouped {
        options.termination.end_time(times[k])?
    } else {
        times[k]
    };
    let n: f64 = counts.iter().map(|&c| c as f64).sum();
    let sum: f64 = times.iter().zip(counts).map(|(&t, &c)| c as f64 * t).sum();

    let estimate = solve_gamma1(sum, n, end, options)?;
    let degenerate = estimate.is_none();
    if degenerate {
        tracing::warn!(time = times[k], "log-linear slope not estimable, using gamma1 = 0");
    }
    let gamma1 = estimate.unwrap_or(0.0);
    let gamma0 = n.ln() + log_rate_factor(gamma1, end);

    // observed information of (γ₀, γ₁); e^{γ₀} F(γ₁) = N at the estimate
    let (f, f1, f2) = growth_integral(gamma1, end);
    let scale = n / f;
    let information = Matrix2::new(n, scale * f1, scale * f1, scale * f2);
    let cov = information
        .try_inverse()
        .ok_or_else(|| DomainError::SingularInformation {
            context: format!("log-linear information at time {end}"),
        })?;

    let log_intensity = gamma0 + gamma1 * end;
    let var_log_intensity = cov[(0, 0)] + 2.0 * end * cov[(0, 1)] + end * end * cov[(1, 1)];
    let rho = log_intensity.exp();
    let intensity = BoundedEstimate::log_normal(rho, rho * rho * var_log_intensity, z);

    Ok(LogLinearRow {
        time: times[k],
        n_failures: counts.iter().map(|&c| c as u64).sum(),
        gamma0: BoundedEstimate::normal(gamma0, cov[(0, 0)], z),
        gamma1: BoundedEstimate::normal(gamma1, cov[(1, 1)], z),
        intensity,
        mtbf: intensity.reciprocal(),
        cumulative_mtbf: end / n,
        degenerate,
    })
}

/// Sequential log-linear NHPP fit
///
/// Row `k` uses the first `k + 1` time points and ends at its own time; the final
/// row of individual data honours `options.termination`. Confidence, iteration
/// budget, tolerance and parallelism come from `options` as for Crow-AMSAA.
pub fn loglinear_fit(series: &GrowthSeries, options: &GrowthOptions) -> Result<LogLinearFit, ReliabilityError> {
    let confidence = normalize_confidence(options.confidence)?;
    let z = std_normal_quantile(confidence);

    let rows = if options.parallel {
        (0..series.len())
            .into_par_iter()
            .map(|k| fit_row(series, k, options, z))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        (0..series.len())
            .map(|k| fit_row(series, k, options, z))
            .collect::<Result<Vec<_>, _>>()?
    };

    if let Some(last) = rows.last() {
        tracing::debug!(
            rows = rows.len(),
            gamma0 = last.gamma0.value,
            gamma1 = last.gamma1.value,
            "log-linear fit complete"
        );
    }
    Ok(LogLinearFit { confidence, rows })
}

//! Crow-AMSAA (NHPP power-law) reliability growth
//!
//! The expected number of failures by time `T` is `λ T^β`. Parameters are
//! re-estimated at every time point using only the data observed so far, so the
//! rows show how the estimates settle as the test accrues time.
//!
//! ```text
//! individual   β = N / (N ln T − Σ c_i ln t_i)
//! grouped      Σ f_i [ (t_i^β ln t_i − t_{i−1}^β ln t_{i−1}) / (t_i^β − t_{i−1}^β) − ln T ] = 0
//!              λ = N / T^β
//! ```
//!
//! Bounds use the inverse Fisher information
//! `[[N/λ², T^β ln T], [T^β ln T, N/β² + λ T^β ln²T]]` and the delta method.

use nalgebra::Matrix2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{BoundedEstimate, GrowthOptions, GrowthSeries, Termination};
use crate::error::{ConvergenceError, DomainError, ReliabilityError};
use crate::optimize::solve_bracketed;
use crate::stats::{normalize_confidence, std_normal_quantile};

/// Estimates using the data up to one time point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub time: f64,
    /// Cumulative failures up to `time`
    pub n_failures: u64,
    pub beta: BoundedEstimate,
    pub lambda: BoundedEstimate,
    /// `λ T^{β−1}`
    pub cumulative_intensity: BoundedEstimate,
    /// `λ β T^{β−1}`
    pub instantaneous_intensity: BoundedEstimate,
    pub cumulative_mtbf: BoundedEstimate,
    pub instantaneous_mtbf: BoundedEstimate,
    pub chi_square: f64,
    /// `NaN` for grouped data or with fewer than two failures
    pub cramer_von_mises: f64,
    /// Beta could not be estimated and fell back to 1
    pub degenerate: bool,
}

/// Sequential Crow-AMSAA fit, one row per time point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthFit {
    pub confidence: f64,
    pub grouped: bool,
    pub termination: Termination,
    pub rows: Vec<GrowthRow>,
}

impl GrowthFit {
    /// Estimates using all the data
    pub fn final_row(&self) -> Option<&GrowthRow> {
        self.rows.last()
    }
}

/// Observation window and data prefix for one row
struct Window<'a> {
    times: &'a [f64],
    counts: &'a [u32],
    end: f64,
    time_truncated: bool,
    n: f64,
}

impl<'a> Window<'a> {
    fn new(series: &'a GrowthSeries, k: usize, options: &GrowthOptions) -> Result<Self, ReliabilityError> {
        let times = &series.times()[..=k];
        let counts = &series.counts()[..=k];
        let last = times[k];
        let is_final = k + 1 == series.len();
        let (end, time_truncated) = if is_final && !options.grouped {
            (options.termination.end_time(last)?, options.termination.is_time_truncated())
        } else {
            (last, false)
        };
        let n = counts.iter().map(|&c| c as f64).sum();
        Ok(Self {
            times,
            counts,
            end,
            time_truncated,
            n,
        })
    }
}

/// Closed-form individual-data shape, `None` when the denominator is not positive
fn individual_beta(w: &Window) -> Option<f64> {
    let sum_log: f64 = w
        .times
        .iter()
        .zip(w.counts)
        .map(|(t, &c)| c as f64 * t.ln())
        .sum();
    let denominator = w.n * w.end.ln() - sum_log;
    (denominator > 0.0).then(|| w.n / denominator)
}

/// Grouped-data score in `β`
///
/// Each interval term is written with `r = (t_{i−1}/t_i)^β` so that large times do
/// not overflow; the first interval starts at zero where `0^β ln 0 = 0`.
fn grouped_score(beta: f64, times: &[f64], counts: &[u32], end: f64) -> f64 {
    let ln_end = end.ln();
    let mut previous = 0.0_f64;
    let mut total = 0.0;
    for (&t, &f) in times.iter().zip(counts) {
        let term = if previous > 0.0 {
            let r = (previous / t).powf(beta);
            (t.ln() - r * previous.ln()) / (1.0 - r)
        } else {
            t.ln()
        };
        total += f as f64 * (term - ln_end);
        previous = t;
    }
    total
}

fn grouped_beta(w: &Window, options: &GrowthOptions) -> Result<Option<f64>, ConvergenceError> {
    let with_failures = w.counts.iter().filter(|&&c| c > 0).count();
    if w.times.len() < 2 || with_failures == 0 {
        return Ok(None);
    }
    let score = |beta: f64| grouped_score(beta, w.times, w.counts, w.end);

    let (mut lo, mut hi) = (0.5, 2.0);
    for _ in 0..30 {
        if score(lo).signum() != score(hi).signum() {
            break;
        }
        lo *= 0.5;
        hi *= 2.0;
    }
    solve_bracketed(
        "Crow-AMSAA grouped beta",
        score,
        lo,
        hi,
        options.tolerance,
        options.max_iterations,
    )
    .map(Some)
}

/// Delta-method variance of `g(λ, β)` with gradient `(dl, db)`
#[inline]
fn delta_variance(cov: &Matrix2<f64>, dl: f64, db: f64) -> f64 {
    dl * dl * cov[(0, 0)] + db * db * cov[(1, 1)] + 2.0 * dl * db * cov[(0, 1)]
}

fn expected_counts(lambda: f64, beta: f64, times: &[f64]) -> Vec<f64> {
    let mut previous = 0.0_f64;
    times
        .iter()
        .map(|&t| {
            let theta = lambda * (t.powf(beta) - previous.powf(beta));
            previous = t;
            theta
        })
        .collect()
}

/// Cramer-von Mises statistic on the expanded failure times
///
/// Failure-truncated data drop the terminal failure (`M = N − 1`); time-truncated
/// data use all `M = N` failures against the termination time.
pub(crate) fn cramer_von_mises(expanded: &[f64], beta: f64, end: f64, time_truncated: bool) -> f64 {
    let n = expanded.len();
    let m = if time_truncated { n } else { n.saturating_sub(1) };
    if m == 0 {
        return f64::NAN;
    }
    let beta_bar = (n as f64 - 1.0) * beta / n as f64;
    let mf = m as f64;
    let sum: f64 = expanded[..m]
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let expected = (2.0 * (i + 1) as f64 - 1.0) / (2.0 * mf);
            ((t / end).powf(beta_bar) - expected).powi(2)
        })
        .sum();
    sum + 1.0 / (12.0 * mf)
}

fn fit_row(series: &GrowthSeries, k: usize, options: &GrowthOptions, z: f64) -> Result<GrowthRow, ReliabilityError> {
    let w = Window::new(series, k, options)?;
    let estimate = if options.grouped {
        grouped_beta(&w, options)?
    } else {
        individual_beta(&w)
    };
    let degenerate = estimate.is_none();
    if degenerate {
        tracing::warn!(time = w.times[k], "growth shape not estimable, using beta = 1");
    }
    let beta = estimate.unwrap_or(1.0);
    let t = w.end;
    let n = w.n;
    let t_beta = t.powf(beta);
    let lambda = n / t_beta;
    let ln_t = t.ln();

    let information = Matrix2::new(
        n / (lambda * lambda),
        t_beta * ln_t,
        t_beta * ln_t,
        n / (beta * beta) + lambda * t_beta * ln_t * ln_t,
    );
    let cov = information
        .try_inverse()
        .ok_or_else(|| DomainError::SingularInformation {
            context: format!("Crow-AMSAA Fisher matrix at time {t}"),
        })?;

    let t_pow = t.powf(beta - 1.0);
    let rho_c = lambda * t_pow;
    let rho_i = lambda * beta * t_pow;
    let var_rho_c = delta_variance(&cov, t_pow, rho_c * ln_t);
    let var_rho_i = delta_variance(&cov, beta * t_pow, lambda * t_pow + rho_i * ln_t);

    let cumulative_intensity = BoundedEstimate::log_normal(rho_c, var_rho_c, z);
    let instantaneous_intensity = BoundedEstimate::log_normal(rho_i, var_rho_i, z);

    let (chi_square, cramer_von_mises) = if options.grouped {
        let chi: f64 = expected_counts(lambda, beta, w.times)
            .iter()
            .zip(w.counts)
            .filter(|(theta, _)| **theta > 0.0)
            .map(|(theta, &f)| (f as f64 - theta).powi(2) / theta)
            .sum();
        (chi, f64::NAN)
    } else {
        let expanded: Vec<f64> = w
            .times
            .iter()
            .zip(w.counts)
            .flat_map(|(&t, &c)| std::iter::repeat(t).take(c as usize))
            .collect();
        (
            2.0 * n / beta,
            cramer_von_mises(&expanded, beta, t, w.time_truncated),
        )
    };

    Ok(GrowthRow {
        time: w.times[k],
        n_failures: w.counts.iter().map(|&c| c as u64).sum(),
        beta: BoundedEstimate::log_normal(beta, cov[(1, 1)], z),
        lambda: BoundedEstimate::log_normal(lambda, cov[(0, 0)], z),
        cumulative_intensity,
        instantaneous_intensity,
        cumulative_mtbf: cumulative_intensity.reciprocal(),
        instantaneous_mtbf: instantaneous_intensity.reciprocal(),
        chi_square,
        cramer_von_mises,
        degenerate,
    })
}

/// Sequential Crow-AMSAA fit
///
/// Row `k` uses the first `k + 1` time points. Only the final row of individual
/// data honours a time-truncated termination; earlier rows end at their own time.
/// With `options.parallel` the rows are computed on the rayon pool; the result is
/// identical to the sequential order.
pub fn crow_amsaa(series: &GrowthSeries, options: &GrowthOptions) -> Result<GrowthFit, ReliabilityError> {
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
            beta = last.beta.value,
            lambda = last.lambda.value,
            "crow-amsaa fit complete"
        );
    }
    Ok(GrowthFit {
        confidence,
        grouped: options.grouped,
        termination: options.termination,
        rows,
    })
}

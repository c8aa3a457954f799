//! Maximum-likelihood estimation for censored life data
//!
//! The score equations are solved in three stages: a starting point from rank
//! regression (or moments), a Nelder-Mead search over log-transformed positive
//! parameters to reach the basin of the maximum, and a damped Newton solve of
//! `∂lnL/∂θ = 0` that polishes the root and yields the observed information.

use nalgebra::DMatrix;

use super::distribution::LifeDistribution;
use super::likelihood::{log_likelihood, score, Sample};
use super::types::{DistributionKind, FitOptions};
use crate::data::CensoringKind;
use crate::error::{ConvergenceError, DataError, DomainError, ReliabilityError};
use crate::optimize::{solve_root, NewtonOptions, SimplexOptimizer};

/// Converged maximum-likelihood estimate
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MleEstimate {
    pub model: LifeDistribution,
    pub covariance: DMatrix<f64>,
    pub iterations: usize,
}

/// Moment-based starting values from the resolved failure times
fn moment_start(kind: DistributionKind, samples: &[Sample]) -> Vec<f64> {
    let failures: Vec<(f64, f64)> = samples
        .iter()
        .filter(|s| s.kind.is_failure())
        .map(|s| {
            let t = match s.kind {
                CensoringKind::Event => s.left,
                CensoringKind::LeftCensored => s.right,
                _ => 0.5 * (s.left + s.right),
            };
            (t, s.weight)
        })
        .collect();
    let (mean, sd) = weighted_moments(&failures, |t| t);
    match kind {
        DistributionKind::Exponential => vec![1.0 / mean.max(f64::MIN_POSITIVE)],
        DistributionKind::Weibull => vec![mean.max(f64::MIN_POSITIVE), 1.0],
        DistributionKind::Lognormal => {
            let (m, s) = weighted_moments(&failures, |t| t.max(f64::MIN_POSITIVE).ln());
            vec![m, fallback_spread(s, m)]
        }
        DistributionKind::Gaussian => vec![mean, fallback_spread(sd, mean)],
    }
}

fn weighted_moments(points: &[(f64, f64)], transform: impl Fn(f64) -> f64) -> (f64, f64) {
    let w: f64 = points.iter().map(|p| p.1).sum();
    let mean = points.iter().map(|&(t, wt)| wt * transform(t)).sum::<f64>() / w;
    let var = points
        .iter()
        .map(|&(t, wt)| wt * (transform(t) - mean).powi(2))
        .sum::<f64>()
        / w;
    (mean, var.sqrt())
}

#[inline]
fn fallback_spread(spread: f64, location: f64) -> f64 {
    if spread.is_finite() && spread > 0.0 {
        spread
    } else {
        (0.1 * location.abs()).max(1e-3)
    }
}

/// Exponential rate from exact and right-censored data: `λ = r / Σ w t`
fn exponential_closed_form(samples: &[Sample]) -> Option<Result<MleEstimate, ReliabilityError>> {
    let closed = samples
        .iter()
        .all(|s| matches!(s.kind, CensoringKind::Event | CensoringKind::RightCensored));
    if !closed {
        return None;
    }
    let failures: f64 = samples
        .iter()
        .filter(|s| s.kind == CensoringKind::Event)
        .map(|s| s.weight)
        .sum();
    let exposure: f64 = samples.iter().map(|s| s.weight * s.left).sum();
    let rate = failures / exposure;
    Some(
        LifeDistribution::from_parameters(DistributionKind::Exponential, &[rate]).map(|model| MleEstimate {
            model,
            covariance: DMatrix::from_element(1, 1, rate * rate / failures),
            iterations: 0,
        }),
    )
}

/// Maximum-likelihood fit of `kind` to `samples`
///
/// `start` is an optional initial parameter vector, usually the rank-regression
/// estimate. Non-convergence of the score solve is a [`ConvergenceError`] named
/// after the distribution.
pub(crate) fn maximum_likelihood(
    kind: DistributionKind,
    samples: &[Sample],
    start: Option<Vec<f64>>,
    options: &FitOptions,
) -> Result<MleEstimate, ReliabilityError> {
    let estimator = format!("{kind} MLE");
    let total_weight: f64 = samples.iter().map(|s| s.weight).sum();
    let failure_weight: f64 = samples
        .iter()
        .filter(|s| s.kind.is_failure())
        .map(|s| s.weight)
        .sum();
    let required = kind.n_parameters();
    if failure_weight < required as f64 {
        return Err(DataError::InsufficientData {
            context: estimator,
            n: failure_weight as usize,
            required,
        }
        .into());
    }

    if kind == DistributionKind::Exponential {
        if let Some(estimate) = exponential_closed_form(samples) {
            return estimate;
        }
    }

    let positive = kind.positive_parameters();
    let start = start.unwrap_or_else(|| moment_start(kind, samples));

    // Search in log space for the positive parameters
    let to_free = |theta: &[f64]| -> Vec<f64> {
        theta
            .iter()
            .zip(positive)
            .map(|(&v, &pos)| if pos { v.ln() } else { v })
            .collect()
    };
    let from_free = |free: &[f64]| -> Vec<f64> {
        free.iter()
            .zip(positive)
            .map(|(&v, &pos)| if pos { v.exp() } else { v })
            .collect()
    };
    let negative_ll = |free: &[f64]| -> f64 {
        match LifeDistribution::from_parameters(kind, &from_free(free)) {
            Ok(dist) => {
                let ll = log_likelihood(&dist, samples);
                if ll.is_finite() {
                    -ll
                } else {
                    f64::INFINITY
                }
            }
            Err(_) => f64::INFINITY,
        }
    };

    let simplex = SimplexOptimizer::new(negative_ll)
        .minimize(&to_free(&start), 1e-12, 20 * options.max_iterations as u64)
        .map_err(|err| {
            tracing::debug!(%kind, error = %err, "simplex search failed");
            ConvergenceError::new(estimator.clone(), 0, f64::NAN, start.clone())
        })?;
    let x0 = from_free(&simplex.param);
    tracing::debug!(%kind, iterations = simplex.iterations, cost = simplex.cost, "simplex search complete");

    let system = |theta: &[f64]| -> Vec<f64> {
        match LifeDistribution::from_parameters(kind, theta) {
            Ok(dist) => score(&dist, samples),
            Err(_) => vec![f64::NAN; theta.len()],
        }
    };
    // Scale-free score: each component times its parameter scale, per unit weight
    let residual = |theta: &[f64], s: &[f64]| -> f64 {
        let spread = theta.last().copied().unwrap_or(1.0);
        s.iter()
            .zip(theta)
            .zip(positive)
            .map(|((g, v), &pos)| (g * if pos { *v } else { spread }).abs())
            .fold(0.0_f64, |acc, r| {
                if acc.is_nan() || r.is_nan() {
                    f64::NAN
                } else {
                    acc.max(r)
                }
            })
            / total_weight
    };
    let feasible = |theta: &[f64]| {
        theta
            .iter()
            .zip(positive)
            .all(|(v, &pos)| v.is_finite() && (!pos || *v > 0.0))
    };
    let newton = NewtonOptions {
        max_iterations: options.max_iterations,
        tolerance: options.tolerance,
        ..NewtonOptions::default()
    };

    let root = solve_root(&estimator, system, residual, feasible, &x0, &newton)?;
    let model = LifeDistribution::from_parameters(kind, &root.x)?;

    let hessian = (&root.jacobian + root.jacobian.transpose()) * 0.5;
    let covariance = (-hessian)
        .try_inverse()
        .ok_or_else(|| DomainError::SingularInformation {
            context: estimator.clone(),
        })?;

    tracing::debug!(
        %kind,
        iterations = root.iterations,
        residual = root.residual,
        "maximum likelihood converged"
    );
    Ok(MleEstimate {
        model,
        covariance,
        iterations: simplex.iterations as usize + root.iterations,
    })
}

//! Fitted distribution with its uncertainty and fit statistics

use serde::{Deserialize, Serialize};

use super::distribution::LifeDistribution;
use super::types::{DistributionKind, FitMethod};
use crate::error::DataError;
use crate::stats::z_score;

/// Information criteria of a fit, evaluated with the censored likelihood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub log_likelihood: f64,
    /// `−2 lnL + 2k`
    pub aic: f64,
    /// `−2 lnL + k ln W`, with `W` the total number of (expanded) records
    pub bic: f64,
}

impl GoodnessOfFit {
    pub(crate) fn new(log_likelihood: f64, n_parameters: usize, n_records: f64) -> Self {
        let k = n_parameters as f64;
        Self {
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n_records.ln(),
        }
    }
}

/// Outcome of one distribution fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub distribution: DistributionKind,
    pub method: FitMethod,
    /// Parameters in family order
    pub parameters: Vec<f64>,
    /// Symmetric parameter covariance in family order
    pub variance_covariance: Vec<Vec<f64>>,
    /// Pearson r of the linearized fit, rank regression only; negative for the
    /// exponential, whose rank transform `ln(1 − F)` falls with time
    pub correlation_coefficient: Option<f64>,
    pub goodness: GoodnessOfFit,
    pub n_failures: f64,
    pub n_suspensions: f64,
    /// Solver iterations, 0 for closed forms
    pub iterations: usize,
    /// Normalized confidence level used for [`FitResult::bounds`]
    pub confidence: f64,
    model: LifeDistribution,
}

impl FitResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        model: LifeDistribution,
        method: FitMethod,
        covariance: &nalgebra::DMatrix<f64>,
        correlation_coefficient: Option<f64>,
        goodness: GoodnessOfFit,
        n_failures: f64,
        n_suspensions: f64,
        iterations: usize,
        confidence: f64,
    ) -> Self {
        let variance_covariance = covariance
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        Self {
            distribution: model.kind(),
            method,
            parameters: model.parameters(),
            variance_covariance,
            correlation_coefficient,
            goodness,
            n_failures,
            n_suspensions,
            iterations,
            confidence,
            model,
        }
    }

    /// The fitted distribution
    pub fn model(&self) -> LifeDistribution {
        self.model
    }

    pub fn standard_errors(&self) -> Vec<f64> {
        self.variance_covariance
            .iter()
            .enumerate()
            .map(|(k, row)| row[k].max(0.0).sqrt())
            .collect()
    }

    /// Two-sided parameter bounds at `confidence`
    ///
    /// Positive parameters use `θ·exp(∓z·se/θ)` so the bounds stay positive;
    /// location parameters use `θ ∓ z·se`.
    pub fn parameter_bounds(&self, confidence: f64) -> Result<Vec<(f64, f64)>, DataError> {
        let z = z_score(confidence)?;
        Ok(self
            .parameters
            .iter()
            .zip(self.standard_errors())
            .zip(self.distribution.positive_parameters())
            .map(|((&theta, se), &positive)| {
                if positive {
                    let factor = (z * se / theta).exp();
                    (theta / factor, theta * factor)
                } else {
                    (theta - z * se, theta + z * se)
                }
            })
            .collect())
    }

    /// Parameter bounds at the confidence level the fit was run with
    pub fn bounds(&self) -> Result<Vec<(f64, f64)>, DataError> {
        self.parameter_bounds(self.confidence)
    }

    pub fn reliability(&self, t: f64) -> f64 {
        self.model.reliability(t)
    }

    pub fn hazard(&self, t: f64) -> f64 {
        self.model.hazard(t)
    }

    pub fn mean_life(&self) -> f64 {
        self.model.mean()
    }
}

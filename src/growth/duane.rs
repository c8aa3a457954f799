//! Duane postulate: cumulative MTBF grows as a power of cumulative test time
//!
//! `ln(T_i / N_i) = ln b + α ln T_i`, fitted by ordinary least squares on the
//! cumulative points of a [`GrowthSeries`].

use serde::{Deserialize, Serialize};

use super::types::GrowthSeries;
use crate::error::{DataError, DomainError, ReliabilityError};
use crate::stats::linear_regression;

/// Least-squares Duane model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuaneFit {
    /// Cumulative MTBF at unit test time
    pub b: f64,
    /// Growth rate
    pub alpha: f64,
    pub b_std_error: f64,
    pub alpha_std_error: f64,
    /// Pearson r of the log-log fit
    pub correlation: f64,
}

impl DuaneFit {
    /// `b t^α`
    pub fn cumulative_mtbf(&self, t: f64) -> f64 {
        self.b * t.powf(self.alpha)
    }

    /// `b t^α / (1 − α)`, infinite for `α ≥ 1`
    pub fn instantaneous_mtbf(&self, t: f64) -> f64 {
        if self.alpha >= 1.0 {
            f64::INFINITY
        } else {
            self.cumulative_mtbf(t) / (1.0 - self.alpha)
        }
    }
}

/// Fit the Duane model to the cumulative points of `series`
///
/// Points before the first failure carry no MTBF and are skipped. At least two
/// distinct points are needed.
pub fn duane_fit(series: &GrowthSeries) -> Result<DuaneFit, ReliabilityError> {
    let mut cumulative = 0u64;
    let (x, y): (Vec<f64>, Vec<f64>) = series
        .times()
        .iter()
        .zip(series.counts())
        .filter_map(|(&t, &c)| {
            cumulative += c as u64;
            (cumulative > 0).then(|| (t.ln(), (t / cumulative as f64).ln()))
        })
        .unzip();
    if x.len() < 2 {
        return Err(DataError::InsufficientData {
            context: "Duane regression".to_string(),
            n: x.len(),
            required: 2,
        }
        .into());
    }
    let stats = linear_regression(&x, &y).ok_or_else(|| DomainError::DegenerateRegression {
        context: "Duane regression".to_string(),
        reason: "all test times coincide".to_string(),
    })?;
    let b = stats.intercept.exp();
    Ok(DuaneFit {
        b,
        alpha: stats.slope,
        b_std_error: b * stats.intercept_variance().max(0.0).sqrt(),
        alpha_std_error: stats.slope_variance().max(0.0).sqrt(),
        correlation: stats.correlation,
    })
}

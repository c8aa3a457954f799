//! Trend tests on cumulative failure times of a repairable system
//!
//! With `N` failures at `t_1 ≤ … ≤ t_N` observed until `T`:
//!
//! ```text
//! MIL-HDBK-189    U = 2 Σ ln(T / t_i)                       χ² with 2M df
//! Laplace         Z = (Σ t_i / N − T/2) / (T √(1/(12N)))    standard normal
//! Lewis-Robinson  Z / CV of the interarrival times
//! ```
//!
//! Failure-truncated data end at `T = t_N`, so the MIL-HDBK-189 statistic has
//! `M = N − 1` informative terms; time-truncated data have `M = N`. The
//! interarrival CV uses the population standard deviation.

use serde::{Deserialize, Serialize};

use super::types::Termination;
use crate::error::{DataError, ReliabilityError};
use crate::stats::{chi_square_sf, pearson, std_normal_sf};

/// Trend test statistics for one failure history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendStatistics {
    pub n_failures: usize,
    /// Small values indicate reliability growth
    pub mil_handbook: f64,
    pub mil_handbook_df: f64,
    /// Negative values indicate reliability growth
    pub laplace: f64,
    /// Laplace statistic corrected for non-exponential interarrival times, `NaN`
    /// when the interarrival spread is zero or undefined
    pub lewis_robinson: f64,
    /// Lag-1 correlation of interarrival times, `NaN` with fewer than three
    pub serial_correlation: f64,
}

impl TrendStatistics {
    /// Two-sided p-value of the MIL-HDBK-189 statistic against a homogeneous
    /// Poisson process
    pub fn mil_handbook_p_value(&self) -> f64 {
        let upper = chi_square_sf(self.mil_handbook, self.mil_handbook_df);
        (2.0 * upper.min(1.0 - upper)).min(1.0)
    }

    pub fn laplace_p_value(&self) -> f64 {
        two_sided_normal(self.laplace)
    }

    pub fn lewis_robinson_p_value(&self) -> f64 {
        two_sided_normal(self.lewis_robinson)
    }
}

#[inline]
fn two_sided_normal(z: f64) -> f64 {
    if z.is_nan() {
        f64::NAN
    } else {
        (2.0 * std_normal_sf(z.abs())).min(1.0)
    }
}

fn validate(times: &[f64]) -> Result<(), DataError> {
    if times.len() < 2 {
        return Err(DataError::InsufficientData {
            context: "trend test".to_string(),
            n: times.len(),
            required: 2,
        });
    }
    let mut previous = 0.0;
    for (index, &time) in times.iter().enumerate() {
        if !time.is_finite() || time <= 0.0 || time < previous {
            return Err(DataError::InvalidTimeSequence { index, time });
        }
        previous = time;
    }
    Ok(())
}

/// Trend statistics for failure-truncated data
pub fn trend_statistics(times: &[f64]) -> Result<TrendStatistics, ReliabilityError> {
    trend_statistics_with(times, Termination::FailureTruncated)
}

/// Trend statistics for data ending as described by `termination`
pub fn trend_statistics_with(times: &[f64], termination: Termination) -> Result<TrendStatistics, ReliabilityError> {
    validate(times)?;
    let n = times.len();
    let last = times[n - 1];
    let end = termination.end_time(last)?;
    let used = if termination.is_time_truncated() {
        times
    } else {
        &times[..n - 1]
    };
    let m = used.len() as f64;
    let nf = n as f64;

    let mil_handbook = 2.0 * used.iter().map(|t| (end / t).ln()).sum::<f64>();
    let laplace = (times.iter().sum::<f64>() / nf - 0.5 * end) / (end * (1.0 / (12.0 * nf)).sqrt());

    let interarrival: Vec<f64> = std::iter::once(times[0])
        .chain(times.windows(2).map(|w| w[1] - w[0]))
        .collect();
    let k = interarrival.len() as f64;
    let mean = interarrival.iter().sum::<f64>() / k;
    let sd = (interarrival.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / k).sqrt();
    let cv = sd / mean;
    let lewis_robinson = if cv.is_finite() && cv > 0.0 {
        laplace / cv
    } else {
        f64::NAN
    };

    let serial_correlation = if interarrival.len() >= 3 {
        pearson(&interarrival[..interarrival.len() - 1], &interarrival[1..])
    } else {
        f64::NAN
    };

    tracing::debug!(n, mil_handbook, laplace, lewis_robinson, "trend statistics");
    Ok(TrendStatistics {
        n_failures: n,
        mil_handbook,
        mil_handbook_df: 2.0 * m,
        laplace,
        lewis_robinson,
        serial_correlation,
    })
}

//! Mean cumulative function for populations of repairable units
//!
//! For unique recurrence times `t_1..t_n` across `m` units:
//!
//! ```text
//! delta[u,i] = 1 if unit u is still under observation at t_i
//! d[u,i]     = events of unit u at t_i
//! d_bar_i    = Σ_u d[u,i] delta[u,i] / Σ_u delta[u,i]
//! MCF(t_i)   = Σ_{j<=i} d_bar_j
//! Var_i      = Σ_u ( Σ_{j<=i} delta[u,j]/delta_dot_j * (d[u,j] - d_bar_j) )²
//! ```

use serde::{Deserialize, Serialize};

use super::types::McfOptions;
use crate::data::CensoredDataset;
use crate::error::{DomainError, ReliabilityError};
use crate::stats::{normalize_confidence, std_normal_quantile};

/// One recurrence time of the MCF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McfRow {
    pub time: f64,
    /// Events per unit at this time
    pub events_by_unit: Vec<f64>,
    /// 1 when the unit is under observation at this time, else 0
    pub at_risk_by_unit: Vec<f64>,
    pub delta_dot: f64,
    pub d_dot: f64,
    pub d_bar: f64,
    /// Cumulative mean number of events per unit
    pub mcf: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
    pub cumulative_mtbf: f64,
    pub cumulative_mtbf_lower: f64,
    pub cumulative_mtbf_upper: f64,
    pub instantaneous_mtbf: f64,
    pub instantaneous_mtbf_lower: f64,
    pub instantaneous_mtbf_upper: f64,
}

/// Frozen MCF curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McfCurve {
    pub confidence: f64,
    /// Unit ids in column order of the per-unit vectors
    pub units: Vec<String>,
    pub rows: Vec<McfRow>,
}

impl McfCurve {
    pub fn rows(&self) -> &[McfRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// MCF just after `time`, 0 before the first recurrence
    pub fn mcf_at(&self, time: f64) -> f64 {
        self.rows
            .iter()
            .take_while(|r| r.time <= time)
            .last()
            .map_or(0.0, |r| r.mcf)
    }
}

/// `numerator / denominator`, or `+∞` when the denominator is not positive
#[inline]
fn ratio_or_infinite(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        f64::INFINITY
    }
}

/// Mean cumulative function with bounds and derived MTBFs
///
/// Every record needs a unit id. Recurrence times are the resolved times of failure
/// records; a unit stays under observation up to the latest resolved time of any of
/// its records. Raises [`DomainError::NoUnitsAtRisk`] if events fall at a time with
/// no unit under observation.
pub fn mean_cumulative_function(
    dataset: &CensoredDataset,
    options: &McfOptions,
) -> Result<McfCurve, ReliabilityError> {
    let confidence = normalize_confidence(options.confidence)?;
    let z = std_normal_quantile(confidence);
    let units = dataset.units()?;

    let mut times: Vec<f64> = dataset
        .observations()
        .iter()
        .filter(|o| o.is_failure())
        .map(|o| o.resolved_time())
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();

    let m = units.len();
    let n = times.len();
    let mut d = vec![vec![0.0; m]; n];
    let mut delta = vec![vec![0.0; m]; n];
    for (u, unit) in units.iter().enumerate() {
        let end = unit.end_of_observation();
        for obs in unit.observations.iter().filter(|o| o.is_failure()) {
            let t = obs.resolved_time();
            let i = times.partition_point(|&x| x < t);
            d[i][u] += obs.weight();
        }
        for (i, &t) in times.iter().enumerate() {
            if t <= end {
                delta[i][u] = 1.0;
            }
        }
    }

    let mut rows = Vec::with_capacity(n);
    let mut contribution = vec![0.0; m];
    let mut mcf = 0.0;
    let (mut t_prev, mut mcf_prev, mut lower_prev, mut upper_prev) = (0.0, 0.0, 0.0, 0.0);

    for i in 0..n {
        let time = times[i];
        let delta_dot: f64 = delta[i].iter().sum();
        let d_dot: f64 = d[i].iter().zip(&delta[i]).map(|(di, wi)| di * wi).sum();
        if delta_dot == 0.0 {
            return Err(DomainError::NoUnitsAtRisk { time }.into());
        }
        let d_bar = d_dot / delta_dot;
        mcf += d_bar;

        for u in 0..m {
            contribution[u] += delta[i][u] / delta_dot * (d[i][u] - d_bar);
        }
        let variance: f64 = contribution.iter().map(|c| c * c).sum();
        let half_width = z * variance.sqrt();
        let (lower, upper) = (mcf - half_width, mcf + half_width);

        let dt = time - t_prev;
        let from_upper = ratio_or_infinite(dt, upper - upper_prev);
        let from_lower = ratio_or_infinite(dt, lower - lower_prev);

        rows.push(McfRow {
            time,
            events_by_unit: d[i].clone(),
            at_risk_by_unit: delta[i].clone(),
            delta_dot,
            d_dot,
            d_bar,
            mcf,
            variance,
            lower,
            upper,
            cumulative_mtbf: ratio_or_infinite(time, mcf),
            cumulative_mtbf_lower: ratio_or_infinite(time, upper),
            cumulative_mtbf_upper: ratio_or_infinite(time, lower),
            instantaneous_mtbf: ratio_or_infinite(dt, mcf - mcf_prev),
            instantaneous_mtbf_lower: from_upper.min(from_lower),
            instantaneous_mtbf_upper: from_upper.max(from_lower),
        });

        t_prev = time;
        mcf_prev = mcf;
        lower_prev = lower;
        upper_prev = upper;
    }

    tracing::debug!(units = m, recurrences = n, "mean cumulative function complete");
    Ok(McfCurve {
        confidence,
        units: units.into_iter().map(|u| u.unit_id).collect(),
        rows,
    })
}

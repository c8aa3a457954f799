//! Product-limit (Kaplan-Meier) survival estimation
//!
//! Steps over the sorted unique resolved times of a [`CensoredDataset`]. Event,
//! left- and interval-censored records count as failures at their resolved time,
//! right-censored records leave the risk set after it.

use serde::{Deserialize, Serialize};

use super::types::{BoundType, KaplanMeierOptions};
use crate::data::CensoredDataset;
use crate::error::{DataError, ReliabilityError};
use crate::stats::z_score;

/// One step of the product-limit curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierRow {
    pub time: f64,
    /// Number at risk entering `time`
    pub n_at_risk: f64,
    pub n_events: f64,
    pub n_censored: f64,
    /// `1 - d/n`
    pub conditional_survival: f64,
    pub survival: f64,
    /// Greenwood standard error
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
    /// `-ln S`, carried forward once `S` reaches zero
    pub cum_hazard: f64,
    /// Area under the step curve from 0 to `time`
    pub mean_to_date: f64,
}

/// Hazard quantities derived from a Kaplan-Meier row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardRow {
    pub time: f64,
    /// `H(t)/t`
    pub hazard: f64,
    pub hazard_lower: f64,
    pub hazard_upper: f64,
    pub cum_hazard: f64,
    pub cum_hazard_lower: f64,
    pub cum_hazard_upper: f64,
    pub log_cum_hazard: f64,
}

/// Restricted mean life under the curve with its variance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanLife {
    pub mean: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Frozen Kaplan-Meier curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierCurve {
    pub confidence: f64,
    pub bound_type: BoundType,
    pub rows: Vec<KaplanMeierRow>,
}

impl KaplanMeierCurve {
    pub fn rows(&self) -> &[KaplanMeierRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Survival just after `time` (right-continuous step function)
    pub fn survival_at(&self, time: f64) -> f64 {
        self.rows
            .iter()
            .take_while(|r| r.time <= time)
            .last()
            .map_or(1.0, |r| r.survival)
    }

    /// Hazard rate `H/t`, cumulative hazard with bounds, and log cumulative hazard
    ///
    /// Cumulative-hazard bounds come from the survival bounds: the upper survival
    /// bound gives the lower hazard bound. A non-positive survival bound maps to
    /// `+∞`.
    pub fn hazard(&self) -> Vec<HazardRow> {
        self.rows
            .iter()
            .map(|row| {
                let cum_hazard_lower = neg_log_survival(row.upper);
                let cum_hazard_upper = neg_log_survival(row.lower);
                let per_time = |h: f64| if row.time > 0.0 { h / row.time } else { 0.0 };
                HazardRow {
                    time: row.time,
                    hazard: per_time(row.cum_hazard),
                    hazard_lower: per_time(cum_hazard_lower),
                    hazard_upper: per_time(cum_hazard_upper),
                    cum_hazard: row.cum_hazard,
                    cum_hazard_lower,
                    cum_hazard_upper,
                    log_cum_hazard: row.cum_hazard.ln(),
                }
            })
            .collect()
    }

    /// Restricted mean life to the last time, with Greenwood-type variance
    ///
    /// ```text
    /// Var = Σ A_i² d_i / (n_i (n_i - d_i))
    /// ```
    ///
    /// where `A_i` is the area under the curve from `t_i` to the last time.
    pub fn mean_life(&self, confidence: f64) -> Result<MeanLife, DataError> {
        let z = z_score(confidence)?;
        let last = self.rows.last().ok_or(DataError::Empty)?;
        let total = last.mean_to_date;
        let variance: f64 = self
            .rows
            .iter()
            .filter(|r| r.n_events > 0.0 && r.n_at_risk > r.n_events)
            .map(|r| {
                let area = total - r.mean_to_date;
                area * area * r.n_events / (r.n_at_risk * (r.n_at_risk - r.n_events))
            })
            .sum();
        let half_width = z * variance.sqrt();
        Ok(MeanLife {
            mean: total,
            variance,
            lower: total - half_width,
            upper: total + half_width,
        })
    }
}

#[inline]
fn neg_log_survival(s: f64) -> f64 {
    if s >= 1.0 {
        0.0
    } else if s > 0.0 {
        -s.ln()
    } else {
        f64::INFINITY
    }
}

/// Kaplan-Meier estimate of the survival curve
///
/// Fails with [`DataError::Empty`] for an empty dataset and
/// [`DataError::InvalidConfidence`] for a bad confidence level.
pub fn kaplan_meier(
    dataset: &CensoredDataset,
    options: &KaplanMeierOptions,
) -> Result<KaplanMeierCurve, ReliabilityError> {
    if dataset.is_empty() {
        return Err(DataError::Empty.into());
    }
    let z = z_score(options.confidence)?;
    let confidence = crate::stats::normalize_confidence(options.confidence)?;

    let times = dataset.unique_times();
    let mut events = vec![0.0; times.len()];
    let mut censored = vec![0.0; times.len()];
    for obs in dataset.observations() {
        let t = obs.resolved_time();
        let i = times.partition_point(|&u| u < t);
        if obs.is_failure() {
            events[i] += obs.weight();
        } else {
            censored[i] += obs.weight();
        }
    }

    let mut rows = Vec::with_capacity(times.len());
    let mut n = dataset.total_weight();
    let mut survival = 1.0;
    let mut greenwood = 0.0;
    let mut cum_hazard = 0.0;
    let mut mean_to_date = 0.0;
    let (mut t_prev, mut s_prev) = (0.0, 1.0);

    for (i, &time) in times.iter().enumerate() {
        if n <= 0.0 {
            break;
        }
        let (d, c) = (events[i], censored[i]);
        let conditional_survival = 1.0 - d / n;
        survival *= conditional_survival;

        let std_error = if d >= n {
            survival = 0.0;
            0.0
        } else {
            greenwood += d / (n * (n - d));
            survival * greenwood.sqrt()
        };
        let (lower, upper) = options.bound_type.apply(survival, z * std_error);

        if survival > 0.0 {
            cum_hazard = -survival.ln();
        }
        mean_to_date += s_prev * (time - t_prev);

        rows.push(KaplanMeierRow {
            time,
            n_at_risk: n,
            n_events: d,
            n_censored: c,
            conditional_survival,
            survival,
            std_error,
            lower,
            upper,
            cum_hazard,
            mean_to_date,
        });

        t_prev = time;
        s_prev = survival;
        n -= d + c;
    }

    tracing::debug!(rows = rows.len(), final_survival = survival, "kaplan-meier complete");
    Ok(KaplanMeierCurve {
        confidence,
        bound_type: options.bound_type,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;
    use approx::assert_relative_eq;

    fn dataset(records: Vec<Observation>) -> CensoredDataset {
        CensoredDataset::build(records, 0.0).unwrap()
    }

    #[test]
    fn one_failure_of_two_halves_survival() {
        let ds = dataset(vec![Observation::event(5.0), Observation::right_censored(10.0)]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        assert_eq!(curve.rows[0].time, 5.0);
        assert_relative_eq!(curve.rows[0].survival, 0.5);
        assert_relative_eq!(curve.rows[1].survival, 0.5);
        assert_eq!(curve.rows[1].n_at_risk, 1.0);
    }

    #[test]
    fn greenwood_error_matches_hand_calculation() {
        // n = 4: failures at 1 and 3, suspension at 2, failure at 4
        let ds = dataset(vec![
            Observation::event(1.0),
            Observation::right_censored(2.0),
            Observation::event(3.0),
            Observation::event(4.0),
        ]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        let r = &curve.rows;
        assert_relative_eq!(r[0].survival, 0.75);
        assert_relative_eq!(r[2].survival, 0.375);
        let gw: f64 = 1.0 / (4.0 * 3.0) + 1.0 / (2.0 * 1.0);
        assert_relative_eq!(r[2].std_error, 0.375 * gw.sqrt(), epsilon = 1e-12);
        // last failure empties the risk set
        assert_eq!(r[3].survival, 0.0);
        assert_eq!(r[3].std_error, 0.0);
        assert_relative_eq!(r[3].cum_hazard, -(0.375f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn mean_to_date_is_area_under_steps() {
        let ds = dataset(vec![Observation::event(2.0), Observation::event(6.0)]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        assert_relative_eq!(curve.rows[0].mean_to_date, 2.0);
        assert_relative_eq!(curve.rows[1].mean_to_date, 2.0 + 0.5 * 4.0);
    }

    #[test]
    fn survival_lookup_is_a_step_function() {
        let ds = dataset(vec![Observation::event(2.0), Observation::event(6.0)]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        assert_eq!(curve.survival_at(1.0), 1.0);
        assert_eq!(curve.survival_at(2.0), 0.5);
        assert_eq!(curve.survival_at(5.9), 0.5);
    }

    #[test]
    fn hazard_rows_follow_cumulative_hazard() {
        let ds = dataset(vec![
            Observation::event(2.0),
            Observation::event(4.0),
            Observation::right_censored(6.0),
        ]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        let hazard = curve.hazard();
        assert_relative_eq!(hazard[0].hazard, (1.5f64).ln() / 2.0, epsilon = 1e-12);
        assert!(hazard[0].cum_hazard_lower <= hazard[0].cum_hazard);
        assert!(hazard[0].cum_hazard_upper >= hazard[0].cum_hazard);
    }

    #[test]
    fn mean_life_variance_for_complete_data() {
        let ds = dataset(vec![
            Observation::event(1.0),
            Observation::event(2.0),
            Observation::event(3.0),
        ]);
        let curve = kaplan_meier(&ds, &KaplanMeierOptions::default()).unwrap();
        let mean = curve.mean_life(0.9).unwrap();
        // area: 1*1 + 2/3*1 + 1/3*1 = 2
        assert_relative_eq!(mean.mean, 2.0, epsilon = 1e-12);
        // A_1 = 1, A_2 = 1/3: 1*1/(3*2) + (1/9)*1/(2*1)
        assert_relative_eq!(mean.variance, 1.0 / 6.0 + 1.0 / 18.0, epsilon = 1e-12);
        assert!(mean.lower < mean.mean && mean.upper > mean.mean);
    }

    #[test]
    fn bad_confidence_is_rejected() {
        let ds = dataset(vec![Observation::event(1.0)]);
        let err = kaplan_meier(&ds, &KaplanMeierOptions::default().with_confidence(0.2)).unwrap_err();
        assert!(matches!(
            err,
            ReliabilityError::Data(DataError::InvalidConfidence { .. })
        ));
    }
}

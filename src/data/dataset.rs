//! Immutable, normalized collection of censored observations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::observation::{CensoringKind, Observation};
use crate::error::DataError;

/// A declared censoring kind replaced by the reclassification rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelOverride {
    /// Position of the record in the input passed to [`CensoredDataset::build`]
    pub index: usize,
    pub declared: CensoringKind,
    pub applied: CensoringKind,
}

/// Records belonging to one physical unit, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct UnitHistory {
    pub unit_id: String,
    pub observations: Vec<Observation>,
}

impl UnitHistory {
    /// Last time the unit was seen, failure or censoring
    pub fn end_of_observation(&self) -> f64 {
        self.observations
            .iter()
            .map(Observation::resolved_time)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Normalized observations consumed by every estimator
///
/// Built once per analysis with [`CensoredDataset::build`] and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CensoredDataset {
    observations: Vec<Observation>,
    unique_times: Vec<f64>,
    overrides: Vec<LabelOverride>,
}

impl CensoredDataset {
    /// Validate, filter and normalize raw records
    ///
    /// - records with a negative left time are dropped
    /// - with `relevance_time > 0`, records whose left time lies beyond it are dropped
    /// - right-censored records get `right = +∞`
    /// - `left == right` forces [`CensoringKind::Event`], then `left == 0` with a
    ///   finite right bound forces [`CensoringKind::LeftCensored`]; each change is
    ///   recorded in [`CensoredDataset::overrides`]
    ///
    /// Fails when the input (or what survives filtering) is empty, and on inverted
    /// intervals, non-finite bounds or zero multiplicity.
    pub fn build(records: Vec<Observation>, relevance_time: f64) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty);
        }

        let mut observations = Vec::with_capacity(records.len());
        let mut overrides = Vec::new();

        for (index, mut record) in records.into_iter().enumerate() {
            if !record.left.is_finite() {
                return Err(DataError::NonFinite {
                    index,
                    field: "left",
                });
            }
            if record.multiplicity == 0 {
                return Err(DataError::ZeroMultiplicity { index });
            }
            if record.left < 0.0 {
                continue;
            }
            if relevance_time > 0.0 && record.left > relevance_time {
                continue;
            }

            if record.kind == CensoringKind::RightCensored {
                record.right = f64::INFINITY;
            } else {
                if !record.right.is_finite() {
                    return Err(DataError::NonFinite {
                        index,
                        field: "right",
                    });
                }
                if record.left > record.right {
                    return Err(DataError::InvertedInterval {
                        index,
                        left: record.left,
                        right: record.right,
                    });
                }
            }

            let declared = record.kind;
            if record.left == record.right {
                record.kind = CensoringKind::Event;
            }
            if record.left == 0.0 && record.right.is_finite() {
                record.kind = CensoringKind::LeftCensored;
            }
            if record.kind != declared {
                tracing::debug!(
                    index,
                    declared = %declared,
                    applied = %record.kind,
                    "censoring label overridden"
                );
                overrides.push(LabelOverride {
                    index,
                    declared,
                    applied: record.kind,
                });
            }

            observations.push(record);
        }

        if observations.is_empty() {
            return Err(DataError::Empty);
        }
        if !overrides.is_empty() {
            tracing::warn!(
                count = overrides.len(),
                "declared censoring kinds were reclassified"
            );
        }

        Ok(Self::from_normalized(observations, overrides))
    }

    fn from_normalized(observations: Vec<Observation>, overrides: Vec<LabelOverride>) -> Self {
        let mut unique_times: Vec<f64> = observations.iter().map(Observation::resolved_time).collect();
        unique_times.sort_by(f64::total_cmp);
        unique_times.dedup();
        Self {
            observations,
            unique_times,
            overrides,
        }
    }

    /// Observations whose left time lies in `[start, end]`
    ///
    /// Returns [`DataError::Empty`] when nothing is left.
    pub fn window(&self, start: f64, end: f64) -> Result<Self, DataError> {
        self.retain(|o| o.left >= start && o.left <= end)
    }

    /// Observations for which `keep` holds, without re-running reclassification
    pub(crate) fn retain(&self, keep: impl FnMut(&&Observation) -> bool) -> Result<Self, DataError> {
        let observations: Vec<Observation> = self.observations.iter().filter(keep).cloned().collect();
        if observations.is_empty() {
            return Err(DataError::Empty);
        }
        Ok(Self::from_normalized(observations, self.overrides.clone()))
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of physical records
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of logical observations after multiplicity expansion
    pub fn total_weight(&self) -> f64 {
        self.observations.iter().map(Observation::weight).sum()
    }

    /// Weighted count of failures (everything except right-censored records)
    pub fn failure_weight(&self) -> f64 {
        self.observations
            .iter()
            .filter(|o| o.is_failure())
            .map(Observation::weight)
            .sum()
    }

    /// Sorted unique resolved times
    pub fn unique_times(&self) -> &[f64] {
        &self.unique_times
    }

    /// Declared kinds that were changed during construction
    pub fn overrides(&self) -> &[LabelOverride] {
        &self.overrides
    }

    /// Record indices ordered by resolved time; ties keep input order
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.observations.len()).collect();
        idx.sort_by(|&a, &b| {
            self.observations[a]
                .resolved_time()
                .total_cmp(&self.observations[b].resolved_time())
        });
        idx
    }

    /// Explicit replication of every record by its multiplicity
    pub fn expanded(&self) -> Vec<Observation> {
        self.observations
            .iter()
            .flat_map(|o| {
                let single = o.clone().with_multiplicity(1);
                std::iter::repeat(single).take(o.multiplicity as usize)
            })
            .collect()
    }

    /// Group records by unit id, in order of first appearance
    pub fn units(&self) -> Result<Vec<UnitHistory>, DataError> {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut units: Vec<UnitHistory> = Vec::new();
        for (index, obs) in self.observations.iter().enumerate() {
            let id = obs
                .unit_id
                .as_deref()
                .ok_or(DataError::MissingUnit { index })?;
            match position.get(id) {
                Some(&slot) => units[slot].observations.push(obs.clone()),
                None => {
                    position.insert(id, units.len());
                    units.push(UnitHistory {
                        unit_id: id.to_string(),
                        observations: vec![obs.clone()],
                    });
                }
            }
        }
        Ok(units)
    }
}

//! Adjusted and median ranks for censored life data
//!
//! Ranks are computed on the logically expanded observations (a record with
//! multiplicity `n` occupies `n` consecutive positions), stably sorted by resolved
//! time so ties keep their input order.
//!
//! The adjusted rank of a failure preceded by suspensions uses the increment
//!
//! ```text
//! increment = (N + 1 - previous adjusted rank) / (1 + reverse rank)
//! ```
//!
//! where the reverse rank is the number of items at or after the current one.
//! Suspensions get `NaN`. Median ranks use Bernard's approximation
//! `(rank - 0.3) / (N + 0.4)`.

use serde::{Deserialize, Serialize};

use crate::data::{CensoredDataset, CensoringKind};

/// Bernard's median-rank approximation
#[inline]
pub fn bernard(rank: f64, n: f64) -> f64 {
    (rank - 0.3) / (n + 0.4)
}

/// One logical observation with its ranks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedObservation {
    /// Resolved time
    pub time: f64,
    pub kind: CensoringKind,
    /// Index of the source record in the dataset
    pub source: usize,
    /// Number of items at or after this one
    pub reverse_rank: usize,
    /// `NaN` for suspensions
    pub adjusted_rank: f64,
    /// `NaN` for suspensions
    pub median_rank: f64,
}

/// Observations sharing one resolved time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankGroup {
    pub time: f64,
    /// Number of logical failures in the group
    pub failures: usize,
    /// Number of logical suspensions in the group
    pub suspensions: usize,
    /// Last adjusted rank in the group, `NaN` without failures
    pub adjusted_rank: f64,
    pub median_rank: f64,
}

/// Ranks for one fitting call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    /// Total number of logical observations
    pub n: usize,
    pub rows: Vec<RankedObservation>,
    pub groups: Vec<RankGroup>,
}

impl RankTable {
    pub fn from_dataset(dataset: &CensoredDataset) -> Self {
        let observations = dataset.observations();
        let order = dataset.sorted_indices();
        let n: usize = observations.iter().map(|o| o.multiplicity as usize).sum();
        let nf = n as f64;

        let mut rows = Vec::with_capacity(n);
        let mut previous = 0.0;
        let mut position = 0usize;
        for &source in &order {
            let obs = &observations[source];
            for _ in 0..obs.multiplicity {
                let reverse_rank = n - position;
                let (adjusted_rank, median_rank) = if obs.is_failure() {
                    let increment = (nf + 1.0 - previous) / (1.0 + reverse_rank as f64);
                    previous += increment;
                    (previous, bernard(previous, nf))
                } else {
                    (f64::NAN, f64::NAN)
                };
                rows.push(RankedObservation {
                    time: obs.resolved_time(),
                    kind: obs.kind,
                    source,
                    reverse_rank,
                    adjusted_rank,
                    median_rank,
                });
                position += 1;
            }
        }

        let groups = group_rows(&rows, nf);
        Self { n, rows, groups }
    }

    /// `(time, F)` pairs for rank regression, suspensions removed
    pub fn regression_points(&self, grouped: bool) -> Vec<(f64, f64)> {
        if grouped {
            self.groups
                .iter()
                .filter(|g| g.failures > 0)
                .map(|g| (g.time, g.median_rank))
                .collect()
        } else {
            self.rows
                .iter()
                .filter(|r| !r.median_rank.is_nan())
                .map(|r| (r.time, r.median_rank))
                .collect()
        }
    }
}

fn group_rows(rows: &[RankedObservation], n: f64) -> Vec<RankGroup> {
    let mut groups: Vec<RankGroup> = Vec::new();
    for row in rows {
        let same_time = groups.last().is_some_and(|g| g.time == row.time);
        if !same_time {
            groups.push(RankGroup {
                time: row.time,
                failures: 0,
                suspensions: 0,
                adjusted_rank: f64::NAN,
                median_rank: f64::NAN,
            });
        }
        if let Some(group) = groups.last_mut() {
            if row.kind.is_failure() {
                group.failures += 1;
                group.adjusted_rank = row.adjusted_rank;
                group.median_rank = bernard(row.adjusted_rank, n);
            } else {
                group.suspensions += 1;
            }
        }
    }
    groups
}

/// Adjusted rank per logical observation in time order, `NaN` for suspensions
pub fn adjusted_ranks(dataset: &CensoredDataset) -> Vec<f64> {
    RankTable::from_dataset(dataset)
        .rows
        .iter()
        .map(|r| r.adjusted_rank)
        .collect()
}

/// Bernard median ranks
///
/// Ungrouped: one value per logical observation in time order, `NaN` for
/// suspensions. Grouped: one value per distinct resolved time, taken from the last
/// adjusted rank in the group, so counts are apportioned cumulatively across
/// groups; suspension-only groups give `NaN`.
pub fn median_ranks(dataset: &CensoredDataset, grouped: bool) -> Vec<f64> {
    let table = RankTable::from_dataset(dataset);
    if grouped {
        table.groups.iter().map(|g| g.median_rank).collect()
    } else {
        table.rows.iter().map(|r| r.median_rank).collect()
    }
}

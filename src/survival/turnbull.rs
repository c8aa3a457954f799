//! Turnbull self-consistent estimator for arbitrarily censored data
//!
//! Each record is an interval known to contain its failure time: Event `[t, t]`,
//! right-censored `(t, ∞)`, left-censored `[0, r]`, interval-censored `[l, r]`.
//! Probability mass can only sit on the innermost intervals, where a left endpoint
//! is immediately followed by a right endpoint in the sorted endpoint list. The
//! masses are found by the EM (self-consistency) iteration.

use serde::{Deserialize, Serialize};

use super::types::TurnbullOptions;
use crate::data::{CensoredDataset, CensoringKind};
use crate::error::{ConvergenceError, DataError, ReliabilityError};

/// One innermost interval and its estimated probability mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnbullRow {
    pub lower: f64,
    pub upper: f64,
    /// Whether the lower endpoint is excluded
    pub lower_open: bool,
    pub probability: f64,
    /// Survival after this interval
    pub survival: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnbullCurve {
    pub rows: Vec<TurnbullRow>,
    pub iterations: usize,
}

impl TurnbullCurve {
    /// Survival after `time`, taken from the last interval ending at or before it
    pub fn survival_at(&self, time: f64) -> f64 {
        self.rows
            .iter()
            .take_while(|r| r.upper <= time)
            .last()
            .map_or(1.0, |r| r.survival)
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    lower: f64,
    upper: f64,
    lower_open: bool,
}

impl Span {
    fn contains(&self, inner: &Span) -> bool {
        let lower_ok = if self.lower_open {
            inner.lower > self.lower || (inner.lower == self.lower && inner.lower_open)
        } else {
            inner.lower >= self.lower
        };
        lower_ok && inner.upper <= self.upper
    }
}

// Sort order at equal values: closed left endpoints, then right endpoints, then
// open left endpoints.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    value: f64,
    order: u8,
}

fn innermost_intervals(spans: &[Span]) -> Vec<Span> {
    let mut endpoints: Vec<Endpoint> = Vec::with_capacity(2 * spans.len());
    for span in spans {
        endpoints.push(Endpoint {
            value: span.lower,
            order: if span.lower_open { 2 } else { 0 },
        });
        endpoints.push(Endpoint {
            value: span.upper,
            order: 1,
        });
    }
    endpoints.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.order.cmp(&b.order)));

    endpoints
        .windows(2)
        .filter(|w| w[0].order != 1 && w[1].order == 1)
        .map(|w| Span {
            lower: w[0].value,
            upper: w[1].value,
            lower_open: w[0].order == 2,
        })
        .collect()
}

/// Nonparametric maximum-likelihood survival estimate by self-consistency
///
/// Fails with [`ConvergenceError`] when the largest probability change is still
/// above the tolerance after `max_iterations`.
pub fn turnbull(
    dataset: &CensoredDataset,
    options: &TurnbullOptions,
) -> Result<TurnbullCurve, ReliabilityError> {
    if dataset.is_empty() {
        return Err(DataError::Empty.into());
    }

    let spans: Vec<Span> = dataset
        .observations()
        .iter()
        .map(|o| match o.kind {
            CensoringKind::Event => Span {
                lower: o.left,
                upper: o.left,
                lower_open: false,
            },
            CensoringKind::RightCensored => Span {
                lower: o.left,
                upper: f64::INFINITY,
                lower_open: true,
            },
            CensoringKind::LeftCensored => Span {
                lower: 0.0,
                upper: o.right,
                lower_open: false,
            },
            CensoringKind::IntervalCensored => Span {
                lower: o.left,
                upper: o.right,
                lower_open: false,
            },
        })
        .collect();
    let weights: Vec<f64> = dataset.observations().iter().map(|o| o.weight()).collect();
    let total: f64 = weights.iter().sum();

    let inner = innermost_intervals(&spans);
    let membership: Vec<Vec<usize>> = spans
        .iter()
        .map(|s| {
            inner
                .iter()
                .enumerate()
                .filter(|(_, j)| s.contains(j))
                .map(|(k, _)| k)
                .collect()
        })
        .collect();

    let m = inner.len();
    let mut p = vec![1.0 / m as f64; m];
    let mut iterations = 0;
    let mut change = f64::INFINITY;

    while iterations < options.max_iterations {
        iterations += 1;
        let mut next = vec![0.0; m];
        for (members, w) in membership.iter().zip(&weights) {
            let mass: f64 = members.iter().map(|&k| p[k]).sum();
            if mass <= 0.0 {
                continue;
            }
            for &k in members {
                next[k] += w * p[k] / mass;
            }
        }
        next.iter_mut().for_each(|v| *v /= total);
        change = next
            .iter()
            .zip(&p)
            .fold(0.0_f64, |acc, (a, b)| acc.max((a - b).abs()));
        p = next;
        if change <= options.tolerance {
            break;
        }
    }

    if change > options.tolerance {
        return Err(ConvergenceError::new("Turnbull", iterations, change, p).into());
    }
    tracing::debug!(intervals = m, iterations, "turnbull converged");

    let mut cumulative = 0.0;
    let rows = inner
        .iter()
        .zip(&p)
        .map(|(span, &probability)| {
            cumulative += probability;
            TurnbullRow {
                lower: span.lower,
                upper: span.upper,
                lower_open: span.lower_open,
                probability,
                survival: (1.0 - cumulative).max(0.0),
            }
        })
        .collect();

    Ok(TurnbullCurve { rows, iterations })
}

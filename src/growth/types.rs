//! Growth test data, options and bounded estimates

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// How a growth test ended
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Termination {
    /// Test stopped at the last failure
    #[default]
    FailureTruncated,
    /// Test stopped at a fixed time at or after the last failure
    TimeTruncated(f64),
}

impl Termination {
    /// End of the observation window for data ending at `last_time`
    pub fn end_time(&self, last_time: f64) -> Result<f64, DataError> {
        match *self {
            Termination::FailureTruncated => Ok(last_time),
            Termination::TimeTruncated(t) if t.is_finite() && t >= last_time => Ok(t),
            Termination::TimeTruncated(t) => Err(DataError::InvalidParameter {
                name: "termination time",
                value: t,
            }),
        }
    }

    pub fn is_time_truncated(&self) -> bool {
        matches!(self, Termination::TimeTruncated(_))
    }
}

/// Crow-AMSAA configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthOptions {
    /// Confidence level, fraction or percentage (default: 0.75)
    pub confidence: f64,
    /// Counts are per interval ending at each time rather than at exact failure
    /// times (default: false)
    pub grouped: bool,
    /// Applies to the final row; earlier rows end at their own time
    pub termination: Termination,
    /// Iteration budget of the grouped shape solve (default: 200)
    pub max_iterations: usize,
    /// Relative tolerance of the grouped shape solve (default: 1e-12)
    pub tolerance: f64,
    /// Compute rows on the rayon pool (default: false)
    pub parallel: bool,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self {
            confidence: 0.75,
            grouped: false,
            termination: Termination::FailureTruncated,
            max_iterations: 200,
            tolerance: 1e-12,
            parallel: false,
        }
    }
}

impl GrowthOptions {
    /// Options for interval (grouped) failure counts
    pub fn grouped_data() -> Self {
        Self::default().with_grouped(true)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_grouped(mut self, grouped: bool) -> Self {
        self.grouped = grouped;
        self
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Cumulative test times with the number of failures observed at (or, grouped,
/// up to) each time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSeries {
    times: Vec<f64>,
    counts: Vec<u32>,
}

impl GrowthSeries {
    /// Validates equal non-zero lengths, strictly increasing positive times and at
    /// least one failure
    pub fn new(times: Vec<f64>, counts: Vec<u32>) -> Result<Self, DataError> {
        if times.len() != counts.len() {
            return Err(DataError::LengthMismatch {
                left: times.len(),
                right: counts.len(),
            });
        }
        if times.is_empty() {
            return Err(DataError::Empty);
        }
        let mut previous = 0.0;
        for (index, &time) in times.iter().enumerate() {
            if !time.is_finite() || time <= previous {
                return Err(DataError::InvalidTimeSequence { index, time });
            }
            previous = time;
        }
        if counts.iter().all(|&c| c == 0) {
            return Err(DataError::InsufficientData {
                context: "growth series".to_string(),
                n: 0,
                required: 1,
            });
        }
        Ok(Self { times, counts })
    }

    /// One failure at each time
    pub fn from_failure_times(times: Vec<f64>) -> Result<Self, DataError> {
        let counts = vec![1; times.len()];
        Self::new(times, counts)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn total_failures(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Failure times with each time repeated by its count
    pub fn expanded_times(&self) -> Vec<f64> {
        self.times
            .iter()
            .zip(&self.counts)
            .flat_map(|(&t, &c)| std::iter::repeat(t).take(c as usize))
            .collect()
    }
}

/// Point estimate with lower and upper confidence bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedEstimate {
    pub lower: f64,
    pub value: f64,
    pub upper: f64,
}

impl BoundedEstimate {
    /// Log-transform bounds `θ·exp(∓z·√Var/θ)`, positive whenever `θ` is
    pub fn log_normal(value: f64, variance: f64, z: f64) -> Self {
        let factor = (z * variance.max(0.0).sqrt() / value).exp();
        Self {
            lower: value / factor,
            value,
            upper: value * factor,
        }
    }

    /// Symmetric bounds `θ ∓ z·√Var` for parameters of either sign
    pub fn normal(value: f64, variance: f64, z: f64) -> Self {
        let half_width = z * variance.max(0.0).sqrt();
        Self {
            lower: value - half_width,
            value,
            upper: value + half_width,
        }
    }

    /// Bounds on `1/θ` from the bounds on `θ`
    pub fn reciprocal(&self) -> Self {
        Self {
            lower: 1.0 / self.upper,
            value: 1.0 / self.value,
            upper: 1.0 / self.lower,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }
}

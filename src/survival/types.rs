//! Options for the non-parametric estimators

use serde::{Deserialize, Serialize};

/// How confidence bounds on survival are formed from `S ± z·se`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundType {
    /// `S ± z·se`, may leave `[0, 1]`
    Linear,
    /// `S ± z·se` clipped to `[0, 1]`
    #[default]
    Clipped,
    /// Only the lower bound is computed, the upper bound equals `S`
    LowerOneSided,
    /// Only the upper bound is computed, the lower bound equals `S`
    UpperOneSided,
}

impl BoundType {
    /// Lower and upper bound for estimate `s` with half-width `margin`
    #[inline]
    pub fn apply(&self, s: f64, margin: f64) -> (f64, f64) {
        match self {
            BoundType::Linear => (s - margin, s + margin),
            BoundType::Clipped => ((s - margin).clamp(0.0, 1.0), (s + margin).clamp(0.0, 1.0)),
            BoundType::LowerOneSided => ((s - margin).max(0.0), s),
            BoundType::UpperOneSided => (s, (s + margin).min(1.0)),
        }
    }
}

/// Kaplan-Meier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaplanMeierOptions {
    /// Confidence level, fraction or percentage (default: 0.75)
    pub confidence: f64,
    /// Bound construction (default: Clipped)
    pub bound_type: BoundType,
}

impl Default for KaplanMeierOptions {
    fn default() -> Self {
        Self {
            confidence: 0.75,
            bound_type: BoundType::Clipped,
        }
    }
}

impl KaplanMeierOptions {
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_bound_type(mut self, bound_type: BoundType) -> Self {
        self.bound_type = bound_type;
        self
    }
}

/// Mean cumulative function configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McfOptions {
    /// Confidence level, fraction or percentage (default: 0.75)
    pub confidence: f64,
}

impl Default for McfOptions {
    fn default() -> Self {
        Self { confidence: 0.75 }
    }
}

impl McfOptions {
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Turnbull self-consistency configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnbullOptions {
    /// Largest allowed change in any interval probability at convergence
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for TurnbullOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 10_000,
        }
    }
}

impl TurnbullOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

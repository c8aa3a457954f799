//! Distribution families, fitting methods and fitter configuration

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported life distributions
///
/// Parameter order is fixed per family: Exponential `[rate]`, Weibull
/// `[scale, shape]`, Lognormal `[mu, sigma]` (on log time), Gaussian `[mu, sigma]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionKind {
    Exponential,
    Weibull,
    Lognormal,
    Gaussian,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 4] = [
        DistributionKind::Exponential,
        DistributionKind::Weibull,
        DistributionKind::Lognormal,
        DistributionKind::Gaussian,
    ];

    pub fn n_parameters(&self) -> usize {
        self.parameter_names().len()
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            DistributionKind::Exponential => &["rate"],
            DistributionKind::Weibull => &["scale", "shape"],
            DistributionKind::Lognormal | DistributionKind::Gaussian => &["mu", "sigma"],
        }
    }

    /// Which parameters must be strictly positive
    pub fn positive_parameters(&self) -> &'static [bool] {
        match self {
            DistributionKind::Exponential => &[true],
            DistributionKind::Weibull => &[true, true],
            DistributionKind::Lognormal | DistributionKind::Gaussian => &[false, true],
        }
    }

    /// Whether the distribution lives on `(0, ∞)`
    pub fn has_positive_support(&self) -> bool {
        !matches!(self, DistributionKind::Gaussian)
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Weibull => "Weibull",
            DistributionKind::Lognormal => "Lognormal",
            DistributionKind::Gaussian => "Gaussian",
        };
        write!(f, "{name}")
    }
}

/// Estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FitMethod {
    #[default]
    MaximumLikelihood,
    RankRegression,
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMethod::MaximumLikelihood => write!(f, "MLE"),
            FitMethod::RankRegression => write!(f, "rank regression"),
        }
    }
}

/// Distribution fitting configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Records with `left` before this time are ignored (default: 0)
    pub start_time: f64,
    /// Records with `left` after this time are ignored (default: ∞, `null` in JSON)
    #[serde(with = "crate::config::unbounded")]
    pub relevance_time: f64,
    /// Confidence level for parameter bounds (default: 0.75)
    pub confidence: f64,
    /// Iteration budget of the score root finder (default: 200)
    pub max_iterations: usize,
    /// Scale-free score tolerance (default: 1e-9)
    pub tolerance: f64,
    /// Use grouped median ranks for regression (default: false)
    pub grouped_ranks: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            relevance_time: f64::INFINITY,
            confidence: 0.75,
            max_iterations: 200,
            tolerance: 1e-9,
            grouped_ranks: false,
        }
    }
}

impl FitOptions {
    /// Fit only records whose left time lies in `[start_time, relevance_time]`
    pub fn windowed(start_time: f64, relevance_time: f64) -> Self {
        Self::default()
            .with_start_time(start_time)
            .with_relevance_time(relevance_time)
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_relevance_time(mut self, relevance_time: f64) -> Self {
        self.relevance_time = relevance_time;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
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

    pub fn with_grouped_ranks(mut self, grouped_ranks: bool) -> Self {
        self.grouped_ranks = grouped_ranks;
        self
    }
}

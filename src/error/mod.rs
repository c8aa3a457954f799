//! Error taxonomy shared by every estimator
//!
//! - [`DataError`]: malformed, empty or inconsistent input, raised at construction
//! - [`ConvergenceError`]: an iterative solve ran out of iterations
//! - [`DomainError`]: a numeric degeneracy with no documented fallback
//!
//! Public entry points return [`ReliabilityError`], which wraps all three so callers
//! can branch on the kind of failure.

use thiserror::Error;

/// Problems with the input data itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// No observations to analyze
    #[error("Dataset is empty")]
    Empty,

    /// Left bound exceeds right bound on a record that is not right-censored
    #[error("Record {index}: left time {left} exceeds right time {right}")]
    InvertedInterval { index: usize, left: f64, right: f64 },

    /// A time bound is NaN or infinite where a finite value is required
    #[error("Record {index}: {field} time is not finite")]
    NonFinite { index: usize, field: &'static str },

    /// A record declares a multiplicity of zero
    #[error("Record {index}: multiplicity must be at least 1")]
    ZeroMultiplicity { index: usize },

    /// Unit grouping requested but a record has no unit id
    #[error("Record {index} has no unit id; unit ids are required for recurrence data")]
    MissingUnit { index: usize },

    /// Confidence level outside the accepted range after normalization
    #[error("Invalid confidence level {value}: expected a fraction in [0.5, 1) or a percentage in (50, 100)")]
    InvalidConfidence { value: f64 },

    /// Not enough usable points for the requested estimate
    #[error("Insufficient data for {context}: {n} points, need at least {required}")]
    InsufficientData {
        context: String,
        n: usize,
        required: usize,
    },

    /// Paired input sequences of different lengths
    #[error("Length mismatch: {left} times but {right} counts")]
    LengthMismatch { left: usize, right: usize },

    /// Growth times must be positive and strictly increasing
    #[error("Time {time} at position {index} is not positive and strictly increasing")]
    InvalidTimeSequence { index: usize, time: f64 },

    /// An option value is outside its valid range
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A test phase leaves a value unset that cannot be derived from the others
    #[error("Phase {phase}: {name} is neither given nor derivable")]
    MissingPlanValue { phase: usize, name: &'static str },

    /// Error encountered when reading CSV data
    #[error("CSV error: {0}")]
    Csv(String),

    /// Configuration JSON could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// An iterative estimator stopped before meeting its tolerance
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{estimator} did not converge after {iterations} iterations (residual {residual:e}, last estimate {estimate:?})")]
pub struct ConvergenceError {
    /// Which estimator failed, e.g. "Weibull MLE"
    pub estimator: String,
    pub iterations: usize,
    /// Last residual of the convergence criterion
    pub residual: f64,
    /// Last parameter estimate
    pub estimate: Vec<f64>,
}

impl ConvergenceError {
    pub fn new(
        estimator: impl Into<String>,
        iterations: usize,
        residual: f64,
        estimate: Vec<f64>,
    ) -> Self {
        Self {
            estimator: estimator.into(),
            iterations,
            residual,
            estimate,
        }
    }
}

/// Numeric degeneracies that are reported rather than patched over
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Events recorded at a time where no unit is under observation
    #[error("No units under observation at time {time} although events were recorded")]
    NoUnitsAtRisk { time: f64 },

    /// A fitted scale or shape parameter came out zero or negative
    #[error("{estimator}: fitted {parameter} = {value} is not positive")]
    NonPositiveParameter {
        estimator: String,
        parameter: &'static str,
        value: f64,
    },

    /// Information matrix could not be inverted
    #[error("Singular information matrix in {context}")]
    SingularInformation { context: String },

    /// Linearized regression could not be computed
    #[error("Degenerate regression in {context}: {reason}")]
    DegenerateRegression { context: String, reason: String },
}

/// Umbrella error returned by every public estimator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReliabilityError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

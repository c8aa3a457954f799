//! Analysis configuration loadable from JSON
//!
//! [`AnalysisConfig`] bundles the options of every estimator so a report can be
//! re-run from a single file. Missing sections and fields take their defaults.
//!
//! ```
//! use reliakit::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_json(r#"{ "fit": { "confidence": 0.9 } }"#).unwrap();
//! assert_eq!(config.fit.confidence, 0.9);
//! assert_eq!(config.fit.relevance_time, f64::INFINITY);
//! assert_eq!(config.growth.confidence, 0.75);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::fit::FitOptions;
use crate::growth::GrowthOptions;
use crate::survival::{KaplanMeierOptions, McfOptions, TurnbullOptions};

/// Options for every estimator in one place
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub kaplan_meier: KaplanMeierOptions,
    pub mcf: McfOptions,
    pub turnbull: TurnbullOptions,
    pub fit: FitOptions,
    pub growth: GrowthOptions,
}

impl AnalysisConfig {
    /// Parse a configuration, filling in defaults
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::Config(e.to_string()))
    }

    /// Pretty-printed JSON of the full configuration
    pub fn to_json(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(self).map_err(|e| DataError::Config(e.to_string()))
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.kaplan_meier.confidence = confidence;
        self.mcf.confidence = confidence;
        self.fit.confidence = confidence;
        self.growth.confidence = confidence;
        self
    }
}

/// Serde adapter for an `f64` upper limit where `null` means unbounded
///
/// JSON has no infinity, so an infinite limit is written as `null` and `null` or
/// a missing value reads back as `f64::INFINITY`.
pub(crate) mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

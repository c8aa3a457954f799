//! Pluggable estimator implementations
//!
//! Report and GUI layers talk to a [`SurvivalBackend`] rather than to the free
//! functions, so an alternative implementation (a reference port used for
//! cross-checking, or a remote service) can be swapped in at construction time.
//!
//! ```
//! use reliakit::prelude::*;
//!
//! fn median_survival(backend: &dyn SurvivalBackend, data: &CensoredDataset) -> f64 {
//!     let curve = backend.kaplan_meier(data, &KaplanMeierOptions::default()).unwrap();
//!     curve.survival_at(50.0)
//! }
//!
//! let data = CensoredDataset::builder()
//!     .event(20.0)
//!     .event(45.0)
//!     .right_censored(80.0)
//!     .build()
//!     .unwrap();
//! assert!(median_survival(&NativeBackend, &data) < 1.0);
//! ```

use crate::data::CensoredDataset;
use crate::error::ReliabilityError;
use crate::fit::{DistributionFitter, DistributionKind, FitMethod, FitOptions, FitResult};
use crate::growth::{GrowthFit, GrowthOptions, GrowthSeries};
use crate::survival::{KaplanMeierCurve, KaplanMeierOptions, McfCurve, McfOptions};

/// The estimators a reliability report needs
pub trait SurvivalBackend: Send + Sync {
    /// Short identifier for logs and reports
    fn name(&self) -> &str;

    fn kaplan_meier(
        &self,
        dataset: &CensoredDataset,
        options: &KaplanMeierOptions,
    ) -> Result<KaplanMeierCurve, ReliabilityError>;

    fn mean_cumulative_function(
        &self,
        dataset: &CensoredDataset,
        options: &McfOptions,
    ) -> Result<McfCurve, ReliabilityError>;

    fn fit_distribution(
        &self,
        dataset: &CensoredDataset,
        method: FitMethod,
        kind: DistributionKind,
        options: &FitOptions,
    ) -> Result<FitResult, ReliabilityError>;

    fn crow_amsaa(&self, series: &GrowthSeries, options: &GrowthOptions) -> Result<GrowthFit, ReliabilityError>;
}

/// The estimators implemented in this crate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeBackend;

impl SurvivalBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn kaplan_meier(
        &self,
        dataset: &CensoredDataset,
        options: &KaplanMeierOptions,
    ) -> Result<KaplanMeierCurve, ReliabilityError> {
        crate::survival::kaplan_meier(dataset, options)
    }

    fn mean_cumulative_function(
        &self,
        dataset: &CensoredDataset,
        options: &McfOptions,
    ) -> Result<McfCurve, ReliabilityError> {
        crate::survival::mean_cumulative_function(dataset, options)
    }

    fn fit_distribution(
        &self,
        dataset: &CensoredDataset,
        method: FitMethod,
        kind: DistributionKind,
        options: &FitOptions,
    ) -> Result<FitResult, ReliabilityError> {
        DistributionFitter::new(*options).fit(dataset, method, kind)
    }

    fn crow_amsaa(&self, series: &GrowthSeries, options: &GrowthOptions) -> Result<GrowthFit, ReliabilityError> {
        crate::growth::crow_amsaa(series, options)
    }
}

//! Parametric life-distribution fitting
//!
//! [`DistributionFitter`] fits an Exponential, Weibull, Lognormal or Gaussian model
//! to a [`CensoredDataset`] by maximum likelihood or rank regression. Every
//! censoring kind may appear in the same dataset.
//!
//! # Example
//!
//! ```
//! use reliakit::prelude::*;
//!
//! let data = CensoredDataset::builder()
//!     .event(35.0)
//!     .event(62.0)
//!     .event(81.0)
//!     .right_censored(120.0)
//!     .times(2)
//!     .build()
//!     .unwrap();
//!
//! let fit = DistributionFitter::new(FitOptions::default())
//!     .fit(&data, FitMethod::RankRegression, DistributionKind::Weibull)
//!     .unwrap();
//! assert_eq!(fit.parameters.len(), 2);
//! ```

pub mod distribution;
mod likelihood;
mod mle;
mod regression;
pub mod result;
pub mod types;

use rayon::prelude::*;

pub use distribution::LifeDistribution;
pub use result::{FitResult, GoodnessOfFit};
pub use types::{DistributionKind, FitMethod, FitOptions};

use crate::data::CensoredDataset;
use crate::error::ReliabilityError;
use crate::rank::RankTable;
use crate::stats::normalize_confidence;

/// Fits life distributions with a fixed set of [`FitOptions`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistributionFitter {
    options: FitOptions,
}

impl DistributionFitter {
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Records inside the fitting window, without failures a positive-support
    /// family cannot explain
    fn working_set(&self, dataset: &CensoredDataset, kind: DistributionKind) -> Result<CensoredDataset, ReliabilityError> {
        let (start, end) = (self.options.start_time, self.options.relevance_time);
        let mut excluded = 0usize;
        let working = dataset.retain(|o| {
            if o.left < start || o.left > end {
                return false;
            }
            let unexplained = kind.has_positive_support() && o.is_failure() && o.resolved_time() <= 0.0;
            if unexplained {
                excluded += 1;
            }
            !unexplained
        })?;
        if excluded > 0 {
            tracing::warn!(%kind, excluded, "failures at or before time zero excluded from fit");
        }
        Ok(working)
    }

    /// Fit one distribution with one method
    pub fn fit(
        &self,
        dataset: &CensoredDataset,
        method: FitMethod,
        kind: DistributionKind,
    ) -> Result<FitResult, ReliabilityError> {
        let confidence = normalize_confidence(self.options.confidence)?;
        let working = self.working_set(dataset, kind)?;
        let samples = likelihood::samples(&working);
        let n_failures = working.failure_weight();
        let n_records = working.total_weight();

        let ranks = RankTable::from_dataset(&working);
        let regression = regression::rank_regression(kind, &ranks.regression_points(self.options.grouped_ranks));

        let (model, covariance, correlation, iterations) = match method {
            FitMethod::RankRegression => {
                let est = regression?;
                let r = Some(est.correlation).filter(|r| r.is_finite());
                (est.model, est.covariance, r, 0)
            }
            FitMethod::MaximumLikelihood => {
                let start = regression.ok().map(|est| est.model.parameters());
                let est = mle::maximum_likelihood(kind, &samples, start, &self.options)?;
                (est.model, est.covariance, None, est.iterations)
            }
        };

        let goodness = GoodnessOfFit::new(
            likelihood::log_likelihood(&model, &samples),
            kind.n_parameters(),
            n_records,
        );
        tracing::debug!(%kind, %method, parameters = ?model.parameters(), "fit complete");

        Ok(FitResult::new(
            model,
            method,
            &covariance,
            correlation,
            goodness,
            n_failures,
            n_records - n_failures,
            iterations,
            confidence,
        ))
    }

    /// Fit every distribution family in parallel, best AIC first
    ///
    /// Families that fail to fit are kept with their error and sorted last, in
    /// family order.
    pub fn compare(
        &self,
        dataset: &CensoredDataset,
        method: FitMethod,
    ) -> Vec<(DistributionKind, Result<FitResult, ReliabilityError>)> {
        let mut results: Vec<_> = DistributionKind::ALL
            .par_iter()
            .map(|&kind| (kind, self.fit(dataset, method, kind)))
            .collect();
        results.sort_by(|(_, a), (_, b)| match (a, b) {
            (Ok(a), Ok(b)) => a.goodness.aic.total_cmp(&b.goodness.aic),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });
        results
    }
}

/// Fit `kind` to `dataset` with `method`
pub fn fit_distribution(
    dataset: &CensoredDataset,
    method: FitMethod,
    kind: DistributionKind,
    options: &FitOptions,
) -> Result<FitResult, ReliabilityError> {
    DistributionFitter::new(*options).fit(dataset, method, kind)
}

//! Rank regression: least squares of transformed median rank on transformed time
//!
//! ```text
//! Exponential  ln(1 − F)      = a − λ t
//! Weibull      ln(−ln(1 − F)) = β ln t − β ln η
//! Lognormal    Φ⁻¹(F)         = (ln t − μ) / σ
//! Gaussian     Φ⁻¹(F)         = (t − μ) / σ
//! ```
//!
//! The parameter covariance is the OLS coefficient covariance mapped to the
//! native parameters by the delta method.

use nalgebra::DMatrix;

use super::distribution::LifeDistribution;
use super::types::DistributionKind;
use crate::error::{DataError, DomainError, ReliabilityError};
use crate::stats::{linear_regression, pearson, std_normal_quantile};

/// Output of a rank regression
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegressionEstimate {
    pub model: LifeDistribution,
    pub covariance: DMatrix<f64>,
    pub correlation: f64,
}

#[inline]
fn rank_transform(kind: DistributionKind, f: f64) -> f64 {
    match kind {
        DistributionKind::Exponential => (-f).ln_1p(),
        DistributionKind::Weibull => (-(-f).ln_1p()).ln(),
        DistributionKind::Lognormal | DistributionKind::Gaussian => std_normal_quantile(f),
    }
}

#[inline]
fn time_transform(kind: DistributionKind, t: f64) -> f64 {
    match kind {
        DistributionKind::Weibull | DistributionKind::Lognormal => t.ln(),
        DistributionKind::Exponential | DistributionKind::Gaussian => t,
    }
}

/// Fit `kind` to `(time, median rank)` pairs
pub(crate) fn rank_regression(
    kind: DistributionKind,
    points: &[(f64, f64)],
) -> Result<RegressionEstimate, ReliabilityError> {
    let context = format!("{kind} rank regression");
    let usable: Vec<(f64, f64)> = points
        .iter()
        .filter(|(t, f)| (!kind.has_positive_support() || *t > 0.0) && *f > 0.0 && *f < 1.0)
        .map(|&(t, f)| (time_transform(kind, t), rank_transform(kind, f)))
        .collect();

    let required = if kind == DistributionKind::Exponential { 2 } else { 3 };
    if usable.len() < required {
        return Err(DataError::InsufficientData {
            context,
            n: usable.len(),
            required,
        }
        .into());
    }
    let (x, y): (Vec<f64>, Vec<f64>) = usable.into_iter().unzip();
    let correlation = pearson(&x, &y);

    let stats = linear_regression(&x, &y).ok_or_else(|| DomainError::DegenerateRegression {
        context: context.clone(),
        reason: "all failure times coincide".to_string(),
    })?;
    let (a, b) = (stats.intercept, stats.slope);
    let expected_sign = if kind == DistributionKind::Exponential { -b } else { b };
    if expected_sign <= 0.0 {
        return Err(DomainError::DegenerateRegression {
            context,
            reason: format!("slope {b} has the wrong sign"),
        }
        .into());
    }
    let ab = DMatrix::from_row_slice(
        2,
        2,
        &[
            stats.intercept_variance(),
            stats.covariance(),
            stats.covariance(),
            stats.slope_variance(),
        ],
    );

    // rows: native parameters, columns: (intercept, slope)
    let (parameters, jacobian) = match kind {
        DistributionKind::Exponential => (vec![-b], DMatrix::from_row_slice(1, 2, &[0.0, -1.0])),
        DistributionKind::Weibull => {
            let eta = (-a / b).exp();
            (
                vec![eta, b],
                DMatrix::from_row_slice(2, 2, &[-eta / b, eta * a / (b * b), 0.0, 1.0]),
            )
        }
        DistributionKind::Lognormal | DistributionKind::Gaussian => (
            vec![-a / b, 1.0 / b],
            DMatrix::from_row_slice(2, 2, &[-1.0 / b, a / (b * b), 0.0, -1.0 / (b * b)]),
        ),
    };
    let model = LifeDistribution::from_parameters(kind, &parameters)?;
    let covariance = &jacobian * ab * jacobian.transpose();

    tracing::debug!(%kind, points = x.len(), r = correlation, "rank regression complete");
    Ok(RegressionEstimate {
        model,
        covariance,
        correlation,
    })
}

//! Shared statistical helpers
//!
//! Confidence-level handling, normal and chi-square quantiles, and the ordinary
//! least-squares fit used by rank regression and the Duane model.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use crate::error::DataError;

// ============================================================================
// Confidence levels
// ============================================================================

/// Normalize a confidence level to a fraction
///
/// Values above 1 are read as percentages and divided by 100. The result must lie
/// in `[0.5, 1)` so that the matching z-value is non-negative and bounds bracket the
/// point estimate.
pub fn normalize_confidence(confidence: f64) -> Result<f64, DataError> {
    let level = if confidence > 1.0 {
        confidence / 100.0
    } else {
        confidence
    };
    if !level.is_finite() || !(0.5..1.0).contains(&level) {
        return Err(DataError::InvalidConfidence { value: confidence });
    }
    Ok(level)
}

/// Standard-normal quantile `Φ⁻¹(c)` for a (possibly percentage) confidence level
pub fn z_score(confidence: f64) -> Result<f64, DataError> {
    let level = normalize_confidence(confidence)?;
    Ok(std_normal_quantile(level))
}

// ============================================================================
// Distribution helpers
// ============================================================================

#[inline]
fn std_normal() -> Normal {
    // Parameters are constant and valid
    Normal::standard()
}

/// Standard-normal cdf
#[inline]
pub fn std_normal_cdf(z: f64) -> f64 {
    std_normal().cdf(z)
}

/// Standard-normal survival function, accurate in the upper tail
#[inline]
pub fn std_normal_sf(z: f64) -> f64 {
    std_normal().sf(z)
}

/// Standard-normal density
#[inline]
pub fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Standard-normal quantile
#[inline]
pub fn std_normal_quantile(p: f64) -> f64 {
    std_normal().inverse_cdf(p)
}

/// Chi-square quantile, `NaN` for non-positive degrees of freedom
pub fn chi_square_quantile(p: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Upper-tail chi-square probability, `NaN` for non-positive degrees of freedom
pub fn chi_square_sf(x: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(dist) => dist.sf(x),
        Err(_) => f64::NAN,
    }
}

// ============================================================================
// Ordinary least squares
// ============================================================================

/// Summary of a simple linear regression `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionStats {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient of x and y
    pub correlation: f64,
    /// Residual variance `SSE / (n - 2)`, `NaN` with two points
    pub residual_variance: f64,
    /// Centered sum of squares of x
    pub sxx: f64,
    pub mean_x: f64,
    pub n_points: usize,
}

impl RegressionStats {
    /// Variance of the slope estimate
    pub fn slope_variance(&self) -> f64 {
        self.residual_variance / self.sxx
    }

    /// Variance of the intercept estimate
    pub fn intercept_variance(&self) -> f64 {
        self.residual_variance * (1.0 / self.n_points as f64 + self.mean_x.powi(2) / self.sxx)
    }

    /// Covariance of intercept and slope
    pub fn covariance(&self) -> f64 {
        -self.mean_x * self.residual_variance / self.sxx
    }
}

/// Least-squares fit of `y` on `x`
///
/// Returns `None` with fewer than two points or when all x values coincide.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<RegressionStats> {
    let n_points = x.len().min(y.len());
    if n_points < 2 {
        return None;
    }
    let n = n_points as f64;
    let (x, y) = (&x[..n_points], &y[..n_points]);

    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let syy: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();

    if sxx.abs() < 1e-15 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum();

    let correlation = if syy.abs() < 1e-15 {
        1.0
    } else {
        sxy / (sxx * syy).sqrt()
    };
    let residual_variance = if n_points > 2 {
        sse / (n - 2.0)
    } else {
        f64::NAN
    };

    Some(RegressionStats {
        slope,
        intercept,
        correlation,
        residual_variance,
        sxx,
        mean_x,
        n_points,
    })
}

/// Pearson correlation of two equally long samples, `NaN` when undefined
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x[..n].iter().zip(&y[..n]) {
        sxy += (xi - mx) * (yi - my);
        sxx += (xi - mx).powi(2);
        syy += (yi - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

//! Parametric life distributions and their parameter derivatives
//!
//! The derivatives feed the censored-data score in [`super::likelihood`]. With
//! `z = (t/η)^β` for the Weibull and `z = (x − μ)/σ` for the normal families
//! (`x = ln t` for the lognormal):
//!
//! ```text
//! Exponential  ∂F/∂λ = t e^{−λt}           ∂ln f/∂λ = 1/λ − t
//! Weibull      ∂F/∂η = −e^{−z} β z / η     ∂ln f/∂η = β (z − 1) / η
//!              ∂F/∂β = e^{−z} z ln(t/η)    ∂ln f/∂β = 1/β + ln(t/η)(1 − z)
//! Normal       ∂F/∂μ = −φ(z) / σ           ∂ln f/∂μ = z / σ
//!              ∂F/∂σ = −φ(z) z / σ         ∂ln f/∂σ = (z² − 1) / σ
//! ```

use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal, Weibull};
use serde::{Deserialize, Serialize};
use statrs::function::gamma::gamma;

use super::types::DistributionKind;
use crate::error::{DataError, DomainError, ReliabilityError};
use crate::stats::{std_normal_cdf, std_normal_pdf, std_normal_quantile, std_normal_sf};

/// A fully parameterized life distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeDistribution {
    Exponential { rate: f64 },
    Weibull { scale: f64, shape: f64 },
    /// `ln T ~ Normal(mu, sigma)`
    Lognormal { mu: f64, sigma: f64 },
    Gaussian { mu: f64, sigma: f64 },
}

impl LifeDistribution {
    /// Build a distribution from a parameter vector in family order
    ///
    /// Fails with [`DomainError::NonPositiveParameter`] when a scale or shape is not
    /// strictly positive.
    pub fn from_parameters(kind: DistributionKind, parameters: &[f64]) -> Result<Self, ReliabilityError> {
        if parameters.len() != kind.n_parameters() {
            return Err(DataError::InvalidParameter {
                name: "parameter count",
                value: parameters.len() as f64,
            }
            .into());
        }
        for ((&value, &positive), &name) in parameters
            .iter()
            .zip(kind.positive_parameters())
            .zip(kind.parameter_names())
        {
            if !value.is_finite() || (positive && value <= 0.0) {
                return Err(DomainError::NonPositiveParameter {
                    estimator: kind.to_string(),
                    parameter: name,
                    value,
                }
                .into());
            }
        }
        Ok(match kind {
            DistributionKind::Exponential => LifeDistribution::Exponential { rate: parameters[0] },
            DistributionKind::Weibull => LifeDistribution::Weibull {
                scale: parameters[0],
                shape: parameters[1],
            },
            DistributionKind::Lognormal => LifeDistribution::Lognormal {
                mu: parameters[0],
                sigma: parameters[1],
            },
            DistributionKind::Gaussian => LifeDistribution::Gaussian {
                mu: parameters[0],
                sigma: parameters[1],
            },
        })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            LifeDistribution::Exponential { .. } => DistributionKind::Exponential,
            LifeDistribution::Weibull { .. } => DistributionKind::Weibull,
            LifeDistribution::Lognormal { .. } => DistributionKind::Lognormal,
            LifeDistribution::Gaussian { .. } => DistributionKind::Gaussian,
        }
    }

    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            LifeDistribution::Exponential { rate } => vec![rate],
            LifeDistribution::Weibull { scale, shape } => vec![scale, shape],
            LifeDistribution::Lognormal { mu, sigma } | LifeDistribution::Gaussian { mu, sigma } => {
                vec![mu, sigma]
            }
        }
    }

    /// Standardized normal deviate, `None` for the non-normal families or `t <= 0`
    /// under the lognormal
    #[inline]
    fn normal_z(&self, t: f64) -> Option<(f64, f64)> {
        match *self {
            LifeDistribution::Lognormal { mu, sigma } if t > 0.0 => Some(((t.ln() - mu) / sigma, sigma)),
            LifeDistribution::Gaussian { mu, sigma } => Some(((t - mu) / sigma, sigma)),
            _ => None,
        }
    }

    pub fn pdf(&self, t: f64) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t < 0.0 {
                    0.0
                } else {
                    rate * (-rate * t).exp()
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t < 0.0 {
                    0.0
                } else {
                    let x = t / scale;
                    shape / scale * x.powf(shape - 1.0) * (-x.powf(shape)).exp()
                }
            }
            LifeDistribution::Lognormal { .. } => match self.normal_z(t) {
                Some((z, sigma)) => std_normal_pdf(z) / (sigma * t),
                None => 0.0,
            },
            LifeDistribution::Gaussian { .. } => match self.normal_z(t) {
                Some((z, sigma)) => std_normal_pdf(z) / sigma,
                None => 0.0,
            },
        }
    }

    /// Log density, `-∞` outside the support
    pub fn ln_pdf(&self, t: f64) -> f64 {
        const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t < 0.0 {
                    f64::NEG_INFINITY
                } else {
                    rate.ln() - rate * t
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t <= 0.0 {
                    self.pdf(t).ln()
                } else {
                    let ln_x = (t / scale).ln();
                    shape.ln() - scale.ln() + (shape - 1.0) * ln_x - (shape * ln_x).exp()
                }
            }
            LifeDistribution::Lognormal { .. } => match self.normal_z(t) {
                Some((z, sigma)) => -LN_SQRT_2PI - (sigma * t).ln() - 0.5 * z * z,
                None => f64::NEG_INFINITY,
            },
            LifeDistribution::Gaussian { .. } => match self.normal_z(t) {
                Some((z, sigma)) => -LN_SQRT_2PI - sigma.ln() - 0.5 * z * z,
                None => f64::NEG_INFINITY,
            },
        }
    }

    /// Unreliability `F(t)`
    pub fn cdf(&self, t: f64) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t <= 0.0 {
                    0.0
                } else {
                    -(-rate * t).exp_m1()
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t <= 0.0 {
                    0.0
                } else {
                    -(-(t / scale).powf(shape)).exp_m1()
                }
            }
            LifeDistribution::Lognormal { .. } | LifeDistribution::Gaussian { .. } => {
                match self.normal_z(t) {
                    Some((z, _)) => std_normal_cdf(z),
                    None => 0.0,
                }
            }
        }
    }

    /// Reliability `R(t) = 1 − F(t)`, computed directly for tail accuracy
    pub fn reliability(&self, t: f64) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t <= 0.0 {
                    1.0
                } else {
                    (-rate * t).exp()
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t <= 0.0 {
                    1.0
                } else {
                    (-(t / scale).powf(shape)).exp()
                }
            }
            LifeDistribution::Lognormal { .. } | LifeDistribution::Gaussian { .. } => {
                match self.normal_z(t) {
                    Some((z, _)) => std_normal_sf(z),
                    None => 1.0,
                }
            }
        }
    }

    /// Hazard rate `f(t)/R(t)`
    pub fn hazard(&self, t: f64) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t < 0.0 {
                    0.0
                } else {
                    rate
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t < 0.0 {
                    0.0
                } else {
                    shape / scale * (t / scale).powf(shape - 1.0)
                }
            }
            _ => {
                let r = self.reliability(t);
                if r > 0.0 {
                    self.pdf(t) / r
                } else {
                    f64::INFINITY
                }
            }
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => 1.0 / rate,
            LifeDistribution::Weibull { scale, shape } => scale * gamma(1.0 + 1.0 / shape),
            LifeDistribution::Lognormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
            LifeDistribution::Gaussian { mu, .. } => mu,
        }
    }

    /// Time by which a fraction `p` of the population has failed
    pub fn quantile(&self, p: f64) -> f64 {
        match *self {
            LifeDistribution::Exponential { rate } => -(-p).ln_1p() / rate,
            LifeDistribution::Weibull { scale, shape } => scale * (-(-p).ln_1p()).powf(1.0 / shape),
            LifeDistribution::Lognormal { mu, sigma } => (mu + sigma * std_normal_quantile(p)).exp(),
            LifeDistribution::Gaussian { mu, sigma } => mu + sigma * std_normal_quantile(p),
        }
    }

    /// Draw `n` failure times
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>, DataError> {
        let invalid = |name: &'static str, value: f64| DataError::InvalidParameter { name, value };
        Ok(match *self {
            LifeDistribution::Exponential { rate } => {
                let dist = Exp::new(rate).map_err(|_| invalid("rate", rate))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            LifeDistribution::Weibull { scale, shape } => {
                let dist = Weibull::new(scale, shape).map_err(|_| invalid("shape", shape))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            LifeDistribution::Lognormal { mu, sigma } => {
                let dist = LogNormal::new(mu, sigma).map_err(|_| invalid("sigma", sigma))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            LifeDistribution::Gaussian { mu, sigma } => {
                let dist = Normal::new(mu, sigma).map_err(|_| invalid("sigma", sigma))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
        })
    }

    // ========================================================================
    // Parameter derivatives
    // ========================================================================

    /// `∂F(t)/∂θ` in parameter order, zero outside the support and at `t = ∞`
    pub fn cdf_gradient(&self, t: f64) -> Vec<f64> {
        if !t.is_finite() {
            return vec![0.0; self.kind().n_parameters()];
        }
        match *self {
            LifeDistribution::Exponential { rate } => {
                if t <= 0.0 {
                    vec![0.0]
                } else {
                    vec![t * (-rate * t).exp()]
                }
            }
            LifeDistribution::Weibull { scale, shape } => {
                if t <= 0.0 {
                    return vec![0.0, 0.0];
                }
                let ln_x = (t / scale).ln();
                let z = (shape * ln_x).exp();
                let s = (-z).exp();
                vec![-s * shape * z / scale, s * z * ln_x]
            }
            LifeDistribution::Lognormal { .. } | LifeDistribution::Gaussian { .. } => {
                match self.normal_z(t) {
                    Some((z, sigma)) => {
                        let phi = std_normal_pdf(z);
                        vec![-phi / sigma, -phi * z / sigma]
                    }
                    None => vec![0.0, 0.0],
                }
            }
        }
    }

    /// `∂ln f(t)/∂θ` in parameter order
    pub fn ln_pdf_gradient(&self, t: f64) -> Vec<f64> {
        match *self {
            LifeDistribution::Exponential { rate } => vec![1.0 / rate - t],
            LifeDistribution::Weibull { scale, shape } => {
                let ln_x = (t / scale).ln();
                let z = (shape * ln_x).exp();
                vec![shape / scale * (z - 1.0), 1.0 / shape + ln_x * (1.0 - z)]
            }
            LifeDistribution::Lognormal { .. } | LifeDistribution::Gaussian { .. } => {
                match self.normal_z(t) {
                    Some((z, sigma)) => vec![z / sigma, (z * z - 1.0) / sigma],
                    None => vec![f64::NAN, f64::NAN],
                }
            }
        }
    }
}

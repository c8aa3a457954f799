//! Censored-data log-likelihood and score
//!
//! Each record contributes according to its censoring kind:
//!
//! ```text
//! Event      w ln f(t)
//! Right      w ln R(l)
//! Left       w ln F(r)
//! Interval   w ln (F(r) − F(l))
//! ```

use super::distribution::LifeDistribution;
use crate::data::{CensoredDataset, CensoringKind, Observation};

/// One record as seen by the likelihood
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sample {
    pub kind: CensoringKind,
    pub left: f64,
    pub right: f64,
    pub weight: f64,
}

impl From<&Observation> for Sample {
    fn from(obs: &Observation) -> Self {
        Self {
            kind: obs.kind,
            left: obs.left,
            right: obs.right,
            weight: obs.weight(),
        }
    }
}

pub(crate) fn samples(dataset: &CensoredDataset) -> Vec<Sample> {
    dataset.observations().iter().map(Sample::from).collect()
}

/// Probability mass of `(l, r]`, taken from whichever tail is more accurate
#[inline]
fn interval_mass(dist: &LifeDistribution, l: f64, r: f64) -> f64 {
    let cdf_l = dist.cdf(l);
    if cdf_l > 0.5 {
        dist.reliability(l) - dist.reliability(r)
    } else {
        dist.cdf(r) - cdf_l
    }
}

/// Total weighted log-likelihood, `-∞` when any record has zero probability
pub(crate) fn log_likelihood(dist: &LifeDistribution, samples: &[Sample]) -> f64 {
    samples
        .iter()
        .map(|s| {
            let term = match s.kind {
                CensoringKind::Event => dist.ln_pdf(s.left),
                CensoringKind::RightCensored => dist.reliability(s.left).ln(),
                CensoringKind::LeftCensored => dist.cdf(s.right).ln(),
                CensoringKind::IntervalCensored => interval_mass(dist, s.left, s.right).ln(),
            };
            s.weight * term
        })
        .sum()
}

/// Gradient of the log-likelihood with respect to the parameters
pub(crate) fn score(dist: &LifeDistribution, samples: &[Sample]) -> Vec<f64> {
    let k = dist.kind().n_parameters();
    let mut total = vec![0.0; k];
    for s in samples {
        let term: Vec<f64> = match s.kind {
            CensoringKind::Event => dist.ln_pdf_gradient(s.left),
            CensoringKind::RightCensored => {
                let r = dist.reliability(s.left);
                dist.cdf_gradient(s.left).iter().map(|g| -g / r).collect()
            }
            CensoringKind::LeftCensored => {
                let f = dist.cdf(s.right);
                dist.cdf_gradient(s.right).iter().map(|g| g / f).collect()
            }
            CensoringKind::IntervalCensored => {
                let mass = interval_mass(dist, s.left, s.right);
                dist.cdf_gradient(s.right)
                    .iter()
                    .zip(dist.cdf_gradient(s.left))
                    .map(|(gr, gl)| (gr - gl) / mass)
                    .collect()
            }
        };
        for (acc, g) in total.iter_mut().zip(term) {
            *acc += s.weight * g;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::DistributionKind;
    use approx::assert_relative_eq;

    fn mixed() -> Vec<Sample> {
        let obs = [
            Observation::event(40.0),
            Observation::event(95.0).with_multiplicity(2),
            Observation::right_censored(120.0),
            Observation::left_censored(30.0),
            Observation::interval(60.0, 80.0),
        ];
        obs.iter().map(Sample::from).collect()
    }

    #[test]
    fn score_matches_numerical_gradient_for_mixed_censoring() {
        let cases = [
            (DistributionKind::Exponential, vec![0.012]),
            (DistributionKind::Weibull, vec![100.0, 1.4]),
            (DistributionKind::Lognormal, vec![4.3, 0.7]),
            (DistributionKind::Gaussian, vec![85.0, 35.0]),
        ];
        let data = mixed();
        for (kind, theta) in cases {
            let dist = LifeDistribution::from_parameters(kind, &theta).unwrap();
            let analytic = score(&dist, &data);
            for k in 0..theta.len() {
                let h = 1e-6 * theta[k].abs();
                let mut up = theta.clone();
                up[k] += h;
                let mut down = theta.clone();
                down[k] -= h;
                let ll = |p: &[f64]| log_likelihood(&LifeDistribution::from_parameters(kind, p).unwrap(), &data);
                let numeric = (ll(&up) - ll(&down)) / (2.0 * h);
                assert_relative_eq!(analytic[k], numeric, epsilon = 1e-6, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn multiplicity_scales_the_contribution() {
        let dist = LifeDistribution::Exponential { rate: 0.01 };
        let one = [Sample::from(&Observation::event(50.0))];
        let three = [Sample::from(&Observation::event(50.0).with_multiplicity(3))];
        assert_relative_eq!(3.0 * log_likelihood(&dist, &one), log_likelihood(&dist, &three));
    }

    #[test]
    fn exponential_right_censored_term_is_linear_in_time() {
        let dist = LifeDistribution::Exponential { rate: 0.5 };
        let data = [Sample::from(&Observation::right_censored(4.0))];
        assert_relative_eq!(log_likelihood(&dist, &data), -2.0, epsilon = 1e-12);
        assert_relative_eq!(score(&dist, &data)[0], -4.0, epsilon = 1e-12);
    }
}

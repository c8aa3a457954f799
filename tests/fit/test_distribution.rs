//! Life distribution functions and sampling

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reliakit::prelude::*;

#[test]
fn test_reliability_and_hazard_relations() {
    let models = [
        LifeDistribution::from_parameters(DistributionKind::Exponential, &[0.01]).unwrap(),
        LifeDistribution::from_parameters(DistributionKind::Weibull, &[150.0, 2.2]).unwrap(),
        LifeDistribution::from_parameters(DistributionKind::Lognormal, &[4.5, 0.6]).unwrap(),
        LifeDistribution::from_parameters(DistributionKind::Gaussian, &[120.0, 25.0]).unwrap(),
    ];
    for model in models {
        for t in [20.0, 80.0, 140.0] {
            assert_relative_eq!(model.reliability(t) + model.cdf(t), 1.0, epsilon = 1e-12);
            assert_relative_eq!(model.hazard(t), model.pdf(t) / model.reliability(t), max_relative = 1e-9);
        }
        assert_relative_eq!(model.cdf(model.quantile(0.3)), 0.3, epsilon = 1e-9);
    }
}

#[test]
fn test_weibull_mean_uses_gamma() {
    let model = LifeDistribution::from_parameters(DistributionKind::Weibull, &[100.0, 1.0]).unwrap();
    assert_relative_eq!(model.mean(), 100.0, max_relative = 1e-12);
}

#[test]
fn test_invalid_parameters_are_rejected() {
    assert!(LifeDistribution::from_parameters(DistributionKind::Weibull, &[100.0, -1.0]).is_err());
    assert!(LifeDistribution::from_parameters(DistributionKind::Gaussian, &[100.0]).is_err());
    assert!(LifeDistribution::from_parameters(DistributionKind::Gaussian, &[-5.0, 2.0]).is_ok());
}

#[test]
fn test_sampled_weibull_refits_close_to_truth() {
    let truth = LifeDistribution::from_parameters(DistributionKind::Weibull, &[300.0, 2.0]).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let times = truth.sample(&mut rng, 5000).unwrap();
    let data = times
        .iter()
        .fold(CensoredDataset::builder(), |b, &t| b.event(t))
        .build()
        .unwrap();
    let result = DistributionFitter::default()
        .fit(&data, FitMethod::MaximumLikelihood, DistributionKind::Weibull)
        .unwrap();
    assert_relative_eq!(result.parameters[0], 300.0, max_relative = 0.1);
    assert_relative_eq!(result.parameters[1], 2.0, max_relative = 0.1);
}

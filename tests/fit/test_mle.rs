//! Maximum-likelihood fits checked against closed forms and score identities

use approx::assert_relative_eq;
use reliakit::prelude::*;
use reliakit::DataError;

const TIMES: [f64; 8] = [17.0, 29.0, 44.0, 58.0, 71.0, 90.0, 112.0, 150.0];

fn complete() -> CensoredDataset {
    TIMES
        .iter()
        .fold(CensoredDataset::builder(), |b, &t| b.event(t))
        .build()
        .unwrap()
}

fn fit(data: &CensoredDataset, kind: DistributionKind) -> FitResult {
    DistributionFitter::default()
        .fit(data, FitMethod::MaximumLikelihood, kind)
        .unwrap()
}

#[test]
fn test_exponential_rate_is_failures_over_exposure() {
    let data = CensoredDataset::builder()
        .event(40.0)
        .event(75.0)
        .right_censored(100.0)
        .times(3)
        .build()
        .unwrap();
    let result = fit(&data, DistributionKind::Exponential);
    assert_relative_eq!(result.parameters[0], 2.0 / 415.0, max_relative = 1e-12);
    assert_eq!(result.n_failures, 2.0);
    assert_eq!(result.n_suspensions, 3.0);
    assert_relative_eq!(result.mean_life(), 207.5, max_relative = 1e-12);
}

#[test]
fn test_weibull_satisfies_complete_data_equations() {
    let result = fit(&complete(), DistributionKind::Weibull);
    let (scale, shape) = (result.parameters[0], result.parameters[1]);
    let n = TIMES.len() as f64;
    let sum_pow: f64 = TIMES.iter().map(|t| t.powf(shape)).sum();
    let sum_pow_log: f64 = TIMES.iter().map(|t| t.powf(shape) * t.ln()).sum();
    let mean_log: f64 = TIMES.iter().map(|t| t.ln()).sum::<f64>() / n;
    assert_relative_eq!(1.0 / shape + mean_log, sum_pow_log / sum_pow, max_relative = 1e-6);
    assert_relative_eq!(scale, (sum_pow / n).powf(1.0 / shape), max_relative = 1e-6);
}

#[test]
fn test_lognormal_matches_log_moments() {
    let result = fit(&complete(), DistributionKind::Lognormal);
    let logs: Vec<f64> = TIMES.iter().map(|t| t.ln()).collect();
    let mu = logs.iter().sum::<f64>() / logs.len() as f64;
    let sigma = (logs.iter().map(|l| (l - mu).powi(2)).sum::<f64>() / logs.len() as f64).sqrt();
    assert_relative_eq!(result.parameters[0], mu, max_relative = 1e-6);
    assert_relative_eq!(result.parameters[1], sigma, max_relative = 1e-6);
}

#[test]
fn test_mixed_censoring_fit_has_usable_uncertainty() {
    let data = CensoredDataset::builder()
        .left_censored(20.0)
        .event(35.0)
        .interval(40.0, 60.0)
        .times(2)
        .event(72.0)
        .interval(80.0, 110.0)
        .right_censored(130.0)
        .times(4)
        .build()
        .unwrap();
    for kind in DistributionKind::ALL {
        let result = fit(&data, kind);
        assert!(result.standard_errors().iter().all(|se| *se > 0.0), "{kind}");
        let r = result.reliability(60.0);
        assert!(r > 0.0 && r < 1.0, "{kind}");
        assert!(result.goodness.aic > result.goodness.log_likelihood * -2.0);
    }
}

#[test]
fn test_bounds_use_the_fit_confidence() {
    let data = complete();
    let narrow = DistributionFitter::new(FitOptions::default().with_confidence(0.8))
        .fit(&data, FitMethod::MaximumLikelihood, DistributionKind::Weibull)
        .unwrap();
    let wide = DistributionFitter::new(FitOptions::default().with_confidence(0.99))
        .fit(&data, FitMethod::MaximumLikelihood, DistributionKind::Weibull)
        .unwrap();
    let (n, w) = (narrow.bounds().unwrap(), wide.bounds().unwrap());
    assert!(w[1].0 < n[1].0 && n[1].1 < w[1].1);
}

#[test]
fn test_single_failure_cannot_fit_two_parameters() {
    let data = CensoredDataset::builder()
        .event(50.0)
        .right_censored(80.0)
        .times(5)
        .build()
        .unwrap();
    let err = DistributionFitter::default()
        .fit(&data, FitMethod::MaximumLikelihood, DistributionKind::Weibull)
        .unwrap_err();
    assert!(matches!(
        err,
        ReliabilityError::Data(DataError::InsufficientData { .. })
    ));
}

#[test]
fn test_fit_result_serializes_for_reports() {
    let result = fit(&complete(), DistributionKind::Gaussian);
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"distribution\":\"Gaussian\""));
    assert!(json.contains("\"method\":\"MaximumLikelihood\""));
}

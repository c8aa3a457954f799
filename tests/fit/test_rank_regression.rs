//! Rank regression on median ranks

use approx::assert_relative_eq;
use reliakit::prelude::*;
use reliakit::rank::{bernard, median_ranks};

fn weibull_sample() -> CensoredDataset {
    // quantiles of Weibull(scale 200, shape 1.8) at Bernard ranks of n = 7
    (1..=7)
        .map(|i| {
            let f = bernard(i as f64, 7.0);
            200.0 * (-(-f).ln_1p()).powf(1.0 / 1.8)
        })
        .fold(CensoredDataset::builder(), |b, t| b.event(t))
        .build()
        .unwrap()
}

#[test]
fn test_complete_ranks_are_bernard() {
    let ranks = median_ranks(&weibull_sample(), false);
    for (i, r) in ranks.iter().enumerate() {
        assert_relative_eq!(*r, (i as f64 + 1.0 - 0.3) / 7.4, epsilon = 1e-12);
    }
}

#[test]
fn test_weibull_quantiles_are_recovered() {
    let result = DistributionFitter::default()
        .fit(&weibull_sample(), FitMethod::RankRegression, DistributionKind::Weibull)
        .unwrap();
    assert_relative_eq!(result.parameters[0], 200.0, max_relative = 1e-9);
    assert_relative_eq!(result.parameters[1], 1.8, max_relative = 1e-9);
    assert_relative_eq!(result.correlation_coefficient.unwrap(), 1.0, epsilon = 1e-12);
    assert_eq!(result.iterations, 0);
}

#[test]
fn test_suspensions_shift_adjusted_ranks() {
    let data = CensoredDataset::builder()
        .event(30.0)
        .right_censored(45.0)
        .event(60.0)
        .event(85.0)
        .right_censored(90.0)
        .event(110.0)
        .build()
        .unwrap();
    let result = DistributionFitter::default()
        .fit(&data, FitMethod::RankRegression, DistributionKind::Lognormal)
        .unwrap();
    assert_eq!(result.n_failures, 4.0);
    assert_eq!(result.n_suspensions, 2.0);
    assert!(result.correlation_coefficient.is_some_and(|r| r > 0.9));
}

#[test]
fn test_compare_ranks_all_families() {
    let ranked = DistributionFitter::default().compare(&weibull_sample(), FitMethod::RankRegression);
    let kinds: Vec<DistributionKind> = ranked.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds.len(), 4);
    for kind in DistributionKind::ALL {
        assert!(kinds.contains(&kind));
    }
}

/// 100 exponential failure times with a mean near 100
const EXPONENTIAL_TIMES: [f64; 100] = [
    48.146, 20.564, 94.072, 177.992, 89.103, 350.577, 82.223, 40.360, 39.576, 53.127,
    159.732, 48.398, 46.984, 36.169, 351.347, 18.917, 101.977, 141.988, 241.044, 61.993,
    171.813, 78.747, 54.070, 87.229, 158.980, 185.254, 16.452, 120.144, 294.418, 13.640,
    115.532, 58.595, 7.876, 10.790, 67.342, 14.848, 82.160, 14.558, 18.793, 69.776,
    65.542, 194.039, 41.559, 75.549, 14.808, 184.263, 2.810, 13.095, 52.885, 49.855,
    263.548, 4.248, 66.864, 172.663, 226.918, 169.175, 148.070, 3.679, 28.693, 34.931,
    297.467, 137.072, 53.180, 49.760, 19.664, 96.415, 14.003, 17.743, 212.279, 38.951,
    74.057, 86.769, 37.765, 5.566, 71.048, 5.137, 35.461, 121.963, 42.486, 52.315,
    77.095, 14.259, 111.147, 49.364, 1.978, 163.827, 66.690, 80.172, 323.763, 275.491,
    49.315, 1.585, 317.922, 12.398, 222.930, 6.328, 143.687, 134.763, 88.862, 143.918,
];

#[test]
fn test_weibull_rank_on_time_reference() {
    let data = [16.0, 34.0, 53.0, 75.0, 93.0, 120.0]
        .into_iter()
        .fold(CensoredDataset::builder(), |b, t| b.event(t))
        .build()
        .unwrap();
    let result = DistributionFitter::default()
        .fit(&data, FitMethod::RankRegression, DistributionKind::Weibull)
        .unwrap();
    assert_relative_eq!(result.parameters[0], 76.3454154, max_relative = 1e-7);
    assert_relative_eq!(result.parameters[1], 1.4269671, max_relative = 1e-7);
    assert_relative_eq!(result.correlation_coefficient.unwrap(), 0.9955808, max_relative = 1e-7);
    assert_relative_eq!(result.variance_covariance[1][1], 0.0045293, max_relative = 1e-4);
}

#[test]
fn test_exponential_rank_on_time_reference() {
    let data = EXPONENTIAL_TIMES
        .into_iter()
        .fold(CensoredDataset::builder(), |b, t| b.event(t))
        .build()
        .unwrap();
    let result = DistributionFitter::default()
        .fit(&data, FitMethod::RankRegression, DistributionKind::Exponential)
        .unwrap();
    assert_relative_eq!(result.parameters[0], 0.0108368, max_relative = 1e-5);
    assert_relative_eq!(result.variance_covariance[0][0], 2.8792752e-8, max_relative = 1e-5);
    assert_relative_eq!(result.correlation_coefficient.unwrap(), -0.9881986, max_relative = 1e-6);
}

//! Sequential Crow-AMSAA fits

use approx::assert_relative_eq;
use reliakit::growth::{cramer_von_mises_critical_value, duane_fit};
use reliakit::prelude::*;

const FAILURES: [f64; 12] = [
    4.3, 10.6, 16.8, 24.0, 38.9, 52.1, 71.5, 93.0, 121.7, 150.2, 198.4, 245.0,
];

#[test]
fn test_one_row_per_time_point() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::default()).unwrap();
    assert_eq!(fit.rows.len(), FAILURES.len());
    for (k, row) in fit.rows.iter().enumerate() {
        assert_eq!(row.time, FAILURES[k]);
        assert_eq!(row.n_failures, k as u64 + 1);
    }
}

#[test]
fn test_each_row_matches_a_fit_on_its_prefix() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let full = crow_amsaa(&series, &GrowthOptions::default()).unwrap();
    let prefix = GrowthSeries::from_failure_times(FAILURES[..6].to_vec()).unwrap();
    let partial = crow_amsaa(&prefix, &GrowthOptions::default()).unwrap();
    assert_eq!(full.rows[5], partial.rows[5]);
}

#[test]
fn test_improving_system_has_beta_below_one() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::default().with_confidence(0.9)).unwrap();
    let last = fit.final_row().unwrap();
    assert!(last.beta.value < 1.0);
    assert!(last.instantaneous_mtbf.value > last.cumulative_mtbf.value);
    assert!(last.instantaneous_mtbf.contains(last.instantaneous_mtbf.value));
}

#[test]
fn test_goodness_of_fit_uses_the_cvm_table() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::default().with_confidence(0.9)).unwrap();
    let gof = fit.goodness_of_fit().unwrap();
    let cvm = gof.cramer_von_mises.unwrap();
    // failure truncated: M = N - 1 = 11
    assert_relative_eq!(cvm.critical_value, cramer_von_mises_critical_value(11, 0.1), epsilon = 1e-12);
    assert_relative_eq!(cvm.critical_value, 0.169, epsilon = 1e-12);
    assert_eq!(gof.chi_square.degrees_of_freedom, 22.0);
}

#[test]
fn test_grouped_counts() {
    let series = GrowthSeries::new(vec![100.0, 200.0, 300.0, 400.0, 500.0], vec![12, 8, 6, 6, 4]).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::grouped_data()).unwrap();
    let last = fit.final_row().unwrap();
    assert_eq!(last.n_failures, 36);
    assert!(last.beta.value < 1.0);
    assert_relative_eq!(last.lambda.value, 36.0 / 500f64.powf(last.beta.value), max_relative = 1e-12);
    assert!(last.chi_square >= 0.0);
}

#[test]
fn test_growth_fit_serializes_for_reports() {
    let series = GrowthSeries::from_failure_times(FAILURES[..4].to_vec()).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::default()).unwrap();
    let json = serde_json::to_value(&fit).unwrap();
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["termination"], "FailureTruncated");
}

#[test]
fn test_duane_agrees_on_direction() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let duane = duane_fit(&series).unwrap();
    let fit = crow_amsaa(&series, &GrowthOptions::default()).unwrap();
    // both models describe growth: alpha > 0 and beta < 1
    assert!(duane.alpha > 0.0);
    assert!(fit.final_row().unwrap().beta.value < 1.0);
}

//! Trend tests against a homogeneous Poisson process

use approx::assert_relative_eq;
use reliakit::growth::{trend_statistics_with, Termination};
use reliakit::prelude::*;

#[test]
fn test_mil_handbook_matches_crow_amsaa_chi_square() {
    let times = [9.2, 15.8, 36.5, 198.5];
    let trend = trend_statistics_with(&times, Termination::TimeTruncated(250.0)).unwrap();
    let series = GrowthSeries::from_failure_times(times.to_vec()).unwrap();
    let fit = crow_amsaa(
        &series,
        &GrowthOptions::default().with_termination(Termination::TimeTruncated(250.0)),
    )
    .unwrap();
    // 2 Σ ln(T/t_i) = 2N / β for time-truncated data
    assert_relative_eq!(trend.mil_handbook, fit.final_row().unwrap().chi_square, max_relative = 1e-12);
    assert_eq!(trend.mil_handbook_df, 8.0);
}

#[test]
fn test_p_values_are_probabilities() {
    let trend = trend_statistics(&[12.0, 30.0, 41.0, 77.0, 96.0, 160.0, 230.0]).unwrap();
    for p in [trend.mil_handbook_p_value(), trend.laplace_p_value(), trend.lewis_robinson_p_value()] {
        assert!((0.0..=1.0).contains(&p), "{p}");
    }
}

/// Grampus diesel engine failure times (thousands of hours), Meeker and Escobar
const GRAMPUS: [f64; 57] = [
    0.860, 1.258, 1.317, 1.442, 1.897, 2.011, 2.122, 2.439, 3.203, 3.298, 3.902, 3.910, 4.000, 4.247, 4.411, 4.456,
    4.517, 4.899, 4.910, 5.676, 5.755, 6.137, 6.221, 6.311, 6.613, 6.975, 7.335, 8.158, 8.498, 8.690, 9.042, 9.330,
    9.394, 9.426, 9.872, 10.191, 11.511, 11.575, 12.1, 12.126, 12.368, 12.681, 12.795, 13.399, 13.668, 13.78, 13.877,
    14.007, 14.028, 14.035, 14.173, 14.173, 14.449, 14.587, 14.610, 15.07, 16.0,
];

#[test]
fn test_grampus_reference_statistics() {
    let trend = trend_statistics(&GRAMPUS).unwrap();
    assert_eq!(trend.n_failures, 57);
    assert_relative_eq!(trend.mil_handbook, 98.67226125807468, max_relative = 1e-12);
    assert_relative_eq!(trend.laplace, 0.6232938719595844, max_relative = 1e-12);
    assert_relative_eq!(trend.lewis_robinson, 0.63904094805166545, max_relative = 1e-12);
}

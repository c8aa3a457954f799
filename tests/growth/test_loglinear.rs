//! Sequential log-linear NHPP fits

use approx::assert_relative_eq;
use reliakit::prelude::*;

const FAILURES: [f64; 12] = [
    4.3, 10.6, 16.8, 24.0, 38.9, 52.1, 71.5, 93.0, 121.7, 150.2, 198.4, 245.0,
];

#[test]
fn test_improving_system_has_a_falling_intensity() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let fit = loglinear_fit(&series, &GrowthOptions::default()).unwrap();
    assert_eq!(fit.rows.len(), FAILURES.len());

    let last = fit.final_row().unwrap();
    assert_relative_eq!(last.gamma1.value, -0.00783035650469068, max_relative = 1e-8);
    assert_relative_eq!(last.gamma0.value, -2.2060368238450208, max_relative = 1e-8);
    assert_relative_eq!(last.intensity.value, 0.016171996114020485, max_relative = 1e-8);
    assert!(last.intensity.contains(last.intensity.value));
    assert_relative_eq!(last.mtbf.value, 1.0 / last.intensity.value);
    assert_relative_eq!(last.cumulative_mtbf, 245.0 / 12.0);

    // agrees in direction with the power-law model
    let crow = crow_amsaa(&series, &GrowthOptions::default()).unwrap();
    assert!(crow.final_row().unwrap().beta.value < 1.0);
}

#[test]
fn test_parallel_rows_match_sequential() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let sequential = loglinear_fit(&series, &GrowthOptions::default()).unwrap();
    let parallel = loglinear_fit(&series, &GrowthOptions::default().with_parallel(true)).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_wider_confidence_widens_bounds() {
    let series = GrowthSeries::from_failure_times(FAILURES.to_vec()).unwrap();
    let narrow = loglinear_fit(&series, &GrowthOptions::default().with_confidence(0.8)).unwrap();
    let wide = loglinear_fit(&series, &GrowthOptions::default().with_confidence(95.0)).unwrap();
    let (n, w) = (narrow.final_row().unwrap(), wide.final_row().unwrap());
    assert_eq!(n.gamma1.value, w.gamma1.value);
    assert!(w.gamma1.lower < n.gamma1.lower && w.gamma1.upper > n.gamma1.upper);
    assert!(w.mtbf.upper > n.mtbf.upper);
}

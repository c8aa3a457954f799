//! Turnbull self-consistency estimates

use approx::assert_relative_eq;
use reliakit::prelude::*;

#[test]
fn test_exact_data_spreads_mass_evenly() {
    let data = CensoredDataset::builder()
        .event(3.0)
        .event(5.0)
        .event(9.0)
        .build()
        .unwrap();
    let curve = turnbull(&data, &TurnbullOptions::default()).unwrap();
    assert_eq!(curve.rows.len(), 3);
    for row in &curve.rows {
        assert_relative_eq!(row.probability, 1.0 / 3.0, epsilon = 1e-12);
    }
    assert_relative_eq!(curve.survival_at(6.0), 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_mixed_censoring_gives_a_proper_distribution() {
    let data = CensoredDataset::builder()
        .interval(1.0, 4.0)
        .interval(2.0, 4.5)
        .interval(3.0, 8.0)
        .event(5.0)
        .right_censored(6.0)
        .build()
        .unwrap();
    let curve = turnbull(&data, &TurnbullOptions::default()).unwrap();
    let total: f64 = curve.rows.iter().map(|r| r.probability).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    assert!(curve.rows.windows(2).all(|w| w[1].survival <= w[0].survival));
}

#[test]
fn test_iteration_budget_is_reported() {
    let data = CensoredDataset::builder()
        .interval(1.0, 4.0)
        .interval(2.0, 4.5)
        .interval(3.0, 8.0)
        .event(5.0)
        .build()
        .unwrap();
    let options = TurnbullOptions::default().with_max_iterations(1).with_tolerance(1e-12);
    match turnbull(&data, &options).unwrap_err() {
        ReliabilityError::Convergence(err) => {
            assert_eq!(err.estimator, "Turnbull");
            assert_eq!(err.iterations, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

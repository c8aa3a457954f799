//! Mean cumulative function over repairable units

use approx::assert_relative_eq;
use reliakit::prelude::*;
use reliakit::DataError;

fn fleet() -> CensoredDataset {
    CensoredDataset::builder()
        .unit("A")
        .event(5.0)
        .event(12.0)
        .right_censored(20.0)
        .unit("B")
        .event(8.0)
        .right_censored(10.0)
        .build()
        .unwrap()
}

#[test]
fn test_mcf_accumulates_mean_recurrences() {
    let curve = mean_cumulative_function(&fleet(), &McfOptions::default()).unwrap();
    let times: Vec<f64> = curve.rows().iter().map(|r| r.time).collect();
    assert_eq!(times, vec![5.0, 8.0, 12.0]);
    let mcf: Vec<f64> = curve.rows().iter().map(|r| r.mcf).collect();
    assert_relative_eq!(mcf[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(mcf[1], 1.0, epsilon = 1e-12);
    // unit B left observation at 10
    assert_relative_eq!(mcf[2], 2.0, epsilon = 1e-12);
    assert_eq!(curve.rows()[2].delta_dot, 1.0);
}

#[test]
fn test_mcf_at_steps() {
    let curve = mean_cumulative_function(&fleet(), &McfOptions::default()).unwrap();
    assert_eq!(curve.mcf_at(1.0), 0.0);
    assert_relative_eq!(curve.mcf_at(10.0), 1.0, epsilon = 1e-12);
}

#[test]
fn test_mcf_bounds_bracket_the_estimate() {
    let curve = mean_cumulative_function(&fleet(), &McfOptions::default().with_confidence(0.95)).unwrap();
    assert_eq!(curve.units, vec!["A".to_string(), "B".to_string()]);
    for row in curve.rows() {
        assert!(row.variance >= 0.0);
        assert!(row.lower <= row.mcf && row.mcf <= row.upper);
    }
}

#[test]
fn test_records_without_units_are_rejected() {
    let data = CensoredDataset::builder().event(3.0).event(9.0).build().unwrap();
    let err = mean_cumulative_function(&data, &McfOptions::default()).unwrap_err();
    assert!(matches!(err, ReliabilityError::Data(DataError::MissingUnit { .. })));
}

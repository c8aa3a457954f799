//! Kaplan-Meier curves on small hand-checked datasets

use approx::assert_relative_eq;
use reliakit::prelude::*;
use reliakit::DataError;

fn four_units() -> CensoredDataset {
    CensoredDataset::builder()
        .event(10.0)
        .event(20.0)
        .right_censored(30.0)
        .event(40.0)
        .build()
        .unwrap()
}

#[test]
fn test_product_limit_steps() {
    let curve = kaplan_meier(&four_units(), &KaplanMeierOptions::default()).unwrap();
    let survival: Vec<f64> = curve.rows().iter().map(|r| r.survival).collect();
    let expected = [0.75, 0.5, 0.5, 0.0];
    for (s, e) in survival.iter().zip(expected) {
        assert_relative_eq!(*s, e, epsilon = 1e-12);
    }
    assert_eq!(curve.rows()[3].n_at_risk, 1.0);
    assert_eq!(curve.rows()[2].n_censored, 1.0);
}

#[test]
fn test_greenwood_standard_error() {
    let curve = kaplan_meier(&four_units(), &KaplanMeierOptions::default()).unwrap();
    // Σ d/(n(n-d)) = 1/12 + 1/6 at t = 20
    assert_relative_eq!(curve.rows()[1].std_error, 0.5 * 0.25f64.sqrt(), epsilon = 1e-12);
    // the last failure empties the risk set
    assert_eq!(curve.rows()[3].std_error, 0.0);
}

#[test]
fn test_survival_at_is_right_continuous() {
    let curve = kaplan_meier(&four_units(), &KaplanMeierOptions::default()).unwrap();
    assert_eq!(curve.survival_at(5.0), 1.0);
    assert_relative_eq!(curve.survival_at(10.0), 0.75);
    assert_relative_eq!(curve.survival_at(35.0), 0.5);
}

#[test]
fn test_restricted_mean_life() {
    let curve = kaplan_meier(&four_units(), &KaplanMeierOptions::default()).unwrap();
    let mean = curve.mean_life(0.9).unwrap();
    // 10·1 + 10·0.75 + 10·0.5 + 10·0.5
    assert_relative_eq!(mean.mean, 27.5, epsilon = 1e-12);
    assert!(mean.lower < mean.mean && mean.mean < mean.upper);
}

#[test]
fn test_cumulative_hazard() {
    let curve = kaplan_meier(&four_units(), &KaplanMeierOptions::default()).unwrap();
    let hazard = curve.hazard();
    assert_relative_eq!(hazard[1].cum_hazard, 2f64.ln(), epsilon = 1e-12);
    assert_relative_eq!(hazard[1].hazard, 2f64.ln() / 20.0, epsilon = 1e-12);
    assert!(hazard[1].cum_hazard_lower <= hazard[1].cum_hazard);
    assert!(hazard[1].cum_hazard <= hazard[1].cum_hazard_upper);
}

#[test]
fn test_interval_records_fail_at_their_midpoint() {
    let data = CensoredDataset::builder()
        .interval(10.0, 30.0)
        .event(40.0)
        .build()
        .unwrap();
    let curve = kaplan_meier(&data, &KaplanMeierOptions::default()).unwrap();
    assert_eq!(curve.rows()[0].time, 20.0);
    assert_relative_eq!(curve.rows()[0].survival, 0.5);
}

#[test]
fn test_one_sided_bounds() {
    let lower = KaplanMeierOptions::default().with_bound_type(BoundType::LowerOneSided);
    let curve = kaplan_meier(&four_units(), &lower).unwrap();
    for row in curve.rows() {
        assert_eq!(row.upper, row.survival);
        assert!(row.lower <= row.survival && row.lower >= 0.0);
    }
}

#[test]
fn test_percentage_confidence_matches_fraction() {
    let data = four_units();
    let percent = kaplan_meier(&data, &KaplanMeierOptions::default().with_confidence(90.0)).unwrap();
    let fraction = kaplan_meier(&data, &KaplanMeierOptions::default().with_confidence(0.9)).unwrap();
    assert_eq!(percent, fraction);
}

#[test]
fn test_invalid_confidence_is_rejected() {
    let err = kaplan_meier(&four_units(), &KaplanMeierOptions::default().with_confidence(0.3)).unwrap_err();
    assert!(matches!(
        err,
        ReliabilityError::Data(DataError::InvalidConfidence { .. })
    ));
}

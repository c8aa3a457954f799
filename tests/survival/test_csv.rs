//! Reading field data from CSV and analyzing it

use approx::assert_relative_eq;
use reliakit::prelude::*;

const FIELD_DATA: &str = "\
left,right,status,unit,quantity
# returns from the first production lot
12,,Event,,2
30,,Right Censored,,1
18,26,Interval Censored,,
45,,Event,,
";

#[test]
fn test_csv_feeds_the_estimators() {
    let data = read_csv_from(FIELD_DATA.as_bytes(), 0.0).unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data.total_weight(), 5.0);
    assert_eq!(data.failure_weight(), 4.0);

    let curve = kaplan_meier(&data, &KaplanMeierOptions::default()).unwrap();
    // two of five fail at 12, the interval record resolves at 22
    assert_relative_eq!(curve.survival_at(12.0), 0.6, epsilon = 1e-12);
    assert_relative_eq!(curve.survival_at(22.0), 0.4, epsilon = 1e-12);
}

#[test]
fn test_relevance_time_drops_late_records() {
    let data = read_csv_from(FIELD_DATA.as_bytes(), 40.0).unwrap();
    assert_eq!(data.len(), 3);
}

#[test]
fn test_malformed_rows_are_csv_errors() {
    let err = read_csv_from("left,right\nabc,3\n".as_bytes(), 0.0).unwrap_err();
    assert!(matches!(err, reliakit::DataError::Csv(_)));
}

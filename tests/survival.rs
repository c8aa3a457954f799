//! Non-parametric survival integration tests
//!
//! Exercises the public estimators through `reliakit::prelude`.

#[path = "survival/test_kaplan_meier.rs"]
mod test_kaplan_meier;

#[path = "survival/test_mcf.rs"]
mod test_mcf;

#[path = "survival/test_turnbull.rs"]
mod test_turnbull;

#[path = "survival/test_csv.rs"]
mod test_csv;

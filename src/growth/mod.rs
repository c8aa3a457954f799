//! Reliability growth of repairable systems under test
//!
//! - [`crow_amsaa`]: sequential NHPP power-law fit with Fisher-matrix bounds
//! - [`GrowthFit::goodness_of_fit`]: chi-square and Cramer-von Mises tests
//! - [`trend_statistics`]: MIL-HDBK-189, Laplace and Lewis-Robinson trend tests
//! - [`loglinear_fit`]: sequential log-linear (Cox-Lewis) NHPP fit
//! - [`duane_fit`]: log-log regression of cumulative MTBF on test time
//! - [`plan_phase`], [`plan_phases`]: test-phase and program planning
//!
//! These work on a [`GrowthSeries`] of cumulative test times and failure counts
//! and are independent of [`crate::data::CensoredDataset`].

pub mod crow_amsaa;
pub mod duane;
pub mod gof;
pub mod loglinear;
pub mod planning;
pub mod trend;
pub mod types;

pub use crow_amsaa::{crow_amsaa, GrowthFit, GrowthRow};
pub use duane::{duane_fit, DuaneFit};
pub use gof::{cramer_von_mises_critical_value, ChiSquareTest, CramerVonMisesTest, GrowthGoodnessOfFit};
pub use loglinear::{loglinear_fit, LogLinearFit, LogLinearRow};
pub use planning::{
    assess_feasibility, plan_phase, plan_phases, FeasibilityCheck, PhaseInputs, PhasePlan, PhaseRow, PlanInputs,
    PlanSolution, PlanVariable,
};
pub use trend::{trend_statistics, trend_statistics_with, TrendStatistics};
pub use types::{BoundedEstimate, GrowthOptions, GrowthSeries, Termination};

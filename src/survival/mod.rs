//! Non-parametric survival and recurrence estimators
//!
//! - [`kaplan_meier`]: product-limit survival with Greenwood bounds
//! - [`mean_cumulative_function`]: mean cumulative events per unit for repairable
//!   populations
//! - [`turnbull`]: self-consistent survival estimate for interval-censored data

pub mod kaplan_meier;
pub mod mcf;
pub mod turnbull;
pub mod types;

pub use kaplan_meier::{kaplan_meier, HazardRow, KaplanMeierCurve, KaplanMeierRow, MeanLife};
pub use mcf::{mean_cumulative_function, McfCurve, McfRow};
pub use turnbull::{turnbull, TurnbullCurve, TurnbullRow};
pub use types::{BoundType, KaplanMeierOptions, McfOptions, TurnbullOptions};

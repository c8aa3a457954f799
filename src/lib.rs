//! Reliability analysis for censored life data and repairable systems
//!
//! - [`data`]: censored observations and the normalized [`CensoredDataset`]
//! - [`survival`]: Kaplan-Meier, mean cumulative function and Turnbull estimators
//! - [`fit`]: Exponential, Weibull, Lognormal and Gaussian fits by maximum
//!   likelihood or rank regression
//! - [`growth`]: Crow-AMSAA and log-linear growth, trend tests, Duane regression
//!   and test planning
//! - [`backend`]: the [`SurvivalBackend`] seam used by report layers
//!
//! Estimators are pure functions over immutable inputs. They never print;
//! convergence details and result-changing fallbacks are reported through
//! `tracing`.

pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod fit;
pub mod growth;
pub mod optimize;
pub mod rank;
pub mod stats;
pub mod survival;

pub use backend::{NativeBackend, SurvivalBackend};
pub use config::AnalysisConfig;
pub use data::{CensoredDataset, CensoringKind, Observation};
pub use error::{ConvergenceError, DataError, DomainError, ReliabilityError};

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            read_csv, read_csv_from, CensoredDataset, CensoringKind, DatasetBuilder, Observation, UnitHistory,
        };
    }
    pub mod survival {
        pub use crate::survival::{
            kaplan_meier, mean_cumulative_function, turnbull, BoundType, KaplanMeierCurve, KaplanMeierOptions,
            McfCurve, McfOptions, TurnbullCurve, TurnbullOptions,
        };
    }
    pub mod fit {
        pub use crate::fit::{
            fit_distribution, DistributionFitter, DistributionKind, FitMethod, FitOptions, FitResult,
            LifeDistribution,
        };
    }
    pub mod growth {
        pub use crate::growth::{
            crow_amsaa, duane_fit, loglinear_fit, plan_phase, plan_phases, trend_statistics, GrowthFit,
            GrowthOptions, GrowthSeries, LogLinearFit, PhaseInputs, PlanInputs, PlanVariable, Termination,
        };
    }

    //extension traits
    pub use crate::data::DatasetBuilderExt;

    pub use self::data::*;
    pub use self::fit::*;
    pub use self::growth::*;
    pub use self::survival::*;
    pub use crate::backend::{NativeBackend, SurvivalBackend};
    pub use crate::config::AnalysisConfig;
    pub use crate::error::ReliabilityError;
}

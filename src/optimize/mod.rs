//! Numerical solvers shared by the estimators
//!
//! - [`simplex`]: argmin Nelder-Mead search used to locate likelihood maxima
//! - [`newton`]: damped Newton root finder for score equations and a bracketed
//!   scalar root finder

pub mod newton;
pub mod simplex;

pub use newton::{fd_jacobian, solve_bracketed, solve_root, NewtonOptions, RootSolution};
pub use simplex::{SimplexOptimizer, SimplexSolution};

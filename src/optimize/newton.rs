//! Damped Newton root finding for likelihood equations and scalar scores

use nalgebra::{DMatrix, DVector};

use crate::error::ConvergenceError;

/// Controls for the damped Newton root finder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    pub max_iterations: usize,
    /// Converged when the residual criterion drops to this value
    pub tolerance: f64,
    /// Relative step for finite-difference Jacobians
    pub fd_step: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-9,
            fd_step: 1e-6,
        }
    }
}

/// Root of a nonlinear system with the Jacobian at the root
#[derive(Debug, Clone, PartialEq)]
pub struct RootSolution {
    pub x: Vec<f64>,
    pub residual: f64,
    pub iterations: usize,
    pub jacobian: DMatrix<f64>,
}

/// Central-difference Jacobian of `system` at `x`
///
/// Falls back to a one-sided difference when `x - h` leaves the feasible region.
pub fn fd_jacobian<G, V>(system: &G, feasible: &V, x: &[f64], fd_step: f64) -> DMatrix<f64>
where
    G: Fn(&[f64]) -> Vec<f64>,
    V: Fn(&[f64]) -> bool,
{
    let n = x.len();
    let base = system(x);
    let m = base.len();
    let mut jac = DMatrix::zeros(m, n);
    for k in 0..n {
        let h = if x[k] == 0.0 { fd_step } else { fd_step * x[k].abs() };
        let mut up = x.to_vec();
        up[k] += h;
        let mut down = x.to_vec();
        down[k] -= h;
        let f_up = system(&up);
        let (f_down, span) = if feasible(&down) {
            (system(&down), 2.0 * h)
        } else {
            (base.clone(), h)
        };
        for i in 0..m {
            jac[(i, k)] = (f_up[i] - f_down[i]) / span;
        }
    }
    jac
}

/// Solve `system(x) = 0` by Newton steps with step-halving
///
/// A step is accepted when the candidate is feasible, finite and lowers the
/// residual criterion. Fails with [`ConvergenceError`] naming `estimator` when the
/// iteration budget runs out or no step makes progress.
pub fn solve_root<G, R, V>(
    estimator: &str,
    system: G,
    residual: R,
    feasible: V,
    x0: &[f64],
    options: &NewtonOptions,
) -> Result<RootSolution, ConvergenceError>
where
    G: Fn(&[f64]) -> Vec<f64>,
    R: Fn(&[f64], &[f64]) -> f64,
    V: Fn(&[f64]) -> bool,
{
    let mut x = x0.to_vec();
    let mut f = system(&x);
    let mut r = residual(&x, &f);
    if !r.is_finite() {
        return Err(ConvergenceError::new(estimator, 0, r, x));
    }

    for iteration in 0..=options.max_iterations {
        if r <= options.tolerance {
            let jacobian = fd_jacobian(&system, &feasible, &x, options.fd_step);
            tracing::debug!(estimator, iteration, residual = r, "root converged");
            return Ok(RootSolution {
                x,
                residual: r,
                iterations: iteration,
                jacobian,
            });
        }
        if iteration == options.max_iterations {
            break;
        }

        let jac = fd_jacobian(&system, &feasible, &x, options.fd_step);
        let rhs = -DVector::from_column_slice(&f);
        let delta = match jac.lu().solve(&rhs) {
            Some(delta) => delta,
            None => return Err(ConvergenceError::new(estimator, iteration, r, x)),
        };

        let mut scale = 1.0;
        let mut accepted = false;
        for _ in 0..50 {
            let candidate: Vec<f64> = x
                .iter()
                .zip(delta.iter())
                .map(|(xi, di)| xi + scale * di)
                .collect();
            if feasible(&candidate) {
                let fc = system(&candidate);
                let rc = residual(&candidate, &fc);
                if rc.is_finite() && rc < r {
                    x = candidate;
                    f = fc;
                    r = rc;
                    accepted = true;
                    break;
                }
            }
            scale *= 0.5;
        }
        if !accepted {
            tracing::debug!(estimator, iteration, residual = r, "newton step stalled");
            return Err(ConvergenceError::new(estimator, iteration, r, x));
        }
    }

    Err(ConvergenceError::new(estimator, options.max_iterations, r, x))
}

/// Root of a scalar function on a bracket with a sign change
///
/// Newton steps from a numerical derivative, replaced by bisection whenever they
/// leave the bracket. Stops when the bracket width falls below
/// `tolerance * max(1, |x|)` or the function vanishes.
pub fn solve_bracketed<F>(
    estimator: &str,
    f: F,
    mut lo: f64,
    mut hi: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, ConvergenceError>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() || !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(ConvergenceError::new(estimator, 0, f_lo.abs().min(f_hi.abs()), vec![lo, hi]));
    }

    let mut x = 0.5 * (lo + hi);
    for iteration in 0..max_iterations {
        let fx = f(x);
        if fx == 0.0 || (hi - lo).abs() <= tolerance * x.abs().max(1.0) {
            tracing::debug!(estimator, iteration, root = x, "bracketed root converged");
            return Ok(x);
        }
        if fx.signum() == f_lo.signum() {
            lo = x;
            f_lo = fx;
        } else {
            hi = x;
        }

        let h = 1e-7 * x.abs().max(1e-7);
        let slope = (f(x + h) - f(x - h)) / (2.0 * h);
        let newton = x - fx / slope;
        x = if slope.is_finite() && slope != 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }

    Err(ConvergenceError::new(estimator, max_iterations, f(x).abs(), vec![x]))
}

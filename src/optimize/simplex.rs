//! Nelder-Mead minimization through argmin

use argmin::{
    core::{CostFunction, Error, Executor},
    solver::neldermead::NelderMead,
};

/// Nelder-Mead minimization of an objective over an unconstrained parameter vector
///
/// The objective must return `f64::INFINITY` (never `NaN`) outside its domain so
/// the simplex can contract away from it.
pub struct SimplexOptimizer<F>
where
    F: Fn(&[f64]) -> f64,
{
    objective: F,
}

impl<F> CostFunction for SimplexOptimizer<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;
    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let value = (self.objective)(param);
        if value.is_nan() {
            return Ok(f64::INFINITY);
        }
        Ok(value)
    }
}

/// Outcome of a simplex search
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSolution {
    pub param: Vec<f64>,
    pub cost: f64,
    pub iterations: u64,
}

impl<F> SimplexOptimizer<F>
where
    F: Fn(&[f64]) -> f64,
{
    pub fn new(objective: F) -> Self {
        Self { objective }
    }

    pub fn minimize(
        self,
        start: &[f64],
        sd_tolerance: f64,
        max_iters: u64,
    ) -> Result<SimplexSolution, Error> {
        let simplex = create_initial_simplex(start);
        let solver: NelderMead<Vec<f64>, f64> =
            NelderMead::new(simplex).with_sd_tolerance(sd_tolerance)?;
        let res = Executor::new(self, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()?;
        let iterations = res.state.iter;
        let cost = res.state.best_cost;
        let param = res
            .state
            .best_param
            .ok_or_else(|| Error::msg("Nelder-Mead returned no parameter"))?;
        Ok(SimplexSolution {
            param,
            cost,
            iterations,
        })
    }
}

/// Start point plus one vertex per dimension, each shifted by 5% of its component
///
/// Components at zero are shifted by a fixed 0.05 instead.
fn create_initial_simplex(initial_point: &[f64]) -> Vec<Vec<f64>> {
    let perturbation_percentage = 0.05;

    let mut vertices = Vec::with_capacity(initial_point.len() + 1);
    vertices.push(initial_point.to_vec());

    for i in 0..initial_point.len() {
        let perturbation = if initial_point[i] == 0.0 {
            0.05
        } else {
            perturbation_percentage * initial_point[i]
        };

        let mut perturbed_point = initial_point.to_owned();
        perturbed_point[i] += perturbation;
        vertices.push(perturbed_point);
    }

    vertices
}

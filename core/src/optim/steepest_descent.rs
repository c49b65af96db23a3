use nalgebra::DVector;

use super::{
    backtracking_line_search, check_dimension, MinimizationConfig, MinimizationResult,
    Minimizer, Objective,
};
use crate::error::Result;

/// Steps along the negative gradient with a backtracking line search. The trial step
/// grows after every accepted step and shrinks on rejection.
#[derive(Copy, Clone, Debug, Default)]
pub struct SteepestDescent;

impl Minimizer for SteepestDescent {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial_guess: DVector<f64>,
        config: &MinimizationConfig,
    ) -> Result<MinimizationResult> {
        check_dimension(objective, &initial_guess)?;

        let mut x = initial_guess;
        let mut value = objective.value(&x)?;
        let mut gradient = objective.gradient(&x)?;
        let mut step = config.initial_step;
        let mut history = vec![value];

        let mut iterations = 0;
        while iterations < config.max_iterations && gradient.norm() >= config.gradient_tolerance
        {
            let direction = -&gradient;
            let Some(accepted) =
                backtracking_line_search(objective, &x, value, &gradient, &direction, step)?
            else {
                log::warn!("steepest descent line search failed at iteration {iterations}");
                break;
            };

            step = 2.0 * accepted.length;
            x = accepted.x;
            value = accepted.value;
            gradient = objective.gradient(&x)?;
            iterations += 1;
            history.push(value);

            log::info!(
                "iteration {iterations:<4} - value {value:1.10}. gradient norm {:1.4e}",
                gradient.norm()
            );
        }

        let gradient_norm = gradient.norm();
        Ok(MinimizationResult {
            x,
            value,
            gradient_norm,
            iterations,
            converged: gradient_norm < config.gradient_tolerance,
            history,
        })
    }
}

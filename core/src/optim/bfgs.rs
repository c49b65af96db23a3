use nalgebra::{DMatrix, DVector};

use super::{
    backtracking_line_search, check_dimension, MinimizationConfig, MinimizationResult,
    Minimizer, Objective,
};
use crate::error::Result;

/// Quasi-newton minimization with the BFGS update of the inverse hessian
#[derive(Copy, Clone, Debug, Default)]
pub struct Bfgs;

impl Minimizer for Bfgs {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial_guess: DVector<f64>,
        config: &MinimizationConfig,
    ) -> Result<MinimizationResult> {
        // updates with sᵀy below this are skipped to keep the inverse hessian positive definite
        const CURVATURE_GUARD: f64 = 1e-12;

        check_dimension(objective, &initial_guess)?;
        let n = initial_guess.len();

        let mut x = initial_guess;
        let mut value = objective.value(&x)?;
        let mut gradient = objective.gradient(&x)?;
        let mut inverse_hessian = DMatrix::<f64>::identity(n, n);
        let mut first_update = true;
        let mut history = vec![value];

        let mut iterations = 0;
        while iterations < config.max_iterations && gradient.norm() >= config.gradient_tolerance
        {
            let mut direction = -(&inverse_hessian * &gradient);
            if gradient.dot(&direction) >= 0.0 {
                log::debug!("resetting inverse hessian at iteration {iterations}");
                inverse_hessian.fill_with_identity();
                direction = -&gradient;
            }

            let Some(accepted) = backtracking_line_search(
                objective,
                &x,
                value,
                &gradient,
                &direction,
                config.initial_step,
            )?
            else {
                log::warn!("BFGS line search failed at iteration {iterations}");
                break;
            };

            let new_gradient = objective.gradient(&accepted.x)?;
            let s = &accepted.x - &x;
            let y = &new_gradient - &gradient;
            let sy = s.dot(&y);

            if sy > CURVATURE_GUARD {
                if first_update {
                    inverse_hessian *= sy / y.norm_squared();
                    first_update = false;
                }
                let rho = sy.recip();
                let identity = DMatrix::<f64>::identity(n, n);
                let left = &identity - rho * &s * y.transpose();
                let right = &identity - rho * &y * s.transpose();
                inverse_hessian = left * inverse_hessian * right + rho * &s * s.transpose();
            }

            x = accepted.x;
            value = accepted.value;
            gradient = new_gradient;
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

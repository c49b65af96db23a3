//! Unconstrained minimization of smooth objectives
mod bfgs;
mod steepest_descent;

use nalgebra::DVector;

pub use bfgs::Bfgs;
pub use steepest_descent::SteepestDescent;

use crate::{
    error::{Error, Result},
    objective::RestrictedHartreeFockObjective,
};

/// A scalar function of a parameter vector with a known gradient
pub trait Objective {
    /// number of parameters
    fn dimension(&self) -> usize;

    fn value(&self, x: &DVector<f64>) -> Result<f64>;

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>>;
}

pub trait Minimizer {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial_guess: DVector<f64>,
        config: &MinimizationConfig,
    ) -> Result<MinimizationResult>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MinimizationConfig {
    pub max_iterations: usize,
    /// the minimization has converged once the gradient norm drops below this
    pub gradient_tolerance: f64,
    /// length of the first trial step of each line search
    pub initial_step: f64,
}

impl Default for MinimizationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            gradient_tolerance: 1e-6,
            initial_step: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MinimizationResult {
    pub x: DVector<f64>,
    pub value: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    /// whether the gradient tolerance was reached. Running out of iterations is
    /// reported here, not as an error.
    pub converged: bool,
    /// objective value after every iteration, starting with the initial guess
    pub history: Vec<f64>,
}

/// Minimize the restricted hartree fock energy over orbital rotations with BFGS,
/// starting from zero rotation unless an initial guess is given
pub fn rhf_minimization(
    objective: &RestrictedHartreeFockObjective,
    initial_guess: Option<DVector<f64>>,
    config: &MinimizationConfig,
) -> Result<MinimizationResult> {
    let initial_guess =
        initial_guess.unwrap_or_else(|| DVector::zeros(objective.n_parameters()));
    Bfgs.minimize(objective, initial_guess, config)
}

fn check_dimension<O: Objective + ?Sized>(objective: &O, x: &DVector<f64>) -> Result<()> {
    if x.len() != objective.dimension() {
        return Err(Error::DimensionMismatch {
            expected: objective.dimension(),
            found: x.len(),
        });
    }
    Ok(())
}

/// Point accepted by a line search
struct Step {
    length: f64,
    x: DVector<f64>,
    value: f64,
}

/// Backtracking line search along `direction` that stops at the first step satisfying
/// the Armijo condition f(x + αp) <= f(x) + c₁ α ∇f·p. Returns `None` if `direction`
/// is not a descent direction or no acceptable step was found.
fn backtracking_line_search<O: Objective + ?Sized>(
    objective: &O,
    x: &DVector<f64>,
    value: f64,
    gradient: &DVector<f64>,
    direction: &DVector<f64>,
    initial_step: f64,
) -> Result<Option<Step>> {
    const ARMIJO: f64 = 1e-4;
    const SHRINK: f64 = 0.5;
    const MAX_TRIALS: usize = 60;

    let slope = gradient.dot(direction);
    if slope >= 0.0 {
        return Ok(None);
    }

    let mut length = initial_step;
    for _ in 0..MAX_TRIALS {
        let trial = x + length * direction;
        let trial_value = objective.value(&trial)?;
        if trial_value <= value + ARMIJO * length * slope {
            return Ok(Some(Step {
                length,
                x: trial,
                value: trial_value,
            }));
        }
        length *= SHRINK;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    use crate::{
        basis::BasisSet,
        error::{Error, Result},
        hf::HartreeFockConfig,
        molecular_data::{MolecularData, OrthonormalBasis},
        objective::RestrictedHartreeFockObjective,
        testing::{hydrogen, water},
    };

    use super::{rhf_minimization, Bfgs, MinimizationConfig, Minimizer, Objective, SteepestDescent};

    /// f(x) = ½ xᵀAx - bᵀx with minimum at A⁻¹b
    struct Quadratic {
        a: DMatrix<f64>,
        b: DVector<f64>,
    }

    impl Quadratic {
        fn example() -> Self {
            Self {
                a: DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0]),
                b: DVector::from_column_slice(&[1.0, -2.0, 0.5]),
            }
        }

        fn minimum(&self) -> DVector<f64> {
            self.a.clone().try_inverse().unwrap() * &self.b
        }
    }

    impl Objective for Quadratic {
        fn dimension(&self) -> usize {
            self.b.len()
        }

        fn value(&self, x: &DVector<f64>) -> Result<f64> {
            Ok(0.5 * x.dot(&(&self.a * x)) - self.b.dot(x))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
            Ok(&self.a * x - &self.b)
        }
    }

    /// Rosenbrock's banana function, minimum at (1, 1)
    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn dimension(&self) -> usize {
            2
        }

        fn value(&self, x: &DVector<f64>) -> Result<f64> {
            Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
            Ok(DVector::from_column_slice(&[
                -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0].powi(2)),
                200.0 * (x[1] - x[0].powi(2)),
            ]))
        }
    }

    #[test]
    fn minimizers_solve_quadratic() {
        let quadratic = Quadratic::example();
        let config = MinimizationConfig {
            max_iterations: 2000,
            gradient_tolerance: 1e-8,
            ..Default::default()
        };

        for result in [
            Bfgs.minimize(&quadratic, DVector::zeros(3), &config).unwrap(),
            SteepestDescent
                .minimize(&quadratic, DVector::zeros(3), &config)
                .unwrap(),
        ] {
            assert!(result.converged);
            assert!(result.gradient_norm < 1e-8);
            assert_relative_eq!(result.x, quadratic.minimum(), epsilon = 1e-7);
            assert!(result.history.windows(2).all(|pair| pair[1] <= pair[0]));
        }
    }

    #[test]
    fn bfgs_solves_rosenbrock() {
        let config = MinimizationConfig {
            max_iterations: 1000,
            ..Default::default()
        };
        let result = Bfgs
            .minimize(&Rosenbrock, DVector::from_column_slice(&[-1.2, 1.0]), &config)
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.x, DVector::from_column_slice(&[1.0, 1.0]), epsilon = 1e-4);
    }

    #[test]
    fn iteration_limit_is_not_an_error() {
        let config = MinimizationConfig {
            max_iterations: 3,
            gradient_tolerance: 1e-12,
            ..Default::default()
        };
        let result = SteepestDescent
            .minimize(&Rosenbrock, DVector::from_column_slice(&[-1.2, 1.0]), &config)
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.history.len(), 4);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        assert!(matches!(
            Bfgs.minimize(&Rosenbrock, DVector::zeros(3), &MinimizationConfig::default()),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn hydrogen_from_lowdin_orbitals() {
        let basis_set = BasisSet::by_name("STO-3G").unwrap();
        let data =
            MolecularData::compute(hydrogen(1.4), &basis_set, &HartreeFockConfig::default())
                .unwrap();
        let (objective, _) =
            RestrictedHartreeFockObjective::from_molecular_data(&data, OrthonormalBasis::Lowdin)
                .unwrap();

        let result = rhf_minimization(&objective, None, &MinimizationConfig::default()).unwrap();

        assert!(result.converged);
        assert!(result.history[0] > data.hf_energy + 1e-3);
        assert_relative_eq!(result.value, data.hf_energy, epsilon = 1e-8);
    }

    #[test]
    fn water_from_perturbed_canonical_orbitals() {
        let basis_set = BasisSet::by_name("STO-3G").unwrap();
        let data =
            MolecularData::compute(water(), &basis_set, &HartreeFockConfig::default()).unwrap();
        let (objective, _) = RestrictedHartreeFockObjective::from_molecular_data(
            &data,
            OrthonormalBasis::Canonical,
        )
        .unwrap();

        let initial_guess = DVector::from_fn(objective.n_parameters(), |i, _| {
            0.05 * if i % 2 == 0 { 1.0 } else { -1.0 }
        });
        let result =
            rhf_minimization(&objective, Some(initial_guess), &MinimizationConfig::default())
                .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.value, data.hf_energy, epsilon = 1e-8);
    }
}

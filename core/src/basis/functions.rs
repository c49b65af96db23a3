use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Function of the form K*x^i*y^j*z^k*exp(-alpha*r^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The coefficient of this gaussian and optionally the normalization constant
    pub coefficient: f64,
    /// (i, j, k) exponents of polynomial terms
    pub angular: (i32, i32, i32),
}

impl Gaussian {
    pub fn norm(exponent: f64, angular: (i32, i32, i32)) -> f64 {
        let (i, j, k) = angular;

        (std::f64::consts::FRAC_2_PI * exponent)
            .powi(3)
            .sqrt()
            .sqrt()
            * f64::sqrt(
                (8.0 * exponent).powi(i + j + k)
                    / ((i + 1..=2 * i).product::<i32>()
                        * (j + 1..=2 * j).product::<i32>()
                        * (k + 1..=2 * k).product::<i32>()) as f64,
            )
    }

    fn evaluate(&self, relative: Vector3<f64>) -> f64 {
        let (i, j, k) = self.angular;
        self.coefficient
            * relative.x.powi(i)
            * relative.y.powi(j)
            * relative.z.powi(k)
            * (-self.exponent * relative.norm_squared()).exp()
    }
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

impl ContractedGaussian {
    /// Rescale the coefficients so that the contracted function has unit norm.
    ///
    /// All primitives must share the same angular part, which is always the case for
    /// contractions read from a basis set.
    pub fn normalized(self) -> Self {
        let Self(mut primitives) = self;

        let self_overlap = itertools::iproduct!(&primitives, &primitives)
            .map(|(a, b)| a.coefficient * b.coefficient * same_center_overlap(a, b))
            .sum::<f64>();

        let scale = self_overlap.sqrt().recip();
        for primitive in &mut primitives {
            primitive.coefficient *= scale;
        }
        Self(primitives)
    }

    pub fn primitives(&self) -> &[Gaussian] {
        &self.0
    }
}

/// overlap of two primitives with equal angular parts sitting on the same center,
/// without their coefficients
fn same_center_overlap(a: &Gaussian, b: &Gaussian) -> f64 {
    let p = a.exponent + b.exponent;
    let (i, j, k) = a.angular;

    let axis = |l: i32| double_factorial(2 * l - 1) / (2.0 * p).powi(l);
    axis(i) * axis(j) * axis(k) * (std::f64::consts::PI / p).powi(3).sqrt()
}

fn double_factorial(n: i32) -> f64 {
    (1..=n).rev().step_by(2).map(|x| x as f64).product()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// The type of basis function this basis function has
    pub contracted_gaussian: ContractedGaussian,
    /// The position of this basis function, in bohr
    pub position: Vector3<f64>,
}

impl BasisFunction {
    /// Evaluate this basis function at a given position
    pub fn evaluate(&self, at: Vector3<f64>) -> f64 {
        let relative = at - self.position;
        self.contracted_gaussian
            .primitives()
            .iter()
            .map(|primitive| primitive.evaluate(relative))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use smallvec::smallvec;

    use super::{BasisFunction, ContractedGaussian, Gaussian};

    fn primitive(exponent: f64, coefficient: f64, angular: (i32, i32, i32)) -> Gaussian {
        Gaussian {
            exponent,
            coefficient: coefficient * Gaussian::norm(exponent, angular),
            angular,
        }
    }

    #[test]
    fn primitive_norm() {
        // (2a/pi)^(3/4) for an s function
        assert_relative_eq!(
            Gaussian::norm(0.5, (0, 0, 0)),
            std::f64::consts::FRAC_1_PI.powf(0.75),
            epsilon = 1e-12
        );
    }

    #[test]
    fn contraction_is_normalized() {
        let contracted = ContractedGaussian(smallvec![
            primitive(5.0331513, 0.155916275, (1, 0, 0)),
            primitive(1.1695961, 0.6076837186, (1, 0, 0)),
            primitive(0.380389, 0.3919573931, (1, 0, 0)),
        ])
        .normalized();

        let renormalized = contracted.clone().normalized();
        for (a, b) in contracted.primitives().iter().zip(renormalized.primitives()) {
            assert_relative_eq!(a.coefficient, b.coefficient, epsilon = 1e-12);
        }
    }

    #[test]
    fn evaluate_single_primitive() {
        let function = BasisFunction {
            contracted_gaussian: ContractedGaussian(smallvec![Gaussian {
                exponent: 1.0,
                coefficient: 2.0,
                angular: (1, 0, 0),
            }]),
            position: Vector3::new(1.0, 0.0, 0.0),
        };

        assert_relative_eq!(function.evaluate(Vector3::new(1.0, 0.0, 0.0)), 0.0);
        assert_relative_eq!(
            function.evaluate(Vector3::new(2.0, 0.0, 0.0)),
            2.0 * (-1.0f64).exp()
        );
    }
}

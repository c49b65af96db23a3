use std::collections::HashMap;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    basis::{AtomicBasis, BasisSet, ContractedGaussian, ElectronShell, Gaussian},
    error::{Error, Result},
    periodic_table::ElementType,
};

/// A basis set in the json format of the basis set exchange
#[derive(Deserialize)]
pub struct ConfigBasisSet {
    #[serde(default)]
    name: Option<String>,
    elements: HashMap<ElementType, ConfigElectronicConfiguration>,
}

#[derive(Deserialize)]
struct ConfigElectronicConfiguration {
    electron_shells: Vec<ConfigElectronShell>,
}

#[derive(Deserialize)]
struct ConfigElectronShell {
    function_type: String,
    angular_momentum: Vec<i32>,
    exponents: Vec<String>,
    coefficients: Vec<Vec<String>>,
}

impl ConfigBasisSet {
    pub fn into_basis_set(self, name: &str) -> Result<BasisSet> {
        let mut atomic_mapping = HashMap::with_capacity(self.elements.len());

        for (element, configuration) in self.elements {
            let mut element_atomic_basis = AtomicBasis::empty();

            for electron_shell in &configuration.electron_shells {
                element_atomic_basis
                    .shells
                    .extend(electron_shell.to_shells()?);
            }

            atomic_mapping.insert(element, element_atomic_basis);
        }

        Ok(BasisSet::new(name.to_owned(), atomic_mapping))
    }
}

impl TryFrom<ConfigBasisSet> for BasisSet {
    type Error = Error;

    fn try_from(value: ConfigBasisSet) -> Result<Self, Self::Error> {
        let name = value.name.clone().unwrap_or_else(|| "custom".to_owned());
        value.into_basis_set(&name)
    }
}

impl ConfigElectronShell {
    /// A generalized contraction (e.g. an `sp` shell) shares its exponents between
    /// several angular momenta. Each of them becomes its own shell.
    fn to_shells(&self) -> Result<Vec<ElectronShell>> {
        if !self.function_type.starts_with("gto") {
            return Err(Error::UnknownBasisSet(format!(
                "unsupported function type {}",
                self.function_type
            )));
        }

        let exponents = self
            .exponents
            .iter()
            .map(|exponent| exponent.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut shells = Vec::with_capacity(self.angular_momentum.len());
        for (index, &angular_magnitude) in self.angular_momentum.iter().enumerate() {
            let coefficients = self.coefficients.get(index).ok_or_else(|| {
                Error::DimensionMismatch {
                    expected: self.angular_momentum.len(),
                    found: self.coefficients.len(),
                }
            })?;
            if coefficients.len() != exponents.len() {
                return Err(Error::DimensionMismatch {
                    expected: exponents.len(),
                    found: coefficients.len(),
                });
            }

            let mut shell = ElectronShell::new(angular_magnitude);
            for angular in generate_angular_vectors(angular_magnitude) {
                let mut primitives = SmallVec::with_capacity(exponents.len());

                for (&exponent, coefficient) in exponents.iter().zip(coefficients) {
                    let coefficient = coefficient.trim().parse::<f64>()?;
                    let norm = Gaussian::norm(exponent, angular);

                    primitives.push(Gaussian {
                        exponent,
                        coefficient: coefficient * norm,
                        angular,
                    });
                }

                shell
                    .basis_functions
                    .push(ContractedGaussian(primitives).normalized());
            }
            shells.push(shell);
        }

        Ok(shells)
    }
}

// generate all (i, j, k) such that i + j + k = angular, in descending order of i, then j
fn generate_angular_vectors(angular_magnitude: i32) -> Vec<(i32, i32, i32)> {
    let mut angular_vectors = Vec::with_capacity(8);

    for i in (0..=angular_magnitude).rev() {
        for j in (0..=angular_magnitude - i).rev() {
            angular_vectors.push((i, j, angular_magnitude - i - j));
        }
    }

    angular_vectors
}

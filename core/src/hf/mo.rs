use nalgebra::{DMatrix, Vector3};

use crate::basis::BasisFunction;

/// The molecular orbitals of a hartree fock calculation, each stored as the basis
/// functions that contribute to it
#[derive(Clone, Debug)]
pub struct MolecularOrbitals {
    orbitals: Vec<MolecularOrbital>,
}

impl MolecularOrbitals {
    /// anything less than this is considered zero
    const ZERO_CUTOFF: f64 = 1e-8;

    /// Reconstruct the molecular orbitals from a coefficient matrix with one orbital
    /// per column
    pub fn from_matrix(coefficient_matrix: &DMatrix<f64>) -> Self {
        let orbitals = coefficient_matrix
            .column_iter()
            .map(|column| {
                let (basis_functions, coefficients) = column
                    .iter()
                    .enumerate()
                    .filter(|(_, element)| element.abs() > Self::ZERO_CUTOFF)
                    .unzip();
                MolecularOrbital {
                    basis_functions,
                    coefficients,
                }
            })
            .collect();

        Self { orbitals }
    }

    pub fn len(&self) -> usize {
        self.orbitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbitals.is_empty()
    }

    /// Evaluate the n-th lowest energy orbital at a given position.
    /// `basis` must be the basis the orbitals were computed in.
    pub fn evaluate_orbital(
        &self,
        basis: &[BasisFunction],
        orbital: usize,
        position: Vector3<f64>,
    ) -> f64 {
        let MolecularOrbital {
            ref basis_functions,
            ref coefficients,
        } = self.orbitals[orbital];

        basis_functions
            .iter()
            .zip(coefficients)
            .map(|(&index, &coefficient)| coefficient * basis[index].evaluate(position))
            .sum()
    }
}

#[derive(Clone, Debug)]
struct MolecularOrbital {
    basis_functions: Vec<usize>,
    coefficients: Vec<f64>,
}

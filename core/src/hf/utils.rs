use nalgebra::{DMatrix, DVector};

use crate::{tensor::Tensor4, utils};

/// Coulomb J_ij = Σ_kl D_kl (ij|kl) and exchange K_ij = Σ_kl D_kl (ik|jl) matrices
/// of a density, contracted against chemist ordered integrals.
pub(crate) fn coulomb_exchange(
    density: &DMatrix<f64>,
    electron: &Tensor4,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = density.nrows();

    let coulomb = utils::symmetric_matrix(n, |i, j| {
        itertools::iproduct!(0..n, 0..n)
            .map(|(k, l)| density[(k, l)] * electron[(i, j, k, l)])
            .sum()
    });
    let exchange = utils::symmetric_matrix(n, |i, j| {
        itertools::iproduct!(0..n, 0..n)
            .map(|(k, l)| density[(k, l)] * electron[(i, k, j, l)])
            .sum()
    });

    (coulomb, exchange)
}

/// Solve the generalized eigenvalue problem FC = SCε through the orthogonalizing
/// transform X (XᵀSX = 1). Returns coefficients and energies in ascending order.
pub(crate) fn diagonalize_fock(
    fock: &DMatrix<f64>,
    transform: &DMatrix<f64>,
) -> (DMatrix<f64>, DVector<f64>) {
    let transformed_fock = transform.transpose() * (fock * transform);
    let (transformed_coefficients, orbital_energies) = utils::sorted_eigs(transformed_fock);
    (transform * transformed_coefficients, orbital_energies)
}

/// D_ij = Σ_k^occ C_ik C_jk
pub(crate) fn occupied_density(coefficients: &DMatrix<f64>, n_occupied: usize) -> DMatrix<f64> {
    let occupied = coefficients.columns(0, n_occupied);
    &occupied * occupied.transpose()
}

/// Initial orbitals from the extended Hückel hamiltonian
/// H_ij = K S_ij (H_ii + H_jj) / 2 built from the core hamiltonian
pub(crate) fn hückel_coefficients(
    core_hamiltonian: &DMatrix<f64>,
    overlap: &DMatrix<f64>,
    transform: &DMatrix<f64>,
) -> DMatrix<f64> {
    const WOLFSBERG_HELMHOLZ: f64 = 1.75;

    let hamiltonian_eht = utils::symmetric_matrix(overlap.nrows(), |i, j| {
        let diagonal = (core_hamiltonian[(i, i)] + core_hamiltonian[(j, j)]) / 2.0;
        if i == j {
            core_hamiltonian[(i, i)]
        } else {
            WOLFSBERG_HELMHOLZ * overlap[(i, j)] * diagonal
        }
    });

    diagonalize_fock(&hamiltonian_eht, transform).0
}

/// root mean square of all entries of a density change
pub(crate) fn rms(change: &DMatrix<f64>) -> f64 {
    (change.norm_squared() / change.len() as f64).sqrt()
}

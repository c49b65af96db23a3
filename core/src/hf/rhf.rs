use nalgebra::DMatrix;

use crate::{
    diis::Diis,
    error::{Error, Result},
    integrals::{AtomicIntegrals, DefaultIntegrator},
    system::MolecularSystem,
    transform::lowdin_orthogonalization,
};

use super::{mo::MolecularOrbitals, utils, HartreeFockConfig};

/// The output of a restricted hartree fock calculation
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RestrictedHartreeFockOutput {
    /// the orbital energies that were found in this hartree fock calculation, sorted in
    /// ascending order
    pub orbital_energies: Vec<f64>,
    /// MO coefficients, one column per molecular orbital (AO x MO), in the same order as
    /// the orbital energies
    pub coefficients: DMatrix<f64>,
    /// The AO density matrix, P = 2 C_occ C_occᵀ
    pub density: DMatrix<f64>,
    /// The electronic energy of the system
    pub electronic_energy: f64,
    /// The nuclear repulsion energy
    pub nuclear_repulsion: f64,
    /// After how many iterations did the system converge
    pub iterations: usize,
    /// number of doubly occupied orbitals
    pub n_occupied: usize,
    /// the atomic orbital integrals the calculation was run with
    pub integrals: AtomicIntegrals,
}

impl RestrictedHartreeFockOutput {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }

    pub fn orbitals(&self) -> MolecularOrbitals {
        MolecularOrbitals::from_matrix(&self.coefficients)
    }
}

pub fn restricted_hartree_fock(
    system: &MolecularSystem,
    config: &HartreeFockConfig,
) -> Result<RestrictedHartreeFockOutput> {
    let n_occupied = system.n_occupied()?;
    let n_basis = system.n_basis();
    if n_occupied > n_basis {
        return Err(Error::DimensionMismatch {
            expected: n_occupied,
            found: n_basis,
        });
    }

    let nuclear_repulsion = system.molecule().nuclear_repulsion()?;
    let integrals = AtomicIntegrals::compute(system, &DefaultIntegrator::default());
    let overlap = &integrals.overlap;
    let electron = integrals.electron.as_tensor();

    let core_hamiltonian = integrals.core_hamiltonian();
    let transform = lowdin_orthogonalization(overlap)?;

    let initial = utils::hückel_coefficients(&core_hamiltonian, overlap, &transform);
    let mut density = 2.0 * utils::occupied_density(&initial, n_occupied);

    // start of scf iteration
    let mut diis = Diis::new();
    for iteration in 0..=config.max_iterations {
        let (coulomb, exchange) = utils::coulomb_exchange(&density, electron);
        let electronic_hamiltonian = coulomb - 0.5 * exchange;
        let fock = &core_hamiltonian + &electronic_hamiltonian;

        let electronic_energy =
            0.5 * (&density * (2.0 * &core_hamiltonian + &electronic_hamiltonian)).trace();

        let error = &fock * &density * overlap - overlap * &density * &fock;
        let fock = diis.fock(error, fock);

        let (coefficients, orbital_energies) = utils::diagonalize_fock(&fock, &transform);
        let new_density = 2.0 * utils::occupied_density(&coefficients, n_occupied);

        let density_rms = utils::rms(&(&new_density - &density));
        density = new_density;

        log::info!(
            "iteration {iteration:<4} - electronic energy {electronic_energy:1.8}. density rms {density_rms:1.4e}. diis error {:1.4e}",
            diis.max_error()
        );

        if density_rms < config.epsilon {
            let (coulomb, exchange) = utils::coulomb_exchange(&density, electron);
            let electronic_hamiltonian = coulomb - 0.5 * exchange;
            let electronic_energy =
                0.5 * (&density * (2.0 * &core_hamiltonian + &electronic_hamiltonian)).trace();
            log::debug!("converged electronic energy: {electronic_energy}");

            return Ok(RestrictedHartreeFockOutput {
                orbital_energies: orbital_energies.as_slice().to_vec(),
                coefficients,
                density,
                electronic_energy,
                nuclear_repulsion,
                iterations: iteration,
                n_occupied,
                integrals,
            });
        }
    }

    Err(Error::NotConverged {
        iterations: config.max_iterations,
    })
}

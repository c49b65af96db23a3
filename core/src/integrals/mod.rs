mod electron_tensor;
mod mmd;
mod utils;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

pub use electron_tensor::ElectronTensor;
pub use mmd::McMurchieDavidson;

use crate::{atom::Atom, basis::BasisFunction, system::MolecularSystem, utils::symmetric_matrix};

pub type DefaultIntegrator = McMurchieDavidson;

pub trait Integrator: Sync {
    type Function;

    /// Calculate the overlap integral between two basis functions.
    fn overlap(&self, functions: (&Self::Function, &Self::Function)) -> f64;

    /// Calculate the kinetic energy integral between two basis functions.
    fn kinetic(&self, functions: (&Self::Function, &Self::Function)) -> f64;

    /// Calculate the nuclear attraction integral between two basis functions and the nuclei of a quantum system.
    fn nuclear(&self, functions: (&Self::Function, &Self::Function), nuclei: &[Atom]) -> f64;

    /// Calculate the electron-electron repulsion integral between four basis functions.
    fn electron_repulsion(
        &self,
        functions: (
            &Self::Function,
            &Self::Function,
            &Self::Function,
            &Self::Function,
        ),
    ) -> f64;
}

pub fn overlap_matrix(
    basis: &[BasisFunction],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let overlap_ij = integrator.overlap((&basis[i], &basis[j]));
        log::trace!("overlap ({i}{j}) = {overlap_ij}");
        overlap_ij
    })
}

pub fn kinetic_matrix(
    basis: &[BasisFunction],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let kinetic_ij = integrator.kinetic((&basis[i], &basis[j]));
        log::trace!("kinetic ({i}{j}) = {kinetic_ij}");
        kinetic_ij
    })
}

pub fn nuclear_matrix(
    basis: &[BasisFunction],
    nuclei: &[Atom],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let nuclear_ij = integrator.nuclear((&basis[i], &basis[j]), nuclei);
        log::trace!("nuclear ({i}{j}) = {nuclear_ij}");
        nuclear_ij
    })
}

/// All one- and two-electron integrals of a system in its atomic orbital basis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtomicIntegrals {
    pub overlap: DMatrix<f64>,
    pub kinetic: DMatrix<f64>,
    pub nuclear: DMatrix<f64>,
    pub electron: ElectronTensor,
}

impl AtomicIntegrals {
    pub fn compute(
        system: &MolecularSystem,
        integrator: &impl Integrator<Function = BasisFunction>,
    ) -> Self {
        let basis = system.basis();

        // TODO: screen negligible electron repulsion integrals with the Cauchy-Schwarz bound
        let overlap = overlap_matrix(basis, integrator);
        log::debug!("overlap matrix: {overlap:0.4}");
        let kinetic = kinetic_matrix(basis, integrator);
        log::debug!("kinetic matrix: {kinetic:0.4}");
        let nuclear = nuclear_matrix(basis, system.atoms(), integrator);
        log::debug!("nuclear matrix: {nuclear:0.4}");
        let electron = ElectronTensor::from_basis(basis, integrator);

        Self {
            overlap,
            kinetic,
            nuclear,
            electron,
        }
    }

    pub fn n_basis(&self) -> usize {
        self.overlap.nrows()
    }

    /// Kinetic energy plus nuclear attraction
    pub fn core_hamiltonian(&self) -> DMatrix<f64> {
        &self.kinetic + &self.nuclear
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{
        basis::BasisSet,
        molecule::{Molecule, Units},
        periodic_table::ElementType,
        system::MolecularSystem,
    };

    use super::{AtomicIntegrals, DefaultIntegrator};

    #[test]
    fn hydrogen_sto3g_szabo_ostlund() {
        // Szabo & Ostlund, table 3.5 / 3.6 (R = 1.4 bohr)
        let molecule = Molecule::from_geometry(
            &[
                (ElementType::H, [0.0, 0.0, 0.0]),
                (ElementType::H, [0.0, 0.0, 1.4]),
            ],
            Units::Bohr,
        );
        let basis_set = BasisSet::by_name("STO-3G").unwrap();
        let system = MolecularSystem::new(molecule, &basis_set).unwrap();

        let integrals = AtomicIntegrals::compute(&system, &DefaultIntegrator::default());

        assert_relative_eq!(integrals.overlap[(0, 0)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(integrals.overlap[(0, 1)], 0.6593, epsilon = 1e-4);
        assert_relative_eq!(integrals.kinetic[(0, 0)], 0.7600, epsilon = 1e-4);
        assert_relative_eq!(integrals.kinetic[(0, 1)], 0.2365, epsilon = 1e-4);

        let core = integrals.core_hamiltonian();
        assert_relative_eq!(core[(0, 0)], -1.1204, epsilon = 1e-4);
        assert_relative_eq!(core[(0, 1)], -0.9584, epsilon = 1e-4);

        let eri = &integrals.electron;
        assert_relative_eq!(eri[(0, 0, 0, 0)], 0.7746, epsilon = 1e-4);
        assert_relative_eq!(eri[(0, 0, 1, 1)], 0.5697, epsilon = 1e-4);
        assert_relative_eq!(eri[(1, 0, 0, 0)], 0.4441, epsilon = 1e-4);
        assert_relative_eq!(eri[(1, 0, 1, 0)], 0.2970, epsilon = 1e-4);
    }
}

use nalgebra::DMatrix;

use crate::{
    error::{Error, Result},
    integrals::{AtomicIntegrals, DefaultIntegrator},
    system::MolecularSystem,
    tensor::Tensor4,
    transform::lowdin_orthogonalization,
};

use super::{mo::MolecularOrbitals, utils, HartreeFockConfig};

/// The output of an unrestricted hartree fock calculation
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct UnrestrictedHartreeFockOutput {
    /// the spin up orbital energies, sorted in ascending order
    pub orbital_energies_alpha: Vec<f64>,
    /// the spin down orbital energies, sorted in ascending order
    pub orbital_energies_beta: Vec<f64>,
    pub coefficients_alpha: DMatrix<f64>,
    pub coefficients_beta: DMatrix<f64>,
    pub density_alpha: DMatrix<f64>,
    pub density_beta: DMatrix<f64>,
    /// The electronic energy of the system
    pub electronic_energy: f64,
    /// The nuclear repulsion energy
    pub nuclear_repulsion: f64,
    /// After how many iterations did the system converge
    pub iterations: usize,
    pub n_alpha: usize,
    pub n_beta: usize,
}

impl UnrestrictedHartreeFockOutput {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }

    /// The spin up molecular orbitals, in ascending order of energy
    pub fn orbitals_alpha(&self) -> MolecularOrbitals {
        MolecularOrbitals::from_matrix(&self.coefficients_alpha)
    }

    /// The spin down molecular orbitals, in ascending order of energy
    pub fn orbitals_beta(&self) -> MolecularOrbitals {
        MolecularOrbitals::from_matrix(&self.coefficients_beta)
    }
}

pub fn unrestricted_hartree_fock(
    system: &MolecularSystem,
    config: &HartreeFockConfig,
) -> Result<UnrestrictedHartreeFockOutput> {
    let n_basis = system.n_basis();
    let n_alpha = system.n_alpha()?;
    let n_beta = system.n_beta()?;
    if n_alpha > n_basis {
        return Err(Error::DimensionMismatch {
            expected: n_alpha,
            found: n_basis,
        });
    }

    let nuclear_repulsion = system.molecule().nuclear_repulsion()?;
    let integrals = AtomicIntegrals::compute(system, &DefaultIntegrator::default());
    let electron = integrals.electron.as_tensor();

    let core_hamiltonian = integrals.core_hamiltonian();
    let transform = lowdin_orthogonalization(&integrals.overlap)?;

    let (initial, _) = utils::diagonalize_fock(&core_hamiltonian, &transform);
    let mut densities = [
        utils::occupied_density(&initial, n_alpha),
        utils::occupied_density(&initial, n_beta),
    ];
    let electrons = [n_alpha, n_beta];

    // start of scf iteration
    for iteration in 0..=config.max_iterations {
        let focks = fock_matrices(&core_hamiltonian, &densities, electron);

        let solutions = [0, 1].map(|spin| utils::diagonalize_fock(&focks[spin], &transform));

        let mut density_rms = 0.0;
        for (spin, (coefficients, _)) in solutions.iter().enumerate() {
            let new_density = utils::occupied_density(coefficients, electrons[spin]);

            const F: f64 = 0.5;
            let density_change = new_density - &densities[spin];
            densities[spin] += &density_change * F;

            let self_rms = utils::rms(&density_change);
            density_rms += self_rms;

            log::info!(
                "iteration {iteration:<4} - spin {} density rms {self_rms:1.4e}",
                ["up", "down"][spin]
            );
        }

        if density_rms / 2.0 < config.epsilon {
            let focks = fock_matrices(&core_hamiltonian, &densities, electron);
            let [density_alpha, density_beta] = densities;
            let total_density = &density_alpha + &density_beta;

            let electronic_energy = 0.5
                * ((&total_density * &core_hamiltonian).trace()
                    + (&density_alpha * &focks[0]).trace()
                    + (&density_beta * &focks[1]).trace());
            log::debug!("converged electronic energy: {electronic_energy}");

            let [(coefficients_alpha, energies_alpha), (coefficients_beta, energies_beta)] =
                solutions;

            return Ok(UnrestrictedHartreeFockOutput {
                orbital_energies_alpha: energies_alpha.as_slice().to_vec(),
                orbital_energies_beta: energies_beta.as_slice().to_vec(),
                coefficients_alpha,
                coefficients_beta,
                density_alpha,
                density_beta,
                electronic_energy,
                nuclear_repulsion,
                iterations: iteration,
                n_alpha,
                n_beta,
            });
        }
    }

    Err(Error::NotConverged {
        iterations: config.max_iterations,
    })
}

/// F_σ = h + J[P_α + P_β] - K[P_σ]
fn fock_matrices(
    core_hamiltonian: &DMatrix<f64>,
    densities: &[DMatrix<f64>; 2],
    electron: &Tensor4,
) -> [DMatrix<f64>; 2] {
    let (coulomb_alpha, exchange_alpha) = utils::coulomb_exchange(&densities[0], electron);
    let (coulomb_beta, exchange_beta) = utils::coulomb_exchange(&densities[1], electron);
    let coulomb = core_hamiltonian + coulomb_alpha + coulomb_beta;

    [&coulomb - exchange_alpha, &coulomb - exchange_beta]
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use approx::assert_relative_eq;

    use crate::{
        basis::BasisSet,
        hf::{restricted_hartree_fock, HartreeFockConfig},
        molecule::{Molecule, Units},
        periodic_table::ElementType,
        system::MolecularSystem,
        testing::hydrogen,
    };

    use super::unrestricted_hartree_fock;

    #[test]
    fn hydrogen_atom_sto3g() {
        let basis_set = BasisSet::by_name("STO-3G").unwrap();
        let molecule = Molecule::from_geometry(&[(ElementType::H, [0.0; 3])], Units::Bohr)
            .with_multiplicity(NonZeroU32::new(2).unwrap());
        let system = MolecularSystem::new(molecule, &basis_set).unwrap();

        let output = unrestricted_hartree_fock(&system, &HartreeFockConfig::default()).unwrap();

        assert_eq!((output.n_alpha, output.n_beta), (1, 0));
        assert_relative_eq!(output.total_energy(), -0.466582, epsilon = 1e-6);
        assert_relative_eq!(output.density_beta.norm(), 0.0);
    }

    #[test]
    fn singlet_matches_restricted() {
        let basis_set = BasisSet::by_name("6-31G").unwrap();
        let system = MolecularSystem::new(hydrogen(1.4), &basis_set).unwrap();
        let config = HartreeFockConfig::default();

        let unrestricted = unrestricted_hartree_fock(&system, &config).unwrap();
        let restricted = restricted_hartree_fock(&system, &config).unwrap();

        assert_relative_eq!(
            unrestricted.total_energy(),
            restricted.total_energy(),
            epsilon = 1e-7
        );
        for (alpha, beta) in unrestricted
            .orbital_energies_alpha
            .iter()
            .zip(&unrestricted.orbital_energies_beta)
        {
            assert_relative_eq!(*alpha, *beta, epsilon = 1e-6);
        }
    }

    #[test]
    fn triplet_lies_above_singlet() {
        let basis_set = BasisSet::by_name("STO-3G").unwrap();
        let config = HartreeFockConfig::default();

        let singlet = MolecularSystem::new(hydrogen(1.4), &basis_set).unwrap();
        let triplet = MolecularSystem::new(
            hydrogen(1.4).with_multiplicity(NonZeroU32::new(3).unwrap()),
            &basis_set,
        )
        .unwrap();

        let singlet = unrestricted_hartree_fock(&singlet, &config).unwrap();
        let triplet = unrestricted_hartree_fock(&triplet, &config).unwrap();
        assert!(triplet.total_energy() > singlet.total_energy());
        assert_eq!((triplet.n_alpha, triplet.n_beta), (2, 0));
    }
}

//! Integrals of a converged restricted hartree fock calculation, in the atomic and
//! molecular orbital bases.
use std::{fs::File, io::BufReader, path::Path};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    basis::BasisSet,
    error::{Error, Result},
    hamiltonian::{generate_hamiltonian, MolecularHamiltonian},
    hf::{restricted_hartree_fock, HartreeFockConfig},
    molecule::Molecule,
    system::MolecularSystem,
    tensor::Tensor4,
    transform::{
        convert_ordering, general_basis_change_matrix, general_basis_change_tensor,
        lowdin_orthogonalization, IndexKind, IntegralOrdering,
    },
    utils,
};

/// Orthonormal orbital bases the integrals can be expressed in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrthonormalBasis {
    /// the canonical hartree fock orbitals
    Canonical,
    /// symmetrically orthogonalized atomic orbitals, S^{-1/2}
    Lowdin,
}

/// One- and two-body integrals in some orthonormal basis
#[derive(Clone, Debug)]
pub struct OrthonormalIntegrals {
    pub one_body: DMatrix<f64>,
    /// chemist ordered (pq|rs)
    pub two_body: Tensor4,
    /// columns are the basis orbitals expressed in atomic orbitals
    pub orbitals: DMatrix<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MolecularData {
    pub description: String,
    pub molecule: Molecule,
    pub basis: String,
    pub n_orbitals: usize,
    pub n_electrons: usize,
    pub nuclear_repulsion: f64,
    pub hf_energy: f64,
    pub orbital_energies: Vec<f64>,
    /// AO x MO coefficients of the canonical orbitals
    pub canonical_orbitals: DMatrix<f64>,
    pub overlap: DMatrix<f64>,
    /// kinetic plus nuclear attraction integrals over atomic orbitals
    pub one_body_ao: DMatrix<f64>,
    /// chemist ordered electron repulsion integrals over atomic orbitals
    pub two_body_ao: Tensor4,
}

impl MolecularData {
    /// Run a restricted hartree fock calculation and collect its integrals.
    /// Only closed shell molecules are supported.
    pub fn compute(
        molecule: Molecule,
        basis_set: &BasisSet,
        config: &HartreeFockConfig,
    ) -> Result<Self> {
        if !molecule.is_closed_shell() {
            return Err(Error::OpenShell);
        }

        let system = MolecularSystem::new(molecule, basis_set)?;
        let output = restricted_hartree_fock(&system, config)?;
        log::info!(
            "hartree fock energy {:1.10} after {} iterations",
            output.total_energy(),
            output.iterations
        );

        let molecule = system.molecule().clone();
        let description = match molecule.description.as_str() {
            "" => format!("{} atoms", molecule.atoms.len()),
            description => description.to_owned(),
        };

        Ok(Self {
            description,
            basis: system.basis_name().to_owned(),
            n_orbitals: system.n_basis(),
            n_electrons: system.n_electrons()?,
            nuclear_repulsion: output.nuclear_repulsion,
            hf_energy: output.total_energy(),
            one_body_ao: output.integrals.core_hamiltonian(),
            orbital_energies: output.orbital_energies,
            canonical_orbitals: output.coefficients,
            overlap: output.integrals.overlap,
            two_body_ao: output.integrals.electron.into_tensor(),
            molecule,
        })
    }

    pub fn n_occupied(&self) -> usize {
        self.n_electrons / 2
    }

    /// One-body integrals over the canonical orbitals, Cᵀ h C
    pub fn one_body_integrals(&self) -> Result<DMatrix<f64>> {
        general_basis_change_matrix(
            &self.one_body_ao,
            &self.canonical_orbitals,
            [IndexKind::Covariant; 2],
        )
    }

    /// Two-body integrals over the canonical orbitals in the requested ordering
    pub fn two_body_integrals(&self, ordering: IntegralOrdering) -> Result<Tensor4> {
        let chemist = general_basis_change_tensor(
            &self.two_body_ao,
            &self.canonical_orbitals,
            [IndexKind::Covariant; 4],
        )?;
        Ok(convert_ordering(
            &chemist,
            IntegralOrdering::Chemist,
            ordering,
        ))
    }

    /// C⁻¹ = CᵀS, which maps molecular orbital integrals back onto atomic orbitals
    fn inverse_orbitals(&self) -> DMatrix<f64> {
        self.canonical_orbitals.transpose() * &self.overlap
    }

    /// Transform one-body integrals over canonical orbitals back to atomic orbitals
    pub fn ao_from_mo_one_body(&self, one_body_mo: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        general_basis_change_matrix(
            one_body_mo,
            &self.inverse_orbitals(),
            [IndexKind::Covariant; 2],
        )
    }

    /// Transform chemist ordered two-body integrals over canonical orbitals back to
    /// atomic orbitals
    pub fn ao_from_mo_two_body(&self, two_body_mo: &Tensor4) -> Result<Tensor4> {
        general_basis_change_tensor(
            two_body_mo,
            &self.inverse_orbitals(),
            [IndexKind::Covariant; 4],
        )
    }

    /// Integrals in an orthonormal basis. Two-body integrals are chemist ordered.
    pub fn orthonormal_integrals(&self, basis: OrthonormalBasis) -> Result<OrthonormalIntegrals> {
        let orbitals = match basis {
            OrthonormalBasis::Canonical => self.canonical_orbitals.clone(),
            OrthonormalBasis::Lowdin => lowdin_orthogonalization(&self.overlap)?,
        };

        Ok(OrthonormalIntegrals {
            one_body: general_basis_change_matrix(
                &self.one_body_ao,
                &orbitals,
                [IndexKind::Covariant; 2],
            )?,
            two_body: general_basis_change_tensor(
                &self.two_body_ao,
                &orbitals,
                [IndexKind::Covariant; 4],
            )?,
            orbitals,
        })
    }

    /// Transform the integrals to the canonical orbital basis and back, and verify that
    /// the atomic orbital integrals are recovered. Returns the largest deviation.
    pub fn check_basis_roundtrip(&self, tolerance: f64) -> Result<f64> {
        let one_body = self.ao_from_mo_one_body(&self.one_body_integrals()?)?;
        let two_body =
            self.ao_from_mo_two_body(&self.two_body_integrals(IntegralOrdering::Chemist)?)?;

        let max_deviation = utils::max_abs_diff(&one_body, &self.one_body_ao)
            .max(two_body.max_abs_diff(&self.two_body_ao));
        log::debug!("basis round trip deviation: {max_deviation:e}");

        if max_deviation > tolerance {
            return Err(Error::TransformMismatch { max_deviation });
        }
        Ok(max_deviation)
    }

    /// The spin orbital hamiltonian over the canonical orbitals, with the nuclear
    /// repulsion as constant
    pub fn hamiltonian(&self) -> Result<MolecularHamiltonian> {
        generate_hamiltonian(
            &self.one_body_integrals()?,
            &self.two_body_integrals(IntegralOrdering::Operator)?,
            self.nuclear_repulsion,
        )
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(serde_json::to_writer(
            File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?,
            self,
        )?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

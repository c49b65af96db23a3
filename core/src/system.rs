use crate::{
    atom::Atom,
    basis::{BasisFunction, BasisSet},
    error::{Error, Result},
    molecule::Molecule,
};

/// A molecule together with the basis functions placed on its atoms
#[derive(Clone, Debug)]
pub struct MolecularSystem {
    molecule: Molecule,
    basis: Vec<BasisFunction>,
    basis_name: String,
}

impl MolecularSystem {
    pub fn new(molecule: Molecule, basis_set: &BasisSet) -> Result<Self> {
        let basis = basis_set.basis_for(&molecule)?;
        // validates charge and multiplicity up front
        molecule.n_alpha()?;

        Ok(Self {
            molecule,
            basis,
            basis_name: basis_set.name().to_owned(),
        })
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub fn atoms(&self) -> &[Atom] {
        self.molecule.atoms()
    }

    pub fn basis(&self) -> &[BasisFunction] {
        &self.basis
    }

    pub fn basis_name(&self) -> &str {
        &self.basis_name
    }

    pub fn n_basis(&self) -> usize {
        self.basis.len()
    }

    pub fn n_electrons(&self) -> Result<usize> {
        self.molecule.n_electrons()
    }

    pub fn n_alpha(&self) -> Result<usize> {
        self.molecule.n_alpha()
    }

    pub fn n_beta(&self) -> Result<usize> {
        self.molecule.n_beta()
    }

    /// Number of doubly occupied orbitals of a closed shell system
    pub fn n_occupied(&self) -> Result<usize> {
        if !self.molecule.is_closed_shell() {
            return Err(Error::OpenShell);
        }
        Ok(self.n_electrons()? / 2)
    }
}

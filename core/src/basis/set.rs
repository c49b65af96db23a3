use std::collections::HashMap;

use crate::{
    atom::Atom,
    error::{Error, Result},
    molecule::Molecule,
    periodic_table::ElementType,
};

use super::{BasisFunction, ContractedGaussian};

#[derive(Debug, Clone)]
pub struct BasisSet {
    name: String,
    atomic_mapping: HashMap<ElementType, AtomicBasis>,
}

impl BasisSet {
    /// Create a new basis set given mappings from element type to the basis of that element
    pub(crate) fn new(name: String, atomic_mapping: HashMap<ElementType, AtomicBasis>) -> Self {
        Self {
            name,
            atomic_mapping,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the basis of a given atom, if it exists.
    pub fn for_atom(&self, atom: &Atom) -> Option<&AtomicBasis> {
        self.atomic_mapping.get(&atom.element_type)
    }

    /// Places the atomic basis of every atom of the molecule on its nucleus
    pub fn basis_for(&self, molecule: &Molecule) -> Result<Vec<BasisFunction>> {
        let mut basis = Vec::new();

        for atom in molecule.atoms() {
            let atomic_basis = self.for_atom(atom).ok_or(Error::MissingBasis {
                element: atom.element_type,
            })?;

            basis.extend(atomic_basis.basis_for(atom));
        }

        Ok(basis)
    }
}

/// Represents the basis functions for a single atom.
#[derive(Debug, Clone)]
pub struct AtomicBasis {
    pub(crate) shells: Vec<ElectronShell>,
}

impl AtomicBasis {
    pub(crate) fn empty() -> Self {
        Self { shells: Vec::new() }
    }

    pub fn basis_functions(&self) -> impl Iterator<Item = &ContractedGaussian> {
        self.shells.iter().flat_map(|shell| &shell.basis_functions)
    }

    pub fn shells(&self) -> &[ElectronShell] {
        &self.shells
    }

    pub fn basis_for<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = BasisFunction> + 'a {
        self.basis_functions()
            .map(move |contracted_gaussian| BasisFunction {
                contracted_gaussian: contracted_gaussian.clone(),
                position: atom.position,
            })
    }
}

#[derive(Debug, Clone)]
pub struct ElectronShell {
    pub(crate) angular_magnitude: i32,
    pub(crate) basis_functions: Vec<ContractedGaussian>,
}

impl ElectronShell {
    pub(crate) fn new(angular_magnitude: i32) -> Self {
        Self {
            angular_magnitude,
            basis_functions: Vec::new(),
        }
    }

    pub fn angular_magnitude(&self) -> i32 {
        self.angular_magnitude
    }
}

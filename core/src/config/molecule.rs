use std::num::NonZeroU32;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::{
    atom::Atom,
    error::Error,
    molecule::{Molecule, Units},
    periodic_table::ElementType,
};

/// Represents a full molecule in a config file.
///
/// Either a bare list of positioned atoms (in bohr), or an object that additionally
/// carries the units, charge and spin multiplicity.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ConfigMolecule {
    Atoms(Vec<ConfigAtom>),
    Full {
        atoms: Vec<ConfigAtom>,
        #[serde(default)]
        units: Units,
        #[serde(default)]
        charge: i32,
        #[serde(default = "singlet")]
        multiplicity: u32,
        #[serde(default)]
        description: String,
    },
}

fn singlet() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct ConfigAtom {
    element: ElementType,
    position: Vec<f64>,
}

impl TryFrom<ConfigMolecule> for Molecule {
    type Error = Error;

    fn try_from(value: ConfigMolecule) -> Result<Self, Self::Error> {
        let (config_atoms, units, charge, multiplicity, description) = match value {
            ConfigMolecule::Atoms(atoms) => (atoms, Units::Bohr, 0, 1, String::new()),
            ConfigMolecule::Full {
                atoms,
                units,
                charge,
                multiplicity,
                description,
            } => (atoms, units, charge, multiplicity, description),
        };

        let multiplicity = NonZeroU32::new(multiplicity).ok_or_else(|| {
            Error::InvalidGeometry("spin multiplicity must be at least 1".to_owned())
        })?;

        let mut atoms = Vec::with_capacity(config_atoms.len());
        for atom in config_atoms {
            let &[x, y, z] = atom.position.as_slice() else {
                return Err(Error::InvalidGeometry(format!(
                    "{} atom has {} coordinates instead of 3",
                    atom.element,
                    atom.position.len()
                )));
            };

            atoms.push(Atom::new(
                atom.element,
                Vector3::new(x, y, z) * units.to_bohr(),
            ));
        }

        Ok(Molecule {
            atoms,
            charge,
            multiplicity,
            description,
        })
    }
}

use std::num::NonZeroU32;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    atom::Atom,
    error::{Error, Result},
    periodic_table::ElementType,
};

/// Conversion factor from Ångström to bohr (atomic units of length)
pub const BOHR_PER_ANGSTROM: f64 = 1.889_726_124_626;

/// The unit the coordinates of a geometry are given in
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Bohr,
    Angstrom,
}

impl Units {
    /// factor that converts a length in these units into bohr
    pub fn to_bohr(self) -> f64 {
        match self {
            Units::Bohr => 1.0,
            Units::Angstrom => BOHR_PER_ANGSTROM,
        }
    }
}

/// A molecule: positioned nuclei plus the total charge and spin state of its electrons
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub charge: i32,
    pub multiplicity: NonZeroU32,
    pub description: String,
}

impl Molecule {
    /// A neutral singlet molecule with the given atoms
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            charge: 0,
            multiplicity: NonZeroU32::MIN,
            description: String::new(),
        }
    }

    /// Build a molecule from `(element, [x, y, z])` pairs
    pub fn from_geometry(geometry: &[(ElementType, [f64; 3])], units: Units) -> Self {
        let scale = units.to_bohr();
        Self::new(
            geometry
                .iter()
                .map(|&(element, [x, y, z])| Atom::new(element, Vector3::new(x, y, z) * scale))
                .collect(),
        )
    }

    pub fn with_charge(self, charge: i32) -> Self {
        Self { charge, ..self }
    }

    pub fn with_multiplicity(self, multiplicity: NonZeroU32) -> Self {
        Self {
            multiplicity,
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns the number of total electrons in the system
    pub fn n_electrons(&self) -> Result<usize> {
        let nuclear_charge = self
            .atoms
            .iter()
            .map(|atom| atom.nuclear_charge() as i64)
            .sum::<i64>();
        let electrons = nuclear_charge - self.charge as i64;

        usize::try_from(electrons).map_err(|_| Error::InvalidElectronCount {
            electrons,
            multiplicity: self.multiplicity.get(),
        })
    }

    /// Returns the number of electrons in the alpha (by convention, spin up) state
    pub fn n_alpha(&self) -> Result<usize> {
        let (n_electrons, unpaired) = self.checked_spin_state()?;
        Ok((n_electrons + unpaired) / 2)
    }

    /// Returns the number of electrons in the beta (by convention, spin down) state
    pub fn n_beta(&self) -> Result<usize> {
        let (n_electrons, unpaired) = self.checked_spin_state()?;
        Ok((n_electrons - unpaired) / 2)
    }

    pub fn is_closed_shell(&self) -> bool {
        self.multiplicity.get() == 1
    }

    fn checked_spin_state(&self) -> Result<(usize, usize)> {
        let n_electrons = self.n_electrons()?;
        let unpaired = self.multiplicity.get() as usize - 1;

        if unpaired > n_electrons || (n_electrons - unpaired) % 2 != 0 {
            return Err(Error::InvalidElectronCount {
                electrons: n_electrons as i64,
                multiplicity: self.multiplicity.get(),
            });
        }
        Ok((n_electrons, unpaired))
    }

    /// Classical repulsion energy between the nuclei
    pub fn nuclear_repulsion(&self) -> Result<f64> {
        let mut potential = 0.0;
        for (index, atom_a) in self.atoms.iter().enumerate() {
            for atom_b in &self.atoms[index + 1..] {
                let distance = (atom_b.position - atom_a.position).norm();
                if distance < 1e-8 {
                    return Err(Error::InvalidGeometry(format!(
                        "nuclei {} and {} coincide",
                        atom_a.element_type, atom_b.element_type
                    )));
                }
                potential += (atom_a.nuclear_charge() * atom_b.nuclear_charge()) as f64 / distance;
            }
        }
        log::debug!("nuclear repulsion energy: {potential}");
        Ok(potential)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use approx::assert_relative_eq;

    use super::{Molecule, Units, BOHR_PER_ANGSTROM};
    use crate::periodic_table::ElementType;

    #[test]
    fn angstrom_geometry_is_converted() {
        let molecule = Molecule::from_geometry(
            &[
                (ElementType::H, [0.0, 0.0, 0.0]),
                (ElementType::H, [0.0, 0.0, 0.7414]),
            ],
            Units::Angstrom,
        );
        assert_relative_eq!(molecule.atoms[1].position.z, 0.7414 * BOHR_PER_ANGSTROM);
        assert_relative_eq!(
            molecule.nuclear_repulsion().unwrap(),
            1.0 / (0.7414 * BOHR_PER_ANGSTROM)
        );
    }

    #[test]
    fn electron_counts() {
        let water = Molecule::from_geometry(
            &[
                (ElementType::O, [0.0, 0.0, 0.0]),
                (ElementType::H, [0.0, 1.4, 1.1]),
                (ElementType::H, [0.0, -1.4, 1.1]),
            ],
            Units::Bohr,
        );
        assert_eq!(water.n_electrons().unwrap(), 10);
        assert_eq!(water.n_alpha().unwrap(), 5);
        assert_eq!(water.n_beta().unwrap(), 5);

        let cation = water
            .clone()
            .with_charge(1)
            .with_multiplicity(NonZeroU32::new(2).unwrap());
        assert_eq!(cation.n_alpha().unwrap(), 5);
        assert_eq!(cation.n_beta().unwrap(), 4);

        // 10 electrons can't form a doublet
        let invalid = water.with_multiplicity(NonZeroU32::new(2).unwrap());
        assert!(invalid.n_alpha().is_err());
    }

    #[test]
    fn coincident_nuclei_are_rejected() {
        let molecule = Molecule::from_geometry(
            &[
                (ElementType::H, [0.0, 0.0, 0.0]),
                (ElementType::H, [0.0, 0.0, 0.0]),
            ],
            Units::Bohr,
        );
        assert!(molecule.nuclear_repulsion().is_err());
    }
}

mod basis_set;
mod molecule;

use std::{fs::File, io::BufReader, path::Path};

pub use basis_set::ConfigBasisSet;
pub use molecule::ConfigMolecule;

use crate::{basis::BasisSet, error::Result, molecule::Molecule};

/// Read a molecule from a json file
pub fn load_molecule(path: impl AsRef<Path>) -> Result<Molecule> {
    let config: ConfigMolecule = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    config.try_into()
}

/// Resolve a basis set either by the name of a built-in basis set or as a path to a
/// basis set exchange json file.
pub fn load_basis_set(name_or_path: &str) -> Result<BasisSet> {
    match BasisSet::by_name(name_or_path) {
        Ok(basis_set) => Ok(basis_set),
        Err(_) if Path::new(name_or_path).is_file() => {
            let config: ConfigBasisSet =
                serde_json::from_reader(BufReader::new(File::open(name_or_path)?))?;
            config.try_into()
        }
        Err(err) => Err(err),
    }
}

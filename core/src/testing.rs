//! Reference molecules shared by tests and benchmarks.
use crate::{
    molecule::{Molecule, Units},
    periodic_table::ElementType,
};

/// Water at the geometry of Crawford's programming projects (bohr)
pub fn water() -> Molecule {
    Molecule::from_geometry(
        &[
            (ElementType::O, [0.0, -0.143225816552, 0.0]),
            (ElementType::H, [1.638036840407, 1.136548822547, 0.0]),
            (ElementType::H, [-1.638036840407, 1.136548822547, 0.0]),
        ],
        Units::Bohr,
    )
    .with_description("water")
}

/// H2 along the z axis with the given bond length in bohr
pub fn hydrogen(distance: f64) -> Molecule {
    Molecule::from_geometry(
        &[
            (ElementType::H, [0.0, 0.0, 0.0]),
            (ElementType::H, [0.0, 0.0, distance]),
        ],
        Units::Bohr,
    )
    .with_description(format!("H2 at {distance} bohr"))
}

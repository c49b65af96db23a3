use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::periodic_table::ElementType;

/// Represents an atom in a molecule.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element_type: ElementType,
    /// position of the nucleus, in bohr
    pub position: Vector3<f64>,
}

impl Atom {
    pub fn new(element_type: ElementType, position: Vector3<f64>) -> Self {
        Self {
            element_type,
            position,
        }
    }

    /// Returns the charge of this nucleus
    pub fn nuclear_charge(&self) -> i32 {
        self.element_type.atomic_number() as i32
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }
}

use std::fmt;

use crate::periodic_table::ElementType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while setting up or running a calculation.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// a number in a basis set file could not be parsed
    Parse(std::num::ParseFloatError),
    UnknownElement(String),
    UnknownBasisSet(String),
    /// the basis set has no entry for an element of the molecule
    MissingBasis {
        element: ElementType,
    },
    InvalidGeometry(String),
    /// the charge and multiplicity don't fit the number of electrons
    InvalidElectronCount {
        electrons: i64,
        multiplicity: u32,
    },
    NotConverged {
        iterations: usize,
    },
    SingularMatrix,
    DimensionMismatch {
        expected: usize,
        found: usize,
    },
    TransformMismatch {
        max_deviation: f64,
    },
    /// a closed shell system was required
    OpenShell,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "malformed json: {err}"),
            Error::Parse(err) => write!(f, "malformed number: {err}"),
            Error::UnknownElement(name) => write!(f, "unknown element {name:?}"),
            Error::UnknownBasisSet(name) => write!(f, "unknown basis set {name:?}"),
            Error::MissingBasis { element } => {
                write!(f, "basis set has no functions for element {element}")
            }
            Error::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
            Error::InvalidElectronCount {
                electrons,
                multiplicity,
            } => write!(
                f,
                "{electrons} electrons are incompatible with spin multiplicity {multiplicity}"
            ),
            Error::NotConverged { iterations } => {
                write!(f, "did not converge after {iterations} iterations")
            }
            Error::SingularMatrix => write!(f, "matrix is singular"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::TransformMismatch { max_deviation } => write!(
                f,
                "back-transformed integrals deviate by up to {max_deviation:e}"
            ),
            Error::OpenShell => write!(f, "operation requires a closed shell system"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Json(value)
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(value: std::num::ParseFloatError) -> Self {
        Error::Parse(value)
    }
}

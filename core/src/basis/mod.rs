mod functions;
mod library;
mod set;

pub use functions::{BasisFunction, ContractedGaussian, Gaussian};
pub use set::{AtomicBasis, BasisSet, ElectronShell};

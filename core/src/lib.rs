pub mod atom;
pub mod basis;
pub mod config;
mod diis;
pub mod error;
pub mod hamiltonian;
pub mod hf;
pub mod integrals;
pub mod molecular_data;
pub mod molecule;
pub mod objective;
pub mod optim;
pub mod periodic_table;
pub mod system;
pub mod tensor;
pub mod testing;
pub mod transform;
mod utils;

pub use error::{Error, Result};

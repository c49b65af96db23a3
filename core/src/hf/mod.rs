mod mo;
mod rhf;
mod uhf;
pub(crate) mod utils;

pub use mo::MolecularOrbitals;
pub use rhf::{restricted_hartree_fock, RestrictedHartreeFockOutput};
pub use uhf::{unrestricted_hartree_fock, UnrestrictedHartreeFockOutput};

/// Settings of the self consistent field iterations
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HartreeFockConfig {
    /// the maximum number of iterations to try
    pub max_iterations: usize,
    /// if the density matrix rms changes by less than this, the system is considered
    /// converged
    pub epsilon: f64,
}

impl Default for HartreeFockConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            epsilon: 1e-8,
        }
    }
}

//! Second quantized electronic hamiltonian over spin orbitals.
use itertools::iproduct;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    tensor::Tensor4,
};

/// Coefficients smaller than this are set to zero
pub const EQ_TOLERANCE: f64 = 1e-8;

/// H = constant + Σ one_body[p,q] a†_p a_q + Σ two_body[p,q,r,s] a†_p a†_q a_r a_s
///
/// Spin orbitals are interleaved: spatial orbital `i` maps to `2i` (alpha) and
/// `2i + 1` (beta).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MolecularHamiltonian {
    pub constant: f64,
    pub one_body: DMatrix<f64>,
    pub two_body: Tensor4,
}

/// Build the spin orbital hamiltonian from spatial integrals. `two_body` must be in
/// operator order, V_pqrs = (ps|qr) (see [`crate::transform::IntegralOrdering::Operator`]).
pub fn generate_hamiltonian(
    one_body: &DMatrix<f64>,
    two_body: &Tensor4,
    constant: f64,
) -> Result<MolecularHamiltonian> {
    let n = one_body.nrows();
    if !one_body.is_square() {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: one_body.ncols(),
        });
    }
    if let Some(&found) = two_body.dims().iter().find(|&&dim| dim != n) {
        return Err(Error::DimensionMismatch { expected: n, found });
    }

    let n_spin_orbitals = 2 * n;
    let mut spin_one_body = DMatrix::zeros(n_spin_orbitals, n_spin_orbitals);
    let mut spin_two_body = Tensor4::zeros([n_spin_orbitals; 4]);

    for (p, q) in iproduct!(0..n, 0..n) {
        for spin in 0..2 {
            spin_one_body[(2 * p + spin, 2 * q + spin)] = one_body[(p, q)];
        }
    }

    for (p, q, r, s) in iproduct!(0..n, 0..n, 0..n, 0..n) {
        let coefficient = two_body[(p, q, r, s)] / 2.0;
        // electron one keeps spin σ (p, s), electron two keeps spin τ (q, r)
        for (sigma, tau) in iproduct!(0..2, 0..2) {
            spin_two_body[(2 * p + sigma, 2 * q + tau, 2 * r + tau, 2 * s + sigma)] =
                coefficient;
        }
    }

    spin_one_body.apply(truncate);
    for (p, q, r, s) in iproduct!(
        0..n_spin_orbitals,
        0..n_spin_orbitals,
        0..n_spin_orbitals,
        0..n_spin_orbitals
    ) {
        truncate(&mut spin_two_body[(p, q, r, s)]);
    }

    Ok(MolecularHamiltonian {
        constant,
        one_body: spin_one_body,
        two_body: spin_two_body,
    })
}

fn truncate(x: &mut f64) {
    if x.abs() < EQ_TOLERANCE {
        *x = 0.0;
    }
}

impl MolecularHamiltonian {
    pub fn n_spin_orbitals(&self) -> usize {
        self.one_body.nrows()
    }

    /// Expectation value of the hamiltonian for the determinant that occupies the
    /// `n_electrons` lowest spin orbitals
    pub fn hartree_fock_energy(&self, n_electrons: usize) -> Result<f64> {
        if n_electrons > self.n_spin_orbitals() {
            return Err(Error::DimensionMismatch {
                expected: self.n_spin_orbitals(),
                found: n_electrons,
            });
        }

        let one_body = (0..n_electrons)
            .map(|p| self.one_body[(p, p)])
            .sum::<f64>();
        let two_body = iproduct!(0..n_electrons, 0..n_electrons)
            .map(|(p, q)| self.two_body[(p, q, q, p)] - self.two_body[(p, q, p, q)])
            .sum::<f64>();

        Ok(self.constant + one_body + two_body)
    }
}

//! Restricted hartree fock energy as a function of orbital rotation parameters.
//!
//! Starting from a set of orthonormal orbitals, the occupied orbitals are the first
//! `n_occupied` columns of U = exp(κ), where κ is antisymmetric and only couples
//! occupied with virtual orbitals. The independent entries of κ are the parameters.
use nalgebra::{DMatrix, DVector};

use crate::{
    error::{Error, Result},
    hf::utils::coulomb_exchange,
    molecular_data::{MolecularData, OrthonormalBasis},
    optim::Objective,
    tensor::Tensor4,
};

/// Antisymmetric generator κ from rotation parameters. Parameters are ordered with the
/// virtual index outer: `params[(v - n_occupied) * n_occupied + o]` is κ[v, o] = -κ[o, v].
pub fn rhf_params_to_matrix(
    params: &[f64],
    n_orbitals: usize,
    n_occupied: usize,
) -> Result<DMatrix<f64>> {
    let n_virtual = n_orbitals.checked_sub(n_occupied).ok_or(Error::DimensionMismatch {
        expected: n_orbitals,
        found: n_occupied,
    })?;
    if params.len() != n_virtual * n_occupied {
        return Err(Error::DimensionMismatch {
            expected: n_virtual * n_occupied,
            found: params.len(),
        });
    }

    let mut kappa = DMatrix::zeros(n_orbitals, n_orbitals);
    for (index, &param) in params.iter().enumerate() {
        let (virtual_, occupied) = (n_occupied + index / n_occupied, index % n_occupied);
        kappa[(virtual_, occupied)] = param;
        kappa[(occupied, virtual_)] = -param;
    }
    Ok(kappa)
}

#[derive(Clone, Debug)]
pub struct RestrictedHartreeFockObjective {
    one_body: DMatrix<f64>,
    /// chemist ordered (pq|rs)
    two_body: Tensor4,
    constant: f64,
    n_orbitals: usize,
    n_occupied: usize,
}

impl RestrictedHartreeFockObjective {
    /// `one_body` and `two_body` (chemist ordered) must be expressed in an orthonormal
    /// basis. `n_electrons` must be even.
    pub fn new(
        one_body: DMatrix<f64>,
        two_body: Tensor4,
        constant: f64,
        n_electrons: usize,
    ) -> Result<Self> {
        let n_orbitals = one_body.nrows();
        if !one_body.is_square() {
            return Err(Error::DimensionMismatch {
                expected: n_orbitals,
                found: one_body.ncols(),
            });
        }
        if let Some(&found) = two_body.dims().iter().find(|&&dim| dim != n_orbitals) {
            return Err(Error::DimensionMismatch {
                expected: n_orbitals,
                found,
            });
        }
        if n_electrons % 2 != 0 {
            return Err(Error::OpenShell);
        }
        let n_occupied = n_electrons / 2;
        if n_occupied > n_orbitals {
            return Err(Error::DimensionMismatch {
                expected: n_orbitals,
                found: n_occupied,
            });
        }

        Ok(Self {
            one_body,
            two_body,
            constant,
            n_orbitals,
            n_occupied,
        })
    }

    /// The objective over an orthonormal basis of `data`, with the nuclear repulsion as
    /// constant. Also returns the basis orbitals (AO x orbital) the parameters rotate.
    pub fn from_molecular_data(
        data: &MolecularData,
        basis: OrthonormalBasis,
    ) -> Result<(Self, DMatrix<f64>)> {
        let integrals = data.orthonormal_integrals(basis)?;
        let objective = Self::new(
            integrals.one_body,
            integrals.two_body,
            data.nuclear_repulsion,
            data.n_electrons,
        )?;
        Ok((objective, integrals.orbitals))
    }

    pub fn n_orbitals(&self) -> usize {
        self.n_orbitals
    }

    pub fn n_occupied(&self) -> usize {
        self.n_occupied
    }

    pub fn n_parameters(&self) -> usize {
        self.n_occupied * (self.n_orbitals - self.n_occupied)
    }

    /// U = exp(κ(params)); the columns are the rotated orbitals in the current basis
    pub fn rotated_orbitals(&self, params: &[f64]) -> Result<DMatrix<f64>> {
        Ok(rhf_params_to_matrix(params, self.n_orbitals, self.n_occupied)?.exp())
    }

    /// D = U_occ U_occᵀ, the density of one spin
    pub fn density(&self, rotation: &DMatrix<f64>) -> DMatrix<f64> {
        let occupied = rotation.columns(0, self.n_occupied);
        &occupied * occupied.transpose()
    }

    /// F = h + Σ_rs D_rs [2(pq|rs) - (pr|qs)]
    pub fn fock(&self, density: &DMatrix<f64>) -> DMatrix<f64> {
        let (coulomb, exchange) = coulomb_exchange(density, &self.two_body);
        &self.one_body + 2.0 * coulomb - exchange
    }

    fn energy_of_density(&self, density: &DMatrix<f64>, fock: &DMatrix<f64>) -> f64 {
        self.constant + (density * (&self.one_body + fock)).trace()
    }

    /// E = c + 2 tr(hD) + Σ D_pq D_rs [2(pq|rs) - (pr|qs)]
    pub fn energy(&self, params: &[f64]) -> Result<f64> {
        let density = self.density(&self.rotated_orbitals(params)?);
        Ok(self.energy_of_density(&density, &self.fock(&density)))
    }

    /// Exact gradient of [`Self::energy`] with respect to the parameters
    pub fn gradient(&self, params: &[f64]) -> Result<DVector<f64>> {
        let kappa = rhf_params_to_matrix(params, self.n_orbitals, self.n_occupied)?;
        let rotation = kappa.clone().exp();
        let density = self.density(&rotation);
        let fock = self.fock(&density);

        // dE/dU, nonzero only in the occupied columns
        let n = self.n_orbitals;
        let mut energy_derivative = DMatrix::zeros(n, n);
        energy_derivative
            .columns_mut(0, self.n_occupied)
            .copy_from(&(4.0 * &fock * rotation.columns(0, self.n_occupied)));

        // adjoint of the Fréchet derivative of exp at κ, applied to dE/dU
        let kappa_t = kappa.transpose();
        let mut block = DMatrix::zeros(2 * n, 2 * n);
        block.view_mut((0, 0), (n, n)).copy_from(&kappa_t);
        block.view_mut((n, n), (n, n)).copy_from(&kappa_t);
        block.view_mut((0, n), (n, n)).copy_from(&energy_derivative);
        let derivative = block.exp().view((0, n), (n, n)).into_owned();

        Ok(DVector::from_iterator(
            params.len(),
            (0..params.len()).map(|index| {
                let (virtual_, occupied) =
                    (self.n_occupied + index / self.n_occupied, index % self.n_occupied);
                derivative[(virtual_, occupied)] - derivative[(occupied, virtual_)]
            }),
        ))
    }
}

impl Objective for RestrictedHartreeFockObjective {
    fn dimension(&self) -> usize {
        self.n_parameters()
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        self.energy(x.as_slice())
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        RestrictedHartreeFockObjective::gradient(self, x.as_slice())
    }
}

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{basis::BasisFunction, tensor::Tensor4};

use super::Integrator;

/// An integral index used in the two-electron integrals of a basis set.
///
/// The index represents the four indices (i, j, k, l) used to calculate a two-electron
/// integral in chemists' notation: (ij|kl).
///
/// Two-electron integrals over real functions are symmetric under i <-> j, k <-> l and
/// (ij) <-> (kl), so the canonical index has i >= j, k >= l and ij >= kl.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct IntegralIndex(usize, usize, usize, usize);

impl IntegralIndex {
    /// Creates a new integral index with the given indices.
    #[cfg(test)]
    pub(crate) const fn new(index: (usize, usize, usize, usize)) -> Self {
        let (i, j, k, l) = Self::correct_order(index);
        Self(i, j, k, l)
    }

    /// Returns the indices with the correct order
    #[cfg(test)]
    const fn correct_order(
        (i, j, k, l): (usize, usize, usize, usize),
    ) -> (usize, usize, usize, usize) {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        let (k, l) = if k >= l { (k, l) } else { (l, k) };

        if pair_index(i, j) >= pair_index(k, l) {
            (i, j, k, l)
        } else {
            (k, l, i, j)
        }
    }

    /// all eight index permutations that share the value of this integral
    fn symmetric_images(self) -> [(usize, usize, usize, usize); 8] {
        let Self(i, j, k, l) = self;
        [
            (i, j, k, l),
            (j, i, k, l),
            (i, j, l, k),
            (j, i, l, k),
            (k, l, i, j),
            (l, k, i, j),
            (k, l, j, i),
            (l, k, j, i),
        ]
    }
}

#[inline(always)]
const fn pair_index(i: usize, j: usize) -> usize {
    i * (i + 1) / 2 + j
}

impl std::fmt::Display for IntegralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let &Self(i, j, k, l) = self;
        write!(f, "({} {}|{} {})", i, j, k, l)
    }
}

/// An electron tensor representing electron-electron repulsion integrals between
/// four contracted Gaussian functions in a given basis set, in chemists' notation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectronTensor {
    data: Tensor4,
}

impl ElectronTensor {
    /// Constructs an `ElectronTensor` from the given basis set. Only the symmetry-unique
    /// integrals are evaluated; with the `rayon` feature enabled, they are evaluated in
    /// parallel.
    pub fn from_basis(
        basis: &[BasisFunction],
        integrator: &impl Integrator<Function = BasisFunction>,
    ) -> Self {
        let n_basis = basis.len();

        let mut to_compute = Vec::with_capacity(n_basis.pow(4) / 8 + n_basis.pow(2));
        for i in 0..n_basis {
            for j in 0..=i {
                for k in 0..=i {
                    for l in 0..=k {
                        if pair_index(i, j) >= pair_index(k, l) {
                            to_compute.push(IntegralIndex(i, j, k, l));
                        }
                    }
                }
            }
        }

        let evaluate = |index @ IntegralIndex(i, j, k, l): IntegralIndex| {
            let integral =
                integrator.electron_repulsion((&basis[i], &basis[j], &basis[k], &basis[l]));
            log::trace!("ERI {index} = {integral:<1.8}");
            (index, integral)
        };

        #[cfg(feature = "rayon")]
        let integrals = {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            to_compute
                .into_par_iter()
                .map(evaluate)
                .collect::<Vec<_>>()
        };

        #[cfg(not(feature = "rayon"))]
        let integrals = to_compute.into_iter().map(evaluate).collect::<Vec<_>>();

        let mut data = Tensor4::zeros([n_basis; 4]);
        for (index, integral) in integrals {
            for image in index.symmetric_images() {
                data[image] = integral;
            }
        }

        Self { data }
    }

    pub fn n_basis(&self) -> usize {
        self.data.dims()[0]
    }

    /// The dense tensor of all integrals, (ij|kl) at index (i, j, k, l)
    pub fn as_tensor(&self) -> &Tensor4 {
        &self.data
    }

    pub fn into_tensor(self) -> Tensor4 {
        self.data
    }
}

impl Index<(usize, usize, usize, usize)> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: (usize, usize, usize, usize)) -> &Self::Output {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{
        basis::BasisSet,
        integrals::{electron_tensor::IntegralIndex, Integrator, McMurchieDavidson},
        molecule::{Molecule, Units},
        periodic_table::ElementType,
    };

    use super::ElectronTensor;

    #[test]
    fn canonical_order() {
        assert_eq!(
            IntegralIndex::new((0, 1, 2, 3)),
            IntegralIndex::new((3, 2, 1, 0))
        );
        assert_eq!(IntegralIndex::new((0, 1, 2, 3)), IntegralIndex(3, 2, 1, 0));
        assert_eq!(IntegralIndex::new((1, 1, 0, 0)), IntegralIndex(1, 1, 0, 0));
    }

    #[test]
    fn tensor_matches_direct_evaluation() {
        let molecule = Molecule::from_geometry(
            &[
                (ElementType::O, [0.0, 0.0, 0.0]),
                (ElementType::H, [0.0, 0.757, 0.587]),
                (ElementType::H, [0.0, -0.757, 0.587]),
            ],
            Units::Angstrom,
        );
        let basis = BasisSet::by_name("STO-3G")
            .unwrap()
            .basis_for(&molecule)
            .unwrap();
        let integrator = McMurchieDavidson;
        let tensor = ElectronTensor::from_basis(&basis, &integrator);

        for (i, j, k, l) in [(0, 1, 2, 3), (4, 4, 2, 1), (6, 5, 0, 2), (3, 3, 3, 3)] {
            let direct =
                integrator.electron_repulsion((&basis[i], &basis[j], &basis[k], &basis[l]));
            assert_relative_eq!(tensor[(i, j, k, l)], direct, epsilon = 1e-12);
            assert_relative_eq!(tensor[(l, k, j, i)], direct, epsilon = 1e-12);
        }
    }
}

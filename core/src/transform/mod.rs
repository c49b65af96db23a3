//! Basis changes for one- and two-index integral matrices and four-index integral tensors,
//! and the index reorderings between the common two-electron integral conventions.
mod ordering;

use nalgebra::DMatrix;

pub use ordering::{convert_ordering, IntegralOrdering};

use crate::{
    error::{Error, Result},
    tensor::Tensor4,
    utils,
};

/// How a single index of a tensor responds to a change of basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// Transforms like the basis functions themselves, i.e. with the rotation matrix R.
    /// Integrals over basis functions (overlap, fock, electron repulsion) are covariant.
    Covariant,
    /// Transforms with the inverse transpose of R. Expansion coefficients in the basis,
    /// such as the density matrix, are contravariant.
    Contravariant,
}

/// Transform a matrix into a new basis, where the columns of `rotation` are the new
/// basis functions expressed in the old ones (old x new).
///
/// With two covariant indices, this computes `Rᵀ M R`.
pub fn general_basis_change_matrix(
    matrix: &DMatrix<f64>,
    rotation: &DMatrix<f64>,
    key: [IndexKind; 2],
) -> Result<DMatrix<f64>> {
    let [left, right] = axis_transforms(rotation, &key)?;

    for (dim, transform) in [(matrix.nrows(), &left), (matrix.ncols(), &right)] {
        if dim != transform.nrows() {
            return Err(Error::DimensionMismatch {
                expected: transform.nrows(),
                found: dim,
            });
        }
    }

    Ok(left.transpose() * matrix * right)
}

/// Transform a four index tensor into a new basis, one index at a time. See
/// [`general_basis_change_matrix`] for the meaning of `rotation` and `key`.
pub fn general_basis_change_tensor(
    tensor: &Tensor4,
    rotation: &DMatrix<f64>,
    key: [IndexKind; 4],
) -> Result<Tensor4> {
    let transforms: [DMatrix<f64>; 4] = axis_transforms(rotation, &key)?;

    let mut output = tensor.clone();
    for (axis, transform) in transforms.iter().enumerate() {
        output = transform_axis(&output, axis, transform)?;
    }
    Ok(output)
}

/// Symmetric (Löwdin) orthogonalization matrix S^{-1/2}
pub fn lowdin_orthogonalization(overlap: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    const LINEAR_DEPENDENCE: f64 = 1e-10;

    let (u, eigenvalues) = utils::eigs(overlap.clone());
    if eigenvalues.iter().any(|&value| value < LINEAR_DEPENDENCE) {
        return Err(Error::SingularMatrix);
    }

    let diagonal_inv_sqrt = DMatrix::from_diagonal(&eigenvalues.map(|f| f.sqrt().recip()));
    Ok(&u * (diagonal_inv_sqrt * u.transpose()))
}

/// The matrix each index gets contracted with
fn axis_transforms<const N: usize>(
    rotation: &DMatrix<f64>,
    key: &[IndexKind; N],
) -> Result<[DMatrix<f64>; N]> {
    let inverse_transpose = if key.contains(&IndexKind::Contravariant) {
        if !rotation.is_square() {
            return Err(Error::DimensionMismatch {
                expected: rotation.nrows(),
                found: rotation.ncols(),
            });
        }
        Some(
            rotation
                .clone()
                .try_inverse()
                .ok_or(Error::SingularMatrix)?
                .transpose(),
        )
    } else {
        None
    };

    Ok(key.map(|kind| match (kind, &inverse_transpose) {
        (IndexKind::Contravariant, Some(inverse_transpose)) => inverse_transpose.clone(),
        _ => rotation.clone(),
    }))
}

/// output[.., a, ..] = sum_p transform[p, a] * tensor[.., p, ..] along `axis`
fn transform_axis(tensor: &Tensor4, axis: usize, transform: &DMatrix<f64>) -> Result<Tensor4> {
    let mut dims = tensor.dims();
    if dims[axis] != transform.nrows() {
        return Err(Error::DimensionMismatch {
            expected: transform.nrows(),
            found: dims[axis],
        });
    }
    dims[axis] = transform.ncols();

    Ok(Tensor4::from_fn(dims, |i, j, k, l| {
        let mut index = [i, j, k, l];
        let target = index[axis];

        (0..transform.nrows())
            .map(|p| {
                index[axis] = p;
                transform[(p, target)] * tensor[(index[0], index[1], index[2], index[3])]
            })
            .sum()
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::{error::Error, tensor::Tensor4};

    use super::{
        general_basis_change_matrix, general_basis_change_tensor, lowdin_orthogonalization,
        IndexKind::{Contravariant, Covariant},
    };

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DMatrix<f64> {
        DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0))
    }

    #[test]
    fn covariant_matrix_transform() {
        let mut rng = StdRng::seed_from_u64(7);
        let matrix = random_matrix(&mut rng, 4, 4);
        let rotation = random_matrix(&mut rng, 4, 3);

        let transformed =
            general_basis_change_matrix(&matrix, &rotation, [Covariant, Covariant]).unwrap();
        assert_eq!(transformed.shape(), (3, 3));
        assert_relative_eq!(
            transformed,
            rotation.transpose() * &matrix * &rotation,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mixed_indices_preserve_contraction() {
        // an operator with one covariant and one contravariant index keeps its trace
        let mut rng = StdRng::seed_from_u64(11);
        let matrix = random_matrix(&mut rng, 3, 3);
        let rotation = random_matrix(&mut rng, 3, 3) + DMatrix::identity(3, 3) * 3.0;

        let transformed =
            general_basis_change_matrix(&matrix, &rotation, [Covariant, Contravariant]).unwrap();
        assert_relative_eq!(transformed.trace(), matrix.trace(), epsilon = 1e-10);
    }

    #[test]
    fn contravariant_needs_invertible_rotation() {
        let matrix = DMatrix::identity(2, 2);
        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(
            general_basis_change_matrix(&matrix, &singular, [Contravariant, Contravariant]),
            Err(Error::SingularMatrix)
        ));

        let rectangular = DMatrix::zeros(2, 3);
        assert!(general_basis_change_matrix(&matrix, &rectangular, [Covariant, Contravariant])
            .is_err());
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let matrix = DMatrix::identity(3, 3);
        let rotation = DMatrix::identity(2, 2);
        assert!(matches!(
            general_basis_change_matrix(&matrix, &rotation, [Covariant, Covariant]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(general_basis_change_tensor(
            &Tensor4::zeros([3; 4]),
            &rotation,
            [Covariant; 4]
        )
        .is_err());
    }

    #[test]
    fn tensor_transform_matches_explicit_sum() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 3;
        let tensor = Tensor4::from_fn([n; 4], |_, _, _, _| rng.gen_range(-1.0..1.0));
        let rotation = random_matrix(&mut rng, n, 2);

        let transformed = general_basis_change_tensor(&tensor, &rotation, [Covariant; 4]).unwrap();
        assert_eq!(transformed.dims(), [2; 4]);

        let mut expected = 0.0;
        for (p, q, r, s) in itertools::iproduct!(0..n, 0..n, 0..n, 0..n) {
            expected += rotation[(p, 1)]
                * rotation[(q, 0)]
                * rotation[(r, 1)]
                * rotation[(s, 1)]
                * tensor[(p, q, r, s)];
        }
        assert_relative_eq!(transformed[(1, 0, 1, 1)], expected, epsilon = 1e-12);
    }

    #[test]
    fn tensor_round_trip_through_inverse() {
        let mut rng = StdRng::seed_from_u64(5);
        let tensor = Tensor4::from_fn([3; 4], |_, _, _, _| rng.gen_range(-1.0..1.0));
        let rotation = random_matrix(&mut rng, 3, 3) + DMatrix::identity(3, 3) * 2.0;
        let inverse = rotation.clone().try_inverse().unwrap();

        let forward = general_basis_change_tensor(&tensor, &rotation, [Covariant; 4]).unwrap();
        let back = general_basis_change_tensor(&forward, &inverse, [Covariant; 4]).unwrap();
        assert!(back.max_abs_diff(&tensor) < 1e-10);
    }

    #[test]
    fn lowdin_orthogonalizes() {
        let overlap = DMatrix::from_row_slice(3, 3, &[1.0, 0.4, 0.1, 0.4, 1.0, 0.3, 0.1, 0.3, 1.0]);
        let x = lowdin_orthogonalization(&overlap).unwrap();

        assert_relative_eq!(x.transpose() * &overlap * &x, DMatrix::identity(3, 3), epsilon = 1e-12);
        assert_relative_eq!(x.transpose(), x, epsilon = 1e-12);

        let dependent = DMatrix::from_element(2, 2, 1.0);
        assert!(lowdin_orthogonalization(&dependent).is_err());
    }
}

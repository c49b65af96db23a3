use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A dense, row-major tensor with four indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor4")]
pub struct Tensor4 {
    data: Vec<f64>,
    dims: [usize; 4],
}

/// Unchecked serialized form of a [`Tensor4`]
#[derive(Deserialize)]
struct RawTensor4 {
    data: Vec<f64>,
    dims: [usize; 4],
}

impl TryFrom<RawTensor4> for Tensor4 {
    type Error = Error;

    fn try_from(RawTensor4 { data, dims }: RawTensor4) -> Result<Self, Self::Error> {
        let expected = dims.iter().product();
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { data, dims })
    }
}

impl Tensor4 {
    pub fn zeros(dims: [usize; 4]) -> Self {
        Self {
            data: vec![0.0; dims.iter().product()],
            dims,
        }
    }

    pub fn from_fn(
        dims: [usize; 4],
        mut func: impl FnMut(usize, usize, usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(dims.iter().product());
        for (i, j, k, l) in itertools::iproduct!(0..dims[0], 0..dims[1], 0..dims[2], 0..dims[3])
        {
            data.push(func(i, j, k, l));
        }
        Self { data, dims }
    }

    pub fn dims(&self) -> [usize; 4] {
        self.dims
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    fn linear(&self, (i, j, k, l): (usize, usize, usize, usize)) -> usize {
        let [_, d1, d2, d3] = self.dims;
        debug_assert!(i < self.dims[0] && j < d1 && k < d2 && l < d3);
        ((i * d1 + j) * d2 + k) * d3 + l
    }

    /// Reorder the indices of the tensor, with the semantics of numpy's `transpose`:
    /// index `n` of the result is index `axes[n]` of `self`.
    ///
    /// # Panics
    /// if `axes` is not a permutation of `0..4`
    pub fn permuted(&self, axes: [usize; 4]) -> Self {
        let mut seen = [false; 4];
        for &axis in &axes {
            assert!(axis < 4 && !seen[axis], "{axes:?} is not a permutation");
            seen[axis] = true;
        }

        let dims = axes.map(|axis| self.dims[axis]);
        Self::from_fn(dims, |i, j, k, l| {
            let mut source = [0; 4];
            for (position, index) in [i, j, k, l].into_iter().enumerate() {
                source[axes[position]] = index;
            }
            self[(source[0], source[1], source[2], source[3])]
        })
    }

    /// Largest absolute elementwise difference between two tensors of the same shape
    ///
    /// # Panics
    /// if the shapes of the tensors differ
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        assert_eq!(self.dims, other.dims, "tensor shapes differ");
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Index<(usize, usize, usize, usize)> for Tensor4 {
    type Output = f64;

    fn index(&self, index: (usize, usize, usize, usize)) -> &Self::Output {
        &self.data[self.linear(index)]
    }
}

impl IndexMut<(usize, usize, usize, usize)> for Tensor4 {
    fn index_mut(&mut self, index: (usize, usize, usize, usize)) -> &mut Self::Output {
        let linear = self.linear(index);
        &mut self.data[linear]
    }
}

#[cfg(test)]
mod tests {
    use super::Tensor4;

    #[test]
    fn permutation_follows_numpy() {
        let tensor = Tensor4::from_fn([2, 3, 4, 5], |i, j, k, l| {
            (1000 * i + 100 * j + 10 * k + l) as f64
        });

        let permuted = tensor.permuted([0, 2, 3, 1]);
        assert_eq!(permuted.dims(), [2, 4, 5, 3]);
        // permuted[a, b, c, d] = tensor[a, d, b, c]
        assert_eq!(permuted[(1, 3, 4, 2)], tensor[(1, 2, 3, 4)]);
        assert_eq!(permuted.permuted([0, 3, 1, 2]), tensor);
    }

    #[test]
    fn deserialization_checks_length() {
        let tensor = Tensor4::from_fn([1, 2, 1, 2], |i, j, k, l| (i + j + k + l) as f64);
        let json = serde_json::to_string(&tensor).unwrap();
        assert_eq!(serde_json::from_str::<Tensor4>(&json).unwrap(), tensor);

        let truncated = r#"{"data": [1.0, 2.0, 3.0], "dims": [1, 2, 1, 2]}"#;
        let err = serde_json::from_str::<Tensor4>(truncated).unwrap_err();
        assert!(err.to_string().contains("expected 4, found 3"));
    }

    #[test]
    #[should_panic]
    fn invalid_permutation() {
        Tensor4::zeros([1, 1, 1, 1]).permuted([0, 0, 1, 2]);
    }
}

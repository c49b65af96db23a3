use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};

struct Sample {
    error: DMatrix<f64>,
    fock: DMatrix<f64>,
}

/// Pulay's direct inversion in the iterative subspace: extrapolates the fock matrix as
/// the combination of previous fock matrices that minimizes the commutator error
/// FDS - SDF.
pub(crate) struct Diis {
    previous_samples: VecDeque<Sample>,
    /// extrapolation starts once this many samples have been collected
    min_samples: usize,
    max_samples: usize,
}

impl Diis {
    pub fn new() -> Self {
        Self {
            previous_samples: VecDeque::new(),
            min_samples: 5,
            max_samples: 12,
        }
    }

    /// Largest absolute entry of the most recent error matrix
    pub fn max_error(&self) -> f64 {
        self.previous_samples
            .front()
            .map(|sample| sample.error.amax())
            .unwrap_or(f64::INFINITY)
    }

    /// Record a new fock matrix and its error, and return the extrapolated fock matrix.
    /// Falls back to the newest fock matrix if the DIIS equations are singular.
    pub fn fock(&mut self, error: DMatrix<f64>, fock: DMatrix<f64>) -> DMatrix<f64> {
        self.previous_samples.push_front(Sample { error, fock });
        self.previous_samples.truncate(self.max_samples);

        let newest = || self.previous_samples[0].fock.clone();

        let n = self.previous_samples.len();
        if n < self.min_samples {
            return newest();
        }

        let matrix = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i, j) {
            (i, j) if i == n && j == n => 0.0,
            (i, j) if i == n || j == n => 1.0,
            _ => self.previous_samples[j]
                .error
                .dot(&self.previous_samples[i].error),
        });

        let b = DVector::from_fn(n + 1, |i, _| if i == n { 1.0 } else { 0.0 });

        match matrix.qr().solve(&b) {
            Some(solution) => solution
                .iter()
                .take(n)
                .zip(&self.previous_samples)
                .map(|(&weight, sample)| weight * &sample.fock)
                .sum(),
            None => {
                log::debug!("DIIS equations are singular, using the plain fock matrix");
                newest()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    use super::Diis;

    #[test]
    fn passes_through_until_enough_samples() {
        let mut diis = Diis::new();
        for step in 0..4 {
            let fock = DMatrix::from_element(2, 2, step as f64);
            let extrapolated = diis.fock(DMatrix::identity(2, 2) * (step + 1) as f64, fock.clone());
            assert_eq!(extrapolated, fock);
        }
        assert_relative_eq!(diis.max_error(), 4.0);
    }

    #[test]
    fn extrapolated_weights_sum_to_one() {
        let mut diis = Diis::new();
        let mut extrapolated = DMatrix::zeros(3, 3);
        for step in 0..6 {
            let error = DMatrix::from_fn(3, 3, |i, j| ((step * 9 + i * 3 + j) as f64).sin());
            extrapolated = diis.fock(error, DMatrix::from_element(3, 3, 3.0));
        }
        // every stored fock matrix is the same, so any affine combination reproduces it
        assert_relative_eq!(extrapolated, DMatrix::from_element(3, 3, 3.0), epsilon = 1e-8);
    }
}

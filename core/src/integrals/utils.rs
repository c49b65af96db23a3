use nalgebra::Vector3;

/// Hermite expansion coefficient E^{ij}_t of the product of two one dimensional
/// cartesian gaussians, with `[i, j, t]` and the distance `qx = A_x - B_x` between the
/// two centers.
pub(crate) fn hermite_expansion([i, j, t]: [i32; 3], qx: f64, a: f64, b: f64) -> f64 {
    let p = a + b;
    let q = a * b / p;

    if t < 0 || i < 0 || j < 0 || t > i + j {
        0.0
    } else if i == 0 && j == 0 && t == 0 {
        (-q * qx * qx).exp()
    } else if j == 0 {
        // decrement index i
        (2.0 * p).recip() * hermite_expansion([i - 1, j, t - 1], qx, a, b)
            - (q * qx / a) * hermite_expansion([i - 1, j, t], qx, a, b)
            + (t + 1) as f64 * hermite_expansion([i - 1, j, t + 1], qx, a, b)
    } else {
        // decrement index j
        (2.0 * p).recip() * hermite_expansion([i, j - 1, t - 1], qx, a, b)
            + (q * qx / b) * hermite_expansion([i, j - 1, t], qx, a, b)
            + (t + 1) as f64 * hermite_expansion([i, j - 1, t + 1], qx, a, b)
    }
}

/// Hermite coulomb integral R^n_{tuv}, where `diff` is the vector from the coulomb
/// center C to the gaussian product center P: P - C.
pub(crate) fn coulomb_auxiliary(t: i32, u: i32, v: i32, n: i32, p: f64, diff: Vector3<f64>) -> f64 {
    if t < 0 || u < 0 || v < 0 {
        return 0.0;
    }

    if t == 0 && u == 0 && v == 0 {
        (-2.0 * p).powi(n) * boys(n, p * diff.norm_squared())
    } else if t == 0 && u == 0 {
        (v - 1) as f64 * coulomb_auxiliary(t, u, v - 2, n + 1, p, diff)
            + diff.z * coulomb_auxiliary(t, u, v - 1, n + 1, p, diff)
    } else if t == 0 {
        (u - 1) as f64 * coulomb_auxiliary(t, u - 2, v, n + 1, p, diff)
            + diff.y * coulomb_auxiliary(t, u - 1, v, n + 1, p, diff)
    } else {
        (t - 1) as f64 * coulomb_auxiliary(t - 2, u, v, n + 1, p, diff)
            + diff.x * coulomb_auxiliary(t - 1, u, v, n + 1, p, diff)
    }
}

/// The boys function F_n(x) = int_0^1 t^{2n} exp(-x t^2) dt
pub(crate) fn boys(n: i32, x: f64) -> f64 {
    debug_assert!(n >= 0 && x >= 0.0);
    const SERIES_LIMIT: f64 = 30.0;

    if x < SERIES_LIMIT {
        // F_n(x) = exp(-x) * sum_k (2x)^k / ((2n + 1)(2n + 3)...(2n + 2k + 1))
        let mut term = ((2 * n + 1) as f64).recip();
        let mut sum = term;
        let mut k = 1;
        while term > f64::EPSILON * 1e-2 * sum {
            term *= 2.0 * x / (2 * n + 2 * k + 1) as f64;
            sum += term;
            k += 1;
        }
        (-x).exp() * sum
    } else {
        // upward recursion is stable for large arguments
        let exp = (-x).exp();
        let mut value = 0.5 * (std::f64::consts::PI / x).sqrt() * libm::erf(x.sqrt());
        for m in 0..n {
            value = ((2 * m + 1) as f64 * value - exp) / (2.0 * x);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::{boys, coulomb_auxiliary, hermite_expansion};

    #[test]
    fn boys_limits() {
        for n in 0..6 {
            assert_relative_eq!(boys(n, 0.0), 1.0 / (2 * n + 1) as f64, epsilon = 1e-14);
        }
        // F_0(x) = sqrt(pi / x) erf(sqrt(x)) / 2
        for x in [0.1, 1.0, 5.0, 12.5, 29.9, 30.0, 45.0] {
            let expected = 0.5 * (std::f64::consts::PI / x).sqrt() * libm::erf(f64::sqrt(x));
            assert_relative_eq!(boys(0, x), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn boys_recursion_is_consistent() {
        // (2n + 1) F_n(x) = 2x F_{n+1}(x) + exp(-x), on both sides of the series limit
        for x in [0.5, 3.0, 17.0, 29.0, 31.0, 60.0] {
            for n in 0..5 {
                assert_relative_eq!(
                    (2 * n + 1) as f64 * boys(n, x),
                    2.0 * x * boys(n + 1, x) + (-x).exp(),
                    max_relative = 1e-11
                );
            }
        }
    }

    #[test]
    fn hermite_base_cases() {
        assert_relative_eq!(hermite_expansion([0, 0, 0], 1.0, 1.0, 1.0), (-0.5f64).exp());
        assert_eq!(hermite_expansion([0, 0, 1], 1.0, 1.0, 1.0), 0.0);
        assert_eq!(hermite_expansion([-1, 0, 0], 1.0, 1.0, 1.0), 0.0);
        // for coincident centers, E^{10}_1 = 1 / 2p
        assert_relative_eq!(hermite_expansion([1, 0, 1], 0.0, 0.5, 1.5), 0.25);
    }

    #[test]
    fn coulomb_base_case() {
        let diff = Vector3::new(0.0, 0.0, 0.0);
        assert_relative_eq!(coulomb_auxiliary(0, 0, 0, 0, 1.0, diff), 1.0);
        // R_{100} vanishes at the coulomb center
        assert_relative_eq!(coulomb_auxiliary(1, 0, 0, 0, 1.0, diff), 0.0);
    }
}

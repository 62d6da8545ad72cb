//! Roots of the boundary equation of the residue series.
//!
//! Each term of the residue series is evaluated at a root _tᵢ_ of
//!
//! ```text
//! w₂′(t) - q w₂(t) = 0
//! ```
//!
//! with _q_ Fock's surface impedance parameter. The two limiting cases are
//! known in closed form: for _q → 0_ the roots are the zeros of _w₂′_, for
//! _|q| → ∞_ those of _w₂_. Both families lie on the ray _arg t = -π/3_ at the
//! (negated) zeros of Ai′ and Ai respectively. A first-order perturbation off
//! the nearer limit gives a seed which Newton's method then polishes.
//!
//! Newton steps only use the scaled Airy mantissas: the common exponential
//! factor cancels out of the step _f/f′_.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::airy::{w2, Airy};
use crate::error::NumericalError;

/// Relative size of the last Newton step at which a root is accepted.
pub const ROOT_TOLERANCE: f64 = 1e-10;

/// First zero of Ai′, which the asymptotic formula gets least right.
const FIRST_AI_PRIME_ZERO: f64 = 1.018_792_971_647_471;

/// A root of the boundary equation, with w₂ evaluated there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Root {
    /// The root _tᵢ_.
    pub t: Complex64,

    /// w₂(tᵢ), scaled.
    pub w2: Airy,

    /// Newton steps taken.
    pub iterations: usize,
}

/// Magnitude of the `s`-th zero of Ai (1-based), from its asymptotic expansion.
///
/// See Abramowitz and Stegun 10.4.94 and 10.4.105.
pub(crate) fn ai_zero(s: usize) -> f64 {
    let t = 3.0 * PI / 8.0 * (4 * s - 1) as f64;
    let t2 = t * t;
    t.powf(2.0 / 3.0)
        * (1.0 + 5.0 / (48.0 * t2) - 5.0 / (36.0 * t2 * t2)
            + 77125.0 / (82944.0 * t2 * t2 * t2))
}

/// Magnitude of the `s`-th zero of Ai′ (1-based), from its asymptotic expansion.
///
/// See Abramowitz and Stegun 10.4.95 and 10.4.106.
pub(crate) fn ai_prime_zero(s: usize) -> f64 {
    if s == 1 {
        return FIRST_AI_PRIME_ZERO;
    }

    let u = 3.0 * PI / 8.0 * (4 * s - 3) as f64;
    let u2 = u * u;
    u.powf(2.0 / 3.0)
        * (1.0 - 7.0 / (48.0 * u2) + 35.0 / (288.0 * u2 * u2)
            - 181_223.0 / (207_360.0 * u2 * u2 * u2))
}

/// Starting point of the Newton search for root `index`.
///
/// Perturbs off the zero of w₂ when |q|² dominates that zero, off the zero of
/// w₂′ otherwise.
pub(crate) fn seed(index: usize, q: Complex64) -> Complex64 {
    let ray = Complex64::from_polar(1.0, -PI / 3.0);
    let w2_zero = ray * ai_zero(index);
    let w2_prime_zero = ray * ai_prime_zero(index);

    if q.norm_sqr() > w2_zero.norm() {
        w2_zero + 1.0 / q
    } else {
        w2_prime_zero + q / w2_prime_zero
    }
}

/// Finds root `index` (1-based) of _w₂′(t) - q w₂(t) = 0_.
///
/// ## Errors
///
/// [`NumericalError::RootSearchDiverged`] when Newton's method has not settled
/// within `max_iterations` steps, or a step stops being finite. Roots are
/// numbered from 1, so index 0 fails without a single step.
pub fn find_root(index: usize, q: Complex64, max_iterations: usize) -> Result<Root, NumericalError> {
    if index == 0 {
        return Err(NumericalError::RootSearchDiverged {
            index,
            iterations: 0,
        });
    }

    let mut t = seed(index, q);

    for iteration in 1..=max_iterations {
        let w = w2(t);
        let f = w.derivative - q * w.value;
        // w₂ solves w″ = t w
        let slope = t * w.value - q * w.derivative;
        let step = f / slope;

        if !step.is_finite() {
            break;
        }

        t -= step;

        if step.norm() <= ROOT_TOLERANCE * t.norm().max(1.0) {
            tracing::trace!(index, iterations = iteration, root = %t, "root polished");
            return Ok(Root {
                t,
                w2: w2(t),
                iterations: iteration,
            });
        }
    }

    Err(NumericalError::RootSearchDiverged {
        index,
        iterations: max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn residual(root: &Root, q: Complex64) -> f64 {
        let w = root.w2;
        ((w.derivative - q * w.value) / w.derivative.norm().max(w.value.norm())).norm()
    }

    #[test]
    fn asymptotic_zeros_match_tables() {
        // A&S table 10.13
        assert_relative_eq!(ai_zero(1), 2.338_107_410, max_relative = 1e-3);
        assert_relative_eq!(ai_zero(2), 4.087_949_444, max_relative = 1e-6);
        assert_relative_eq!(ai_zero(10), 12.828_776_753, max_relative = 1e-9);
        assert_relative_eq!(ai_prime_zero(1), 1.018_792_972, max_relative = 1e-9);
        assert_relative_eq!(ai_prime_zero(2), 3.248_197_582, max_relative = 1e-5);
        assert_relative_eq!(ai_prime_zero(10), 12.384_788_372, max_relative = 1e-8);
    }

    #[test]
    fn roots_satisfy_boundary_equation() {
        let qs = [
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(0.5, -PI / 4.0),
            Complex64::from_polar(3.0, -2.0 * PI / 3.0),
            Complex64::from_polar(40.0, -PI / 2.0),
            Complex64::from_polar(800.0, -PI / 4.0),
        ];

        for &q in qs.iter() {
            for index in [1, 2, 5, 50, 200].iter().copied() {
                let root = find_root(index, q, 50).unwrap();
                assert!(residual(&root, q) < 1e-7, "q = {}, index = {}", q, index);
                assert!(root.iterations <= 50);
            }
        }
    }

    #[test]
    fn zero_impedance_gives_zeros_of_w2_prime() {
        let root = find_root(1, Complex64::new(0.0, 0.0), 50).unwrap();
        let expected = Complex64::from_polar(FIRST_AI_PRIME_ZERO, -PI / 3.0);
        assert_relative_eq!(root.t.re, expected.re, max_relative = 1e-9);
        assert_relative_eq!(root.t.im, expected.im, max_relative = 1e-9);
    }

    #[test]
    fn roots_are_distinct_and_ordered() {
        let q = Complex64::from_polar(2.0, -PI / 3.0);
        let roots: Vec<_> = (1..=30).map(|i| find_root(i, q, 50).unwrap().t).collect();

        for pair in roots.windows(2) {
            assert!(pair[1].norm() > pair[0].norm() + 0.5);
        }
    }

    #[test]
    fn single_iteration_cap_reports_divergence() {
        let q = Complex64::from_polar(1.5, -PI / 2.0);
        let error = find_root(3, q, 1).unwrap_err();
        assert_eq!(
            error,
            NumericalError::RootSearchDiverged {
                index: 3,
                iterations: 1
            }
        );
    }

    #[test]
    fn index_zero_has_no_root() {
        let error = find_root(0, Complex64::new(0.0, 0.0), 50).unwrap_err();
        assert_eq!(
            error,
            NumericalError::RootSearchDiverged {
                index: 0,
                iterations: 0
            }
        );
    }
}

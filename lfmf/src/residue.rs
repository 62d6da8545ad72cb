//! The residue series of Fock's groundwave problem.
//!
//! Beyond the transition distance the attenuation function is written as a sum
//! over the roots _tᵢ_ of the boundary equation (see [`crate::roots`]):
//!
//! ```text
//! W = √x √(π/2) (1 - i) Σ  H(y₁) H(y₂) e^(-ixtᵢ) / (tᵢ - q²)
//! ```
//!
//! where _x = νθ_ is the normalised distance and the height gains are
//! _H(y) = w₂(tᵢ - y) / w₂(tᵢ)_. Terms decay like _e^(-x Im(-tᵢ))_, so a few
//! dozen usually matter, but reference outputs sum a fixed number of them.
//!
//! The height gains overflow for high antennas and the exponential underflows
//! for high-order terms, so both are kept scaled and combined with a single
//! `exp` at the end of each term.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::airy::w2;
use crate::error::NumericalError;
use crate::geometry::DerivedGeometry;
use crate::roots::{find_root, Root};
use crate::trace::{Probe, TraceEvent};
use crate::Options;

/// Relative distance to _q²_ under which a root counts as the pole.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Per-path constants of the series.
#[derive(Clone, Copy, Debug)]
struct Residues {
    x: f64,
    q_squared: Complex64,
    heights: [f64; 2],
}

impl Residues {
    fn new(geometry: &DerivedGeometry) -> Self {
        let (low, high) = geometry.normalised_heights();
        Residues {
            x: geometry.x(),
            q_squared: geometry.q * geometry.q,
            heights: [low, high],
        }
    }

    fn term(&self, index: usize, root: &Root) -> Result<Complex64, NumericalError> {
        let denominator = root.t - self.q_squared;
        if denominator.norm() < SINGULAR_TOLERANCE * self.q_squared.norm().max(1.0) {
            return Err(NumericalError::SingularResidueTerm { index });
        }

        let mut gain = Complex64::new(1.0, 0.0);
        let mut exponent = -Complex64::i() * self.x * root.t;

        // antennas on the ground contribute no gain
        for &y in self.heights.iter().filter(|&&y| y > 0.0) {
            let shifted = w2(root.t - y);
            gain *= shifted.value / root.w2.value;
            exponent += shifted.exponent - root.w2.exponent;
        }

        let term = gain * exponent.exp() / denominator;
        if !term.is_finite() {
            return Err(NumericalError::NonFiniteField {
                stage: "residue term",
            });
        }

        Ok(term)
    }

    fn field(&self, sum: Complex64) -> f64 {
        (self.x.sqrt() * (PI / 2.0).sqrt() * Complex64::new(1.0, -1.0) * sum).norm()
    }
}

/// Normalised groundwave field by the residue series.
///
/// With no convergence tolerance, exactly `options.series.max_terms` terms are
/// summed in index order. Otherwise summation stops at the first term smaller
/// than `tolerance × |sum|`, or at `max_terms`.
pub fn field<P>(geometry: &DerivedGeometry, options: &Options, probe: &mut P) -> Result<f64, NumericalError>
where
    P: Probe + ?Sized,
{
    let residues = Residues::new(geometry);
    let q = geometry.q;
    let config = options.series;

    let mut sum = Complex64::new(0.0, 0.0);
    let mut terms = 0;
    let mut converged_early = false;

    match config.convergence_tolerance {
        None => {
            let roots = solve_roots(q, config.max_terms, options.max_root_iterations)?;

            for (offset, root) in roots.iter().enumerate() {
                let index = offset + 1;
                report_root(probe, index, root);

                let term = residues.term(index, root)?;
                sum += term;
                report_term(probe, index, term, sum);
            }

            terms = roots.len();
        }
        Some(tolerance) => {
            for index in 1..=config.max_terms {
                let root = find_root(index, q, options.max_root_iterations)?;
                report_root(probe, index, &root);

                let term = residues.term(index, &root)?;
                sum += term;
                report_term(probe, index, term, sum);
                terms = index;

                if term.norm() < tolerance * sum.norm() {
                    converged_early = index < config.max_terms;
                    break;
                }
            }
        }
    }

    probe.event(&TraceEvent::SeriesStopped {
        terms,
        converged_early,
    });
    tracing::debug!(terms, converged_early, sum = %sum, "residue series summed");

    let field = residues.field(sum);
    if !field.is_finite() {
        return Err(NumericalError::NonFiniteField {
            stage: "residue sum",
        });
    }

    Ok(field)
}

fn report_root<P: Probe + ?Sized>(probe: &mut P, index: usize, root: &Root) {
    probe.event(&TraceEvent::RootFound {
        index,
        root: root.t,
        iterations: root.iterations,
    });
}

fn report_term<P: Probe + ?Sized>(probe: &mut P, index: usize, term: Complex64, sum: Complex64) {
    tracing::trace!(index, term = %term, "residue term");
    probe.event(&TraceEvent::TermAdded { index, term, sum });
}

/// Roots 1 through `count`, in index order.
#[cfg(feature = "parallel")]
fn solve_roots(q: Complex64, count: usize, max_iterations: usize) -> Result<Vec<Root>, NumericalError> {
    use rayon::prelude::*;

    (1..=count)
        .into_par_iter()
        .map(|index| find_root(index, q, max_iterations))
        .collect()
}

/// Roots 1 through `count`, in index order.
#[cfg(not(feature = "parallel"))]
fn solve_roots(q: Complex64, count: usize, max_iterations: usize) -> Result<Vec<Root>, NumericalError> {
    (1..=count)
        .map(|index| find_root(index, q, max_iterations))
        .collect()
}

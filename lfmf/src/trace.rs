//! Instrumentation hook.
//!
//! Structured logging goes through `tracing`; a [`Probe`] is for callers who
//! want the intermediate values themselves, to chart a series converging or to
//! compare against reference runs.

use num_complex::Complex64;

use crate::geometry::DerivedGeometry;
use crate::{Correction, Method};

/// An intermediate step of a prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceEvent<'a> {
    /// Validation passed.
    Validated { correction: Correction },

    /// Geometry and ground parameters derived.
    Geometry(&'a DerivedGeometry),

    /// Solver chosen.
    MethodSelected {
        method: Method,
        transition_distance: f64,
    },

    /// A boundary-equation root was polished.
    RootFound {
        index: usize,
        root: Complex64,
        iterations: usize,
    },

    /// A residue term was added to the running sum.
    TermAdded {
        index: usize,
        term: Complex64,
        sum: Complex64,
    },

    /// Residue summation stopped after `terms` terms.
    SeriesStopped { terms: usize, converged_early: bool },

    /// Normalised field from the solver, before scaling by the free-space field.
    FieldComputed { normalized: f64 },
}

/// Receives [`TraceEvent`]s.
pub trait Probe {
    fn event(&mut self, event: &TraceEvent<'_>);
}

impl<F> Probe for F
where
    F: FnMut(&TraceEvent<'_>),
{
    fn event(&mut self, event: &TraceEvent<'_>) {
        self(event)
    }
}

/// A probe that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Probe for Silent {
    fn event(&mut self, _event: &TraceEvent<'_>) {}
}

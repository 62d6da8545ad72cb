//! Error types.
//!
//! Every error is local to one request: nothing here ever aborts a batch.
//! Each variant maps onto the numeric status code reported in the output
//! record, see [`crate::record`].

use thiserror::Error;

/// Result type for kernel operations.
pub type GroundwaveResult<T> = Result<T, GroundwaveError>;

/// Hard failures of input validation, one per physical range.
///
/// Checked in declaration order; the first failure wins.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum ValidationError {
    /// Transmitter height is negative.
    #[error("transmitter height out of range: {0} m")]
    TxHeight(f64),

    /// Receiver height is negative.
    #[error("receiver height out of range: {0} m")]
    RxHeight(f64),

    /// Frequency is outside 0.01–30 MHz.
    #[error("frequency out of range: {0} MHz")]
    Frequency(f64),

    /// Transmit power is not positive.
    #[error("transmit power out of range: {0} W")]
    TxPower(f64),

    /// Surface refractivity is outside 250–400 N-units.
    #[error("surface refractivity out of range: {0} N-units")]
    SurfaceRefractivity(f64),

    /// Path distance is outside 0.001–10000 km.
    #[error("path distance out of range: {0} km")]
    PathDistance(f64),

    /// Relative permittivity is below 1.
    #[error("relative permittivity out of range: {0}")]
    Epsilon(f64),

    /// Conductivity is not positive.
    #[error("conductivity out of range: {0} S/m")]
    Sigma(f64),

    /// Polarisation code is neither horizontal (0) nor vertical (1).
    #[error("invalid polarisation code: {0}")]
    Polarisation(i32),
}

impl ValidationError {
    /// The 1000-series status code for this failure.
    pub fn status_code(&self) -> i32 {
        match self {
            ValidationError::TxHeight(_) => 1000,
            ValidationError::RxHeight(_) => 1001,
            ValidationError::Frequency(_) => 1002,
            ValidationError::TxPower(_) => 1003,
            ValidationError::SurfaceRefractivity(_) => 1004,
            ValidationError::PathDistance(_) => 1005,
            ValidationError::Epsilon(_) => 1006,
            ValidationError::Sigma(_) => 1007,
            ValidationError::Polarisation(_) => 1008,
        }
    }
}

/// Failures of the residue series solver.
///
/// These are deterministic given the inputs: retrying is pointless, only a
/// change of parameters helps.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum NumericalError {
    /// Newton polishing of a boundary-equation root hit its iteration cap.
    #[error("root {index} of the boundary equation did not converge after {iterations} iterations")]
    RootSearchDiverged { index: usize, iterations: usize },

    /// A root landed on the pole at _T = q²_.
    #[error("residue term {index} is singular (root too close to q²)")]
    SingularResidueTerm { index: usize },

    /// A term, or the summed field, overflowed or became NaN.
    #[error("non-finite field in {stage}")]
    NonFiniteField { stage: &'static str },
}

impl NumericalError {
    /// The 3000-series status code for this failure.
    pub fn status_code(&self) -> i32 {
        match self {
            NumericalError::RootSearchDiverged { .. } => 3000,
            NumericalError::SingularResidueTerm { .. } => 3001,
            NumericalError::NonFiniteField { .. } => 3002,
        }
    }
}

/// Invalid kernel options.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The series must sum at least one term.
    #[error("max_terms must be at least 1")]
    NoTerms,

    /// Tolerances must be positive and finite.
    #[error("convergence tolerance must be positive and finite, got {0}")]
    Tolerance(f64),

    /// The root finder needs at least one Newton step.
    #[error("max_root_iterations must be at least 1")]
    NoIterations,
}

/// Any failure of a single prediction.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum GroundwaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GroundwaveError {
    /// Status code reported for this failure.
    ///
    /// Configuration errors are caller bugs rather than per-row conditions;
    /// they report as 4000.
    pub fn status_code(&self) -> i32 {
        match self {
            GroundwaveError::Validation(e) => e.status_code(),
            GroundwaveError::Numerical(e) => e.status_code(),
            GroundwaveError::Config(_) => 4000,
        }
    }
}

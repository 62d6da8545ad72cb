#![forbid(unsafe_code)]

//! The LF/MF groundwave propagation model.
//!
//! Below 30 MHz, and particularly in the LF and MF bands, most of the energy
//! reaching a receiver beyond the horizon travels as a _groundwave_: a surface
//! wave that clings to the Earth and is steadily attenuated by the ground it
//! runs over. The strength of that wave depends on the frequency, on how much
//! the ground conducts and polarises, on the curvature of the Earth (corrected
//! for atmospheric refraction), and on how high the antennas sit.
//!
//! This crate predicts, for a single great-circle path over a smooth Earth of
//! homogeneous ground, the basic transmission loss, the received field strength
//! and the received power, following the method of [ITU-R P.368] and the
//! [NTIA LFMF] model.
//!
//! The computation goes, in order:
//!
//!  - **Validation.** Inputs are range-checked. Antenna heights above the
//!    region where the groundwave theory holds are clamped (and reported), any
//!    other out-of-range input rejects the request. See [`validate`].
//!
//!  - **Geometry.** The effective Earth radius, wave number, the scaling
//!    constant ν, the complex ground permittivity η, the surface impedance δ
//!    and Fock's parameter _q = -iνδ_ are derived. See [`geometry`].
//!
//!  - **Solution.** Short paths, closer than _80 f^(-1/3)_ km, use Wait's flat
//!    Earth attenuation with a curvature correction, see [`flat_earth`]. Longer
//!    paths sum the residue series of Fock's boundary value problem, which
//!    needs a root of _w₂′(t) - q w₂(t) = 0_ per term, see [`residue`] and
//!    [`roots`].
//!
//!  - **Composition.** The normalised field is scaled by the free-space field
//!    of the transmitter and turned into decibel quantities, see [`output`].
//!
//! Everything is a pure function of the inputs. There is no global state, so
//! requests may be evaluated from as many threads as the caller likes; the
//! [`batch`] module does exactly that.
//!
//! [ITU-R P.368]: https://www.itu.int/rec/R-REC-P.368/en
//! [NTIA LFMF]: https://github.com/NTIA/LFMF

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub mod airy;
pub mod batch;
pub mod error;
pub mod flat_earth;
pub mod formulae;
pub mod geometry;
pub mod output;
pub mod record;
pub mod residue;
pub mod roots;
pub mod trace;
pub mod validate;

pub use crate::batch::{predict_batch, Dispatch};
pub use crate::error::{
    ConfigError, GroundwaveError, GroundwaveResult, NumericalError, ValidationError,
};
pub use crate::geometry::DerivedGeometry;
pub use crate::record::{InputRecord, OutputRecord};
pub use crate::trace::{Probe, Silent, TraceEvent};
pub use crate::validate::{validate, ValidatedParameters};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Vacuum permittivity ε₀ (F/m).
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_817e-12;

/// Impedance of free space η₀ (Ω).
pub const FREE_SPACE_IMPEDANCE: f64 = 119.916_983_2 * PI;

/// Nominal Earth radius (km), before the refraction correction.
pub const EARTH_RADIUS: f64 = 6370.0;

/// Gain of both antennas (dBi): short monopoles over a ground plane.
pub const ANTENNA_GAIN_DBI: f64 = 4.77;

/// Default number of terms summed in the residue series.
pub const RESIDUE_TERM_COUNT: usize = 200;

/// Default cap on Newton steps per boundary-equation root.
pub const MAX_ROOT_ITERATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarisation {
    Horizontal, // 0
    Vertical,   // 1
}

impl Default for Polarisation {
    fn default() -> Self {
        Polarisation::Horizontal
    }
}

impl Polarisation {
    /// Wire code of the polarisation.
    pub fn code(self) -> i32 {
        match self {
            Polarisation::Horizontal => 0,
            Polarisation::Vertical => 1,
        }
    }

    /// Polarisation from its wire code, if the code is one.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Polarisation::Horizontal),
            1 => Some(Polarisation::Vertical),
            _ => None,
        }
    }
}

/// Which solver produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    FlatEarthCurve, // 0
    ResidueSeries,  // 1
}

impl Method {
    /// Wire code of the method.
    pub fn code(self) -> i32 {
        match self {
            Method::FlatEarthCurve => 0,
            Method::ResidueSeries => 1,
        }
    }
}

/// Which antenna heights were clamped during validation.
///
/// The two flags form a two-bit combination; all four cases are named.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Correction {
    None,
    Tx,
    Rx,
    Both,
}

impl Default for Correction {
    fn default() -> Self {
        Correction::None
    }
}

impl Correction {
    pub fn from_flags(tx_clamped: bool, rx_clamped: bool) -> Self {
        match (tx_clamped, rx_clamped) {
            (false, false) => Correction::None,
            (true, false) => Correction::Tx,
            (false, true) => Correction::Rx,
            (true, true) => Correction::Both,
        }
    }

    pub fn tx_clamped(self) -> bool {
        matches!(self, Correction::Tx | Correction::Both)
    }

    pub fn rx_clamped(self) -> bool {
        matches!(self, Correction::Rx | Correction::Both)
    }

    /// Status code of a successful prediction carrying this correction.
    pub fn status_code(self) -> i32 {
        match self {
            Correction::None => record::SUCCESS,
            Correction::Tx => record::TX_HEIGHT_CLAMPED,
            Correction::Rx => record::RX_HEIGHT_CLAMPED,
            Correction::Both => record::TX_AND_RX_HEIGHTS_CLAMPED,
        }
    }
}

/// A propagation request.
///
/// Refer to [ITU-R P.527] to derive ground permittivity and conductivity for
/// your region and frequency. Typical values are ε = 80, σ = 5 S/m for sea
/// water and ε = 15, σ = 0.005 S/m for average land.
///
/// This is the typed form of an [`InputRecord`]; convert with `.into()`.
///
/// [ITU-R P.527]: https://www.itu.int/dms_pubrec/itu-r/rec/p/R-REC-P.527-4-201706-I!!PDF-E.pdf
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Height of the transmitting antenna above ground (m).
    pub tx_height: f64,

    /// Height of the receiving antenna above ground (m).
    pub rx_height: f64,

    /// Frequency of the modeled wave (MHz).
    pub frequency: f64,

    /// Transmitter power (W).
    pub power: f64,

    /// Surface refractivity (N-units).
    pub surface_refractivity: f64,

    /// Great-circle path length (km).
    pub distance: f64,

    /// Relative permittivity of the ground.
    pub permittivity: f64,

    /// Conductivity of the ground (S/m).
    pub conductivity: f64,

    /// Polarisation of the modeled wave.
    pub polarisation: Polarisation,
}

/// Options of the residue series summation.
///
/// The defaults sum exactly [`RESIDUE_TERM_COUNT`] terms, whatever their size,
/// which reproduces reference outputs. Setting a tolerance opts in to stopping
/// early, once a term is smaller than `tolerance × |sum|`. That changes the
/// result in the last digits and is never done silently.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Number of terms summed (or the cap, with a tolerance set).
    pub max_terms: usize,

    /// Relative size of a term at which summation may stop.
    pub convergence_tolerance: Option<f64>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        SeriesConfig {
            max_terms: RESIDUE_TERM_COUNT,
            convergence_tolerance: None,
        }
    }
}

/// Kernel options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Residue series summation.
    pub series: SeriesConfig,

    /// Cap on Newton steps when polishing each root.
    pub max_root_iterations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            series: SeriesConfig::default(),
            max_root_iterations: MAX_ROOT_ITERATIONS,
        }
    }
}

impl Options {
    /// Checks the options make sense.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.series.max_terms == 0 {
            return Err(ConfigError::NoTerms);
        }

        if let Some(tolerance) = self.series.convergence_tolerance {
            if !(tolerance > 0.0 && tolerance.is_finite()) {
                return Err(ConfigError::Tolerance(tolerance));
            }
        }

        if self.max_root_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }

        Ok(())
    }
}

/// The outcome of a successful prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Basic transmission loss (dB).
    pub basic_loss: f64,

    /// Received field strength (dB(µV/m)).
    pub field_strength: f64,

    /// Received power (dBm).
    pub received_power: f64,

    /// Solver that produced the field.
    pub method: Method,

    /// Heights clamped during validation.
    pub correction: Correction,
}

impl Prediction {
    /// Status code: success, or which heights were clamped.
    pub fn status_code(&self) -> i32 {
        self.correction.status_code()
    }
}

/// Predicts groundwave propagation for one request, with default options.
pub fn predict(record: &InputRecord) -> GroundwaveResult<Prediction> {
    predict_with(record, &Options::default(), &mut Silent)
}

/// Predicts groundwave propagation for one request.
///
/// `probe` is told about every intermediate step, see [`TraceEvent`]. Pass
/// [`Silent`] to ignore them.
///
/// ## Errors
///
/// Errors early, so one error may shadow another:
///
///  - invalid `options` give a [`ConfigError`];
///  - the first failed validation rule gives a [`ValidationError`];
///  - a failure of the residue series gives a [`NumericalError`].
pub fn predict_with<P>(
    record: &InputRecord,
    options: &Options,
    probe: &mut P,
) -> GroundwaveResult<Prediction>
where
    P: Probe + ?Sized,
{
    options.check()?;

    let validated = validate(record)?;
    probe.event(&TraceEvent::Validated {
        correction: validated.correction,
    });

    if validated.correction != Correction::None {
        tracing::debug!(
            correction = ?validated.correction,
            tx_height = validated.request.tx_height,
            rx_height = validated.request.rx_height,
            "antenna heights clamped"
        );
    }

    let geometry = DerivedGeometry::new(&validated.request);
    probe.event(&TraceEvent::Geometry(&geometry));

    let method = geometry.method();
    let transition_distance = geometry.transition_distance();
    probe.event(&TraceEvent::MethodSelected {
        method,
        transition_distance,
    });
    tracing::debug!(
        ?method,
        distance = geometry.distance,
        transition_distance,
        "solver selected"
    );

    let normalized = match method {
        Method::FlatEarthCurve => flat_earth::field(&geometry),
        Method::ResidueSeries => {
            residue::field(&geometry, options, probe).map_err(|error| {
                tracing::warn!(%error, "residue series failed");
                error
            })?
        }
    };

    if !normalized.is_finite() {
        let error = NumericalError::NonFiniteField {
            stage: "normalized field",
        };
        tracing::warn!(%error, ?method, "solver produced a non-finite field");
        return Err(error.into());
    }

    probe.event(&TraceEvent::FieldComputed { normalized });

    let prediction = output::compose(normalized, &validated.request, method, validated.correction);

    if !(prediction.basic_loss.is_finite()
        && prediction.field_strength.is_finite()
        && prediction.received_power.is_finite())
    {
        let error = NumericalError::NonFiniteField { stage: "output" };
        tracing::warn!(%error, normalized, "field does not convert to decibels");
        return Err(error.into());
    }

    Ok(prediction)
}

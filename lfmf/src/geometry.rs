//! Derived geometry and ground parameters.
//!
//! Everything the solvers need is a pure function of the validated request.
//! Distances are kept in kilometres throughout, so the wave number is in
//! radians per kilometre.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::{Method, Polarisation, Request, EARTH_RADIUS, SPEED_OF_LIGHT, VACUUM_PERMITTIVITY};

/// Wavelength (m) at a frequency (MHz).
pub fn wavelength(frequency: f64) -> f64 {
    SPEED_OF_LIGHT / (frequency * 1e6)
}

/// Effective Earth radius (km), corrected for refraction.
///
/// See ITU-R P.368 and the exponential refractivity model of Bean and Thayer.
pub fn effective_earth_radius(surface_refractivity: f64) -> f64 {
    EARTH_RADIUS / (1.0 - 0.04665 * (0.005577 * surface_refractivity).exp())
}

/// Distance (km) below which the flat-Earth solver is used.
pub fn transition_distance(frequency: f64) -> f64 {
    80.0 * frequency.powf(-1.0 / 3.0)
}

/// Solver for a path length at a frequency (MHz).
///
/// A hard threshold: paths exactly at the transition use the residue series.
pub fn select_method(distance: f64, frequency: f64) -> Method {
    if distance < transition_distance(frequency) {
        Method::FlatEarthCurve
    } else {
        Method::ResidueSeries
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedGeometry {
    /// Frequency (MHz).
    pub frequency: f64,

    /// Wavelength (m).
    pub wavelength: f64,

    /// Effective Earth radius (km).
    pub effective_radius: f64,

    /// Wave number (rad/km).
    pub wave_number: f64,

    /// Fock's scaling constant _ν = (a_e k / 2)^(1/3)_.
    pub nu: f64,

    /// Complex relative permittivity of the ground.
    pub eta: Complex64,

    /// Normalised surface impedance.
    pub delta: Complex64,

    /// Fock's parameter _q = -iνδ_.
    pub q: Complex64,

    /// Lower antenna height (km).
    pub low_height: f64,

    /// Higher antenna height (km).
    pub high_height: f64,

    /// Path length (km).
    pub distance: f64,

    /// Angular path length (rad).
    pub theta: f64,
}

impl DerivedGeometry {
    pub fn new(request: &Request) -> Self {
        let frequency = request.frequency;
        let wavelength = wavelength(frequency);
        let effective_radius = effective_earth_radius(request.surface_refractivity);
        let wave_number = 2.0 * PI / (wavelength / 1000.0);
        let nu = (effective_radius * wave_number / 2.0).cbrt();

        let eta = Complex64::new(
            request.permittivity,
            -request.conductivity / (2.0 * PI * VACUUM_PERMITTIVITY * frequency * 1e6),
        );

        let mut delta = (eta - 1.0).sqrt();
        if request.polarisation == Polarisation::Vertical {
            delta /= eta;
        }

        let q = -Complex64::i() * nu * delta;

        DerivedGeometry {
            frequency,
            wavelength,
            effective_radius,
            wave_number,
            nu,
            eta,
            delta,
            q,
            low_height: request.tx_height.min(request.rx_height) / 1000.0,
            high_height: request.tx_height.max(request.rx_height) / 1000.0,
            distance: request.distance,
            theta: request.distance / effective_radius,
        }
    }

    /// Normalised distance _x = νθ_.
    pub fn x(&self) -> f64 {
        self.nu * self.theta
    }

    /// Normalised heights _y = kh/ν_ of the (low, high) antennas.
    pub fn normalised_heights(&self) -> (f64, f64) {
        (
            self.wave_number * self.low_height / self.nu,
            self.wave_number * self.high_height / self.nu,
        )
    }

    pub fn transition_distance(&self) -> f64 {
        transition_distance(self.frequency)
    }

    pub fn method(&self) -> Method {
        select_method(self.distance, self.frequency)
    }
}

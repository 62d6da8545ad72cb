//! Input validation.
//!
//! Rules are checked in a fixed order and the first hard failure wins. Antenna
//! heights above the upper bound of the groundwave theory are not failures:
//! they are clamped to that bound and the clamp is reported alongside the
//! result.

use crate::error::ValidationError;
use crate::geometry::wavelength;
use crate::record::InputRecord;
use crate::{Correction, Polarisation, Request};

/// Lowest frequency handled (MHz).
pub const MIN_FREQUENCY: f64 = 0.01;
/// Highest frequency handled (MHz).
pub const MAX_FREQUENCY: f64 = 30.0;
/// Lowest surface refractivity (N-units).
pub const MIN_SURFACE_REFRACTIVITY: f64 = 250.0;
/// Highest surface refractivity (N-units).
pub const MAX_SURFACE_REFRACTIVITY: f64 = 400.0;
/// Shortest path (km).
pub const MIN_DISTANCE: f64 = 0.001;
/// Longest path (km).
pub const MAX_DISTANCE: f64 = 10_000.0;

/// A request that passed validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedParameters {
    /// The request, heights within `[0, upper bound]`.
    pub request: Request,

    /// Which heights were clamped.
    pub correction: Correction,
}

/// Highest antenna height the groundwave method applies to (m).
///
/// _1.2 √σ λ^1.5_, with λ the wavelength in metres.
pub fn height_upper_bound(sigma: f64, frequency: f64) -> f64 {
    1.2 * sigma.sqrt() * wavelength(frequency).powf(1.5)
}

/// Checks and corrects a raw input record.
///
/// NaN fails whichever range check it is subject to.
pub fn validate(record: &InputRecord) -> Result<ValidatedParameters, ValidationError> {
    let upper_bound = height_upper_bound(record.sigma, record.frequency);

    let mut tx_height = record.tx_height;
    let mut rx_height = record.rx_height;

    if !(tx_height >= 0.0) {
        return Err(ValidationError::TxHeight(tx_height));
    }
    let tx_clamped = tx_height > upper_bound;
    if tx_clamped {
        tx_height = upper_bound;
    }

    if !(rx_height >= 0.0) {
        return Err(ValidationError::RxHeight(rx_height));
    }
    let rx_clamped = rx_height > upper_bound;
    if rx_clamped {
        rx_height = upper_bound;
    }

    if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&record.frequency) {
        return Err(ValidationError::Frequency(record.frequency));
    }

    if !(record.power > 0.0) {
        return Err(ValidationError::TxPower(record.power));
    }

    if !(MIN_SURFACE_REFRACTIVITY..=MAX_SURFACE_REFRACTIVITY)
        .contains(&record.surface_refractivity)
    {
        return Err(ValidationError::SurfaceRefractivity(
            record.surface_refractivity,
        ));
    }

    if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&record.distance) {
        return Err(ValidationError::PathDistance(record.distance));
    }

    if !(record.epsilon >= 1.0) {
        return Err(ValidationError::Epsilon(record.epsilon));
    }

    if !(record.sigma > 0.0) {
        return Err(ValidationError::Sigma(record.sigma));
    }

    let polarisation =
        Polarisation::from_code(record.pol).ok_or(ValidationError::Polarisation(record.pol))?;

    Ok(ValidatedParameters {
        request: Request {
            tx_height,
            rx_height,
            frequency: record.frequency,
            power: record.power,
            surface_refractivity: record.surface_refractivity,
            distance: record.distance,
            permittivity: record.epsilon,
            conductivity: record.sigma,
            polarisation,
        },
        correction: Correction::from_flags(tx_clamped, rx_clamped),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land() -> InputRecord {
        InputRecord {
            tx_height: 10.0,
            rx_height: 2.0,
            frequency: 0.5,
            power: 1000.0,
            surface_refractivity: 301.0,
            distance: 100.0,
            epsilon: 15.0,
            sigma: 0.005,
            pol: 1,
        }
    }

    #[test]
    fn passes_through_valid_input() {
        let validated = validate(&land()).unwrap();
        assert_eq!(validated.correction, Correction::None);
        assert_eq!(validated.request.tx_height, 10.0);
        assert_eq!(validated.request.polarisation, Polarisation::Vertical);
        assert_eq!(validated.request.permittivity, 15.0);
    }

    #[test]
    fn upper_bound_for_average_land() {
        // λ = 599.585 m at 0.5 MHz
        let ub = height_upper_bound(0.005, 0.5);
        assert!((ub - 1247.0).abs() < 1.0, "{}", ub);
    }

    #[test]
    fn clamps_to_upper_bound_exactly() {
        let ub = height_upper_bound(0.005, 0.5);

        let mut record = land();
        record.tx_height = 5000.0;
        let validated = validate(&record).unwrap();
        assert_eq!(validated.correction, Correction::Tx);
        assert_eq!(validated.request.tx_height, ub);

        record.rx_height = 1e6;
        let validated = validate(&record).unwrap();
        assert_eq!(validated.correction, Correction::Both);
        assert_eq!(validated.request.rx_height, ub);

        record.tx_height = 0.0;
        let validated = validate(&record).unwrap();
        assert_eq!(validated.correction, Correction::Rx);
    }

    #[test]
    fn first_failure_wins() {
        let mut record = land();
        record.rx_height = -1.0;
        record.frequency = 100.0;
        record.pol = 9;
        assert_eq!(validate(&record), Err(ValidationError::RxHeight(-1.0)));

        record.rx_height = 1.0;
        assert_eq!(validate(&record), Err(ValidationError::Frequency(100.0)));

        record.frequency = 1.0;
        assert_eq!(validate(&record), Err(ValidationError::Polarisation(9)));
    }

    #[test]
    fn each_range_is_checked() {
        let cases: [(fn(&mut InputRecord), i32); 12] = [
            (|r| r.tx_height = -0.1, 1000),
            (|r| r.rx_height = -0.1, 1001),
            (|r| r.frequency = 0.0099, 1002),
            (|r| r.frequency = 30.01, 1002),
            (|r| r.power = 0.0, 1003),
            (|r| r.surface_refractivity = 249.0, 1004),
            (|r| r.surface_refractivity = 401.0, 1004),
            (|r| r.distance = 0.0009, 1005),
            (|r| r.distance = 10_001.0, 1005),
            (|r| r.epsilon = 0.99, 1006),
            (|r| r.sigma = 0.0, 1007),
            (|r| r.pol = 2, 1008),
        ];

        for &(mutate, code) in cases.iter() {
            let mut record = land();
            mutate(&mut record);
            assert_eq!(validate(&record).unwrap_err().status_code(), code);
        }
    }

    #[test]
    fn range_ends_are_inclusive() {
        for &f in &[MIN_FREQUENCY, MAX_FREQUENCY] {
            let record = InputRecord {
                frequency: f,
                ..land()
            };
            assert!(validate(&record).is_ok(), "f = {}", f);
        }

        for &d in &[MIN_DISTANCE, MAX_DISTANCE] {
            let record = InputRecord {
                distance: d,
                ..land()
            };
            assert!(validate(&record).is_ok(), "d = {}", d);
        }
    }

    #[test]
    fn nan_fails() {
        let record = InputRecord {
            tx_height: f64::NAN,
            ..land()
        };
        assert_eq!(validate(&record).unwrap_err().status_code(), 1000);

        let record = InputRecord {
            power: f64::NAN,
            ..land()
        };
        assert_eq!(validate(&record).unwrap_err().status_code(), 1003);
    }
}

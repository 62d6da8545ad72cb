//! Turning the normalised field into decibel results.
//!
//! All three results come from one Friis-type relation between the field at the
//! receiver and the power radiated, so they stay consistent with each other:
//! `P = E + G - 20 log f + 42.8` holds for every prediction.

use std::f64::consts::PI;

use crate::formulae::{db_field, db_power, from_db_power};
use crate::{Correction, Method, Prediction, Request, ANTENNA_GAIN_DBI, FREE_SPACE_IMPEDANCE, SPEED_OF_LIGHT};

/// Constant of the dBm / dB(µV/m) conversion for a short monopole.
const POWER_CONVERSION_DB: f64 = 42.8;

/// Field of the transmitter in free space at the path distance (V/km, or mV/m).
pub fn free_space_field(power: f64, distance: f64) -> f64 {
    let eirp = power * from_db_power(ANTENNA_GAIN_DBI);
    (FREE_SPACE_IMPEDANCE * eirp / (4.0 * PI)).sqrt() / distance
}

/// Composes the final results from a normalised field.
pub fn compose(normalized: f64, request: &Request, method: Method, correction: Correction) -> Prediction {
    let field = normalized * free_space_field(request.power, request.distance);
    let frequency_hz = request.frequency * 1e6;
    let eirp = request.power * from_db_power(ANTENNA_GAIN_DBI);

    let basic_loss = db_power(eirp) + db_power(FREE_SPACE_IMPEDANCE * 4.0 * PI) + db_field(frequency_hz)
        - db_field(field / 1000.0)
        - db_field(SPEED_OF_LIGHT);

    let field_strength = 60.0 + db_field(field);
    let received_power = field_strength + ANTENNA_GAIN_DBI - db_field(frequency_hz) + POWER_CONVERSION_DB;

    Prediction {
        basic_loss,
        field_strength,
        received_power,
        method,
        correction,
    }
}

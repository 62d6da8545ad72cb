//! Flat input and output records, as exchanged with callers and files.
//!
//! Field names follow the `quantity__unit` convention of the reference tool.

use serde::{Deserialize, Serialize};

use crate::error::GroundwaveResult;
use crate::{Polarisation, Prediction, Request};

/// No error, no correction.
pub const SUCCESS: i32 = 0;
/// The transmitter height was clamped to its upper bound.
pub const TX_HEIGHT_CLAMPED: i32 = 2000;
/// The receiver height was clamped to its upper bound.
pub const RX_HEIGHT_CLAMPED: i32 = 2001;
/// Both heights were clamped.
pub const TX_AND_RX_HEIGHTS_CLAMPED: i32 = 2002;

/// One request, as a flat record.
///
/// The polarisation is kept as its raw wire code so that invalid codes reach
/// validation and are reported there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Transmitter height (m).
    #[serde(rename = "h_tx__meter")]
    pub tx_height: f64,

    /// Receiver height (m).
    #[serde(rename = "h_rx__meter")]
    pub rx_height: f64,

    /// Frequency (MHz).
    #[serde(rename = "f__mhz")]
    pub frequency: f64,

    /// Transmitter power (W).
    #[serde(rename = "P_tx__watt")]
    pub power: f64,

    /// Surface refractivity (N-units).
    #[serde(rename = "N_s")]
    pub surface_refractivity: f64,

    /// Path distance (km).
    #[serde(rename = "d__km")]
    pub distance: f64,

    /// Relative permittivity.
    pub epsilon: f64,

    /// Conductivity (S/m).
    pub sigma: f64,

    /// Polarisation code: 0 horizontal, 1 vertical.
    pub pol: i32,
}

impl From<Request> for InputRecord {
    fn from(request: Request) -> Self {
        InputRecord {
            tx_height: request.tx_height,
            rx_height: request.rx_height,
            frequency: request.frequency,
            power: request.power,
            surface_refractivity: request.surface_refractivity,
            distance: request.distance,
            epsilon: request.permittivity,
            sigma: request.conductivity,
            pol: Polarisation::code(request.polarisation),
        }
    }
}

/// One result, as a flat record.
///
/// On failure every numeric field is zero and `status_code` says why.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Basic transmission loss (dB).
    #[serde(rename = "A_dB")]
    pub basic_loss: f64,

    /// Field strength (dB(µV/m)).
    #[serde(rename = "E_dB_uVm")]
    pub field_strength: f64,

    /// Received power (dBm).
    #[serde(rename = "P_dBm")]
    pub received_power: f64,

    /// 0 flat Earth with curvature correction, 1 residue series.
    pub method_code: i32,

    /// 0 success, 1000-series validation failure, 2000-series height
    /// correction, 3000-series numerical failure, 4000 bad options.
    pub status_code: i32,
}

impl OutputRecord {
    /// A failed result: zeroed fields and the failure's code.
    pub fn failure(status_code: i32) -> Self {
        OutputRecord {
            status_code,
            ..OutputRecord::default()
        }
    }
}

impl From<Prediction> for OutputRecord {
    fn from(prediction: Prediction) -> Self {
        OutputRecord {
            basic_loss: prediction.basic_loss,
            field_strength: prediction.field_strength,
            received_power: prediction.received_power,
            method_code: prediction.method.code(),
            status_code: prediction.status_code(),
        }
    }
}

impl From<GroundwaveResult<Prediction>> for OutputRecord {
    fn from(result: GroundwaveResult<Prediction>) -> Self {
        match result {
            Ok(prediction) => prediction.into(),
            Err(error) => OutputRecord::failure(error.status_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GroundwaveError, ValidationError};
    use crate::{Correction, Method};

    #[test]
    fn input_uses_wire_names() {
        let json = r#"{"h_tx__meter":10,"h_rx__meter":2,"f__mhz":0.5,"P_tx__watt":1000,"N_s":301,"d__km":200,"epsilon":15,"sigma":0.005,"pol":1}"#;
        let record: InputRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.tx_height, 10.0);
        assert_eq!(record.rx_height, 2.0);
        assert_eq!(record.distance, 200.0);
        assert_eq!(record.pol, 1);
    }

    #[test]
    fn request_converts_to_record() {
        let request = Request {
            permittivity: 80.0,
            conductivity: 5.0,
            polarisation: Polarisation::Vertical,
            ..Request::default()
        };

        let record = InputRecord::from(request);
        assert_eq!(record.epsilon, 80.0);
        assert_eq!(record.sigma, 5.0);
        assert_eq!(record.pol, 1);
    }

    #[test]
    fn failures_zero_the_numbers() {
        let result: GroundwaveResult<Prediction> =
            Err(GroundwaveError::from(ValidationError::Sigma(0.0)));
        let output = OutputRecord::from(result);

        assert_eq!(output, OutputRecord::failure(1007));
        assert_eq!(output.basic_loss, 0.0);
        assert_eq!(output.method_code, 0);
    }

    #[test]
    fn output_uses_wire_names() {
        let output = OutputRecord::from(Prediction {
            basic_loss: 120.0,
            field_strength: 40.0,
            received_power: -60.0,
            method: Method::ResidueSeries,
            correction: Correction::Rx,
        });

        let json: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(json["A_dB"], 120.0);
        assert_eq!(json["E_dB_uVm"], 40.0);
        assert_eq!(json["P_dBm"], -60.0);
        assert_eq!(json["method_code"], 1);
        assert_eq!(json["status_code"], 2001);
    }
}

//! Sites, transmitters, and the links between them.
//!
//! A link is the friendlier way to ask for a prediction: give the two sites by
//! position and the distance is worked out along the great circle.

use geo::{HaversineDistance, Point};
use lfmf::{InputRecord, Polarisation};
use serde::Deserialize;

/// Base site definition.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Site {
    /// Latitude (degrees north)
    pub latitude: f64,

    /// Longitude (degrees east)
    pub longitude: f64,

    /// How high above ground (m)
    pub aboveground: f64,

    /// What it's called
    #[serde(default)]
    pub name: String,
}

impl Site {
    pub fn position(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// An RF transmitter and its parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Transmitter {
    #[serde(flatten)]
    pub site: Site,

    /// Earth Dielectric Constant (Relative permittivity)
    pub dielectric: f64,

    /// Earth Conductivity (Siemens per metre)
    pub conductivity: f64,

    /// Atmospheric Bending Constant (N-units)
    pub bending: f64,

    /// Site frequency (MHz)
    pub frequency: f64,

    /// Transmitter power (W)
    pub power: f64,

    /// Polarisation
    #[serde(default)]
    pub polarisation: Polarisation,
}

/// A transmitter and a receiving site.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Link {
    pub transmitter: Transmitter,
    pub receiver: Site,
}

impl Link {
    /// Great-circle distance between the sites (km).
    pub fn distance(&self) -> f64 {
        let tx = self.transmitter.site.position();
        let rx = self.receiver.position();
        tx.haversine_distance(&rx) / 1000.0
    }

    /// The kernel request for this link.
    pub fn record(&self) -> InputRecord {
        let tx = &self.transmitter;

        InputRecord {
            tx_height: tx.site.aboveground,
            rx_height: self.receiver.aboveground,
            frequency: tx.frequency,
            power: tx.power,
            surface_refractivity: tx.bending,
            distance: self.distance(),
            epsilon: tx.dielectric,
            sigma: tx.conductivity,
            pol: tx.polarisation.code(),
        }
    }
}

/// One line of batch input: a raw record, or a link to resolve.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Row {
    Link(Link),
    Record(InputRecord),
}

impl Row {
    pub fn record(&self) -> InputRecord {
        match self {
            Row::Link(link) => link.record(),
            Row::Record(record) => *record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LINK: &str = r#"{
        "transmitter": {
            "name": "Titahi Bay",
            "latitude": -41.1, "longitude": 174.833, "aboveground": 220,
            "dielectric": 15, "conductivity": 0.005, "bending": 301,
            "frequency": 0.567, "power": 50000, "polarisation": "Vertical"
        },
        "receiver": { "latitude": -43.53, "longitude": 172.63, "aboveground": 2 }
    }"#;

    #[test]
    fn link_resolves_to_record() {
        let row: Row = serde_json::from_str(LINK).unwrap();
        let record = row.record();

        // Wellington to Christchurch, roughly
        assert!(record.distance > 320.0 && record.distance < 340.0, "{}", record.distance);
        assert_eq!(record.tx_height, 220.0);
        assert_eq!(record.rx_height, 2.0);
        assert_eq!(record.surface_refractivity, 301.0);
        assert_eq!(record.pol, 1);
    }

    #[test]
    fn raw_record_passes_through() {
        let json = r#"{"h_tx__meter":10,"h_rx__meter":2,"f__mhz":0.5,"P_tx__watt":1000,"N_s":301,"d__km":200,"epsilon":15,"sigma":0.005,"pol":7}"#;
        let row: Row = serde_json::from_str(json).unwrap();

        assert!(matches!(row, Row::Record(_)));
        assert_eq!(row.record().pol, 7);
    }

    #[test]
    fn a_degree_of_meridian() {
        let link = Link {
            transmitter: Transmitter {
                site: Site {
                    latitude: 0.0,
                    longitude: 10.0,
                    aboveground: 0.0,
                    name: String::new(),
                },
                dielectric: 80.0,
                conductivity: 5.0,
                bending: 315.0,
                frequency: 0.2,
                power: 1.0,
                polarisation: Polarisation::Horizontal,
            },
            receiver: Site {
                latitude: 1.0,
                longitude: 10.0,
                aboveground: 0.0,
                name: String::new(),
            },
        };

        assert_relative_eq!(link.distance(), 111.195, max_relative = 1e-4);
    }
}

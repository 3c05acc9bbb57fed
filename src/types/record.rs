use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const METERS_PER_FOOT: f64 = 0.3048;

/// Line terminator written after every coordinate record
pub const RECORD_TERMINATOR: &str = "\r\n";

/// One KML coordinate tuple taken from an accepted row
///
/// Latitude and longitude keep the exact text from the log so no precision is
/// lost on the way through; only the altitude is computed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinateRecord {
    pub longitude: String,
    pub latitude: String,
    pub altitude_m: f64,
}

impl CoordinateRecord {
    pub fn from_feet(longitude: &str, latitude: &str, altitude_ft: f64) -> Self {
        Self {
            longitude: longitude.to_string(),
            latitude: latitude.to_string(),
            altitude_m: feet_to_meters(altitude_ft),
        }
    }

    /// Serialized form appended to a session document, CRLF included
    pub fn to_kml_line(&self) -> String {
        format!("{}{}", self, RECORD_TERMINATOR)
    }
}

impl fmt::Display for CoordinateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.longitude,
            self.latitude,
            format_altitude(self.altitude_m)
        )
    }
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

/// Shortest round-trip decimal, always with a fractional part (`0.0`, `30.48`)
///
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent form with a
/// signed, at least two-digit exponent (`3.048e-05`, `1e+16`).
pub fn format_altitude(meters: f64) -> String {
    if meters.is_nan() {
        return "nan".to_string();
    }
    if meters.is_infinite() {
        return if meters > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", meters);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if meters != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    if meters.fract() == 0.0 {
        format!("{:.1}", meters)
    } else {
        meters.to_string()
    }
}

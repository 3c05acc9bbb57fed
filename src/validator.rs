//! Row acceptance rules
//!
//! Decides whether a log row carries a usable GPS position and turns it into a
//! [`CoordinateRecord`]. Rejection is the normal outcome for rows logged
//! without a fix, so it is reported as `Ok(None)` and never as an error.
//! Only a non-blank field that fails to parse as a number aborts the run.

use std::str::FromStr;

use crate::config::{DEFAULT_MIN_FIX_QUALITY, DEFAULT_MIN_SATELLITES};
use crate::error::{ConvertError, Result};
use crate::types::{
    CoordinateRecord, Row, GPS_ALTITUDE_FEET, GPS_DATE_TIME, GPS_FIX_QUALITY, LATITUDE_DEG,
    LONGITUDE_DEG, NUMBER_OF_SATELLITES,
};

/// GPS quality thresholds applied to every row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowValidator {
    pub min_fix_quality: i64,
    pub min_satellites: i64,
}

impl Default for RowValidator {
    fn default() -> Self {
        Self {
            min_fix_quality: DEFAULT_MIN_FIX_QUALITY,
            min_satellites: DEFAULT_MIN_SATELLITES,
        }
    }
}

impl RowValidator {
    pub fn new(min_fix_quality: i64, min_satellites: i64) -> Self {
        Self {
            min_fix_quality,
            min_satellites,
        }
    }

    /// Validate one row
    ///
    /// Checks, in order:
    /// 1. fix quality, satellite count and GPS timestamp are present
    /// 2. fix quality and satellite count meet the minimums
    /// 3. latitude, longitude and altitude are present
    pub fn validate(&self, row: &Row) -> Result<Option<CoordinateRecord>> {
        let (fix_quality, num_sats) = match (
            row.non_blank(GPS_FIX_QUALITY),
            row.non_blank(NUMBER_OF_SATELLITES),
            row.non_blank(GPS_DATE_TIME),
        ) {
            (Some(fix), Some(sats), Some(_)) => (fix, sats),
            _ => return Ok(None),
        };

        let fix_quality: i64 = parse_field(row, GPS_FIX_QUALITY, fix_quality)?;
        let num_sats: i64 = parse_field(row, NUMBER_OF_SATELLITES, num_sats)?;
        if fix_quality < self.min_fix_quality || num_sats < self.min_satellites {
            return Ok(None);
        }

        let (latitude, longitude, altitude) = match (
            row.non_blank(LATITUDE_DEG),
            row.non_blank(LONGITUDE_DEG),
            row.non_blank(GPS_ALTITUDE_FEET),
        ) {
            (Some(lat), Some(lon), Some(alt)) => (lat, lon, alt),
            _ => return Ok(None),
        };

        let altitude_ft: f64 = parse_field(row, GPS_ALTITUDE_FEET, altitude)?;
        Ok(Some(CoordinateRecord::from_feet(
            longitude,
            latitude,
            altitude_ft,
        )))
    }
}

/// Parse a non-blank field, mapping failure to [`ConvertError::MalformedNumericField`]
pub(crate) fn parse_field<T: FromStr>(row: &Row, column: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConvertError::MalformedNumericField {
            column: column.to_string(),
            value: value.to_string(),
            row: row.index(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeaderIndex;
    use csv::StringRecord;
    use std::rc::Rc;

    const HEADER: [&str; 6] = [
        GPS_FIX_QUALITY,
        NUMBER_OF_SATELLITES,
        GPS_DATE_TIME,
        LATITUDE_DEG,
        LONGITUDE_DEG,
        GPS_ALTITUDE_FEET,
    ];

    fn row(fields: [&str; 6]) -> Row {
        let header = Rc::new(HeaderIndex::from_record(&StringRecord::from(HEADER.to_vec())));
        Row::new(0, header, StringRecord::from(fields.to_vec()))
    }

    fn good() -> [&'static str; 6] {
        ["1", "8", "2021-06-01T12:00:00", "47.4500", "-122.3080", "100"]
    }

    #[test]
    fn test_accepts_good_row() {
        let record = RowValidator::default().validate(&row(good())).unwrap().unwrap();
        assert_eq!(record.longitude, "-122.3080");
        assert_eq!(record.latitude, "47.4500");
        assert!((record.altitude_m - 30.48).abs() < 1e-9);
        assert!(record.to_kml_line().starts_with("-122.3080,47.4500,30.48"));
        assert!(record.to_kml_line().ends_with("\r\n"));
    }

    #[test]
    fn test_same_row_same_result() {
        let validator = RowValidator::default();
        let a = validator.validate(&row(good())).unwrap();
        let b = validator.validate(&row(good())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_blank_gps_status_fields() {
        let validator = RowValidator::default();
        for blank in 0..3 {
            let mut fields = good();
            fields[blank] = "";
            assert_eq!(validator.validate(&row(fields)).unwrap(), None);
        }
    }

    #[test]
    fn test_rejects_below_thresholds() {
        let validator = RowValidator::default();

        let mut no_fix = good();
        no_fix[0] = "0";
        assert_eq!(validator.validate(&row(no_fix)).unwrap(), None);

        let mut few_sats = good();
        few_sats[1] = "3";
        assert_eq!(validator.validate(&row(few_sats)).unwrap(), None);

        let mut boundary = good();
        boundary[0] = "1";
        boundary[1] = "4";
        assert!(validator.validate(&row(boundary)).unwrap().is_some());
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = RowValidator::new(2, 6);
        assert_eq!(strict.validate(&row(good())).unwrap(), None);

        let lenient = RowValidator::new(0, 0);
        let mut no_fix = good();
        no_fix[0] = "0";
        no_fix[1] = "0";
        assert!(lenient.validate(&row(no_fix)).unwrap().is_some());
    }

    #[test]
    fn test_rejects_missing_position() {
        let validator = RowValidator::default();
        for blank in 3..6 {
            let mut fields = good();
            fields[blank] = " ";
            assert_eq!(validator.validate(&row(fields)).unwrap(), None);
        }
    }

    #[test]
    fn test_threshold_rejection_wins_over_missing_position() {
        let mut fields = good();
        fields[0] = "0";
        fields[5] = "not a number";
        assert_eq!(RowValidator::default().validate(&row(fields)).unwrap(), None);
    }

    #[test]
    fn test_malformed_numbers_are_fatal() {
        let validator = RowValidator::default();

        let mut bad_fix = good();
        bad_fix[0] = "1.5";
        match validator.validate(&row(bad_fix)) {
            Err(ConvertError::MalformedNumericField { column, value, .. }) => {
                assert_eq!(column, GPS_FIX_QUALITY);
                assert_eq!(value, "1.5");
            }
            other => panic!("expected MalformedNumericField, got {other:?}"),
        }

        let mut bad_alt = good();
        bad_alt[5] = "high";
        assert!(matches!(
            validator.validate(&row(bad_alt)),
            Err(ConvertError::MalformedNumericField { .. })
        ));
    }
}

use csv::StringRecord;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{ConvertError, Result};

pub const SESSION_TIME: &str = "Session Time";
pub const GPS_FIX_QUALITY: &str = "GPS Fix Quality";
pub const NUMBER_OF_SATELLITES: &str = "Number of Satellites";
pub const GPS_DATE_TIME: &str = "GPS Date & Time";
pub const LATITUDE_DEG: &str = "Latitude (deg)";
pub const LONGITUDE_DEG: &str = "Longitude (deg)";
pub const GPS_ALTITUDE_FEET: &str = "GPS Altitude (feet)";

/// Columns read by the conversion pass
pub const CONVERSION_COLUMNS: [&str; 7] = [
    SESSION_TIME,
    GPS_FIX_QUALITY,
    NUMBER_OF_SATELLITES,
    GPS_DATE_TIME,
    LATITUDE_DEG,
    LONGITUDE_DEG,
    GPS_ALTITUDE_FEET,
];

/// Column name to field position, built once per pass from the header row
#[derive(Debug, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_record(header: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (position, name) in header.iter().enumerate() {
            // First occurrence wins for duplicated column names
            positions.entry(name.trim().to_string()).or_insert(position);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Fails with [`ConvertError::MissingColumn`] for the first absent column
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        match columns.iter().find(|c| self.position(c).is_none()) {
            Some(missing) => Err(ConvertError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// One data row of the log
///
/// Rows borrow nothing from the reader; each owns its record and shares the
/// header index of the pass that produced it.
#[derive(Debug, Clone)]
pub struct Row {
    index: usize,
    header: Rc<HeaderIndex>,
    record: StringRecord,
}

impl Row {
    pub fn new(index: usize, header: Rc<HeaderIndex>, record: StringRecord) -> Self {
        Self {
            index,
            header,
            record,
        }
    }

    /// Zero-based position of this row among the data rows
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw field text, `None` if the column is unknown or the row is short
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .position(column)
            .and_then(|position| self.record.get(position))
    }

    pub fn header(&self) -> &HeaderIndex {
        &self.header
    }

    /// Field text if present and not blank
    pub fn non_blank(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.trim().is_empty())
    }
}

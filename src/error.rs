use std::fmt;
use std::path::PathBuf;

/// Errors that abort a conversion run
///
/// Data-quality problems (blank fields, weak GPS fixes, empty sessions) are not
/// errors; they only show up in [`crate::RunStats`].
#[derive(Debug)]
pub enum ConvertError {
    /// I/O errors without a more specific location
    Io(std::io::Error),
    /// An output resource could not be created, written or removed
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    /// CSV decoding errors
    Csv(csv::Error),
    /// A column required by a pass is not in the header row
    MissingColumn(String),
    /// A non-blank field that must be numeric failed to parse
    MalformedNumericField {
        column: String,
        value: String,
        row: usize,
    },
    /// Template loading or substitution errors
    Template(String),
    /// Invalid configuration
    Config(String),
    /// The conversion pass read a different number of rows than the index pass
    PassMismatch { indexed: usize, converted: usize },
}

impl ConvertError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Output {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io(err) => write!(f, "I/O error: {}", err),
            ConvertError::Output { path, source } => {
                write!(f, "Output error for {}: {}", path.display(), source)
            }
            ConvertError::Csv(err) => write!(f, "CSV error: {}", err),
            ConvertError::MissingColumn(name) => write!(f, "Missing column: '{}'", name),
            ConvertError::MalformedNumericField { column, value, row } => write!(
                f,
                "Malformed numeric field: '{}' = {:?} at data row {}",
                column, value, row
            ),
            ConvertError::Template(msg) => write!(f, "Template error: {}", msg),
            ConvertError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ConvertError::PassMismatch { indexed, converted } => write!(
                f,
                "Input changed between passes: indexed {} rows, converted {}",
                indexed, converted
            ),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io(err) => Some(err),
            ConvertError::Output { source, .. } => Some(source),
            ConvertError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io(err)
    }
}

impl From<csv::Error> for ConvertError {
    fn from(err: csv::Error) -> Self {
        ConvertError::Csv(err)
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_malformed_field_message_names_column_and_row() {
        let err = ConvertError::MalformedNumericField {
            column: "GPS Fix Quality".to_string(),
            value: "x".to_string(),
            row: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("GPS Fix Quality"));
        assert!(msg.contains("\"x\""));
        assert!(msg.contains("row 7"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_output_error_keeps_source() {
        let err = ConvertError::output(
            "out/S001.kml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("out/S001.kml"));
        assert!(err.source().is_some());
    }
}

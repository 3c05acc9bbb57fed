//! UDL KML Library
//!
//! A Rust library for converting SkyView user data logs (CSV exports with a
//! `Session Time` column and GPS fields) into one KML track per recording
//! session, suitable for Google Earth and other viewers.
//!
//! # Features
//!
//! - **`cli`** (default): Build the `udl_kml` command-line binary
//! - **`serde`**: Enable serialization/deserialization of config and stats
//! - **`json`**: Enable `RunStats::to_json`
//!
//! # Quick Start
//!
//! Convert a log with the default settings (`output/<log>_S001.kml`, ...):
//! ```rust,no_run
//! use udl_kml::{convert_log, ConvertConfig};
//!
//! let config = ConvertConfig::new("user_data_log.csv");
//! let stats = convert_log(&config).unwrap();
//! println!("{stats}");
//! ```
//!
//! Lower-level control over thresholds, templates and the row source:
//! ```rust,no_run
//! use udl_kml::{
//!     convert_source, CsvFileSource, KmlTemplate, OutputPattern, RowValidator, SessionWriter,
//! };
//!
//! let pattern = OutputPattern::new("tracks/{session_number}.kml").unwrap();
//! let writer = SessionWriter::new(pattern, KmlTemplate::default());
//! let validator = RowValidator::new(1, 6);
//! let stats = convert_source(&CsvFileSource::new("udl.csv"), &validator, &writer).unwrap();
//! println!("{} of {} sessions written", stats.sessions_written, stats.sessions_detected);
//! ```
//!
//! # Public API
//!
//! ## Conversion
//! - [`convert_log`] - Prepare output and convert a log file from a [`ConvertConfig`]
//! - [`convert_source`] - Two-pass conversion of any [`RowSource`]
//! - [`ConversionDriver`] - Second-pass state machine
//!
//! ## Building Blocks
//! - [`build_session_index`] / [`index_session_times`] - Session boundary detection
//! - [`RowValidator`] - GPS quality filter producing [`CoordinateRecord`]s
//! - [`SessionWriter`] - Open, append, close and discard session documents
//! - [`KmlTemplate`] - Header/footer text with named placeholders
//! - [`prepare_output_dir`] - Create or recreate the output directory

// Module declarations
pub mod config;
pub mod error;
pub mod export;
pub mod indexer;
pub mod outdir;
pub mod parser;
pub mod template;
pub mod types;
pub mod validator;
pub mod writer;

// Re-export everything from modules for convenience
pub use config::*;
pub use error::*;
pub use export::*;
pub use indexer::*;
pub use outdir::*;
pub use parser::*;
pub use template::*;
pub use types::*;
pub use validator::*;
pub use writer::*;

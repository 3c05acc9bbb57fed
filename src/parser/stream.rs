//! Sequential row access to a user data log
//!
//! A [`RowSource`] can be opened any number of times; every opening yields the
//! same rows in the same order. The converter relies on this to read the log
//! once for indexing and once for conversion without holding it in memory.

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ConvertError, Result};
use crate::types::{HeaderIndex, Row};

/// Something that can produce a fresh forward-only pass over the log rows
pub trait RowSource {
    type Reader: Read;

    fn open_reader(&self) -> Result<Self::Reader>;

    /// Human-readable name used in log messages
    fn describe(&self) -> String;

    fn rows(&self) -> Result<Rows<Self::Reader>> {
        Rows::new(self.open_reader()?)
    }
}

/// CSV log on disk
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvFileSource {
    type Reader = File;

    fn open_reader(&self) -> Result<File> {
        File::open(&self.path).map_err(ConvertError::Io)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// CSV log held in memory
#[derive(Debug, Clone)]
pub struct CsvTextSource {
    text: String,
}

impl CsvTextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl RowSource for CsvTextSource {
    type Reader = Cursor<String>;

    fn open_reader(&self) -> Result<Cursor<String>> {
        Ok(Cursor::new(self.text.clone()))
    }

    fn describe(&self) -> String {
        format!("<{} bytes of CSV text>", self.text.len())
    }
}

/// Iterator over the data rows of one pass
///
/// The first line is the header. Rows may be shorter than the header; the
/// missing trailing fields read as absent.
pub struct Rows<R: Read> {
    reader: csv::Reader<R>,
    header: Rc<HeaderIndex>,
    next_index: usize,
}

impl<R: Read> Rows<R> {
    pub fn new(input: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        let header = Rc::new(HeaderIndex::from_record(reader.headers()?));
        Ok(Self {
            reader,
            header,
            next_index: 0,
        })
    }

}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let row = Row::new(self.next_index, Rc::clone(&self.header), record);
                self.next_index += 1;
                Some(Ok(row))
            }
            Ok(false) => None,
            Err(err) => Some(Err(ConvertError::Csv(err))),
        }
    }
}

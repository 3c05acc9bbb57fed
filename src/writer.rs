//! Session document lifecycle
//!
//! [`SessionWriter::open`] creates a document and writes the rendered header,
//! [`SessionFile::append`] adds one coordinate line, and
//! [`SessionFile::close`] writes the footer and releases the file. A
//! [`ClosedSession`] that never received a record can be discarded, which
//! removes it from disk.
//!
//! The open file is owned by [`SessionFile`], so it is released on every exit
//! path, including an error unwinding out of the conversion loop.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputPattern;
use crate::error::{ConvertError, Result};
use crate::template::KmlTemplate;
use crate::types::CoordinateRecord;

/// `S001`, `S002`, ... `S999`, `S1000`
pub fn session_id(ordinal: usize) -> String {
    format!("S{:03}", ordinal)
}

/// Opens session documents from an output pattern and a template
#[derive(Debug, Clone)]
pub struct SessionWriter {
    pattern: OutputPattern,
    template: KmlTemplate,
}

impl SessionWriter {
    pub fn new(pattern: OutputPattern, template: KmlTemplate) -> Self {
        Self { pattern, template }
    }

    pub fn path_for(&self, ordinal: usize) -> PathBuf {
        self.pattern.path_for(&session_id(ordinal))
    }

    /// Create the document for the 1-based session `ordinal`
    pub fn open(&self, ordinal: usize) -> Result<SessionFile<'_>> {
        let id = session_id(ordinal);
        let path = self.pattern.path_for(&id);
        let header = self.template.render_header(&id)?;

        info!(
            "New session file [{}]",
            path.file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default()
        );

        let file = File::create(&path).map_err(|e| ConvertError::output(&path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(header.as_bytes())
            .map_err(|e| ConvertError::output(&path, e))?;

        Ok(SessionFile {
            ordinal,
            path,
            writer,
            records: 0,
            footer: self.template.footer(),
        })
    }
}

/// An open session document
#[derive(Debug)]
pub struct SessionFile<'t> {
    ordinal: usize,
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
    footer: &'t str,
}

impl SessionFile<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn append(&mut self, record: &CoordinateRecord) -> Result<()> {
        self.writer
            .write_all(record.to_kml_line().as_bytes())
            .map_err(|e| ConvertError::output(&self.path, e))?;
        self.records += 1;
        Ok(())
    }

    /// Write the footer, flush and release the file
    pub fn close(mut self) -> Result<ClosedSession> {
        self.writer
            .write_all(self.footer.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| ConvertError::output(&self.path, e))?;
        drop(self.writer);

        Ok(ClosedSession {
            ordinal: self.ordinal,
            path: self.path,
            records: self.records,
        })
    }
}

/// A finished session document on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSession {
    pub ordinal: usize,
    pub path: PathBuf,
    pub records: usize,
}

impl ClosedSession {
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Remove the document from disk
    pub fn discard(self) -> Result<()> {
        fs::remove_file(&self.path).map_err(|e| ConvertError::output(&self.path, e))
    }
}

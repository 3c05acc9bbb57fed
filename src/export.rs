//! Session-by-session KML export
//!
//! Conversion runs in two forward passes over the same log. The first pass
//! ([`build_session_index`]) finds where sessions begin. The second pass
//! streams rows through the [`RowValidator`] and appends accepted records to
//! the document of the session the row belongs to. Nothing larger than one row
//! and one open output buffer is held in memory.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::indexer::{build_session_index, SessionIndex};
use crate::outdir::prepare_output_dir;
use crate::parser::{CsvFileSource, RowSource};
use crate::template::KmlTemplate;
use crate::types::{Row, RunStats, CONVERSION_COLUMNS};
use crate::validator::RowValidator;
use crate::writer::{SessionFile, SessionWriter};

/// Where the conversion pass stands relative to the session index
#[derive(Debug)]
pub enum DriverState<'w> {
    AwaitingSessionStart,
    InSession(SessionFile<'w>),
    Done,
}

/// Second-pass state machine
///
/// Feed rows in file order with [`ConversionDriver::process`], then call
/// [`ConversionDriver::finish`] to get the run statistics.
pub struct ConversionDriver<'a> {
    index: &'a SessionIndex,
    validator: &'a RowValidator,
    writer: &'a SessionWriter,
    state: DriverState<'a>,
    // Position in the boundary list of the current or next session
    cursor: usize,
    stats: RunStats,
}

impl<'a> ConversionDriver<'a> {
    pub fn new(
        index: &'a SessionIndex,
        validator: &'a RowValidator,
        writer: &'a SessionWriter,
    ) -> Self {
        let state = if index.is_empty() {
            DriverState::Done
        } else {
            DriverState::AwaitingSessionStart
        };
        Self {
            index,
            validator,
            writer,
            state,
            cursor: 0,
            stats: RunStats {
                sessions_detected: index.session_count(),
                ..RunStats::default()
            },
        }
    }

    pub fn state(&self) -> &DriverState<'a> {
        &self.state
    }

    pub fn process(&mut self, row: &Row) -> Result<()> {
        let i = self.stats.rows_read;
        let boundaries = self.index.boundaries();
        let writer = self.writer;
        self.stats.rows_read += 1;

        if matches!(self.state, DriverState::AwaitingSessionStart) && boundaries[self.cursor] == i
        {
            self.state = DriverState::InSession(writer.open(self.cursor + 1)?);
        }

        let DriverState::InSession(session) = &mut self.state else {
            // Only reachable when the log grew after indexing
            self.stats.rows_rejected += 1;
            return Ok(());
        };

        match self.validator.validate(row)? {
            Some(record) => {
                session.append(&record)?;
                self.stats.records_written += 1;
            }
            None => {
                trace!("Rejected row {}", row.index());
                self.stats.rows_rejected += 1;
            }
        }

        if boundaries[self.cursor + 1] == i + 1 {
            self.close_session()?;
        }
        Ok(())
    }

    fn close_session(&mut self) -> Result<()> {
        let session = match std::mem::replace(&mut self.state, DriverState::Done) {
            DriverState::InSession(session) => session,
            other => {
                self.state = other;
                return Ok(());
            }
        };

        let closed = session.close()?;
        if closed.is_empty() {
            info!("Wrote {} data points, (deleting)", closed.records);
            closed.discard()?;
        } else {
            info!("Wrote {} data points", closed.records);
            self.stats.sessions_written += 1;
        }

        self.cursor += 1;
        if self.cursor < self.index.session_count() {
            self.state = DriverState::AwaitingSessionStart;
        }
        Ok(())
    }

    /// Close any session left open and return the counters
    ///
    /// A row count that disagrees with the index means the log changed between
    /// the passes; that is reported as [`ConvertError::PassMismatch`].
    pub fn finish(mut self) -> Result<RunStats> {
        self.close_session()?;
        if self.stats.rows_read != self.index.total_rows() {
            return Err(ConvertError::PassMismatch {
                indexed: self.index.total_rows(),
                converted: self.stats.rows_read,
            });
        }
        Ok(self.stats)
    }
}

/// Run both passes over `source`, writing documents through `writer`
pub fn convert_source<S: RowSource>(
    source: &S,
    validator: &RowValidator,
    writer: &SessionWriter,
) -> Result<RunStats> {
    let started = Instant::now();
    debug!("Converting {}", source.describe());

    let index = build_session_index(source)?;
    if index.is_empty() {
        warn!("Empty session index. Is the input file empty?");
        return Ok(RunStats {
            elapsed: started.elapsed(),
            ..RunStats::default()
        });
    }

    let mut driver = ConversionDriver::new(&index, validator, writer);
    for row in source.rows()? {
        let row = row?;
        if row.index() == 0 {
            row.header().require(&CONVERSION_COLUMNS)?;
        }
        driver.process(&row)?;
    }

    let mut stats = driver.finish()?;
    stats.elapsed = started.elapsed();
    Ok(stats)
}

/// Convert the log named by `config` into per-session KML documents
///
/// Loads the templates, prepares the output directory, then runs
/// [`convert_source`] over the input file.
pub fn convert_log(config: &ConvertConfig) -> Result<RunStats> {
    config.validate()?;

    let template = KmlTemplate::load(&config.header_template, &config.footer_template)?;
    prepare_output_dir(&config.output_dir, config.delete_output_dir_on_start)?;
    let pattern_dir = config.output_pattern.directory();
    if pattern_dir != config.output_dir {
        prepare_output_dir(&pattern_dir, false)?;
    }

    let writer = SessionWriter::new(config.output_pattern.clone(), template);
    let validator = RowValidator::new(config.min_fix_quality, config.min_satellites);
    convert_source(&CsvFileSource::new(&config.input), &validator, &writer)
}

//! Conversion settings
//!
//! Every knob of a run lives in [`ConvertConfig`]. Paths default to the layout
//! the command-line tool has always used: an `output` directory next to the
//! working directory and one `<input name>_Snnn.kml` file per session.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

pub const DEFAULT_MIN_FIX_QUALITY: i64 = 1;
pub const DEFAULT_MIN_SATELLITES: i64 = 4;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Placeholder replaced by the session identifier in output paths
pub const SESSION_NUMBER_PLACEHOLDER: &str = "{session_number}";

/// Output path with a `{session_number}` slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct OutputPattern(String);

impl OutputPattern {
    /// The placeholder must appear in the file name, not in a directory
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let file_name = Path::new(&pattern)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !file_name.contains(SESSION_NUMBER_PLACEHOLDER) {
            return Err(ConvertError::Config(format!(
                "output pattern '{}' does not contain {} in its file name",
                pattern, SESSION_NUMBER_PLACEHOLDER
            )));
        }
        if pattern.matches(SESSION_NUMBER_PLACEHOLDER).count()
            != file_name.matches(SESSION_NUMBER_PLACEHOLDER).count()
        {
            return Err(ConvertError::Config(format!(
                "output pattern '{}' uses {} in a directory name",
                pattern, SESSION_NUMBER_PLACEHOLDER
            )));
        }
        Ok(Self(pattern))
    }

    /// `<dir>/<input file name>_{session_number}.kml`
    pub fn for_input(output_dir: &Path, input: &Path) -> Self {
        let input_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string());
        let file_name = format!("{}_{}.kml", input_name, SESSION_NUMBER_PLACEHOLDER);
        Self(output_dir.join(file_name).to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path_for(&self, session_id: &str) -> PathBuf {
        PathBuf::from(self.0.replace(SESSION_NUMBER_PLACEHOLDER, session_id))
    }

    /// Directory every session document lands in (`.` for a bare file name)
    pub fn directory(&self) -> PathBuf {
        match Path::new(&self.0).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl TryFrom<String> for OutputPattern {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<OutputPattern> for String {
    fn from(pattern: OutputPattern) -> Self {
        pattern.0
    }
}

/// Where a header or footer template comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TemplateSource {
    /// Built-in KML text
    #[default]
    Builtin,
    File(PathBuf),
}

/// Settings for one conversion run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_pattern: OutputPattern,
    pub header_template: TemplateSource,
    pub footer_template: TemplateSource,
    pub delete_output_dir_on_start: bool,
    pub min_fix_quality: i64,
    pub min_satellites: i64,
}

impl ConvertConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output_dir = PathBuf::from(DEFAULT_OUTPUT_DIR);
        let output_pattern = OutputPattern::for_input(&output_dir, &input);
        Self {
            input,
            output_dir,
            output_pattern,
            header_template: TemplateSource::Builtin,
            footer_template: TemplateSource::Builtin,
            delete_output_dir_on_start: true,
            min_fix_quality: DEFAULT_MIN_FIX_QUALITY,
            min_satellites: DEFAULT_MIN_SATELLITES,
        }
    }

    /// Change the output directory; the pattern follows it
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self.output_pattern = OutputPattern::for_input(&self.output_dir, &self.input);
        self
    }

    /// Change the output pattern; the output directory follows it
    pub fn with_output_pattern(mut self, pattern: OutputPattern) -> Self {
        self.output_dir = pattern.directory();
        self.output_pattern = pattern;
        self
    }

    pub fn with_templates(mut self, header: TemplateSource, footer: TemplateSource) -> Self {
        self.header_template = header;
        self.footer_template = footer;
        self
    }

    pub fn with_thresholds(mut self, min_fix_quality: i64, min_satellites: i64) -> Self {
        self.min_fix_quality = min_fix_quality;
        self.min_satellites = min_satellites;
        self
    }

    pub fn keep_existing_output(mut self) -> Self {
        self.delete_output_dir_on_start = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.output_pattern.as_str().contains(SESSION_NUMBER_PLACEHOLDER) {
            return Err(ConvertError::Config(format!(
                "output pattern '{}' does not contain {}",
                self.output_pattern.as_str(),
                SESSION_NUMBER_PLACEHOLDER
            )));
        }
        if self.input.as_os_str().is_empty() {
            return Err(ConvertError::Config("input path is empty".to_string()));
        }
        if !self.input.is_file() {
            return Err(ConvertError::Config(format!(
                "File [{}] does not exist!",
                self.input.display()
            )));
        }
        if self.delete_output_dir_on_start {
            self.check_output_dir_is_disposable()?;
        }
        Ok(())
    }

    /// The output directory is deleted on start, so it must not hold the
    /// input log or the working directory
    fn check_output_dir_is_disposable(&self) -> Result<()> {
        if !self.output_dir.exists() {
            return Ok(());
        }
        let output_dir = fs::canonicalize(&self.output_dir)?;
        let input = fs::canonicalize(&self.input)?;
        if input.starts_with(&output_dir) {
            return Err(ConvertError::Config(format!(
                "Output directory [{}] contains the input file [{}]; refusing to delete it",
                self.output_dir.display(),
                self.input.display()
            )));
        }
        let cwd = std::env::current_dir().and_then(fs::canonicalize)?;
        if cwd.starts_with(&output_dir) {
            return Err(ConvertError::Config(format!(
                "Output directory [{}] contains the working directory; refusing to delete it",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

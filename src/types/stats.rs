use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const RULE: &str = "########################################";

/// Counters gathered over one conversion run
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunStats {
    pub rows_read: usize,
    pub rows_rejected: usize,
    pub sessions_detected: usize,
    pub sessions_written: usize,
    pub records_written: usize,
    pub elapsed: Duration,
}

impl RunStats {
    /// Fraction of rows rejected, 0.0 when nothing was read
    pub fn row_rejection_ratio(&self) -> f64 {
        ratio(self.rows_rejected, self.rows_read)
    }

    /// Fraction of detected sessions that produced no document
    pub fn session_rejection_ratio(&self) -> f64 {
        if self.sessions_detected == 0 {
            return 0.0;
        }
        1.0 - ratio(self.sessions_written, self.sessions_detected)
    }

    pub fn sessions_discarded(&self) -> usize {
        self.sessions_detected.saturating_sub(self.sessions_written)
    }

    pub fn is_empty_input(&self) -> bool {
        self.sessions_detected == 0
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "rows_read": self.rows_read,
            "rows_rejected": self.rows_rejected,
            "row_rejection_ratio": self.row_rejection_ratio(),
            "sessions_detected": self.sessions_detected,
            "sessions_written": self.sessions_written,
            "session_rejection_ratio": self.session_rejection_ratio(),
            "records_written": self.records_written,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
        })
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "CSV rows read     = {}", self.rows_read)?;
        writeln!(
            f,
            "CSV rows rejected = {} ({})",
            self.rows_rejected,
            percent(self.row_rejection_ratio())
        )?;
        writeln!(f)?;
        writeln!(f, "Sessions detected = {}", self.sessions_detected)?;
        writeln!(
            f,
            "Sessions written  = {} ({} rejected)",
            self.sessions_written,
            percent(self.session_rejection_ratio())
        )?;
        writeln!(f)?;
        writeln!(f, "KML rows written  = {}", self.records_written)?;
        writeln!(f)?;
        writeln!(f, "Duration          = {:.3} seconds", self.elapsed.as_secs_f64())?;
        write!(f, "{}", RULE)
    }
}

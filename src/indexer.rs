//! Session boundary detection
//!
//! The log keeps recording across power cycles; each restart resets the
//! session clock. A new session therefore begins at the first row and at every
//! row whose session time is lower than the last one seen.

use tracing::{debug, info};

use crate::error::Result;
use crate::parser::RowSource;
use crate::types::SESSION_TIME;
use crate::validator::parse_field;

/// Row indices where sessions begin, followed by the total row count
///
/// Always holds at least the end sentinel and is strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIndex {
    boundaries: Vec<usize>,
}

impl SessionIndex {
    /// Build directly from boundaries; the last element is the end sentinel
    ///
    /// Returns `None` unless the list is non-empty and strictly increasing.
    pub fn from_boundaries(boundaries: Vec<usize>) -> Option<Self> {
        if boundaries.is_empty() || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self { boundaries })
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Total number of rows covered by the index
    pub fn total_rows(&self) -> usize {
        self.boundaries[self.boundaries.len() - 1]
    }

    pub fn session_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.session_count() == 0
    }
}

/// Incremental boundary detector fed one session time per row
///
/// `None` stands for a row with a blank session time. Such rows still occupy a
/// row index but never start a session and leave the last time untouched.
#[derive(Debug, Default)]
pub struct SessionIndexer {
    boundaries: Vec<usize>,
    // Only times actually read from the log; blank leading rows leave this unset
    last_session_time: Option<f64>,
    rows: usize,
}

impl SessionIndexer {
    pub fn push(&mut self, session_time: Option<f64>) {
        let row_index = self.rows;
        self.rows += 1;

        if row_index == 0 {
            self.boundaries.push(row_index);
        }

        if let Some(time) = session_time {
            if matches!(self.last_session_time, Some(last) if time < last) {
                self.boundaries.push(row_index);
            }
            self.last_session_time = Some(time);
        }
    }

    pub fn finish(mut self) -> SessionIndex {
        self.boundaries.push(self.rows);
        SessionIndex {
            boundaries: self.boundaries,
        }
    }
}

/// Index a sequence of session times
pub fn index_session_times<I>(times: I) -> SessionIndex
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut indexer = SessionIndexer::default();
    for time in times {
        indexer.push(time);
    }
    indexer.finish()
}

/// First pass: scan the whole source once and locate session boundaries
pub fn build_session_index<S: RowSource>(source: &S) -> Result<SessionIndex> {
    info!("Building session list...");

    let mut indexer = SessionIndexer::default();
    for row in source.rows()? {
        let row = row?;
        if row.index() == 0 {
            row.header().require(&[SESSION_TIME])?;
        }
        let session_time = match row.non_blank(SESSION_TIME) {
            Some(text) => Some(parse_field::<f64>(&row, SESSION_TIME, text)?),
            None => None,
        };
        indexer.push(session_time);
    }

    let index = indexer.finish();
    debug!("Session boundaries: {:?}", index.boundaries());
    info!("Found {} sessions!", index.session_count());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::parser::CsvTextSource;

    fn times(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_backwards_time_starts_session() {
        let index = index_session_times(times(&[1.0, 2.0, 3.0, 0.0, 1.0, 5.0, 2.0, 9.0]));
        assert_eq!(index.boundaries(), &[0, 3, 6, 8]);
        assert_eq!(index.session_count(), 3);
        assert_eq!(index.total_rows(), 8);
    }

    #[test]
    fn test_equal_time_continues_session() {
        let index = index_session_times(times(&[5.0, 5.0, 5.0]));
        assert_eq!(index.boundaries(), &[0, 3]);
    }

    #[test]
    fn test_empty_input_has_only_sentinel() {
        let index = index_session_times(Vec::new());
        assert_eq!(index.boundaries(), &[0]);
        assert_eq!(index.session_count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_blank_times_keep_row_numbering() {
        let index = index_session_times(vec![None, Some(4.0), None, Some(2.0), Some(3.0), None]);
        assert_eq!(index.boundaries(), &[0, 3, 6]);
        assert_eq!(index.total_rows(), 6);
    }

    #[test]
    fn test_negative_time_after_blank_first_row_continues_session() {
        let index = index_session_times(vec![None, Some(-5.0), Some(-3.0)]);
        assert_eq!(index.boundaries(), &[0, 3]);

        let index = index_session_times(vec![None, Some(-5.0), Some(-6.0)]);
        assert_eq!(index.boundaries(), &[0, 2, 3]);
    }

    #[test]
    fn test_all_blank_times_form_one_session() {
        let index = index_session_times(vec![None, None]);
        assert_eq!(index.boundaries(), &[0, 2]);
    }

    #[test]
    fn test_boundary_invariants_hold() {
        let sequences: Vec<Vec<f64>> = vec![
            vec![0.0],
            vec![3.0, 2.0, 1.0, 0.0],
            vec![0.0, 1.0, 2.0, 3.0],
            vec![10.0, 1.0, 1.0, 0.5, 7.0, 7.0, 6.9],
        ];
        for seq in sequences {
            let index = index_session_times(times(&seq));
            let b = index.boundaries();
            assert_eq!(*b.last().unwrap(), seq.len());
            assert!(b.windows(2).all(|w| w[0] < w[1]), "{b:?} not increasing");
            assert_eq!(b.len() - 1, index.session_count());
            assert!(SessionIndex::from_boundaries(b.to_vec()).is_some());
        }
    }

    #[test]
    fn test_from_boundaries_rejects_bad_lists() {
        assert!(SessionIndex::from_boundaries(vec![]).is_none());
        assert!(SessionIndex::from_boundaries(vec![0, 0]).is_none());
        assert!(SessionIndex::from_boundaries(vec![0, 5, 3]).is_none());
        assert_eq!(
            SessionIndex::from_boundaries(vec![0, 5]).unwrap().session_count(),
            1
        );
    }

    #[test]
    fn test_build_from_csv() {
        let source = CsvTextSource::new(
            "Session Time,Other\n1,a\n2,b\n3,c\n0,d\n1,e\n5,f\n2,g\n9,h\n",
        );
        let index = build_session_index(&source).unwrap();
        assert_eq!(index.boundaries(), &[0, 3, 6, 8]);
    }

    #[test]
    fn test_build_from_empty_text() {
        let index = build_session_index(&CsvTextSource::new("")).unwrap();
        assert_eq!(index.boundaries(), &[0]);

        let index = build_session_index(&CsvTextSource::new("Session Time\n")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_requires_session_time_column() {
        let source = CsvTextSource::new("Time\n1\n");
        assert!(matches!(
            build_session_index(&source),
            Err(ConvertError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_build_fails_on_malformed_time() {
        let source = CsvTextSource::new("Session Time\n1\nabc\n");
        match build_session_index(&source) {
            Err(ConvertError::MalformedNumericField { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("expected MalformedNumericField, got {other:?}"),
        }
    }
}

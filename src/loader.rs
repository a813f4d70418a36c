//! CSV loader for raw trip logs.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Tokens treated as a missing cell, in addition to blank cells.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// An input file as found on disk: the header row plus every record, with no
/// renaming or typing applied.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the column whose trimmed header equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Returns the cell at `index`, or `None` when the cell is absent or holds a
/// missing marker.
pub fn cell(record: &StringRecord, index: usize) -> Option<&str> {
    let value = record.get(index)?.trim();
    if value.is_empty() || NA_TOKENS.contains(&value) {
        None
    } else {
        Some(value)
    }
}

/// Reads a delimited file into a [`RawTable`].
///
/// # Errors
///
/// Returns [`PipelineError::DataLoad`] when the file cannot be opened or read
/// as CSV, [`PipelineError::EmptyInput`] when there is no header row, and
/// [`PipelineError::MalformedRow`] when a record is wider than the header.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_table(path: &Path) -> Result<RawTable> {
    let load_err = |source| PipelineError::DataLoad {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(load_err)?;

    let headers = rdr.headers().map_err(load_err)?.clone();
    if headers.is_empty() {
        return Err(PipelineError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    debug!(columns = headers.len(), "Header read");

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(load_err)?;
        if record.len() > headers.len() {
            return Err(PipelineError::MalformedRow {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: headers.len(),
                found: record.len(),
            });
        }
        records.push(record);
    }

    info!(rows = records.len(), columns = headers.len(), "Input loaded");
    Ok(RawTable { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_keeps_columns_as_found() {
        let file = write_temp("Date,Time, Booking Status\n2024-01-01,10:00:00,Completed\n");
        let table = load_table(file.path()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.column_index("Booking Status"), Some(2));
        assert_eq!(table.column_index("Vehicle Type"), None);
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let err = load_table(Path::new("/nonexistent/rides.csv")).unwrap_err();
        assert!(err.is_load_error());
        assert!(matches!(err, PipelineError::DataLoad { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_temp("");
        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput { .. }));
    }

    #[test]
    fn test_short_rows_accepted_wide_rows_rejected() {
        let file = write_temp("a,b,c\n1,2\n");
        let table = load_table(file.path()).unwrap();
        assert_eq!(cell(&table.records[0], 2), None);

        let file = write_temp("a,b\n1,2,3\n");
        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedRow {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_cell_missing_markers() {
        let record = StringRecord::from(vec!["  x ", "", "null", "NaN", "N/A", "0"]);
        assert_eq!(cell(&record, 0), Some("x"));
        assert_eq!(cell(&record, 1), None);
        assert_eq!(cell(&record, 2), None);
        assert_eq!(cell(&record, 3), None);
        assert_eq!(cell(&record, 4), None);
        assert_eq!(cell(&record, 5), Some("0"));
        assert_eq!(cell(&record, 9), None);
    }
}

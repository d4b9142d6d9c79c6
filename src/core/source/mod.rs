//! # Record Source
//!
//! Parses the input record list from tabular CSV text.
//!
//! Field order is fixed: `id, store_id, frontliner_id, photo_url`. The
//! header row is skipped. Rows with the wrong field count are structural
//! errors that abort the run before the engine starts; the engine never
//! sees a malformed record.
//!
//! Fields are split on commas without quoting support - the upstream
//! export never quotes these columns.

use crate::core::record::ImageRecord;
use crate::error::SourceError;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read records from a CSV file.
pub fn read_records(path: &Path) -> Result<Vec<ImageRecord>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(BufReader::new(file))
}

/// Parse records from any reader. The first line is treated as a header
/// and skipped; blank lines are ignored.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ImageRecord>, SourceError> {
    let mut records = Vec::new();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| SourceError::Io {
            path: format!("line {}", line_number),
            source,
        })?;

        if index == 0 {
            continue; // header row
        }
        let trimmed = line.trim_end_matches('\r');
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').collect();
        if fields.len() != 4 {
            return Err(SourceError::MalformedRow {
                line: line_number,
                found: fields.len(),
            });
        }

        records.push(ImageRecord {
            id: fields[0].trim().to_string(),
            store_id: fields[1].trim().to_string(),
            frontliner_id: fields[2].trim().to_string(),
            photo_url: fields[3].trim().to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_records_and_skips_header() {
        let input = "id,store_id,frontliner_id,photo_url\n\
                     1,S1,F1,http://x/a.jpg\n\
                     2,S2,F2,http://x/b.jpg\n";

        let records = parse_records(Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].frontliner_id, "F1");
        assert_eq!(records[1].photo_url, "http://x/b.jpg");
    }

    #[test]
    fn ignores_blank_lines_and_crlf() {
        let input = "id,store_id,frontliner_id,photo_url\r\n\
                     1,S1,F1,http://x/a.jpg\r\n\
                     \r\n";

        let records = parse_records(Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].photo_url, "http://x/a.jpg");
    }

    #[test]
    fn rejects_malformed_row_with_line_number() {
        let input = "id,store_id,frontliner_id,photo_url\n\
                     1,S1,F1,http://x/a.jpg\n\
                     2,S2,F2\n";

        let error = parse_records(Cursor::new(input)).unwrap_err();

        match error {
            SourceError::MalformedRow { line, found } => {
                assert_eq!(line, 3);
                assert_eq!(found, 3);
            }
            other => panic!("Expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn header_only_input_yields_no_records() {
        let input = "id,store_id,frontliner_id,photo_url\n";
        let records = parse_records(Cursor::new(input)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn read_records_reports_missing_file() {
        let error = read_records(Path::new("/nonexistent/records.csv")).unwrap_err();
        assert!(matches!(error, SourceError::Io { .. }));
    }

    #[test]
    fn read_records_accepts_header_only_file() {
        // A header-only export means "nothing uploaded yet"; the run
        // proceeds and produces empty reports rather than aborting.
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, "id,store_id,frontliner_id,photo_url\n").unwrap();

        let records = read_records(&path).unwrap();
        assert!(records.is_empty());
    }
}

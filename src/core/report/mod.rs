//! # Report Module
//!
//! Writes the two flat output reports as CSV.
//!
//! - Duplicates: one row per owner-pair group, multi-value cells joined
//!   with `;`
//! - Failed downloads: one row per record that exhausted its retries
//!
//! These are plain tabular exports; the engine hands over finished lists
//! and no further deduplication or validation happens here.

use crate::core::record::{DuplicateGroup, FailedRecord};
use crate::error::ReportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the duplicates report.
///
/// CSV columns: `frontliner_id,duplicate_image_urls,duplicate_ids`
pub fn write_duplicates_csv<W: Write>(
    groups: &[DuplicateGroup],
    mut writer: W,
) -> std::io::Result<()> {
    writeln!(writer, "frontliner_id,duplicate_image_urls,duplicate_ids")?;

    for group in groups {
        writeln!(
            writer,
            "{},{},{}",
            group.frontliner_id,
            group.duplicate_image_urls.join(";"),
            group.duplicate_ids.join(";"),
        )?;
    }

    Ok(())
}

/// Write the failed-downloads report.
///
/// CSV columns: `id,store_id,frontliner_id,photo_url`
pub fn write_failed_csv<W: Write>(
    failed: &[FailedRecord],
    mut writer: W,
) -> std::io::Result<()> {
    writeln!(writer, "id,store_id,frontliner_id,photo_url")?;

    for record in failed {
        writeln!(
            writer,
            "{},{},{},{}",
            record.id, record.store_id, record.frontliner_id, record.photo_url,
        )?;
    }

    Ok(())
}

/// Write the duplicates report to a file.
pub fn export_duplicates(groups: &[DuplicateGroup], path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_duplicates_csv(groups, BufWriter::new(file)).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write the failed-downloads report to a file.
pub fn export_failed(failed: &[FailedRecord], path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_failed_csv(failed, BufWriter::new(file)).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ImageRecord;

    fn test_group() -> DuplicateGroup {
        let mut group = DuplicateGroup::new("F1");
        group.push_collision(
            &ImageRecord {
                id: "2".to_string(),
                store_id: "S1".to_string(),
                frontliner_id: "F1".to_string(),
                photo_url: "http://x/b.jpg".to_string(),
            },
            &ImageRecord {
                id: "1".to_string(),
                store_id: "S1".to_string(),
                frontliner_id: "F1".to_string(),
                photo_url: "http://x/a.jpg".to_string(),
            },
        );
        group
    }

    fn test_failed() -> FailedRecord {
        FailedRecord {
            id: "9".to_string(),
            store_id: "S2".to_string(),
            frontliner_id: "F3".to_string(),
            photo_url: "http://x/gone.jpg".to_string(),
            reason: "connection refused".to_string(),
        }
    }

    #[test]
    fn duplicates_csv_includes_header_and_joined_values() {
        let mut output = Vec::new();
        write_duplicates_csv(&[test_group()], &mut output).unwrap();

        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "frontliner_id,duplicate_image_urls,duplicate_ids");
        assert_eq!(lines[1], "F1,http://x/b.jpg;http://x/a.jpg,2;1");
    }

    #[test]
    fn failed_csv_includes_all_input_fields_but_not_reason() {
        let mut output = Vec::new();
        write_failed_csv(&[test_failed()], &mut output).unwrap();

        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "id,store_id,frontliner_id,photo_url");
        assert_eq!(lines[1], "9,S2,F3,http://x/gone.jpg");
        assert!(!csv.contains("connection refused"));
    }

    #[test]
    fn empty_reports_still_carry_headers() {
        let mut duplicates = Vec::new();
        let mut failed = Vec::new();
        write_duplicates_csv(&[], &mut duplicates).unwrap();
        write_failed_csv(&[], &mut failed).unwrap();

        assert_eq!(
            String::from_utf8(duplicates).unwrap(),
            "frontliner_id,duplicate_image_urls,duplicate_ids\n"
        );
        assert_eq!(
            String::from_utf8(failed).unwrap(),
            "id,store_id,frontliner_id,photo_url\n"
        );
    }

    #[test]
    fn export_writes_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let dup_path = dir.path().join("duplicates.csv");
        let failed_path = dir.path().join("failed.csv");

        export_duplicates(&[test_group()], &dup_path).unwrap();
        export_failed(&[test_failed()], &failed_path).unwrap();

        let dup_contents = std::fs::read_to_string(&dup_path).unwrap();
        assert!(dup_contents.contains("F1"));
        let failed_contents = std::fs::read_to_string(&failed_path).unwrap();
        assert!(failed_contents.contains("http://x/gone.jpg"));
    }

    #[test]
    fn export_reports_unwritable_path() {
        let error =
            export_duplicates(&[], Path::new("/nonexistent/dir/duplicates.csv")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/dir/duplicates.csv"));
    }
}

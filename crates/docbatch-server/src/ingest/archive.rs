//! ZIP archive inspection
//!
//! Opens an uploaded archive in memory and finds the single entry that holds
//! the tabular data.

use std::io::{Cursor, Read};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive is corrupt or not a ZIP file: {0}")]
    CorruptArchive(String),

    #[error("Archive contains no entry ending with '{0}'")]
    TargetEntryNotFound(String),
}

impl From<ZipError> for ArchiveError {
    fn from(err: ZipError) -> Self {
        ArchiveError::CorruptArchive(err.to_string())
    }
}

/// Position and full name of the entry picked by [`ArchiveInspector::locate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub index: usize,
    pub name: String,
}

/// An opened archive. Entry readers borrow it, so the archive outlives every
/// read and is released when the inspector is dropped.
pub struct ArchiveInspector {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for ArchiveInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveInspector")
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl ArchiveInspector {
    pub fn open(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self { archive })
    }

    /// First file entry, in index order, whose full name ends with `suffix`.
    /// The match is case-sensitive and directories are skipped.
    pub fn locate(&mut self, suffix: &str) -> Result<TargetEntry, ArchiveError> {
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(index)?;
            if entry.is_dir() {
                continue;
            }
            if entry.name().ends_with(suffix) {
                tracing::debug!(index, name = entry.name(), "Located target entry");
                return Ok(TargetEntry {
                    index,
                    name: entry.name().to_string(),
                });
            }
        }

        Err(ArchiveError::TargetEntryNotFound(suffix.to_string()))
    }

    /// Reader over the decompressed content of `entry`
    pub fn open_entry(&mut self, entry: &TargetEntry) -> Result<impl Read + '_, ArchiveError> {
        Ok(self.archive.by_index(entry.index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_locate_first_match_in_index_order() {
        let bytes = build_zip(&[
            ("readme.txt", "hello"),
            ("a/first.csv", "PdfName\nx.pdf\n"),
            ("second.csv", "PdfName\ny.pdf\n"),
        ]);
        let mut inspector = ArchiveInspector::open(bytes).unwrap();

        let entry = inspector.locate(".csv").unwrap();
        assert_eq!(entry.index, 1);
        assert_eq!(entry.name, "a/first.csv");

        let mut content = String::new();
        inspector.open_entry(&entry).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "PdfName\nx.pdf\n");
    }

    #[test]
    fn test_locate_is_case_sensitive() {
        let bytes = build_zip(&[("DATA.CSV", "x")]);
        let mut inspector = ArchiveInspector::open(bytes).unwrap();
        assert!(matches!(
            inspector.locate(".csv"),
            Err(ArchiveError::TargetEntryNotFound(suffix)) if suffix == ".csv"
        ));
    }

    #[test]
    fn test_locate_skips_directories() {
        let bytes = build_zip(&[("tables.csv/", ""), ("notes.txt", "x")]);
        let mut inspector = ArchiveInspector::open(bytes).unwrap();
        assert!(matches!(
            inspector.locate(".csv/"),
            Err(ArchiveError::TargetEntryNotFound(_))
        ));
    }

    #[test]
    fn test_open_rejects_non_zip_bytes() {
        let result = ArchiveInspector::open(b"definitely not a zip archive".to_vec());
        assert!(matches!(result, Err(ArchiveError::CorruptArchive(_))));
    }

    #[test]
    fn test_empty_archive_has_no_target() {
        let bytes = build_zip(&[]);
        let mut inspector = ArchiveInspector::open(bytes).unwrap();
        assert!(matches!(
            inspector.locate(".csv"),
            Err(ArchiveError::TargetEntryNotFound(_))
        ));
    }
}

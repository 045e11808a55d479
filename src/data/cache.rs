use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::error::LoadError;
use super::loader::{LoadOptions, load_file};
use super::model::Table;

/// Holds the table for the life of the process; the source is read at most once.
///
/// A failed load leaves the cell empty so the caller decides what is fatal.
#[derive(Debug, Default)]
pub struct TableCell {
    table: OnceLock<Arc<Table>>,
    source: OnceLock<PathBuf>,
}

impl TableCell {
    pub const fn new() -> Self {
        Self {
            table: OnceLock::new(),
            source: OnceLock::new(),
        }
    }

    /// The loaded table, if any.
    pub fn get(&self) -> Option<Arc<Table>> {
        self.table.get().cloned()
    }

    /// Path the cached table was read from.
    pub fn source(&self) -> Option<&Path> {
        self.source.get().map(PathBuf::as_path)
    }

    /// Return the cached table, loading `path` on the first call.
    pub fn get_or_load(&self, path: &Path, options: &LoadOptions) -> Result<Arc<Table>, LoadError> {
        if let Some(table) = self.table.get() {
            if self.source() != Some(path) {
                log::warn!(
                    "Table already loaded from {}; ignoring {}",
                    self.source().map(|p| p.display().to_string()).unwrap_or_default(),
                    path.display()
                );
            }
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_file(path, options)?);
        if self.table.set(Arc::clone(&table)).is_ok() {
            let _ = self.source.set(path.to_path_buf());
            Ok(table)
        } else {
            // Another caller won the race; theirs is the process table.
            Ok(self.get().unwrap_or(table))
        }
    }
}

/// The process-wide table used by the binaries.
pub fn shared_table() -> &'static TableCell {
    static SHARED: TableCell = TableCell::new();
    &SHARED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::writer::write_csv;

    fn one_row(platform: &str) -> Vec<Record> {
        vec![Record {
            platform: platform.into(),
            influencer_name: "Ava".into(),
            safety_bucket: "Low".into(),
            would_rehire: "Yes".into(),
            ..Default::default()
        }]
    }

    #[test]
    fn loads_once_and_reuses() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("roi.csv");
        write_csv(&path, &one_row("IG")).unwrap();

        let cell = TableCell::new();
        let first = cell.get_or_load(&path, &LoadOptions::default()).unwrap();

        // The source is never read again, even after it disappears.
        std::fs::remove_file(&path).unwrap();
        let second = cell.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cell.source(), Some(path.as_path()));
    }

    #[test]
    fn later_path_is_ignored() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.csv");
        let b = temp.path().join("b.csv");
        write_csv(&a, &one_row("IG")).unwrap();
        write_csv(&b, &one_row("TikTok")).unwrap();

        let cell = TableCell::new();
        cell.get_or_load(&a, &LoadOptions::default()).unwrap();
        let table = cell.get_or_load(&b, &LoadOptions::default()).unwrap();
        assert_eq!(table.platforms(), ["IG"]);
    }

    #[test]
    fn failed_load_leaves_cell_empty() {
        let temp = tempfile::tempdir().unwrap();
        let cell = TableCell::new();
        assert!(cell.get_or_load(&temp.path().join("absent.csv"), &LoadOptions::default()).is_err());
        assert!(cell.get().is_none());

        let path = temp.path().join("roi.csv");
        write_csv(&path, &one_row("IG")).unwrap();
        assert!(cell.get_or_load(&path, &LoadOptions::default()).is_ok());
    }
}

use crate::core::types::CsvImportOptions;
use crate::core::Dataset;
use crate::error::{LoadError, PipelineError, Result};
use crate::services::DataService;
use std::path::Path;
use tracing::info;

/// Owner of the dataset for the lifetime of a session.
///
/// Every pipeline stage takes the session explicitly; a new load replaces the
/// previous dataset wholesale.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a comment file, returning the number of rows
    pub fn load(&mut self, path: Option<&Path>) -> Result<usize> {
        let path = path.ok_or(LoadError::NoFile)?;
        let dataset = DataService::load(path)?;
        Ok(self.replace(dataset))
    }

    /// Load a delimited text file with explicit options
    pub fn load_csv(&mut self, path: &Path, options: &CsvImportOptions) -> Result<usize> {
        let dataset = DataService::load_csv(path, options)?;
        Ok(self.replace(dataset))
    }

    /// Install an already built dataset, discarding any previous one
    pub fn replace(&mut self, dataset: Dataset) -> usize {
        let rows = dataset.row_count();
        if let Some(prev) = self.dataset.replace(dataset) {
            info!("Replaced dataset {} ({} rows)", prev.name, prev.row_count());
        }
        rows
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or_else(PipelineError::not_loaded)
    }

    pub fn dataset_mut(&mut self) -> Result<&mut Dataset> {
        self.dataset.as_mut().ok_or_else(PipelineError::not_loaded)
    }

    pub fn clear(&mut self) {
        self.dataset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_session_rejects_access() {
        let mut session = Session::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.dataset(), Err(PipelineError::Precondition(_))));
        assert!(matches!(session.dataset_mut(), Err(PipelineError::Precondition(_))));
    }

    #[test]
    fn test_load_without_path_is_load_error() {
        let mut session = Session::new();
        let err = session.load(None).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::NoFile)));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_replace_discards_previous_dataset() {
        let mut session = Session::new();
        session.replace(Dataset::from_comments(&["a", "b"]).unwrap());
        let rows = session.replace(Dataset::from_comments(&["c"]).unwrap());
        assert_eq!(rows, 1);
        assert_eq!(session.dataset().unwrap().comment(0), Some("c"));
    }

    #[test]
    fn test_load_csv_without_header_uses_first_column() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("raw.txt");
        std::fs::write(&path, "loved it;5\ntoo noisy;2\n").unwrap();

        let mut session = Session::new();
        let options = CsvImportOptions { has_header: false, delimiter: ';', quote_char: None };
        assert_eq!(session.load_csv(&path, &options).unwrap(), 2);

        let ds = session.dataset().unwrap();
        assert_eq!(ds.headers(), &["Comment", "column_2"]);
        assert_eq!(ds.comment(1), Some("too noisy"));

        session.clear();
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let mut session = Session::new();
        session.replace(Dataset::from_comments(&["keep me"]).unwrap());
        let dir = tempfile::TempDir::new().unwrap();
        assert!(session.load(Some(dir.path().join("missing.csv").as_path())).is_err());
        assert_eq!(session.dataset().unwrap().comment(0), Some("keep me"));
    }
}

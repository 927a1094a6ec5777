use std::path::{Path, PathBuf};

use log::debug;

use crate::data::loader;
use crate::data::model::MatchupResults;
use crate::error::RetrievalError;

// ---------------------------------------------------------------------------
// Results retrieval
// ---------------------------------------------------------------------------

/// Read access to stored matchup executions.
///
/// A call either returns the complete stored execution or fails; any handle
/// an implementation opens must be released before it returns.
pub trait ResultsRetrieval {
    fn retrieve_results(&self, execution_id: &str) -> Result<MatchupResults, RetrievalError>;
}

/// Stored executions as `<root>/<execution_id>.json` files.
#[derive(Debug, Clone)]
pub struct FileResultsStore {
    root: PathBuf,
}

impl FileResultsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `execution_id`, or `None` for ids that are not a plain
    /// file name.
    pub fn path_for(&self, execution_id: &str) -> Option<PathBuf> {
        let plain = !execution_id.is_empty()
            && execution_id != "."
            && execution_id != ".."
            && !execution_id.contains(['/', '\\']);
        plain.then(|| self.root.join(format!("{execution_id}.json")))
    }
}

impl ResultsRetrieval for FileResultsStore {
    fn retrieve_results(&self, execution_id: &str) -> Result<MatchupResults, RetrievalError> {
        let not_found = || RetrievalError::NotFound {
            execution_id: execution_id.to_string(),
        };

        let path = self.path_for(execution_id).ok_or_else(not_found)?;
        if !path.is_file() {
            return Err(not_found());
        }

        debug!("loading results for '{execution_id}' from {}", path.display());
        loader::load_results(&path).map_err(|source| RetrievalError::Backend {
            execution_id: execution_id.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = r#"{
        "params": { "primary": "A", "matchup": ["B"] },
        "stats": {},
        "data": [ { "sea_water_temperature": 10, "matches": [ { "source": "B", "sea_water_temperature": 8 } ] } ]
    }"#;

    #[test]
    fn test_retrieves_stored_execution() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run-1.json"), STORED).unwrap();

        let store = FileResultsStore::new(dir.path());
        let results = store.retrieve_results("run-1").unwrap();
        assert_eq!(results.params.primary, "A");
        assert_eq!(results.records.len(), 1);
    }

    #[test]
    fn test_missing_execution_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileResultsStore::new(dir.path());
        let err = store.retrieve_results("nope").unwrap_err();
        assert!(matches!(err, RetrievalError::NotFound { execution_id } if execution_id == "nope"));
    }

    #[test]
    fn test_path_like_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileResultsStore::new(dir.path().join("inner"));
        std::fs::write(dir.path().join("outside.json"), STORED).unwrap();

        for id in ["../outside", "a/b", "..", ""] {
            assert!(store.path_for(id).is_none(), "{id}");
            assert!(matches!(
                store.retrieve_results(id),
                Err(RetrievalError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_corrupt_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = FileResultsStore::new(dir.path());
        let err = store.retrieve_results("bad").unwrap_err();
        assert!(matches!(err, RetrievalError::Backend { .. }));
    }
}

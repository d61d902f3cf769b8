// Dataset persistence
//
// This module is the opaque key-value persistence collaborator: datasets are
// written and read back whole, keyed by a version tag. Storage is one pretty
// printed JSON file per tag under a store directory. Nothing here knows about
// correction or validation; it only moves complete datasets in and out.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::CalibrationDataset;
use crate::error::ValidationError;

/// File-backed dataset store
///
/// `write(tag, dataset)` is the publication step of a correction run: the
/// dataset is fully serialized before anything touches the filesystem, so a
/// reader never observes a partial run.
pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, tag: &str) -> PathBuf {
        self.root.join(format!("{}.json", tag))
    }

    /// Persist a dataset under a version tag, creating the store directory
    /// if needed
    pub fn write(&self, tag: &str, dataset: &CalibrationDataset) -> Result<(), ValidationError> {
        let path = self.path_for(tag);
        let payload = serde_json::to_string_pretty(dataset).map_err(|err| ValidationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        fs::create_dir_all(&self.root).map_err(|err| ValidationError::Io {
            path: self.root.display().to_string(),
            reason: err.to_string(),
        })?;
        fs::write(&path, payload).map_err(|err| ValidationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        log::info!("[DatasetStore] Wrote dataset '{}' to {:?}", tag, path);
        Ok(())
    }

    /// Load the dataset stored under a version tag
    pub fn read(&self, tag: &str) -> Result<CalibrationDataset, ValidationError> {
        let path = self.path_for(tag);
        let contents = fs::read_to_string(&path).map_err(|err| ValidationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| ValidationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FeedError;

/// The last search string, kept in a single file between runs.
#[derive(Debug, Clone)]
pub struct SavedQuery {
    path: PathBuf,
}

impl SavedQuery {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, FeedError> {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                FeedError::Storage("could not determine a config or home directory".into())
            })?;
        path.push("flickr");
        path.push("last_query");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>, FeedError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let query = contents.trim();
                Ok((!query.is_empty()).then(|| query.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.storage_error(e)),
        }
    }

    /// Stores `query`. Blank queries are not stored; returns whether it was written.
    pub fn save(&self, query: &str) -> Result<bool, FeedError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }
        fs::write(&self.path, query).map_err(|e| self.storage_error(e))?;
        debug!(path = %self.path.display(), query, "saved query");
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), FeedError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error(e)),
        }
    }

    fn storage_error(&self, err: std::io::Error) -> FeedError {
        FeedError::Storage(format!("{}: {err}", self.path.display()))
    }
}

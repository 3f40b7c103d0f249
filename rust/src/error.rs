//! Error types for loading analysis inputs.
//!
//! The analysis itself has no error type: every phase query returns a
//! well-formed result.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl LoadError {
    /// True when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// True when the file was read but its content is not usable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::Parse { .. } | LoadError::InvalidJson(_))
    }

    pub(crate) fn at_path(self, path: PathBuf) -> Self {
        match self {
            LoadError::InvalidJson(source) => LoadError::Parse { path, source },
            other => other,
        }
    }
}

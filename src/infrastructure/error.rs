//! Infrastructure-level errors (I/O, release artifacts, store, warehouse)

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("release artifact '{artifact}' not found in {dir} (looked for .csv and .zip forms)")]
    MissingArtifact { dir: PathBuf, artifact: String },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed symbol list {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("hierarchy store error: {context}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("warehouse target unavailable: {0}")]
    TargetUnavailable(String),

    #[error("warehouse load failed: {message}")]
    LoadFailed {
        message: String,
        exit_code: Option<i32>,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store error with context.
    pub fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;

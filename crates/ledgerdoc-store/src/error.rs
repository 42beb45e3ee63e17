/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::PathBuf;

use ledgerdoc_template::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No template with this id or name.
    #[error("Template not found: {key}")]
    NotFound { key: String },

    /// No active template of the requested type.
    #[error("No active template of type '{kind}'")]
    NoActive { kind: String },

    /// Two stored templates share an id.
    #[error("Duplicate template id: {id}")]
    Duplicate { id: String },

    /// Template id cannot be used as a file name in a directory store.
    #[error("Invalid template id for a directory store: {id:?}")]
    InvalidId { id: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Error types for cello operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a notebook document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the input path a failure belongs to, so batch output can
    /// locate the offending document.
    pub fn for_document(self, path: impl Into<PathBuf>) -> Self {
        Error::Document {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

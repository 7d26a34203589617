//! Error taxonomy shared by the record stores, the desks and the report
//! writer. None of these are fatal: the terminal front-end turns every variant
//! into a footer message and carries on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything a desk operation can reject.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was blank or a numeric/date field failed to parse.
    #[error("{0}")]
    InvalidInput(String),

    /// Another record already owns this key (compared case-insensitively).
    #[error("duplicate key '{key}'")]
    DuplicateKey { key: String },

    /// The referenced record is not (or no longer) in the store.
    #[error("record not found")]
    NotFound,

    /// Writing a report or alert file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        StoreError::InvalidInput(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shorthand used throughout the headless core.
pub type StoreResult<T> = Result<T, StoreError>;

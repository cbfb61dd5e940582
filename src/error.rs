//! Error types shared by the document store, config bridge and process streamer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for the installer core.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the installer core.
///
/// Every variant reaches the HTTP caller as a human-readable message;
/// nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing file could not be opened, written or renamed into place.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a well-formed configuration document.
    #[error("parse error: {0}")]
    Parse(String),

    /// An update payload does not have the required shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// The executable could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io { .. } => "io",
            Error::Parse(_) => "parse",
            Error::Validation(_) => "validation",
            Error::Launch { .. } => "launch",
        }
    }
}

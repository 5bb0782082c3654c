//! Common error types used throughout ncm-convert.
//!
//! This module provides a unified error type for the failure cases that cross
//! component boundaries: configuration storage, the conversion engine and I/O.

/// Common error type for ncm-convert.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing persisted configuration failed.
    #[error("Config error: {0}")]
    Config(String),

    /// The conversion engine could not be located or started.
    #[error("Engine error: {0}")]
    Engine(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Engine error.
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        Self::Engine(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for Pipeflow.
//!
//! All errors in Pipeflow are represented by the `PipeflowError` enum.
//! Lookups that simply find nothing (missing type, icon or catalog entry)
//! are never errors; these variants only cover collaborator failures.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Pipeflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum PipeflowError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Catalog fetch errors (transport, status, payload).
    #[error("{0}")]
    Catalog(String),

    /// Errors reported by the canvas collaborator.
    #[error("{0}")]
    Canvas(String),

    /// Element tree errors (unknown or removed element).
    #[error("{0}")]
    Dom(String),

    /// Host diagram errors (duplicate or unknown pipe).
    #[error("{0}")]
    Diagram(String),

    /// Async runtime errors.
    #[error("{0}")]
    Runtime(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<PipeflowError> for String {
    fn from(val: PipeflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for PipeflowError {
    fn from(error: std::io::Error) -> Self {
        PipeflowError::IoError(error.to_string())
    }
}

impl From<PipeflowError> for std::io::Error {
    fn from(val: PipeflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for PipeflowError {
    fn from(error: serde_json::Error) -> Self {
        PipeflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for PipeflowError {
    fn from(error: toml::de::Error) -> Self {
        PipeflowError::Config(error.to_string())
    }
}

impl From<reqwest::Error> for PipeflowError {
    fn from(error: reqwest::Error) -> Self {
        PipeflowError::Catalog(error.to_string())
    }
}

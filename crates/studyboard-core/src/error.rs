//! Core error types for studyboard-core.
//!
//! This module defines the error hierarchy using thiserror. Domain
//! operations on the tracker return [`TrackerError`]; the file gateway and
//! the configuration layer have their own enums, and [`CoreError`] wraps
//! them all for callers that do not care which layer failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Subject store / timer errors
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Persistence gateway errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by subject and timer operations.
///
/// Every rejected operation leaves the tracker untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Name was empty after trimming.
    #[error("subject name cannot be empty")]
    EmptyName,

    /// No subject with this id.
    #[error("subject not found: {0}")]
    NotFound(String),

    /// Progress input is not a number.
    #[error("progress must be a whole number, got '{0}'")]
    InvalidRange(String),

    /// Stored or imported data does not match the schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Export requested on an empty collection.
    #[error("no data to export")]
    NothingToExport,
}

/// Gateway I/O errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the storage slot
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the storage slot
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Payload could not be encoded
    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

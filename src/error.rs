//! Error handling for liverstage
//!
//! Format errors cover records that cannot be brought to the current schema.
//! Validation errors cover fields that are present but out of range.

use std::path::PathBuf;

use thiserror::Error;

use crate::layers::LayerKind;

/// Result type alias for liverstage operations
pub type Result<T> = std::result::Result<T, LayerStoreError>;

/// Main error type for layer store operations
#[derive(Error, Debug)]
pub enum LayerStoreError {
    // Format Errors
    #[error("{kind} record has schema version {version}, newer than supported version {current}")]
    UnsupportedVersion {
        kind: LayerKind,
        version: u32,
        current: u32,
    },

    #[error("{kind} record has invalid schema version {version}")]
    InvalidVersion { kind: LayerKind, version: u32 },

    #[error("{kind} record (schema version {version}) is missing required field '{field}'")]
    MissingField {
        kind: LayerKind,
        version: u32,
        field: String,
    },

    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    #[error("Archive checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // Validation Errors
    #[error("Invalid {kind} field '{field}': {reason}")]
    Validation {
        kind: LayerKind,
        field: String,
        reason: String,
    },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerStoreError {
    /// Shorthand for a field validation failure.
    pub fn validation(kind: LayerKind, field: &str, reason: impl Into<String>) -> Self {
        LayerStoreError::Validation {
            kind,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LayerStoreError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            LayerStoreError::InvalidVersion { .. } => "INVALID_VERSION",
            LayerStoreError::MissingField { .. } => "MISSING_FIELD",
            LayerStoreError::MalformedRecord { .. } => "MALFORMED_RECORD",
            LayerStoreError::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            LayerStoreError::Validation { .. } => "VALIDATION_ERROR",
            LayerStoreError::FileReadError { .. } => "FILE_READ_ERROR",
            LayerStoreError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            LayerStoreError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            LayerStoreError::Serialization(_) => "SERIALIZATION_ERROR",
            LayerStoreError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns true if the stored data itself cannot be read at the current schema.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            LayerStoreError::UnsupportedVersion { .. }
                | LayerStoreError::InvalidVersion { .. }
                | LayerStoreError::MissingField { .. }
                | LayerStoreError::MalformedRecord { .. }
                | LayerStoreError::ChecksumMismatch { .. }
        )
    }

    /// Returns true if a field was present but failed its constraint.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, LayerStoreError::Validation { .. })
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            LayerStoreError::UnsupportedVersion { .. } => {
                Some("The record was written by a newer release. Upgrade liverstage to read it.")
            }
            LayerStoreError::ChecksumMismatch { .. } => Some(
                "The archive was modified after it was saved. Restore it from a backup copy.",
            ),
            LayerStoreError::MissingField { .. } | LayerStoreError::MalformedRecord { .. } => {
                Some("The record is incomplete. Re-export the layer from its source network.")
            }
            LayerStoreError::FileReadError { .. } => Some("Check the file path and try again."),
            _ => None,
        }
    }
}

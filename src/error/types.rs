//! Error types for the attendance collector.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the collector.
///
/// Authentication failure is *not* represented here: a claim that does not
/// verify is an ordinary [`VerificationOutcome::Invalid`] value, never an
/// error. These variants cover startup and transport faults only.
///
/// [`VerificationOutcome::Invalid`]: crate::auth::VerificationOutcome::Invalid
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Listener and connection plumbing errors.
    #[error("Listener error: {message}")]
    Listener { message: String },

    /// Credential registry loading errors.
    #[error("Credential error: {kind}")]
    Credential { kind: CredentialErrorKind },

    /// Protocol errors.
    #[error("Protocol error: {kind}")]
    Protocol { kind: ProtocolErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Credential registry error kinds.
#[derive(Error, Debug)]
pub enum CredentialErrorKind {
    #[error("Failed to read credentials file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Credentials file {path} has insecure permissions {mode:04o}, expected 0600 or 0400")]
    InsecurePermissions { path: PathBuf, mode: u32 },

    #[error("Failed to parse credentials file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Duplicate device id in credentials: {device_id}")]
    DuplicateDevice { device_id: String },
}

/// Protocol error kinds.
#[derive(Error, Debug)]
pub enum ProtocolErrorKind {
    #[error("Message too large: {size} bytes exceeds maximum of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid message format: {message}")]
    InvalidMessageFormat { message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out")]
    ConnectionTimeout,
}

/// Result type alias for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;

//! Error types for keyspace-inventory
//!
//! This module defines the error hierarchy used by the scan pipeline:
//! - Store errors (anything a call against the remote store can return)
//! - Configuration errors
//! - The top-level inventory error the binary reports on exit
//!
//! Store errors carry a classification. Only timeouts are transient; the
//! connection manager may reconnect and retry those, everything else ends
//! the run.

use thiserror::Error;

/// Top-level error type for a keyspace inventory run
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Store call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The initial liveness check failed
    #[error("Store at '{target}' is not reachable: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: StoreError,
    },
}

/// How the connection manager should treat a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to heal after a reconnect
    Transient,
    /// Never retried
    Fatal,
}

/// Errors returned by calls against the store
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The call did not complete within the read timeout
    #[error("i/o timeout: {0}")]
    Timeout(String),

    /// Socket level failure other than a timeout
    #[error("I/O failure: {0}")]
    Io(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The store rejected the command or replied with something unexpected
    #[error("Command failed: {0}")]
    Command(String),

    /// Could not open a connection
    #[error("Failed to connect to '{target}': {reason}")]
    Connect { target: String, reason: String },

    /// Rebuilding the connection after a transient error failed
    #[error("Reconnect failed: {source}")]
    Reconnect {
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Classify this error for the retry policy
    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::Timeout(_) => ErrorClass::Transient,
            _ => ErrorClass::Fatal,
        }
    }

    /// Check if this error may be retried after a reconnect
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// Returns true if an error message describes an I/O timeout
pub fn is_timeout_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("i/o timeout") || message.contains("timed out")
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        let message = err.to_string();

        if err.is_timeout() || is_timeout_message(&message) {
            return StoreError::Timeout(message);
        }

        match err.kind() {
            redis::ErrorKind::AuthenticationFailed => StoreError::Auth(message),
            redis::ErrorKind::IoError => StoreError::Io(message),
            _ => StoreError::Command(message),
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Host must not be empty
    #[error("Store host must not be empty")]
    EmptyHost,

    /// SCAN COUNT hint must be positive
    #[error("Invalid batch size hint {count}: must be at least 1")]
    InvalidBatchHint { count: u64 },

    /// Separator must not be empty
    #[error("Separator must not be empty")]
    EmptySeparator,

    /// Timeout must be positive
    #[error("Invalid timeout {millis}ms: must be at least 1ms")]
    InvalidTimeout { millis: u64 },
}

/// Result type alias for InventoryError
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

//! Error types for the Nexus manager core library.

use thiserror::Error;

/// Core error type for repository provisioning.
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied data is malformed or incomplete.
    #[error("{0}")]
    Validation(String),

    /// A referenced organization or package manager is not in the catalog.
    #[error("{0}")]
    NotFound(String),

    /// Operator-side settings are absent.
    #[error("{0}")]
    Misconfiguration(String),

    /// A catalog or template file could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A call against Nexus or IQ Server failed.
    #[error("{0}")]
    Remote(String),

    /// A remote object exists with a configuration that differs from the request.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ManagerError {
    /// Returns true for errors caused by the caller rather than the operator
    /// or the remote system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ManagerError::Validation(_) | ManagerError::NotFound(_))
    }
}

/// Result type alias for Nexus manager operations.
pub type Result<T> = std::result::Result<T, ManagerError>;

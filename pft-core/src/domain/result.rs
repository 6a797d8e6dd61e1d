//! Result and error types for the core library

use std::path::Path;

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid, expired or revoked credential/token, as reported by the provider
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport failure or provider-side error
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// Malformed account/transaction record or request parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Table file unreadable, unwritable or corrupt
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a remote service error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteService(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error tied to a table file
    pub fn storage(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", path.display(), err))
    }

    /// True for credential/token failures
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

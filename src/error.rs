// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the Vigil cross-check orchestrator.
//!
//! This module provides strongly-typed errors for different parts of the application,
//! using `thiserror` for ergonomic error definitions and `anyhow` for error propagation.
//!
//! Note that the gateway, dispatcher, fallback controller, session store, and
//! applicator all recover errors at their own boundary and return explicit
//! success/failure values; these types exist for the seams where a caller
//! genuinely needs to branch on the failure kind.

use thiserror::Error;

/// Errors that can occur while invoking external agent CLIs.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not available on this host: {0}")]
    Unavailable(String),

    #[error("Provider call timed out after {0}s")]
    Timeout(u64),

    #[error("Provider process failed: {0}")]
    Process(String),

    #[error("Maximum self-heal attempts exceeded")]
    FallbackExhausted,
}

impl ProviderError {
    /// Check if this error is eligible for a fallback retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Process(_))
    }
}

/// Errors that can occur during session persistence.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session file corrupted: {0}")]
    Corrupt(String),

    #[error("Session expired: {0}")]
    Expired(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

/// Errors that can occur while applying extracted code changes.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File does not exist: {0}")]
    Missing(String),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ApplyError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::Missing(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    Io(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_retryable() {
        assert!(ProviderError::Timeout(300).is_retryable());
        assert!(ProviderError::Process("exit 1".to_string()).is_retryable());
        assert!(!ProviderError::Unavailable("gemini".to_string()).is_retryable());
        assert!(!ProviderError::FallbackExhausted.is_retryable());
    }

    #[test]
    fn test_session_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such session");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[test]
    fn test_session_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("not json");
        let err: SessionError = result.unwrap_err().into();
        assert!(matches!(err, SessionError::Corrupt(_)));
    }

    #[test]
    fn test_apply_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApplyError = io_err.into();
        assert!(matches!(err, ApplyError::PermissionDenied(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "fallback.maxSelfHealAttempts".to_string(),
            message: "must be between 1 and 5".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("maxSelfHealAttempts"));
        assert!(display.contains("between 1 and 5"));
    }
}

//! Error types for the unified compute toolkit
//!
//! Strategies never log or swallow failures. Every error reaches the
//! immediate caller with its kind and provider message intact so the caller
//! can decide on retry and backoff.

use std::fmt;
use thiserror::Error;

/// Why a provider declined an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// The referenced instance does not exist
    NotFound,
    /// The instance is in a state that does not allow the operation
    InvalidState,
    /// The credentials are not allowed to perform the operation
    PermissionDenied,
    /// Anything else the provider reported
    Other,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::NotFound => write!(f, "not_found"),
            RejectionKind::InvalidState => write!(f, "invalid_state"),
            RejectionKind::PermissionDenied => write!(f, "permission_denied"),
            RejectionKind::Other => write!(f, "other"),
        }
    }
}

/// Unified error type for the toolkit
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Handle Errors
    // =========================================================================
    #[error("Malformed node handle '{handle}': {reason}")]
    MalformedHandle { handle: String, reason: String },

    // =========================================================================
    // Provider Errors
    // =========================================================================
    #[error("Provider {provider} rejected {operation} ({kind}): {message}")]
    ProviderRejected {
        provider: String,
        operation: String,
        kind: RejectionKind,
        message: String,
    },

    #[error("Transport failure talking to {provider}: {message}")]
    Transport { provider: String, message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    // =========================================================================
    // Parse / IO Errors
    // =========================================================================
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a caller may do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Retry with exponential backoff
    RetryWithBackoff,
    /// Don't retry, the request itself must change
    NoRetry,
}

impl Error {
    /// Build a provider rejection
    pub fn rejected(
        provider: impl Into<String>,
        operation: impl Into<String>,
        kind: RejectionKind,
        message: impl Into<String>,
    ) -> Self {
        Error::ProviderRejected {
            provider: provider.into(),
            operation: operation.into(),
            kind,
            message: message.into(),
        }
    }

    /// Build a malformed handle error
    pub fn malformed_handle(handle: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedHandle {
            handle: handle.into(),
            reason: reason.into(),
        }
    }

    /// Determine what a caller may do about this error
    pub fn action(&self) -> ErrorAction {
        match self {
            Error::Transport { .. } | Error::Io(_) => ErrorAction::RetryWithBackoff,

            Error::ProviderRejected {
                kind: RejectionKind::Other,
                ..
            } => ErrorAction::RetryWithBackoff,

            _ => ErrorAction::NoRetry,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRetry)
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Rejection kind, if the provider declined the operation
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Error::ProviderRejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for the toolkit
pub type Result<T> = std::result::Result<T, Error>;

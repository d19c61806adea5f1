//! Error types for the POS client core
//!
//! Standardized error types used across the workspace

use thiserror::Error;

/// Unified error type for client operations
///
/// Remote backend failures keep the backend's message verbatim so callers
/// can surface it unchanged.
#[derive(Debug, Error)]
pub enum PosError {
    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Invalid or expired token
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Permission denied
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    /// Resource not found
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Resource already exists
    #[error("{resource} already exists")]
    Conflict { resource: String },

    /// Validation error
    #[error("{message}")]
    Validation { message: String },

    /// Remote backend rejected the call
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure (connection, timeout, TLS)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Operation requires a live backend but the session is offline
    #[error("Operation unavailable in offline demo mode: {operation}")]
    Offline { operation: String },
}

impl PosError {
    // ========== Convenient constructors ==========

    /// Create an InvalidToken error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken { message: message.into() }
    }

    /// Create a Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    /// Create a NotFound error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a Conflict error
    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict { resource: resource.into() }
    }

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Create a Remote error
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote { status, message: message.into() }
    }

    /// Create a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create an Offline error
    pub fn offline(operation: impl Into<String>) -> Self {
        Self::Offline { operation: operation.into() }
    }

    // ========== Error inspection methods ==========

    /// Whether this error indicates the remote backend is unreachable
    /// (as opposed to having rejected the request)
    ///
    /// Unreachable errors trigger the offline-demo degradation path;
    /// rejections are surfaced to the caller as-is.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for direct display, preserving the backend's
    /// wording where one exists
    pub fn display_message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for client operations
pub type PosResult<T> = Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_unreachable() {
        assert!(PosError::remote(500, "internal").is_unreachable());
        assert!(PosError::remote(503, "unavailable").is_unreachable());
        assert!(PosError::transport("connection refused").is_unreachable());
    }

    #[test]
    fn rejections_are_not_unreachable() {
        assert!(!PosError::remote(400, "bad request").is_unreachable());
        assert!(!PosError::remote(409, "duplicate").is_unreachable());
        assert!(!PosError::Unauthorized.is_unreachable());
        assert!(!PosError::validation("missing field").is_unreachable());
    }

    #[test]
    fn remote_message_survives_verbatim() {
        let err = PosError::remote(422, "duplicate key value violates unique constraint");
        assert_eq!(
            err.display_message(),
            "duplicate key value violates unique constraint"
        );
    }
}

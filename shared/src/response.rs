//! Backend response envelope
//!
//! The hosted backend wraps row and RPC responses in a uniform envelope.
//! The client checks the error field only and otherwise treats results as
//! opaque data.

use serde::{Deserialize, Serialize};

use crate::error::{PosError, PosResult};

/// Error body carried inside an envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Backend error code (e.g. "PGRST116", "23505")
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message, surfaced to the caller verbatim
    pub message: String,
}

/// Uniform response envelope
///
/// ```json
/// { "data": { ... } }
/// { "error": { "code": "23505", "message": "duplicate key" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub fn ok(data: T) -> Self {
        Self { data: Some(data), error: None }
    }

    /// Create an error envelope
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ApiErrorBody {
                code: Some(code.into()),
                message: message.into(),
            }),
        }
    }

    /// Unwrap the envelope into a result, mapping the error field onto
    /// [`PosError::Remote`]
    ///
    /// `status` is the HTTP status the envelope arrived with.
    pub fn into_result(self, status: u16) -> PosResult<T> {
        if let Some(err) = self.error {
            return Err(PosError::remote(status, err.message));
        }
        self.data
            .ok_or_else(|| PosError::remote(status, "empty response body"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_unwraps() {
        let env = ApiEnvelope::ok(42);
        assert_eq!(env.into_result(200).unwrap(), 42);
    }

    #[test]
    fn error_envelope_maps_to_remote_error() {
        let env: ApiEnvelope<i32> = ApiEnvelope::error("23505", "duplicate key");
        let err = env.into_result(409).unwrap_err();
        match err {
            PosError::Remote { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_envelope_is_an_error() {
        let env: ApiEnvelope<i32> = ApiEnvelope { data: None, error: None };
        assert!(env.into_result(200).is_err());
    }
}

//! Auth API DTOs
//!
//! Request/response types for the hosted backend's email/password auth
//! endpoints. The backend issues bearer tokens; the client never inspects
//! them beyond the expiry claim.

use serde::{Deserialize, Serialize};

/// Authenticated user identity as reported by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// An issued session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp the access token expires at
    #[serde(default)]
    pub expires_at: Option<u64>,
    pub user: AuthUser,
}

/// Sign-in / sign-up request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

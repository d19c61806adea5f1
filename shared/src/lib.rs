//! Shared types for the POS client core
//!
//! Common types used across the workspace: domain models, error types,
//! backend response envelope, and change-feed event types.

pub mod auth;
pub mod error;
pub mod event;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{PosError, PosResult};
pub use event::{ChangeAction, ChangeEvent};
pub use response::ApiEnvelope;

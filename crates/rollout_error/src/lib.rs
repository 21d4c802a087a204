//! Error types for the rollout inference client.
//!
//! Every failure a model server can report maps onto [`InferenceErrorKind`].
//! Collaborators (chat formatters, rollout clusters) report their own errors as
//! [`CollaboratorError`], which adapters re-wrap before they reach the caller.

mod inference;

pub use inference::{InferenceError, InferenceErrorKind};

/// Result type for model server operations.
pub type InferenceResult<T> = std::result::Result<T, InferenceError>;

/// Opaque error raised by an external collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for collaborator calls.
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

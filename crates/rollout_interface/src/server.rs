//! The model server capability.

use rollout_core::{GenerationResult, Message};
use rollout_error::InferenceResult;
use std::sync::Arc;

/// Anything that can turn a conversation into generated text.
///
/// Callers in the policy loop are written against this trait so the backend
/// (an in-process rollout cluster, a remote endpoint) can be swapped without
/// touching them.
///
/// # Contract
///
/// - `messages` must be non-empty; implementations reject an empty slice with
///   [`InferenceErrorKind::InvalidInput`](rollout_error::InferenceErrorKind::InvalidInput).
/// - On success the returned text is fully decoded and ready to use.
/// - Backend failures are reported, never retried. Retrying is the backend's
///   concern.
pub trait ModelServer: Send + Sync {
    /// Generate a completion for the conversation.
    fn generate(&self, messages: &[Message]) -> InferenceResult<GenerationResult>;
}

impl<T: ModelServer + ?Sized> ModelServer for &T {
    fn generate(&self, messages: &[Message]) -> InferenceResult<GenerationResult> {
        (**self).generate(messages)
    }
}

impl<T: ModelServer + ?Sized> ModelServer for Box<T> {
    fn generate(&self, messages: &[Message]) -> InferenceResult<GenerationResult> {
        (**self).generate(messages)
    }
}

impl<T: ModelServer + ?Sized> ModelServer for Arc<T> {
    fn generate(&self, messages: &[Message]) -> InferenceResult<GenerationResult> {
        (**self).generate(messages)
    }
}

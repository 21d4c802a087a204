//! Chat template rendering.

use rollout_core::Message;
use rollout_error::CollaboratorResult;
use std::sync::Arc;

/// Rendering switches passed to a [`ChatTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChatTemplateOptions {
    /// Append the marker that cues the assistant's turn
    pub add_generation_prompt: bool,
    /// Return token ids instead of text
    pub tokenize: bool,
    /// Render the model's "thinking" section
    pub enable_thinking: bool,
}

/// Renders a whole conversation into a single prompt string.
///
/// Typically backed by a tokenizer's chat template. Implementations must be
/// deterministic: identical messages and options give identical prompts.
pub trait ChatTemplate: Send + Sync {
    /// Render `messages` into one prompt.
    fn apply_chat_template(
        &self,
        messages: &[Message],
        options: ChatTemplateOptions,
    ) -> CollaboratorResult<String>;
}

impl<T: ChatTemplate + ?Sized> ChatTemplate for &T {
    fn apply_chat_template(
        &self,
        messages: &[Message],
        options: ChatTemplateOptions,
    ) -> CollaboratorResult<String> {
        (**self).apply_chat_template(messages, options)
    }
}

impl<T: ChatTemplate + ?Sized> ChatTemplate for Arc<T> {
    fn apply_chat_template(
        &self,
        messages: &[Message],
        options: ChatTemplateOptions,
    ) -> CollaboratorResult<String> {
        (**self).apply_chat_template(messages, options)
    }
}

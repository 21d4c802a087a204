//! Chat messages.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single turn in a conversation.
///
/// Serializes as `{"role": "...", "content": "..."}`, the shape chat templates
/// expect.
///
/// # Examples
///
/// ```
/// use rollout_core::{Message, Role};
///
/// let message = Message::user("which is larger 9.9 or 9.11?");
///
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.content(), "which is larger 9.9 or 9.11?");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// Text content of the message
    content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns a builder for constructing a Message.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }
}

//! Recording collaborators for testing adapters without a tokenizer or cluster.

use rollout_core::{Message, RolloutMode};
use rollout_error::CollaboratorResult;
use rollout_interface::{ChatTemplate, ChatTemplateOptions, RolloutCluster, RolloutOutput};
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// One recorded call to [`ChatTemplate::apply_chat_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCall {
    pub messages: Vec<Message>,
    pub options: ChatTemplateOptions,
}

/// One recorded call to [`RolloutCluster::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutCall {
    pub prompts: Vec<String>,
    pub mode: RolloutMode,
    pub micro_batch_size: NonZeroUsize,
}

// ---------------------------------------------------------------------------
// RecordingChatTemplate
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum TemplateBehavior {
    /// Render `<|role|>content` turns, plus `<|assistant|>` when asked.
    Render,
    Fixed(String),
    Fail(String),
}

/// Chat template that records every call.
#[derive(Debug)]
pub struct RecordingChatTemplate {
    behavior: TemplateBehavior,
    calls: Mutex<Vec<TemplateCall>>,
}

impl Default for RecordingChatTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingChatTemplate {
    /// A template that renders a simple tagged transcript.
    pub fn new() -> Self {
        Self::with_behavior(TemplateBehavior::Render)
    }

    /// A template that always returns `prompt`.
    pub fn returning(prompt: impl Into<String>) -> Self {
        Self::with_behavior(TemplateBehavior::Fixed(prompt.into()))
    }

    /// A template that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(TemplateBehavior::Fail(message.into()))
    }

    fn with_behavior(behavior: TemplateBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls seen so far, oldest first.
    pub fn calls(&self) -> Vec<TemplateCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChatTemplate for RecordingChatTemplate {
    fn apply_chat_template(
        &self,
        messages: &[Message],
        options: ChatTemplateOptions,
    ) -> CollaboratorResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TemplateCall {
                messages: messages.to_vec(),
                options,
            });

        match &self.behavior {
            TemplateBehavior::Render => {
                let mut prompt: String = messages
                    .iter()
                    .map(|m| format!("<|{}|>{}", m.role(), m.content()))
                    .collect();
                if options.add_generation_prompt {
                    prompt.push_str("<|assistant|>");
                }
                Ok(prompt)
            }
            TemplateBehavior::Fixed(prompt) => Ok(prompt.clone()),
            TemplateBehavior::Fail(message) => Err(message.clone().into()),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedRolloutCluster
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum ClusterBehavior {
    Respond(RolloutOutput),
    Fail(String),
}

/// Rollout cluster that returns a canned output and records every call.
#[derive(Debug)]
pub struct ScriptedRolloutCluster {
    behavior: ClusterBehavior,
    calls: Mutex<Vec<RolloutCall>>,
}

impl ScriptedRolloutCluster {
    /// Always respond with `output`.
    pub fn returning(output: RolloutOutput) -> Self {
        Self {
            behavior: ClusterBehavior::Respond(output),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always respond with the given candidate texts.
    pub fn returning_text<I, S>(text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::returning(RolloutOutput::from_text(text))
    }

    /// Always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: ClusterBehavior::Fail(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls seen so far, oldest first.
    pub fn calls(&self) -> Vec<RolloutCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RolloutCluster for ScriptedRolloutCluster {
    fn generate(
        &self,
        prompts: &[String],
        mode: RolloutMode,
        micro_batch_size: NonZeroUsize,
    ) -> CollaboratorResult<RolloutOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RolloutCall {
                prompts: prompts.to_vec(),
                mode,
                micro_batch_size,
            });

        match &self.behavior {
            ClusterBehavior::Respond(output) => Ok(output.clone()),
            ClusterBehavior::Fail(message) => Err(message.clone().into()),
        }
    }
}

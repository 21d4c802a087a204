//! Model server backed by an in-process rollout cluster.

use crate::AdapterConfig;
use rollout_core::{GenerationResult, Message, RolloutMode, record_generation};
use rollout_error::{InferenceError, InferenceErrorKind, InferenceResult};
use rollout_interface::{ChatTemplate, ChatTemplateOptions, ModelServer, RolloutCluster};
use std::num::NonZeroUsize;
use tracing::{debug, error, instrument, warn};

/// Options used for every render: cue the assistant turn, return text, no thinking section.
pub const GENERATION_PROMPT_OPTIONS: ChatTemplateOptions = ChatTemplateOptions {
    add_generation_prompt: true,
    tokenize: false,
    enable_thinking: false,
};

/// Serves generations by rendering the conversation with a chat template and
/// dispatching it as a one-prompt batch to a rollout cluster.
///
/// The adapter holds only immutable configuration. It is `Send + Sync` when its
/// collaborators are, and concurrent calls are independent.
///
/// `G` is the generation-policy configuration of the surrounding training loop.
/// It is held unmodified and never inspected.
#[derive(Debug, Clone)]
pub struct LocalClusterInferenceAdapter<C, T, G = ()> {
    cluster: C,
    micro_batch_size: NonZeroUsize,
    generation_config: G,
    tokenizer: T,
}

impl<C, T, G> LocalClusterInferenceAdapter<C, T, G>
where
    C: RolloutCluster,
    T: ChatTemplate,
{
    /// Create an adapter, rejecting a zero micro-batch size.
    #[track_caller]
    pub fn new(
        cluster: C,
        micro_batch_size: usize,
        generation_config: G,
        tokenizer: T,
    ) -> InferenceResult<Self> {
        let config = AdapterConfig::new(micro_batch_size)?;
        Ok(Self::from_config(cluster, &config, generation_config, tokenizer))
    }

    /// Create an adapter from a loaded [`AdapterConfig`].
    pub fn from_config(
        cluster: C,
        config: &AdapterConfig,
        generation_config: G,
        tokenizer: T,
    ) -> Self {
        Self {
            cluster,
            micro_batch_size: *config.micro_batch_size(),
            generation_config,
            tokenizer,
        }
    }

    /// Micro-batch size forwarded on every dispatch.
    pub fn micro_batch_size(&self) -> NonZeroUsize {
        self.micro_batch_size
    }

    /// The generation-policy configuration this adapter was built with.
    pub fn generation_config(&self) -> &G {
        &self.generation_config
    }

    /// Generate the text for one conversation.
    ///
    /// Shares its name with [`ModelServer::generate`], which always uses
    /// [`RolloutMode::Train`]. Behind an `Arc` or `Box` the pointer's own
    /// `ModelServer` impl is found first, so call this as
    /// `(*adapter).generate(..)` or `LocalClusterInferenceAdapter::generate(&adapter, ..)`.
    pub fn generate(&self, messages: &[Message], mode: RolloutMode) -> InferenceResult<String> {
        self.generate_result(messages, mode)
            .map(GenerationResult::into_text)
    }

    /// Generate one conversation, keeping the backend's metadata.
    #[instrument(
        skip_all,
        fields(
            mode = %mode,
            micro_batch_size = self.micro_batch_size.get(),
            message_count = messages.len()
        )
    )]
    pub fn generate_result(
        &self,
        messages: &[Message],
        mode: RolloutMode,
    ) -> InferenceResult<GenerationResult> {
        let outcome = self.dispatch(messages, mode);
        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => match e.kind() {
                InferenceErrorKind::InvalidInput(_) => "invalid_input",
                InferenceErrorKind::EmptyRollout => "empty_rollout",
                _ => "backend_unavailable",
            },
        };
        record_generation(mode, label);
        outcome
    }

    fn dispatch(&self, messages: &[Message], mode: RolloutMode) -> InferenceResult<GenerationResult> {
        if messages.is_empty() {
            warn!("Rejecting empty conversation");
            return Err(InferenceError::new(InferenceErrorKind::InvalidInput(
                "messages must not be empty".to_string(),
            )));
        }

        let prompt = self
            .tokenizer
            .apply_chat_template(messages, GENERATION_PROMPT_OPTIONS)
            .map_err(|e| {
                error!(error = %e, "Chat template rendering failed");
                InferenceError::new(InferenceErrorKind::BackendUnavailable(format!(
                    "chat template failed: {}",
                    e
                )))
            })?;

        debug!(prompt_len = prompt.len(), "Dispatching rollout");

        let prompts = vec![prompt];
        let output = self
            .cluster
            .generate(&prompts, mode, self.micro_batch_size)
            .map_err(|e| {
                error!(error = %e, "Rollout cluster failed");
                InferenceError::new(InferenceErrorKind::BackendUnavailable(format!(
                    "rollout failed: {}",
                    e
                )))
            })?;

        let (text, finish_reasons, usage, raw) = output.dissolve();

        let text = text.ok_or_else(|| {
            error!("Rollout output has no text field");
            InferenceError::new(InferenceErrorKind::BackendUnavailable(
                "rollout output is missing text".to_string(),
            ))
        })?;

        if text.len() != prompts.len() {
            warn!(
                candidates = text.len(),
                prompts = prompts.len(),
                "Rollout output is not aligned with prompts"
            );
        }

        let first = text
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::new(InferenceErrorKind::EmptyRollout))?;

        let mut builder = GenerationResult::builder();
        builder.text(first).usage(usage).raw(raw);
        if let Some(reason) = finish_reasons.and_then(|r| r.into_iter().next()) {
            builder.finish_reason(reason);
        }

        builder.build().map_err(|e| {
            InferenceError::new(InferenceErrorKind::BackendUnavailable(format!(
                "failed to build generation result: {}",
                e
            )))
        })
    }
}

/// Generates in [`RolloutMode::Train`], the default mode of the policy loop.
impl<C, T, G> ModelServer for LocalClusterInferenceAdapter<C, T, G>
where
    C: RolloutCluster,
    T: ChatTemplate,
    G: Send + Sync,
{
    fn generate(&self, messages: &[Message]) -> InferenceResult<GenerationResult> {
        self.generate_result(messages, RolloutMode::default())
    }
}

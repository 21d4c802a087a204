//! Uniform generation interface for agentic policy loops.
//!
//! Policy code asks a [`ModelServer`] for completions and does not care
//! whether they come from the training cluster's rollout path or a remote
//! endpoint. This crate re-exports the pieces from the member crates:
//!
//! - [`rollout_core`] - messages, modes and generation results
//! - [`rollout_error`] - the error taxonomy
//! - [`rollout_interface`] - the capability and collaborator traits
//! - [`rollout_local`] - the local cluster adapter

pub use rollout_core::{
    DEFAULT_FINISH_REASON, GenerationResult, GenerationResultBuilder, LOG_FORMAT_ENV, Message,
    MessageBuilder, Role, RolloutMode, UsageCounters, init_observability, record_generation,
    shutdown_observability,
};
pub use rollout_error::{
    CollaboratorError, CollaboratorResult, InferenceError, InferenceErrorKind, InferenceResult,
};
pub use rollout_interface::{
    ChatTemplate, ChatTemplateOptions, ModelServer, RolloutCluster, RolloutOutput,
    RolloutOutputBuilder,
};
pub use rollout_local::{
    AdapterConfig, AdapterConfigBuilder, ENV_PREFIX, GENERATION_PROMPT_OPTIONS,
    LocalClusterInferenceAdapter,
};

#[cfg(feature = "mocks")]
pub use rollout_local::mocks;

//! Rollout cluster collaborator.

use derive_getters::{Dissolve, Getters};
use rollout_core::{RolloutMode, UsageCounters};
use rollout_error::CollaboratorResult;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Output of one batched rollout.
///
/// `text` is aligned positionally with the prompts that produced it. It is an
/// `Option` because loosely typed backends can return a payload without it,
/// which consumers must treat as a malformed response.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    Dissolve,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct RolloutOutput {
    /// Generated strings, one per prompt
    #[serde(default)]
    text: Option<Vec<String>>,
    /// Finish reasons, aligned with `text` when present
    #[serde(default)]
    finish_reasons: Option<Vec<String>>,
    /// Aggregate usage counters for the batch
    #[serde(default)]
    usage: Option<UsageCounters>,
    /// Backend-specific payload
    #[serde(default)]
    raw: Option<serde_json::Value>,
}

impl RolloutOutput {
    /// Output carrying only generated text.
    pub fn from_text<I, S>(text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: Some(text.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Returns a builder for constructing a RolloutOutput.
    pub fn builder() -> RolloutOutputBuilder {
        RolloutOutputBuilder::default()
    }
}

/// An in-process cluster that executes batched rollouts.
///
/// Batching, scheduling and any cancellation live behind this trait.
pub trait RolloutCluster: Send + Sync {
    /// Generate one completion per prompt.
    ///
    /// Implementations are expected to return `text` with the same length as
    /// `prompts`.
    fn generate(
        &self,
        prompts: &[String],
        mode: RolloutMode,
        micro_batch_size: NonZeroUsize,
    ) -> CollaboratorResult<RolloutOutput>;
}

impl<T: RolloutCluster + ?Sized> RolloutCluster for &T {
    fn generate(
        &self,
        prompts: &[String],
        mode: RolloutMode,
        micro_batch_size: NonZeroUsize,
    ) -> CollaboratorResult<RolloutOutput> {
        (**self).generate(prompts, mode, micro_batch_size)
    }
}

impl<T: RolloutCluster + ?Sized> RolloutCluster for Arc<T> {
    fn generate(
        &self,
        prompts: &[String],
        mode: RolloutMode,
        micro_batch_size: NonZeroUsize,
    ) -> CollaboratorResult<RolloutOutput> {
        (**self).generate(prompts, mode, micro_batch_size)
    }
}

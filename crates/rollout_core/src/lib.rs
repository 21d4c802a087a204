//! Core data types for the rollout inference client.
//!
//! This crate provides the values that flow through a model server: the chat
//! [`Message`] a caller supplies, the [`RolloutMode`] it runs under, and the
//! [`GenerationResult`] it gets back.

mod generation;
mod message;
mod mode;
mod observability;
mod role;

pub use generation::{
    DEFAULT_FINISH_REASON, GenerationResult, GenerationResultBuilder, UsageCounters,
};
pub use message::{Message, MessageBuilder};
pub use mode::RolloutMode;
pub use observability::{
    LOG_FORMAT_ENV, init_observability, record_generation, shutdown_observability,
};
pub use role::Role;

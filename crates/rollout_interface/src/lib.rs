//! Trait definitions for the rollout inference client.
//!
//! - [`ModelServer`] - the capability callers depend on
//! - [`ChatTemplate`] - renders a conversation into one prompt
//! - [`RolloutCluster`] - executes batched rollouts

mod cluster;
mod server;
mod template;

pub use cluster::{RolloutCluster, RolloutOutput, RolloutOutputBuilder};
pub use server::ModelServer;
pub use template::{ChatTemplate, ChatTemplateOptions};

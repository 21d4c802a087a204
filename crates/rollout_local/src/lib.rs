//! Model server backed by an in-process rollout cluster.
//!
//! [`LocalClusterInferenceAdapter`] lets an agentic policy loop call the same
//! cluster that produces training rollouts through the
//! [`ModelServer`](rollout_interface::ModelServer) capability.
//!
//! ```
//! use rollout_core::{Message, RolloutMode};
//! use rollout_local::LocalClusterInferenceAdapter;
//! use rollout_local::mocks::{RecordingChatTemplate, ScriptedRolloutCluster};
//!
//! let adapter = LocalClusterInferenceAdapter::new(
//!     ScriptedRolloutCluster::returning_text(["9.11 is larger than 9.9."]),
//!     1,
//!     (),
//!     RecordingChatTemplate::returning("formatted prompt"),
//! )?;
//!
//! let answer = adapter.generate(
//!     &[Message::user("which is larger 9.9 or 9.11?")],
//!     RolloutMode::Eval,
//! )?;
//! assert_eq!(answer, "9.11 is larger than 9.9.");
//! # Ok::<(), rollout_error::InferenceError>(())
//! ```

mod adapter;
mod config;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use adapter::{GENERATION_PROMPT_OPTIONS, LocalClusterInferenceAdapter};
pub use config::{AdapterConfig, AdapterConfigBuilder, ENV_PREFIX};

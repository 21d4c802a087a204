//! Adapter configuration.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use rollout_error::{InferenceError, InferenceErrorKind, InferenceResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Prefix for environment overrides (`ROLLOUT_MICRO_BATCH_SIZE`).
pub const ENV_PREFIX: &str = "ROLLOUT";

const DEFAULT_MICRO_BATCH_SIZE: i64 = 1;

/// Fixed settings of a [`LocalClusterInferenceAdapter`](crate::LocalClusterInferenceAdapter).
///
/// ```toml
/// micro_batch_size = 4
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
pub struct AdapterConfig {
    /// Prompts grouped per rollout dispatch
    micro_batch_size: NonZeroUsize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            micro_batch_size: NonZeroUsize::MIN,
        }
    }
}

impl AdapterConfig {
    /// Create a config, rejecting a zero micro-batch size.
    #[track_caller]
    pub fn new(micro_batch_size: usize) -> InferenceResult<Self> {
        let micro_batch_size = NonZeroUsize::new(micro_batch_size).ok_or_else(|| {
            InferenceError::new(InferenceErrorKind::Config(
                "micro_batch_size must be positive".to_string(),
            ))
        })?;
        Ok(Self { micro_batch_size })
    }

    /// Returns a builder for constructing an AdapterConfig.
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }

    /// Load from an optional TOML file, overridden by `ROLLOUT_*` environment variables.
    ///
    /// Missing keys fall back to a micro-batch size of 1.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> InferenceResult<Self> {
        let mut builder = Config::builder()
            .set_default("micro_batch_size", DEFAULT_MICRO_BATCH_SIZE)
            .map_err(config_error)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        tracing::debug!(micro_batch_size = config.micro_batch_size.get(), "Loaded adapter config");
        Ok(config)
    }

    /// Parse inline TOML, without environment overrides.
    pub fn from_toml_str(toml: &str) -> InferenceResult<Self> {
        Config::builder()
            .set_default("micro_batch_size", DEFAULT_MICRO_BATCH_SIZE)
            .map_err(config_error)?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)
    }
}

#[track_caller]
fn config_error(e: config::ConfigError) -> InferenceError {
    InferenceError::new(InferenceErrorKind::Config(e.to_string()))
}

//! Error types for rollout-codegen.

use thiserror::Error;

use rollout_core::ConfigError;

/// All errors that can arise while synthesizing source text.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Invalid trigger/version combination or missing trigger option.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context or quoting values).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

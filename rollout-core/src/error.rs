//! Error types for rollout-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::trigger::TriggerKind;

/// Configuration errors raised while loading the manifest or resolving a
/// function's trigger.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No `rollout.yaml` was found at or above the starting directory.
    #[error("manifest not found (looked for {file_name} from {start})")]
    ManifestNotFound { start: PathBuf, file_name: &'static str },

    /// `project_id` missing or blank. Fatal for the whole run.
    #[error("manifest is missing a project_id")]
    MissingProjectId,

    /// Two manifest entries share a function name.
    #[error("function '{0}' is declared more than once")]
    DuplicateFunction(String),

    /// Function name that cannot be the exported symbol of its entry point.
    #[error("function name '{0}' is not a valid JavaScript identifier")]
    InvalidFunctionName(String),

    /// Trigger name outside the supported set.
    #[error("unknown trigger kind '{0}'")]
    UnknownTrigger(String),

    /// A trigger that needs an option (cron expression, topic, path) lacks it.
    #[error("trigger {trigger} requires the '{option}' option")]
    MissingTriggerOption {
        trigger: TriggerKind,
        option: &'static str,
    },

    /// `v2` requested for a trigger outside the HTTP family.
    #[error("invalid deploy function for https v2: {trigger} only supports v1")]
    InvalidV2Trigger { trigger: TriggerKind },
}

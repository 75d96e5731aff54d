//! rollout core library: domain types, trigger table, manifest, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes, function specs, deployment records, run summary
//! - [`trigger`]: [`TriggerKind`] and its verb table
//! - [`options`]: typed option values
//! - [`manifest`]: `rollout.yaml` load / resolve
//! - [`error`]: [`ConfigError`]

pub mod error;
pub mod manifest;
pub mod options;
pub mod trigger;
pub mod types;

pub use error::ConfigError;
pub use manifest::{Project, ResolvedFunctions};
pub use options::{OptionMap, OptionValue};
pub use trigger::{TriggerFamily, TriggerKind, TriggerVersion};
pub use types::{
    is_js_identifier, BuildArtifact, DeployStatus, DeployTarget, DeploymentRecord, FunctionName,
    FunctionOutcome, FunctionSpec, OutcomeStatus, RunOptions, RunSummary, DEFAULT_CONCURRENCY,
};

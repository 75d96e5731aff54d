//! Domain types shared by the synthesizer, checksum engine and scheduler.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::options::OptionMap;
use crate::trigger::TriggerKind;

/// Default number of deploy operations in flight.
pub const DEFAULT_CONCURRENCY: usize = 10;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed function name; also the exported symbol of the entry point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionName(pub String);

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FunctionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FunctionName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// ASCII JavaScript identifier: `[A-Za-z_$][A-Za-z0-9_$]*`.
pub fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ---------------------------------------------------------------------------
// Function specification
// ---------------------------------------------------------------------------

/// A resolved function, immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub function_name: FunctionName,
    pub trigger_kind: TriggerKind,
    pub trigger_options: OptionMap,
    pub region: String,
    pub runtime_options: Option<OptionMap>,
    /// Absolute path of the module exporting the handler.
    pub source_path: PathBuf,
    /// Absolute build output directory; also holds the local checksum file.
    pub output_dir: PathBuf,
    /// Auxiliary file co-located with the build output, relative to `output_dir`.
    pub aux_file: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
    /// Baseline checksum merged in from the remote cache.
    pub cached_checksum: Option<String>,
}

impl FunctionSpec {
    /// Copy of this spec carrying `checksum` as its remote baseline.
    pub fn with_cached_checksum(&self, checksum: Option<String>) -> Self {
        Self {
            cached_checksum: checksum,
            ..self.clone()
        }
    }
}

/// The bundler's output for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub output_dir: PathBuf,
    /// Primary output file hashed for change detection.
    pub main_file: PathBuf,
}

impl BuildArtifact {
    /// Bundle file name the build command is expected to produce.
    pub const MAIN_FILE: &'static str = "index.js";

    /// Artifact layout for a build into `output_dir`.
    pub fn in_output_dir(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            main_file: output_dir.join(Self::MAIN_FILE),
        }
    }
}

/// A changed function on its way to the scheduler.
#[derive(Debug, Clone)]
pub struct DeployTarget {
    pub spec: FunctionSpec,
    pub entry_point: PathBuf,
    pub artifact: BuildArtifact,
    pub checksum: Option<String>,
}

impl DeployTarget {
    pub fn name(&self) -> &FunctionName {
        &self.spec.function_name
    }
}

// ---------------------------------------------------------------------------
// Deployment bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    #[default]
    Pending,
    Deployed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub function_name: FunctionName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub status: DeployStatus,
}

impl DeploymentRecord {
    pub fn pending(target: &DeployTarget) -> Self {
        Self {
            function_name: target.name().clone(),
            checksum: target.checksum.clone(),
            status: DeployStatus::Pending,
        }
    }
}

/// Options for one `rollout deploy` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub concurrency: usize,
    pub retry_amount: Option<u32>,
    pub force: bool,
    /// Restrict the run to these function names.
    pub only: Option<Vec<FunctionName>>,
    /// Build and synthesize, but never deploy.
    pub dry_run: bool,
    /// Keep the temporary directory of generated sources.
    pub debug: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_amount: None,
            force: false,
            only: None,
            dry_run: false,
            debug: false,
        }
    }
}

impl RunOptions {
    /// Parse a comma-separated `--only` value. Blank entries are ignored.
    pub fn parse_only(raw: &str) -> Vec<FunctionName> {
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(FunctionName::from)
            .collect()
    }

    /// Whether `name` survives the `only` filter.
    pub fn selects(&self, name: &FunctionName) -> bool {
        match &self.only {
            Some(names) => names.contains(name),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Final state of one function after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Deployed,
    /// Checksum matched the baseline.
    Skipped,
    /// `--dry-run`: the function changed and would have been deployed.
    WouldDeploy,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionOutcome {
    pub function_name: FunctionName,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<FunctionOutcome>,
}

impl RunSummary {
    pub fn push(&mut self, function_name: FunctionName, status: OutcomeStatus) {
        self.outcomes.push(FunctionOutcome {
            function_name,
            status,
        });
    }

    /// True iff no function ended in a failed state.
    pub fn success(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Project manifest (`rollout.yaml`) loading and function resolution.
//!
//! # Layout
//!
//! ```text
//! <project root>/
//!   rollout.yaml
//!   src/...                      (handler modules, referenced by `source`)
//!   dist/functions/<name>/       (default build output per function)
//!     index.js
//!     .rollout-checksum
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit manifest path; used in tests with `TempDir`
//! - `load()`: discovers the manifest from the working directory, delegates to `load_at`

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::options::OptionMap;
use crate::trigger::TriggerKind;
use crate::types::{is_js_identifier, FunctionName, FunctionSpec};

/// Manifest file name looked up from the working directory upwards.
pub const MANIFEST_FILE: &str = "rollout.yaml";

pub const DEFAULT_REGION: &str = "us-central1";

// ---------------------------------------------------------------------------
// 1. On-disk shape
// ---------------------------------------------------------------------------

/// Root of `rollout.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Argv template run once per function to bundle its entry point.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,
    /// Argv template run once per function to deploy it.
    #[serde(default = "default_deploy_command")]
    pub deploy_command: Vec<String>,
    /// Argv prefix used to execute generated hook scripts.
    #[serde(default = "default_script_runner")]
    pub script_runner: Vec<String>,
    /// Module exporting `fetchChecksums` / `updateChecksums`.
    #[serde(default)]
    pub checksum_hooks: Option<PathBuf>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
}

/// One `functions:` entry, before trigger resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub trigger: String,
    #[serde(default)]
    pub options: OptionMap,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub runtime_options: Option<OptionMap>,
    pub source: PathBuf,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub aux_file: Option<PathBuf>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_build_command() -> Vec<String> {
    [
        "npx",
        "esbuild",
        "{entry}",
        "--bundle",
        "--platform=node",
        "--format=cjs",
        "--outfile={main}",
    ]
    .map(String::from)
    .to_vec()
}

fn default_deploy_command() -> Vec<String> {
    [
        "npx",
        "firebase",
        "deploy",
        "--only",
        "functions:{name}",
        "--project",
        "{project}",
        "--force",
    ]
    .map(String::from)
    .to_vec()
}

fn default_script_runner() -> Vec<String> {
    ["npx", "tsx"].map(String::from).to_vec()
}

// ---------------------------------------------------------------------------
// 2. Loaded project
// ---------------------------------------------------------------------------

/// A validated manifest plus the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing `rollout.yaml`; relative paths resolve against it.
    pub root: PathBuf,
    pub project_id: String,
    pub manifest: Manifest,
}

/// Outcome of resolving every manifest entry.
///
/// A bad entry only rejects that function; the rest of the run proceeds.
#[derive(Debug, Default)]
pub struct ResolvedFunctions {
    pub specs: Vec<FunctionSpec>,
    pub rejected: Vec<(FunctionName, ConfigError)>,
}

impl Project {
    /// Resolve every entry into a [`FunctionSpec`].
    pub fn resolve(&self) -> ResolvedFunctions {
        let mut resolved = ResolvedFunctions::default();
        for entry in &self.manifest.functions {
            match self.resolve_entry(entry) {
                Ok(spec) => resolved.specs.push(spec),
                Err(err) => resolved
                    .rejected
                    .push((FunctionName::from(entry.name.clone()), err)),
            }
        }
        resolved
    }

    fn resolve_entry(&self, entry: &FunctionEntry) -> Result<FunctionSpec, ConfigError> {
        if !is_js_identifier(&entry.name) {
            return Err(ConfigError::InvalidFunctionName(entry.name.clone()));
        }
        let trigger_kind: TriggerKind = entry.trigger.parse()?;
        trigger_kind.resolve_version(&entry.options)?;

        let output_dir = match &entry.output_dir {
            Some(dir) => self.root.join(dir),
            None => self.root.join("dist").join("functions").join(&entry.name),
        };

        let mut environment = self.manifest.environment.clone();
        environment.extend(entry.environment.clone());

        Ok(FunctionSpec {
            function_name: FunctionName::from(entry.name.clone()),
            trigger_kind,
            trigger_options: entry.options.clone(),
            region: entry
                .region
                .clone()
                .unwrap_or_else(|| self.manifest.region.clone()),
            runtime_options: entry.runtime_options.clone(),
            source_path: self.root.join(&entry.source),
            output_dir,
            aux_file: entry.aux_file.clone(),
            environment,
            cached_checksum: None,
        })
    }

    /// Absolute path of the checksum hooks module, if configured.
    pub fn checksum_hooks(&self) -> Option<PathBuf> {
        self.manifest
            .checksum_hooks
            .as_ref()
            .map(|path| self.root.join(path))
    }
}

// ---------------------------------------------------------------------------
// 3. Discovery + load
// ---------------------------------------------------------------------------

/// Walk from `start` up to the filesystem root looking for [`MANIFEST_FILE`].
pub fn find_manifest(start: &Path) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ConfigError::ManifestNotFound {
        start: start.to_path_buf(),
        file_name: MANIFEST_FILE,
    })
}

/// Load and validate the manifest at `path`.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML,
/// `ConfigError::MissingProjectId` or `ConfigError::DuplicateFunction` if the
/// manifest is structurally invalid.
pub fn load_at(path: &Path) -> Result<Project, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project_id = manifest
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ConfigError::MissingProjectId)?
        .to_string();

    let mut seen = HashSet::new();
    for entry in &manifest.functions {
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::DuplicateFunction(entry.name.clone()));
        }
    }

    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Project {
        root,
        project_id,
        manifest,
    })
}

/// `load_at` convenience wrapper: discovers the manifest from the working directory.
pub fn load() -> Result<Project, ConfigError> {
    let cwd = std::env::current_dir()?;
    load_at(&find_manifest(&cwd)?)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

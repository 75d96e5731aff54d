//! Remote checksum cache, reached only through the project's hook module.
//!
//! Both directions synthesize a short script into the run's tmp dir and hand
//! it to a [`ScriptRunner`]. Fetch results come back through a JSON file:
//! a flat `{ "functionName": "checksum" }` object.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use rollout_codegen::Synthesizer;
use rollout_core::{DeploymentRecord, Project};

use crate::error::{io_err, SyncError};
use crate::writer::atomic_write;

/// `functionName → checksum` as stored by the remote cache.
pub type RemoteChecksums = BTreeMap<String, String>;

pub const FETCH_SCRIPT_FILE: &str = "__rollout_fetch_checksums.ts";
pub const FETCH_OUTPUT_FILE: &str = "__rollout_remote_checksums.json";
pub const UPDATE_SCRIPT_FILE: &str = "__rollout_update_checksums.ts";

/// Executes a generated hook script to completion.
pub trait ScriptRunner: Send + Sync {
    fn run_script(&self, script: &Path) -> Result<(), SyncError>;
}

/// Runs scripts with an argv prefix such as `npx tsx`.
#[derive(Debug, Clone)]
pub struct CommandScriptRunner {
    pub command: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandScriptRunner {
    /// Runner configured from the manifest's `script_runner`, rooted at the
    /// project directory.
    pub fn for_project(project: &Project) -> Self {
        Self {
            command: project.manifest.script_runner.clone(),
            cwd: project.root.clone(),
        }
    }
}

impl ScriptRunner for CommandScriptRunner {
    fn run_script(&self, script: &Path) -> Result<(), SyncError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(SyncError::Script {
                script: script.to_path_buf(),
                detail: "script runner command is empty".into(),
            });
        };
        let output = Command::new(program)
            .args(args)
            .arg(script)
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| io_err(program, e))?;
        if output.status.success() {
            return Ok(());
        }
        Err(SyncError::Script {
            script: script.to_path_buf(),
            detail: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Inputs shared by the fetch and update directions.
#[derive(Clone, Copy)]
pub struct RemoteCache<'a> {
    pub runner: &'a dyn ScriptRunner,
    pub synth: &'a Synthesizer,
    /// Hook module; `None` disables the remote cache entirely.
    pub hooks: Option<&'a Path>,
    pub project_id: &'a str,
    pub tmp_dir: &'a Path,
}

impl RemoteCache<'_> {
    /// Fetch the remote checksum mapping. `force`, a missing hook module and
    /// any failure all yield `None`.
    pub fn fetch(&self, force: bool) -> Option<RemoteChecksums> {
        if force {
            tracing::debug!("force set, remote checksums not fetched");
            return None;
        }
        let hooks = self.hooks?;
        match self.try_fetch(hooks) {
            Ok(checksums) => {
                tracing::info!(count = checksums.len(), "remote checksums fetched");
                Some(checksums)
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote checksums unavailable");
                None
            }
        }
    }

    fn try_fetch(&self, hooks: &Path) -> Result<RemoteChecksums, SyncError> {
        let output = self.tmp_dir.join(FETCH_OUTPUT_FILE);
        let script = self.tmp_dir.join(FETCH_SCRIPT_FILE);
        atomic_write(
            &script,
            &self.synth.fetch_script(hooks, self.project_id, &output)?,
        )?;
        self.runner.run_script(&script)?;
        let raw = std::fs::read_to_string(&output).map_err(|e| io_err(&output, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Push the checksums of `records` to the remote cache. Records without a
    /// checksum are left out; failures are logged only.
    pub fn update(&self, records: &[DeploymentRecord]) {
        let Some(hooks) = self.hooks else {
            return;
        };
        let checksums = checksum_mapping(records);
        if checksums.is_empty() {
            tracing::debug!("no checksums to upload");
            return;
        }
        match self.try_update(hooks, &checksums) {
            Ok(()) => tracing::info!(count = checksums.len(), "remote checksums updated"),
            Err(err) => tracing::warn!(error = %err, "failed to update remote checksums"),
        }
    }

    fn try_update(&self, hooks: &Path, checksums: &RemoteChecksums) -> Result<(), SyncError> {
        let script = self.tmp_dir.join(UPDATE_SCRIPT_FILE);
        atomic_write(
            &script,
            &self.synth.update_script(hooks, self.project_id, checksums)?,
        )?;
        self.runner.run_script(&script)
    }
}

/// `functionName → checksum` for every record carrying a non-empty checksum.
pub fn checksum_mapping(records: &[DeploymentRecord]) -> RemoteChecksums {
    records
        .iter()
        .filter_map(|record| {
            let checksum = record.checksum.as_deref().filter(|c| !c.is_empty())?;
            Some((record.function_name.0.clone(), checksum.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

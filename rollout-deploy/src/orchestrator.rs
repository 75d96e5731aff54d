//! One `rollout deploy` run, end to end.
//!
//! resolve → `only` filter → tmp dir → remote fetch + merge → prepare
//! (synthesize, build, change check; bounded) → dry-run short-circuit →
//! schedule → persist local checksums → update remote cache → cleanup.
//!
//! Per-function failures become [`OutcomeStatus::Failed`]; only startup
//! errors (tmp dir creation, template loading) abort the run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use rollout_codegen::Synthesizer;
use rollout_core::{
    DeployStatus, DeployTarget, DeploymentRecord, FunctionName, FunctionSpec, OutcomeStatus,
    Project, RunOptions, RunSummary,
};
use rollout_sync::{
    check_for_changes, persist_checksum, write_entry_point, ChangeSignal, CommandScriptRunner,
    RemoteCache, RemoteChecksums, ScriptRunner,
};

use crate::command::{Builder, CommandBuilder, CommandDeployer};
use crate::error::{io_err, DeployError};
use crate::pool::run_bounded;
use crate::scheduler::{schedule, Deployer, SchedulerOptions};

/// Result of preparing one function for deployment.
enum Prepared {
    Changed(DeployTarget),
    Unchanged,
}

pub struct Orchestrator<B, D> {
    project: Project,
    synth: Arc<Synthesizer>,
    builder: Arc<B>,
    deployer: Arc<D>,
    runner: Arc<dyn ScriptRunner>,
}

impl Orchestrator<CommandBuilder, CommandDeployer> {
    /// Orchestrator running the manifest's build, deploy and script commands.
    pub fn from_project(project: Project) -> Result<Self, DeployError> {
        let builder = CommandBuilder::for_project(&project);
        let deployer = CommandDeployer::for_project(&project);
        let runner = CommandScriptRunner::for_project(&project);
        Self::new(project, builder, deployer, Arc::new(runner))
    }
}

impl<B: Builder, D: Deployer> Orchestrator<B, D> {
    pub fn new(
        project: Project,
        builder: B,
        deployer: D,
        runner: Arc<dyn ScriptRunner>,
    ) -> Result<Self, DeployError> {
        Ok(Self {
            project,
            synth: Arc::new(Synthesizer::new()?),
            builder: Arc::new(builder),
            deployer: Arc::new(deployer),
            runner,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run every selected function through the pipeline.
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary, DeployError> {
        let resolved = self.project.resolve();
        let mut statuses: BTreeMap<FunctionName, OutcomeStatus> = BTreeMap::new();

        for (name, err) in resolved.rejected {
            if options.selects(&name) {
                tracing::error!(function = %name, error = %err, "invalid function configuration");
                statuses.insert(name, OutcomeStatus::Failed { reason: err.to_string() });
            }
        }
        let specs: Vec<FunctionSpec> = resolved
            .specs
            .into_iter()
            .filter(|spec| options.selects(&spec.function_name))
            .collect();
        self.warn_unknown_only(options);

        if specs.is_empty() {
            tracing::info!("no functions selected");
            return Ok(self.summarize(options, statuses));
        }

        let tmp_dir = create_tmp_dir().await?;
        let result = self.run_in(tmp_dir.path(), specs, options, &mut statuses).await;
        cleanup_tmp_dir(tmp_dir, options.debug).await;
        result?;

        Ok(self.summarize(options, statuses))
    }

    async fn run_in(
        &self,
        tmp_dir: &Path,
        specs: Vec<FunctionSpec>,
        options: &RunOptions,
        statuses: &mut BTreeMap<FunctionName, OutcomeStatus>,
    ) -> Result<(), DeployError> {
        let remote = self.fetch_remote(tmp_dir, options.force).await?;
        let specs: Vec<FunctionSpec> = match &remote {
            Some(checksums) => specs
                .iter()
                .map(|spec| spec.with_cached_checksum(checksums.get(&spec.function_name.0).cloned()))
                .collect(),
            None => specs,
        };

        let mut pending: BTreeSet<FunctionName> =
            specs.iter().map(|spec| spec.function_name.clone()).collect();
        let mut targets = Vec::new();
        for (name, prepared) in self.prepare_all(tmp_dir, specs, options).await {
            pending.remove(&name);
            match prepared {
                Ok(Prepared::Changed(target)) => targets.push(target),
                Ok(Prepared::Unchanged) => {
                    statuses.insert(name, OutcomeStatus::Skipped);
                }
                Err(err) => {
                    tracing::error!(function = %name, error = %err, "build failed");
                    statuses.insert(name, OutcomeStatus::Failed { reason: err.to_string() });
                }
            }
        }
        for name in pending {
            statuses.insert(
                name,
                OutcomeStatus::Failed {
                    reason: "build task did not complete".to_string(),
                },
            );
        }

        if options.dry_run {
            for target in targets {
                tracing::info!(function = %target.name(), "would deploy (dry run)");
                statuses.insert(target.name().clone(), OutcomeStatus::WouldDeploy);
            }
            return Ok(());
        }
        if targets.is_empty() {
            tracing::info!("nothing to deploy");
            return Ok(());
        }

        let report = schedule(
            targets,
            self.deployer.clone(),
            SchedulerOptions {
                concurrency: options.concurrency,
                retry_amount: options.retry_amount,
            },
        )
        .await;

        let deployed: Vec<(PathBuf, Option<String>)> = report
            .deployed
            .iter()
            .map(|target| (target.spec.output_dir.clone(), target.checksum.clone()))
            .collect();
        tokio::task::spawn_blocking(move || {
            for (output_dir, checksum) in &deployed {
                persist_checksum(output_dir, checksum.as_deref());
            }
        })
        .await?;

        let records: Vec<_> = report
            .records
            .iter()
            .filter(|record| record.status == DeployStatus::Deployed)
            .cloned()
            .collect();
        self.update_remote(tmp_dir, records).await?;

        for target in &report.deployed {
            statuses.insert(target.name().clone(), OutcomeStatus::Deployed);
        }
        for (name, reason) in report.failures {
            statuses.insert(name, OutcomeStatus::Failed { reason });
        }
        Ok(())
    }

    /// Synthesize, build and change-check every spec with bounded concurrency.
    async fn prepare_all(
        &self,
        tmp_dir: &Path,
        specs: Vec<FunctionSpec>,
        options: &RunOptions,
    ) -> Vec<(FunctionName, Result<Prepared, DeployError>)> {
        let synth = self.synth.clone();
        let builder = self.builder.clone();
        let tmp_dir = tmp_dir.to_path_buf();
        let force = options.force;
        run_bounded(specs, options.concurrency, move |spec: FunctionSpec| {
            let synth = synth.clone();
            let builder = builder.clone();
            let tmp_dir = tmp_dir.clone();
            async move {
                let name = spec.function_name.clone();
                let prepared = prepare(synth, builder.as_ref(), &tmp_dir, spec, force).await;
                (name, prepared)
            }
        })
        .await
    }

    async fn fetch_remote(
        &self,
        tmp_dir: &Path,
        force: bool,
    ) -> Result<Option<RemoteChecksums>, DeployError> {
        let Some(hooks) = self.project.checksum_hooks() else {
            return Ok(None);
        };
        let runner = self.runner.clone();
        let synth = self.synth.clone();
        let project_id = self.project.project_id.clone();
        let tmp_dir = tmp_dir.to_path_buf();
        let fetched = tokio::task::spawn_blocking(move || {
            RemoteCache {
                runner: runner.as_ref(),
                synth: &synth,
                hooks: Some(hooks.as_path()),
                project_id: &project_id,
                tmp_dir: &tmp_dir,
            }
            .fetch(force)
        })
        .await?;
        Ok(fetched)
    }

    async fn update_remote(
        &self,
        tmp_dir: &Path,
        records: Vec<DeploymentRecord>,
    ) -> Result<(), DeployError> {
        let Some(hooks) = self.project.checksum_hooks() else {
            return Ok(());
        };
        let runner = self.runner.clone();
        let synth = self.synth.clone();
        let project_id = self.project.project_id.clone();
        let tmp_dir = tmp_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            RemoteCache {
                runner: runner.as_ref(),
                synth: &synth,
                hooks: Some(hooks.as_path()),
                project_id: &project_id,
                tmp_dir: &tmp_dir,
            }
            .update(&records)
        })
        .await?;
        Ok(())
    }

    fn warn_unknown_only(&self, options: &RunOptions) {
        let Some(only) = &options.only else {
            return;
        };
        for name in only {
            let known = self
                .project
                .manifest
                .functions
                .iter()
                .any(|entry| entry.name == name.0);
            if !known {
                tracing::warn!(function = %name, "--only names a function not in the manifest");
            }
        }
    }

    /// Outcomes in manifest order.
    fn summarize(
        &self,
        options: &RunOptions,
        mut statuses: BTreeMap<FunctionName, OutcomeStatus>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.project.manifest.functions {
            let name = FunctionName::from(entry.name.clone());
            if !options.selects(&name) {
                continue;
            }
            if let Some(status) = statuses.remove(&name) {
                summary.push(name, status);
            }
        }
        summary
    }
}

async fn prepare<B: Builder>(
    synth: Arc<Synthesizer>,
    builder: &B,
    tmp_dir: &Path,
    spec: FunctionSpec,
    force: bool,
) -> Result<Prepared, DeployError> {
    let entry_point = {
        let spec = spec.clone();
        let tmp_dir = tmp_dir.to_path_buf();
        tokio::task::spawn_blocking(move || write_entry_point(&synth, &spec, &tmp_dir)).await??
    };

    let artifact = builder.build(&spec, &entry_point).await?;

    let (spec, artifact, signal) = tokio::task::spawn_blocking(move || {
        let signal = check_for_changes(&spec, &artifact, force);
        (spec, artifact, signal)
    })
    .await?;

    Ok(match signal {
        ChangeSignal::Unchanged { .. } => Prepared::Unchanged,
        ChangeSignal::Changed { checksum } => Prepared::Changed(DeployTarget {
            spec,
            entry_point,
            artifact,
            checksum,
        }),
    })
}

/// Fresh `rollout-*` directory under the system temp dir, unique per run.
async fn create_tmp_dir() -> Result<TempDir, DeployError> {
    let dir = tokio::task::spawn_blocking(|| tempfile::Builder::new().prefix("rollout-").tempdir())
        .await?
        .map_err(|e| io_err(std::env::temp_dir(), e))?;
    tracing::debug!(path = %dir.path().display(), "tmp dir created");
    Ok(dir)
}

async fn cleanup_tmp_dir(dir: TempDir, keep: bool) {
    if keep {
        let path = dir.keep();
        tracing::info!(path = %path.display(), "debug: keeping generated sources");
        return;
    }
    let path = dir.path().to_path_buf();
    let closed = tokio::task::spawn_blocking(move || dir.close()).await;
    match closed {
        Ok(Ok(())) => tracing::debug!(path = %path.display(), "tmp dir removed"),
        Ok(Err(err)) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove tmp dir")
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "tmp dir cleanup task failed")
        }
    }
}

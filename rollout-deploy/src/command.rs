//! External build and deploy commands.
//!
//! Both are argv templates from `rollout.yaml`. Placeholders:
//!
//! | Placeholder | Value                                  |
//! |-------------|----------------------------------------|
//! | `{name}`    | function name                          |
//! | `{project}` | project id                             |
//! | `{region}`  | function region                        |
//! | `{entry}`   | generated entry point                  |
//! | `{outdir}`  | build output directory                 |
//! | `{main}`    | bundle file inside the output directory |
//!
//! Commands run from the project root with the function's environment.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use rollout_core::{BuildArtifact, DeployTarget, FunctionSpec, Project};

use crate::error::{io_err, DeployError};
use crate::scheduler::Deployer;

/// Bundles one function's generated entry point.
pub trait Builder: Send + Sync + 'static {
    fn build(
        &self,
        spec: &FunctionSpec,
        entry_point: &Path,
    ) -> impl Future<Output = Result<BuildArtifact, DeployError>> + Send;
}

/// Values substituted into an argv template.
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    pub name: &'a str,
    pub project: &'a str,
    pub region: &'a str,
    pub entry: &'a Path,
    pub outdir: &'a Path,
    pub main: &'a Path,
}

impl<'a> Placeholders<'a> {
    pub fn new(project: &'a str, spec: &'a FunctionSpec, entry: &'a Path, artifact: &'a BuildArtifact) -> Self {
        Self {
            name: &spec.function_name.0,
            project,
            region: &spec.region,
            entry,
            outdir: &artifact.output_dir,
            main: &artifact.main_file,
        }
    }

    fn expand_arg(&self, arg: &str) -> String {
        arg.replace("{name}", self.name)
            .replace("{project}", self.project)
            .replace("{region}", self.region)
            .replace("{entry}", &self.entry.to_string_lossy())
            .replace("{outdir}", &self.outdir.to_string_lossy())
            .replace("{main}", &self.main.to_string_lossy())
    }
}

/// Expand every placeholder in `template`.
pub fn expand(template: &[String], vars: &Placeholders<'_>) -> Vec<String> {
    template.iter().map(|arg| vars.expand_arg(arg)).collect()
}

async fn run_command(
    stage: &'static str,
    argv: &[String],
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<(), DeployError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(DeployError::EmptyCommand { stage });
    };
    tracing::debug!(stage, command = %argv.join(" "), "running");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| io_err(program, e))?;
    if output.status.success() {
        return Ok(());
    }
    Err(DeployError::CommandFailed {
        stage,
        program: program.clone(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    pub argv: Vec<String>,
    pub project_id: String,
    pub cwd: PathBuf,
}

impl CommandBuilder {
    pub fn for_project(project: &Project) -> Self {
        Self {
            argv: project.manifest.build_command.clone(),
            project_id: project.project_id.clone(),
            cwd: project.root.clone(),
        }
    }
}

impl Builder for CommandBuilder {
    async fn build(&self, spec: &FunctionSpec, entry_point: &Path) -> Result<BuildArtifact, DeployError> {
        let artifact = BuildArtifact::in_output_dir(&spec.output_dir);
        tokio::fs::create_dir_all(&artifact.output_dir)
            .await
            .map_err(|e| io_err(&artifact.output_dir, e))?;

        let argv = expand(
            &self.argv,
            &Placeholders::new(&self.project_id, spec, entry_point, &artifact),
        );
        run_command("build", &argv, &self.cwd, &spec.environment).await?;

        if !tokio::fs::try_exists(&artifact.main_file).await.unwrap_or(false) {
            return Err(DeployError::MissingBundle {
                path: artifact.main_file,
            });
        }
        tracing::debug!(function = %spec.function_name, "built");
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Deployer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandDeployer {
    pub argv: Vec<String>,
    pub project_id: String,
    pub cwd: PathBuf,
}

impl CommandDeployer {
    pub fn for_project(project: &Project) -> Self {
        Self {
            argv: project.manifest.deploy_command.clone(),
            project_id: project.project_id.clone(),
            cwd: project.root.clone(),
        }
    }
}

impl Deployer for CommandDeployer {
    async fn deploy(&self, target: &DeployTarget) -> Result<(), DeployError> {
        let argv = expand(
            &self.argv,
            &Placeholders::new(&self.project_id, &target.spec, &target.entry_point, &target.artifact),
        );
        run_command("deploy", &argv, &self.cwd, &target.spec.environment).await
    }
}

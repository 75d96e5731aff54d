//! `rollout deploy`: build, change-check and deploy functions.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use rollout_core::{OutcomeStatus, RunOptions, RunSummary, DEFAULT_CONCURRENCY};
use rollout_deploy::{start_blocking, Orchestrator};

use super::load_project;

/// Arguments for `rollout deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Maximum builds/deploys in flight.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Extra rounds over functions that failed to deploy.
    #[arg(long)]
    pub retry_amount: Option<u32>,

    /// Deploy even when the checksum is unchanged.
    #[arg(long)]
    pub force: bool,

    /// Comma-separated function names to restrict the run to.
    #[arg(long)]
    pub only: Option<String>,

    /// Build and check for changes without deploying.
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the temporary directory of generated entry points.
    #[arg(long)]
    pub debug: bool,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DeployArgs {
    fn options(&self) -> RunOptions {
        RunOptions {
            concurrency: self.concurrency,
            retry_amount: self.retry_amount,
            force: self.force,
            only: self.only.as_deref().map(RunOptions::parse_only),
            dry_run: self.dry_run,
            debug: self.debug,
        }
    }

    pub fn run(self, manifest: Option<&Path>) -> Result<()> {
        let project = load_project(manifest)?;
        let options = self.options();
        let orchestrator =
            Orchestrator::from_project(project).context("failed to initialise deployer")?;
        let summary = start_blocking(orchestrator.run(&options))
            .context("failed to start async runtime")?
            .context("deploy run aborted")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
        } else {
            print_summary(&summary, options.dry_run);
        }

        let failed = summary.count(|s| matches!(s, OutcomeStatus::Failed { .. }));
        if failed > 0 {
            bail!("{failed} function(s) failed to deploy");
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "function")]
    function: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if summary.outcomes.is_empty() {
        println!("{prefix}No functions selected.");
        return;
    }

    let rows: Vec<OutcomeRow> = summary
        .outcomes
        .iter()
        .map(|outcome| OutcomeRow {
            function: outcome.function_name.0.clone(),
            status: status_label(&outcome.status),
            detail: match &outcome.status {
                OutcomeStatus::Failed { reason } => reason.clone(),
                _ => String::new(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    println!(
        "{prefix}{} deployed, {} would deploy, {} skipped, {} failed",
        summary.count(|s| matches!(s, OutcomeStatus::Deployed)),
        summary.count(|s| matches!(s, OutcomeStatus::WouldDeploy)),
        summary.count(|s| matches!(s, OutcomeStatus::Skipped)),
        summary.count(|s| matches!(s, OutcomeStatus::Failed { .. })),
    );
}

fn status_label(status: &OutcomeStatus) -> String {
    match status {
        OutcomeStatus::Deployed => "deployed".green().bold().to_string(),
        OutcomeStatus::WouldDeploy => "would deploy".cyan().to_string(),
        OutcomeStatus::Skipped => "skipped".bright_black().to_string(),
        OutcomeStatus::Failed { .. } => "failed".red().bold().to_string(),
    }
}

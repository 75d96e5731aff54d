//! `rollout status`: built artifacts versus their last deployed checksum.
//!
//! Only the local checksum files are consulted; the remote cache is never
//! fetched here.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use rollout_core::{BuildArtifact, FunctionSpec, Project};
use rollout_sync::{change::artifact_checksum, read_checksum};

use super::load_project;

/// Arguments for `rollout status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, manifest: Option<&Path>) -> Result<()> {
        let project = load_project(manifest)?;
        let rows = build_report(&project);
        if self.json {
            print_json(&project, rows)?;
            return Ok(());
        }
        print_table(&project, rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionState {
    /// Built output matches the last deployed checksum.
    Current,
    /// Built output differs from the last deployed checksum.
    Modified,
    /// Built, but no checksum has been recorded.
    NeverDeployed,
    /// No bundle in the output directory.
    NotBuilt,
    /// Manifest entry could not be resolved.
    Invalid,
}

#[derive(Debug, Clone)]
struct FunctionStatus {
    function: String,
    trigger: String,
    state: FunctionState,
    detail: String,
}

#[derive(Serialize)]
struct StatusReportJson {
    project_id: String,
    functions: Vec<FunctionStatusJson>,
}

#[derive(Serialize)]
struct FunctionStatusJson {
    function: String,
    trigger: String,
    status: String,
    detail: String,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "function")]
    function: String,
    #[tabled(rename = "trigger")]
    trigger: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn build_report(project: &Project) -> Vec<FunctionStatus> {
    let resolved = project.resolve();
    let mut rows: Vec<FunctionStatus> = resolved.specs.iter().map(function_status).collect();
    for (name, err) in resolved.rejected {
        let trigger = project
            .manifest
            .functions
            .iter()
            .find(|entry| entry.name == name.0)
            .map(|entry| entry.trigger.clone())
            .unwrap_or_default();
        rows.push(FunctionStatus {
            function: name.0,
            trigger,
            state: FunctionState::Invalid,
            detail: err.to_string(),
        });
    }

    // Manifest order.
    let position = |name: &str| {
        project
            .manifest
            .functions
            .iter()
            .position(|entry| entry.name == name)
            .unwrap_or(usize::MAX)
    };
    rows.sort_by_key(|row| position(&row.function));
    rows
}

fn function_status(spec: &FunctionSpec) -> FunctionStatus {
    let artifact = BuildArtifact::in_output_dir(&spec.output_dir);
    let (state, detail) = if !artifact.main_file.is_file() {
        (
            FunctionState::NotBuilt,
            format!("no bundle at {}", artifact.main_file.display()),
        )
    } else {
        match (artifact_checksum(spec, &artifact), read_checksum(&spec.output_dir)) {
            (Err(err), _) => (FunctionState::Modified, err.to_string()),
            (Ok(_), None) => (FunctionState::NeverDeployed, "no recorded checksum".to_string()),
            (Ok(current), Some(deployed)) if current == deployed => {
                (FunctionState::Current, short(&current))
            }
            (Ok(current), Some(deployed)) => (
                FunctionState::Modified,
                format!("{} → {}", short(&deployed), short(&current)),
            ),
        }
    };
    FunctionStatus {
        function: spec.function_name.0.clone(),
        trigger: spec.trigger_kind.to_string(),
        state,
        detail,
    }
}

fn short(checksum: &str) -> String {
    checksum.chars().take(12).collect()
}

fn print_json(project: &Project, rows: Vec<FunctionStatus>) -> Result<()> {
    let payload = StatusReportJson {
        project_id: project.project_id.clone(),
        functions: rows
            .into_iter()
            .map(|row| FunctionStatusJson {
                function: row.function,
                trigger: row.trigger,
                status: state_key(row.state).to_string(),
                detail: row.detail,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(project: &Project, rows: Vec<FunctionStatus>) {
    let pending = rows
        .iter()
        .filter(|r| r.state != FunctionState::Current)
        .count();
    println!(
        "rollout v{} | {} | {} functions | {} pending",
        env!("CARGO_PKG_VERSION"),
        project.project_id.bold(),
        rows.len(),
        pending,
    );

    if rows.is_empty() {
        println!("No functions declared in rollout.yaml.");
        return;
    }

    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|row| StatusTableRow {
            function: row.function,
            trigger: row.trigger,
            status: format!("{} {}", state_indicator(row.state), state_label(row.state)),
            detail: row.detail,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if pending > 0 {
        println!("Run 'rollout deploy' to build and deploy pending functions.");
    }
}

fn state_key(state: FunctionState) -> &'static str {
    match state {
        FunctionState::Current => "current",
        FunctionState::Modified => "modified",
        FunctionState::NeverDeployed => "never_deployed",
        FunctionState::NotBuilt => "not_built",
        FunctionState::Invalid => "invalid",
    }
}

fn state_label(state: FunctionState) -> &'static str {
    match state {
        FunctionState::Current => "CURRENT",
        FunctionState::Modified => "MODIFIED",
        FunctionState::NeverDeployed => "NEVER DEPLOYED",
        FunctionState::NotBuilt => "NOT BUILT",
        FunctionState::Invalid => "INVALID",
    }
}

fn state_indicator(state: FunctionState) -> String {
    match state {
        FunctionState::Current => "■".green().bold().to_string(),
        FunctionState::Modified => "■".yellow().bold().to_string(),
        FunctionState::NeverDeployed => "■".bright_black().bold().to_string(),
        FunctionState::NotBuilt => "■".bright_black().to_string(),
        FunctionState::Invalid => "■".red().bold().to_string(),
    }
}

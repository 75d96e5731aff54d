//! rollout: incremental serverless function deployment.
//!
//! # Usage
//!
//! ```text
//! rollout deploy [--concurrency N] [--retry-amount N] [--force] [--only a,b] [--dry-run] [--debug] [--json]
//! rollout status [--json]
//! rollout generate <function> [--out <path>]
//!
//! global: [--manifest <path>] [--verbose] [--log-json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{deploy::DeployArgs, generate::GenerateArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rollout",
    version,
    about = "Build and deploy only the serverless functions that changed",
    long_about = None,
)]
struct Cli {
    /// Path to rollout.yaml (default: discovered from the working directory).
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every function and deploy the ones whose checksum changed.
    Deploy(DeployArgs),

    /// Compare built artifacts against their last deployed checksum.
    Status(StatusArgs),

    /// Print the generated entry point for one function.
    Generate(GenerateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    rollout_deploy::init_tracing(cli.verbose, cli.log_json);
    let manifest = cli.manifest.as_deref();
    match cli.command {
        Commands::Deploy(args) => args.run(manifest),
        Commands::Status(args) => args.run(manifest),
        Commands::Generate(args) => args.run(manifest),
    }
}

//! `rollout generate`: print or write one function's entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use rollout_codegen::Synthesizer;
use rollout_sync::atomic_write;

use super::load_project;

/// Arguments for `rollout generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Function name as declared in rollout.yaml.
    pub function: String,

    /// Write to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn run(self, manifest: Option<&Path>) -> Result<()> {
        let project = load_project(manifest)?;
        let resolved = project.resolve();

        if let Some((_, err)) = resolved
            .rejected
            .into_iter()
            .find(|(name, _)| name.0 == self.function)
        {
            return Err(err).with_context(|| format!("invalid function '{}'", self.function));
        }
        let spec = resolved
            .specs
            .iter()
            .find(|spec| spec.function_name.0 == self.function)
            .with_context(|| format!("no function '{}' in rollout.yaml", self.function))?;

        let synth = Synthesizer::new().context("failed to load templates")?;
        let source = synth
            .synthesize(spec)
            .with_context(|| format!("failed to generate '{}'", self.function))?;

        match &self.out {
            Some(path) => {
                atomic_write(path, &source)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("✎  {}", path.display());
            }
            None => print!("{source}"),
        }
        Ok(())
    }
}

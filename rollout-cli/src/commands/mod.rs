pub mod deploy;
pub mod generate;
pub mod status;

use std::path::Path;

use anyhow::{Context, Result};

use rollout_core::{manifest, Project};

/// Load `rollout.yaml` from `--manifest` or by walking up from the working
/// directory.
pub fn load_project(path: Option<&Path>) -> Result<Project> {
    match path {
        Some(path) => manifest::load_at(path)
            .with_context(|| format!("failed to load manifest {}", path.display())),
        None => manifest::load().context("failed to load rollout.yaml"),
    }
}

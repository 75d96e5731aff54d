//! Change detection for built artifacts.
//!
//! Baseline precedence:
//! 1. `FunctionSpec::cached_checksum` (merged from the remote cache)
//! 2. the local checksum file in the output directory
//!
//! Every failure along the way degrades to [`ChangeSignal::Changed`] with no
//! digest, so a broken cache can only cause a redeploy, never a skip.

use std::path::Path;

use rollout_core::{BuildArtifact, FunctionSpec};

use crate::error::{io_err, SyncError};
use crate::{digest, local};

/// Outcome of comparing a fresh digest against the last deployed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    /// Digest matches the baseline; nothing to deploy.
    Unchanged { checksum: String },
    /// Deploy required. `checksum` is `None` when the digest could not be
    /// computed.
    Changed { checksum: Option<String> },
}

impl ChangeSignal {
    pub fn is_changed(&self) -> bool {
        matches!(self, ChangeSignal::Changed { .. })
    }

    /// The digest to persist once the function is deployed.
    pub fn checksum(&self) -> Option<&str> {
        match self {
            ChangeSignal::Unchanged { checksum } => Some(checksum),
            ChangeSignal::Changed { checksum } => checksum.as_deref(),
        }
    }
}

/// Classify `spec`'s freshly built `artifact` as changed or unchanged.
pub fn check_for_changes(
    spec: &FunctionSpec,
    artifact: &BuildArtifact,
    force: bool,
) -> ChangeSignal {
    let checksum = match artifact_checksum(spec, artifact) {
        Ok(checksum) => checksum,
        Err(err) => {
            tracing::warn!(
                function = %spec.function_name,
                error = %err,
                "checksum unavailable, treating as changed"
            );
            return ChangeSignal::Changed { checksum: None };
        }
    };

    let baseline = spec
        .cached_checksum
        .clone()
        .or_else(|| local::read_checksum(&spec.output_dir));

    if !force && baseline.as_deref() == Some(checksum.as_str()) {
        tracing::info!(function = %spec.function_name, "no changes, skipping deploy");
        return ChangeSignal::Unchanged { checksum };
    }
    ChangeSignal::Changed {
        checksum: Some(checksum),
    }
}

/// Digest of the artifact's main file, the optional auxiliary file and the
/// function's environment.
pub fn artifact_checksum(spec: &FunctionSpec, artifact: &BuildArtifact) -> Result<String, SyncError> {
    let main = std::fs::read(&artifact.main_file).map_err(|e| io_err(&artifact.main_file, e))?;
    let auxiliary = spec
        .aux_file
        .as_deref()
        .and_then(|aux| read_auxiliary(spec, &artifact.output_dir.join(aux)));
    Ok(digest::compute(
        &main,
        auxiliary.as_deref(),
        &spec.environment,
    ))
}

fn read_auxiliary(spec: &FunctionSpec, path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::warn!(
                function = %spec.function_name,
                path = %path.display(),
                error = %err,
                "auxiliary file unreadable, ignoring"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

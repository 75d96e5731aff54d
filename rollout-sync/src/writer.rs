//! Atomic writer and entry-point materialization.
//!
//! ## `atomic_write`
//!
//! 1. Ensure the parent directory exists.
//! 2. Write to `<path>.rollout.tmp`.
//! 3. Rename to the final path (atomic on POSIX); remove the `.tmp` on failure.

use std::path::{Path, PathBuf};

use rollout_codegen::{entry_point_path, Synthesizer};
use rollout_core::FunctionSpec;

use crate::error::{io_err, SyncError};

/// Atomically replace `path` with `content`.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = PathBuf::from(format!("{}.rollout.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Synthesize `spec`'s entry point and write it to `<tmp_dir>/<name>.ts`.
///
/// Returns the written path. Configuration errors surface as
/// [`SyncError::Synth`] and nothing is written.
pub fn write_entry_point(
    synth: &Synthesizer,
    spec: &FunctionSpec,
    tmp_dir: &Path,
) -> Result<PathBuf, SyncError> {
    let source = synth.synthesize(spec)?;
    let path = entry_point_path(tmp_dir, &spec.function_name);
    atomic_write(&path, &source)?;
    tracing::debug!(function = %spec.function_name, path = %path.display(), "entry point written");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

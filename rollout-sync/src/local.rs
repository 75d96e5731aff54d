//! Local checksum file: one bare hex digest per build output directory.
//!
//! Persists `<output_dir>/.rollout-checksum`.
//! Writes use the atomic `.tmp` + rename pattern from [`crate::writer`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::writer::atomic_write;

/// File name of the local checksum inside a function's output directory.
pub const CHECKSUM_FILE: &str = ".rollout-checksum";

/// `<output_dir>/.rollout-checksum`: pure, no I/O.
pub fn checksum_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CHECKSUM_FILE)
}

/// Read the last deployed digest for `output_dir`.
///
/// Never built and unreadable both yield `None`; the former logs at debug,
/// the latter at warn.
pub fn read_checksum(output_dir: &Path) -> Option<String> {
    let path = checksum_path(output_dir);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let digest = contents.trim();
            if digest.is_empty() {
                None
            } else {
                Some(digest.to_string())
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no local checksum yet");
            None
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "local checksum unreadable");
            None
        }
    }
}

/// Persist `checksum` for `output_dir`. `None` is a no-op; failures are
/// logged and swallowed since the deployment already happened.
pub fn persist_checksum(output_dir: &Path, checksum: Option<&str>) {
    let Some(checksum) = checksum else {
        return;
    };
    let path = checksum_path(output_dir);
    match atomic_write(&path, checksum) {
        Ok(()) => tracing::debug!(path = %path.display(), "local checksum saved"),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to save local checksum")
        }
    }
}

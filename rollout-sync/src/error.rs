//! Error types for rollout-sync.

use std::path::PathBuf;

use thiserror::Error;

use rollout_codegen::SynthError;

/// All errors that can arise from checksum and cache operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the synthesizer (entry point or hook script).
    #[error("synthesis error: {0}")]
    Synth(#[from] SynthError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (remote cache payload).
    #[error("checksum cache JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generated hook script exited unsuccessfully.
    #[error("hook script {script} failed: {detail}")]
    Script { script: PathBuf, detail: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Error surface for building, deploying and orchestrating a run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] rollout_core::ConfigError),

    #[error("synthesis error: {0}")]
    Synth(#[from] rollout_codegen::SynthError),

    #[error("sync error: {0}")]
    Sync(#[from] rollout_sync::SyncError),

    #[error("{stage} command is empty")]
    EmptyCommand { stage: &'static str },

    #[error("{stage} command `{program}` failed ({status}): {stderr}")]
    CommandFailed {
        stage: &'static str,
        program: String,
        status: String,
        stderr: String,
    },

    #[error("build produced no bundle at {path}")]
    MissingBundle { path: PathBuf },

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeployError {
    DeployError::Io {
        path: path.into(),
        source,
    }
}

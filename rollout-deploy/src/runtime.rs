use std::future::Future;

use crate::error::{io_err, DeployError};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `info`, or `debug` with `verbose`. `json`
/// switches to one JSON object per line. Repeated calls are ignored.
pub fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Build a multi-thread runtime and block the current thread on `fut`.
pub fn start_blocking<F: Future>(fut: F) -> Result<F::Output, DeployError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    Ok(runtime.block_on(fut))
}

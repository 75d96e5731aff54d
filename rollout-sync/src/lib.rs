//! # rollout-sync
//!
//! Checksum engine: content digests, local and remote checksum caches, and
//! the atomic writer used for every generated file.
//!
//! Call [`check_for_changes`] after a build to decide whether a function
//! needs deploying, then [`persist_checksum`] and [`RemoteCache::update`]
//! once it is deployed.

pub mod change;
pub mod digest;
pub mod error;
pub mod local;
pub mod remote;
pub mod writer;

pub use change::{check_for_changes, ChangeSignal};
pub use error::SyncError;
pub use local::{persist_checksum, read_checksum};
pub use remote::{CommandScriptRunner, RemoteCache, RemoteChecksums, ScriptRunner};
pub use writer::{atomic_write, write_entry_point};

//! Deployment runtime: bounded worker pool, retrying scheduler, external
//! build/deploy commands and the end-to-end orchestrator.

pub mod command;
mod error;
pub mod orchestrator;
pub mod pool;
mod runtime;
pub mod scheduler;

pub use command::{Builder, CommandBuilder, CommandDeployer};
pub use error::DeployError;
pub use orchestrator::Orchestrator;
pub use runtime::{init_tracing, start_blocking};
pub use scheduler::{schedule, Deployer, ScheduleReport, SchedulerOptions};

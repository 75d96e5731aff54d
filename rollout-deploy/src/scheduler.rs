//! Deployment scheduler: bounded rounds with set-difference retries.
//!
//! Round 1 deploys every target. Each later round deploys exactly the
//! targets still failing, `failing_next = failing_prev − succeeded`, and the
//! loop stops early once nothing is failing. Round N+1 starts only after
//! every deploy of round N has settled.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use rollout_core::{DeployStatus, DeployTarget, DeploymentRecord, FunctionName, DEFAULT_CONCURRENCY};

use crate::error::DeployError;
use crate::pool::run_bounded;

/// Deploys one function. Implementations log their own failures.
pub trait Deployer: Send + Sync + 'static {
    fn deploy(&self, target: &DeployTarget) -> impl Future<Output = Result<(), DeployError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub concurrency: usize,
    /// Extra rounds after the first. `None` and `Some(0)` both disable retry.
    pub retry_amount: Option<u32>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_amount: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScheduleReport {
    /// One record per input target, in input order.
    pub records: Vec<DeploymentRecord>,
    /// Targets that deployed, in the round they succeeded.
    pub deployed: Vec<DeployTarget>,
    /// Last error seen for every target that never deployed.
    pub failures: BTreeMap<FunctionName, String>,
    /// Rounds actually run, including the first.
    pub rounds: u32,
}

impl ScheduleReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deploy `targets` through `deployer` with bounded concurrency and retries.
pub async fn schedule<D: Deployer>(
    targets: Vec<DeployTarget>,
    deployer: Arc<D>,
    opts: SchedulerOptions,
) -> ScheduleReport {
    let mut records: Vec<DeploymentRecord> = targets.iter().map(DeploymentRecord::pending).collect();
    let max_rounds = 1 + opts.retry_amount.unwrap_or(0);

    let mut report = ScheduleReport::default();
    let mut failing = targets;
    let mut last_errors: BTreeMap<FunctionName, String> = BTreeMap::new();

    while !failing.is_empty() && report.rounds < max_rounds {
        report.rounds += 1;
        if report.rounds > 1 {
            tracing::info!(
                round = report.rounds,
                failing = failing.len(),
                "retrying failed deployments"
            );
        }

        let attempted = failing.len();
        let succeeded = deploy_round(
            failing.clone(),
            deployer.clone(),
            opts.concurrency,
            &mut last_errors,
        )
        .await;

        let (ok, still_failing): (Vec<_>, Vec<_>) = failing
            .into_iter()
            .partition(|target| succeeded.contains(target.name()));
        tracing::info!(
            round = report.rounds,
            deployed = ok.len(),
            attempted,
            "deploy round settled"
        );
        report.deployed.extend(ok);
        failing = still_failing;
    }

    let deployed: BTreeSet<&FunctionName> = report.deployed.iter().map(DeployTarget::name).collect();
    for record in &mut records {
        record.status = if deployed.contains(&record.function_name) {
            DeployStatus::Deployed
        } else {
            DeployStatus::Failed
        };
    }
    for target in &failing {
        let reason = last_errors
            .remove(target.name())
            .unwrap_or_else(|| "deploy did not report a result".to_string());
        report.failures.insert(target.name().clone(), reason);
    }
    report.records = records;
    report
}

/// One round over `targets`. Returns the names that deployed; a target with
/// no result counts as failed.
async fn deploy_round<D: Deployer>(
    targets: Vec<DeployTarget>,
    deployer: Arc<D>,
    concurrency: usize,
    last_errors: &mut BTreeMap<FunctionName, String>,
) -> BTreeSet<FunctionName> {
    let results = run_bounded(targets, concurrency, move |target: DeployTarget| {
        let deployer = deployer.clone();
        async move {
            let result = deployer.deploy(&target).await;
            (target.spec.function_name, result)
        }
    })
    .await;

    let mut succeeded = BTreeSet::new();
    for (name, result) in results {
        match result {
            Ok(()) => {
                tracing::info!(function = %name, "deployed");
                succeeded.insert(name);
            }
            Err(err) => {
                tracing::warn!(function = %name, error = %err, "deploy failed");
                last_errors.insert(name, err.to_string());
            }
        }
    }
    succeeded
}

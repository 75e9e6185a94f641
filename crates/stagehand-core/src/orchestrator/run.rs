//! Plan execution: a Kahn-style scheduler over a bounded set of tasks.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use log::{debug, info, warn};
use tokio::{
    sync::Mutex,
    task::{self, JoinSet},
    time::{timeout_at, Instant},
};
use tokio_util::sync::CancellationToken;

use super::{
    readiness::{timed_out, wait_ready},
    Orchestrator,
};
use crate::{
    cluster::{ClusterHandle, ReadinessQuery},
    error::StepError,
    models::{RunReport, RunResult, SkipReason, Step, StepOutcome},
    plan::DeploymentPlan,
};

/// One gate per distinct readiness requirement. The flag turns true once the
/// requirement has been confirmed during the current run.
type ReadinessGates = Arc<Mutex<HashMap<ReadinessQuery, Arc<Mutex<bool>>>>>;

/// Everything a step task needs, owned so the task can be spawned.
#[derive(Clone)]
struct StepContext {
    cluster: Arc<dyn ClusterHandle>,
    namespace: String,
    poll_interval: Duration,
    gates: ReadinessGates,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Executes every step of the plan and reports the outcome of each one.
    ///
    /// Steps start only once all of their dependencies succeeded or were
    /// already satisfied. A failed step skips its transitive dependents while
    /// unrelated branches keep running.
    pub async fn run(&self, plan: &DeploymentPlan) -> RunReport {
        self.run_with_cancel(plan, CancellationToken::new()).await
    }

    /// Like [`Orchestrator::run`], but stops issuing new steps once `cancel`
    /// fires. In-flight readiness waits return promptly with
    /// [`StepError::Cancelled`] and unstarted steps are skipped as cancelled.
    pub async fn run_with_cancel(
        &self,
        plan: &DeploymentPlan,
        cancel: CancellationToken,
    ) -> RunReport {
        let started_at = Timestamp::now();
        info!(
            "Running {} step(s) with concurrency {}",
            plan.len(),
            self.config.concurrency
        );

        let ctx = StepContext {
            cluster: Arc::clone(&self.cluster),
            namespace: self.config.namespace.clone(),
            poll_interval: self.config.poll_interval,
            gates: Arc::default(),
            cancel: cancel.clone(),
        };

        let mut results: Vec<Option<RunResult>> = vec![None; plan.len()];
        let mut pending: Vec<usize> = (0..plan.len())
            .map(|pos| plan.dependencies_of(pos).len())
            .collect();
        let mut ready: BTreeSet<usize> =
            (0..plan.len()).filter(|&pos| pending[pos] == 0).collect();
        let mut running = JoinSet::new();
        let mut in_flight: HashMap<task::Id, (usize, Timestamp)> = HashMap::new();

        loop {
            if !cancel.is_cancelled() {
                while in_flight.len() < self.config.concurrency {
                    let Some(pos) = ready.pop_first() else {
                        break;
                    };
                    let step = plan.step(pos).clone();
                    info!("Starting step '{}'", step.id);
                    let handle = running.spawn(execute_step(step, ctx.clone()));
                    in_flight.insert(handle.id(), (pos, Timestamp::now()));
                }
            }

            if in_flight.is_empty() {
                break;
            }

            let cancelled = cancel.is_cancelled();
            let joined = tokio::select! {
                biased;
                () = cancel.cancelled(), if !cancelled => {
                    warn!("Run cancelled, waiting for {} in-flight step(s)", in_flight.len());
                    continue;
                }
                joined = running.join_next_with_id() => joined,
            };

            let (pos, result) = match joined {
                Some(Ok((id, result))) => match in_flight.remove(&id) {
                    Some((pos, _)) => (pos, result),
                    None => continue,
                },
                Some(Err(err)) => match in_flight.remove(&err.id()) {
                    Some((pos, started)) => {
                        let error = StepError::Aborted {
                            message: err.to_string(),
                        };
                        (pos, RunResult::failed(&plan.step(pos).id, started, error))
                    }
                    None => continue,
                },
                None => break,
            };

            log_result(&result);
            if result.is_ok() {
                for &dependent in plan.dependents_of(pos) {
                    pending[dependent] -= 1;
                    if pending[dependent] == 0 && results[dependent].is_none() {
                        ready.insert(dependent);
                    }
                }
            } else if !is_cancellation(&result) {
                skip_dependents(plan, pos, &mut results);
            }
            results[pos] = Some(result);
        }

        let results = results
            .into_iter()
            .enumerate()
            .map(|(pos, result)| {
                result.unwrap_or_else(|| {
                    RunResult::skipped(&plan.step(pos).id, Timestamp::now(), SkipReason::Cancelled)
                })
            })
            .collect();

        let report = RunReport {
            started_at,
            finished_at: Timestamp::now(),
            results,
        };
        info!(
            "Run finished: {} succeeded, {} failed, {} skipped",
            report.succeeded_count(),
            report.failed_count(),
            report.skipped_count()
        );
        report
    }
}

/// Marks every unresolved transitive dependent of `failed` as skipped, naming
/// the dependency through which the failure reached it.
fn skip_dependents(plan: &DeploymentPlan, failed: usize, results: &mut [Option<RunResult>]) {
    let mut queue = VecDeque::from([failed]);
    while let Some(pos) = queue.pop_front() {
        for &dependent in plan.dependents_of(pos) {
            if results[dependent].is_some() {
                continue;
            }
            let dependency = plan.step(pos).id.clone();
            let id = &plan.step(dependent).id;
            info!("Skipping step '{id}': dependency '{dependency}' did not complete");
            results[dependent] = Some(RunResult::skipped(
                id,
                Timestamp::now(),
                SkipReason::DependencyFailed { dependency },
            ));
            queue.push_back(dependent);
        }
    }
}

fn is_cancellation(result: &RunResult) -> bool {
    matches!(
        result.outcome,
        StepOutcome::Skipped {
            reason: SkipReason::Cancelled
        }
    ) || result.error == Some(StepError::Cancelled)
}

fn log_result(result: &RunResult) {
    match (&result.outcome, &result.error) {
        (StepOutcome::Failed, Some(err)) => warn!("Step '{}' failed: {err}", result.step_id),
        (outcome, _) => info!("Step '{}' {}", result.step_id, outcome.as_str()),
    }
}

async fn execute_step(step: Step, ctx: StepContext) -> RunResult {
    let started_at = Timestamp::now();
    let namespace = step
        .action
        .namespace()
        .unwrap_or(&ctx.namespace)
        .to_string();

    if step.idempotent {
        match ctx.cluster.is_satisfied(&step.action, &namespace).await {
            Ok(true) => {
                return RunResult::skipped(step.id, started_at, SkipReason::AlreadySatisfied);
            }
            Ok(false) => debug!("Step '{}' is not yet in its desired state", step.id),
            Err(err) => warn!(
                "Could not check the state of step '{}', applying it: {err}",
                step.id
            ),
        }
    }

    if ctx.cancel.is_cancelled() {
        return RunResult::skipped(step.id, started_at, SkipReason::Cancelled);
    }

    if let Err(err) = ctx.cluster.apply(&step.action, &namespace).await {
        return RunResult::failed(step.id, started_at, err.into());
    }

    if let Some(readiness) = &step.readiness {
        let query = ReadinessQuery::resolve(readiness, &namespace);
        if let Err(err) = ctx.await_readiness(&query, readiness.timeout()).await {
            return RunResult::failed(step.id, started_at, err);
        }
    }

    RunResult::succeeded(step.id, started_at)
}

impl StepContext {
    /// Waits for a readiness requirement unless it was already confirmed in
    /// this run. Steps sharing a requirement wait on the same gate.
    ///
    /// The step's own timeout covers both the wait for the gate and the
    /// polling, so a step never outlives its budget while another step polls
    /// the same requirement.
    async fn await_readiness(
        &self,
        query: &ReadinessQuery,
        timeout: Duration,
    ) -> Result<(), StepError> {
        let deadline = Instant::now() + timeout;
        let gate = {
            let mut gates = self.gates.lock().await;
            Arc::clone(gates.entry(query.clone()).or_default())
        };

        let mut confirmed = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(StepError::Cancelled),
            locked = timeout_at(deadline, gate.lock()) => {
                locked.map_err(|_| timed_out(query, timeout))?
            }
        };
        if *confirmed {
            debug!("{query} already confirmed in this run");
            return Ok(());
        }

        info!("Waiting up to {}s for {query}", timeout.as_secs());
        wait_ready(
            self.cluster.as_ref(),
            query,
            deadline,
            timeout,
            self.poll_interval,
            &self.cancel,
        )
        .await?;
        *confirmed = true;
        Ok(())
    }
}

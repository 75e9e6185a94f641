//! Command wrappers and handlers.
//!
//! Each command has a clap argument struct converted into a core parameter
//! type with `From`, keeping clap out of the core crate:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Orchestrator
//! ```
//!
//! [`Cli`] then loads the plan, builds the orchestrator, and renders the
//! outcome as markdown (or JSON with `--json`).

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{info, warn};
use serde::Serialize;
use stagehand_core::{
    config::DEFAULT_CLUSTER_NAME,
    display::{OperationStatus, PlanRounds},
    params::{RunPlan, Settings, ShowPlan, Teardown},
    DeploymentPlan, MemoryCluster, Orchestrator, OrchestratorBuilder, Step, TeardownScope,
};

use tokio_util::sync::CancellationToken;

use crate::renderer::TerminalRenderer;

/// Exit status after a second interrupt, as a shell reports SIGINT
const FORCED_EXIT_CODE: i32 = 130;

/// Execute a plan file
///
/// Exits with status 0 when every step succeeded or was already in its
/// desired state, and 1 when any step failed or the run was interrupted.
#[derive(Args)]
pub struct RunArgs {
    /// Path of the JSON plan file
    pub plan_file: PathBuf,
}

impl From<RunArgs> for RunPlan {
    fn from(val: RunArgs) -> Self {
        RunPlan {
            plan_file: val.plan_file,
        }
    }
}

/// Validate a plan file and show its execution rounds
#[derive(Args)]
pub struct PlanArgs {
    /// Path of the JSON plan file
    pub plan_file: PathBuf,
}

impl From<PlanArgs> for ShowPlan {
    fn from(val: PlanArgs) -> Self {
        ShowPlan {
            plan_file: val.plan_file,
        }
    }
}

/// Remove a deployment
///
/// `workload` deletes the application namespace and leaves the cluster
/// running. `all` deletes the cluster and the local build cache. Running a
/// teardown again is harmless.
#[derive(Args)]
pub struct TeardownArgs {
    /// How much to remove
    #[arg(long, value_enum, default_value = "workload")]
    pub scope: ScopeArg,
}

impl From<TeardownArgs> for Teardown {
    fn from(val: TeardownArgs) -> Self {
        Teardown {
            scope: val.scope.into(),
        }
    }
}

/// Command-line representation of the teardown scope
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Delete the application namespace only
    Workload,
    /// Delete the whole cluster and the build cache
    All,
}

impl From<ScopeArg> for TeardownScope {
    fn from(val: ScopeArg) -> Self {
        match val {
            ScopeArg::Workload => TeardownScope::Workload,
            ScopeArg::All => TeardownScope::All,
        }
    }
}

/// Handles commands and renders their output.
pub struct Cli {
    settings: Settings,
    dry_run: bool,
    json: bool,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(settings: Settings, dry_run: bool, json: bool, renderer: TerminalRenderer) -> Self {
        Self {
            settings,
            dry_run,
            json,
            renderer,
        }
    }

    /// Loads and executes a plan. The first Ctrl-C cancels the run, a second
    /// one exits immediately.
    pub async fn run(&self, params: &RunPlan) -> Result<ExitCode> {
        let plan = load_plan(&params.plan_file)?;
        let orchestrator = self.orchestrator()?;

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn(forward_interrupts(tokio::signal::ctrl_c, cancel.clone()));
        let report = orchestrator.run_with_cancel(&plan, cancel).await;
        interrupt.abort();

        if self.json {
            print_json(&report)?;
        } else {
            self.renderer.render(&report.to_string())?;
        }
        Ok(exit_code(report.success()))
    }

    /// Validates a plan and shows its rounds.
    pub fn show_plan(&self, params: &ShowPlan) -> Result<()> {
        let plan = load_plan(&params.plan_file)?;
        if self.json {
            let rounds: Vec<Vec<&str>> = plan
                .rounds()
                .into_iter()
                .map(|round| round.into_iter().map(|step| step.id.as_str()).collect())
                .collect();
            print_json(&rounds)
        } else {
            self.renderer.render(&PlanRounds::new(&plan).to_string())
        }
    }

    pub async fn teardown(&self, params: &Teardown) -> Result<ExitCode> {
        let orchestrator = self.orchestrator()?;
        let result = orchestrator.teardown(params.scope).await;

        if self.json {
            print_json(&result)?;
        } else {
            self.renderer
                .render(&OperationStatus::from(&result).to_string())?;
        }
        Ok(exit_code(result.is_ok()))
    }

    /// Prints the JSON schema of plan files.
    pub fn schema(&self) -> Result<()> {
        let schema = schemars::schema_for!(Vec<Step>);
        print_json(&schema)
    }

    fn orchestrator(&self) -> Result<Orchestrator> {
        let builder = if self.dry_run {
            let mut settings = self.settings.clone();
            // Dry runs never touch the real build cache
            settings
                .cache_dir
                .get_or_insert_with(|| std::env::temp_dir().join("stagehand-dry-run"));
            let cluster_name = settings
                .cluster_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string());
            info!("Dry run against an in-memory cluster '{cluster_name}'");
            OrchestratorBuilder::from(&settings)
                .with_cluster(Arc::new(MemoryCluster::new(cluster_name)))
        } else {
            OrchestratorBuilder::from(&self.settings)
        };

        builder.build().context("Failed to initialize orchestrator")
    }
}

/// Cancels `cancel` on the first interrupt and exits the process on the
/// second. Returns without exiting if interrupts cannot be received.
async fn forward_interrupts<F, Fut>(next_interrupt: F, cancel: CancellationToken)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if wait_for_second_interrupt(next_interrupt, &cancel).await {
        warn!("Second interrupt received, exiting");
        std::process::exit(FORCED_EXIT_CODE);
    }
}

/// Returns true once a second interrupt arrives after the run was cancelled.
async fn wait_for_second_interrupt<F, Fut>(
    mut next_interrupt: F,
    cancel: &CancellationToken,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = next_interrupt().await {
        warn!("Cannot listen for interrupts: {err}");
        return false;
    }
    warn!("Interrupt received, cancelling the run (press Ctrl-C again to exit)");
    cancel.cancel();
    next_interrupt().await.is_ok()
}

fn load_plan(path: &Path) -> Result<DeploymentPlan> {
    DeploymentPlan::load(path)
        .with_context(|| format!("Failed to load plan '{}'", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;

    type Interrupt = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

    /// An interrupt source fired by hand.
    fn interrupts(notify: &Arc<Notify>) -> impl FnMut() -> Interrupt {
        let notify = Arc::clone(notify);
        move || {
            let notify = Arc::clone(&notify);
            Box::pin(async move {
                notify.notified().await;
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_first_interrupt_cancels_second_forces_exit() {
        let notify = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let source = interrupts(&notify);
            let cancel = cancel.clone();
            async move { wait_for_second_interrupt(source, &cancel).await }
        });

        notify.notify_one();
        tokio::time::timeout(Duration::from_secs(1), cancel.cancelled())
            .await
            .expect("first interrupt should cancel the run");
        assert!(!task.is_finished());

        notify.notify_one();
        let forced = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("second interrupt should end the wait")
            .expect("task should not panic");
        assert!(forced);
    }

    #[tokio::test]
    async fn test_unavailable_interrupts_leave_run_alone() {
        let cancel = CancellationToken::new();
        let failing = || async { Err(std::io::Error::other("no signal handler")) };

        assert!(!wait_for_second_interrupt(failing, &cancel).await);
        assert!(!cancel.is_cancelled());
    }
}

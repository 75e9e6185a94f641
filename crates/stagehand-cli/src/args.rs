use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use stagehand_core::params::Settings;

use crate::cli::{PlanArgs, RunArgs, TeardownArgs};

/// Dependency-ordered, idempotent deployment orchestrator
///
/// Stagehand reads a plan of named steps (apply a manifest, build an image,
/// install a chart, create the local cluster), runs them in dependency order
/// with independent branches in parallel, waits for readiness between
/// dependent steps, and skips work the cluster already reflects.
#[derive(Parser)]
#[command(version, about, name = "stagehand")]
pub struct Args {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Run against an in-memory cluster instead of the real one
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print machine-readable JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a plan file against the cluster
    #[command(alias = "r")]
    Run(RunArgs),
    /// Validate a plan file and show its execution rounds
    #[command(alias = "p")]
    Plan(PlanArgs),
    /// Remove the deployed application or the whole cluster
    #[command(alias = "t")]
    Teardown(TeardownArgs),
    /// Print the JSON schema of the plan file format
    Schema,
}

/// Deployment environment flags shared by every command
#[derive(ClapArgs)]
pub struct SettingsArgs {
    /// Name of the local cluster [default: webstack]
    #[arg(long, global = true, env = "STAGEHAND_CLUSTER")]
    pub cluster_name: Option<String>,

    /// Namespace the application is deployed into [default: webstack]
    #[arg(long, global = true, env = "STAGEHAND_NAMESPACE")]
    pub namespace: Option<String>,

    /// Kube context passed to kubectl and helm
    #[arg(long, global = true)]
    pub kube_context: Option<String>,

    /// Directory for cached build artifacts. Defaults to
    /// $XDG_CACHE_HOME/stagehand/builds
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of steps running at the same time [default: 4]
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Pause between readiness queries in milliseconds [default: 2000]
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,
}

impl From<SettingsArgs> for Settings {
    fn from(val: SettingsArgs) -> Self {
        Settings {
            cluster_name: val.cluster_name,
            namespace: val.namespace,
            kube_context: val.kube_context,
            cache_dir: val.cache_dir,
            concurrency: val.concurrency,
            poll_interval_ms: val.poll_interval_ms,
        }
    }
}

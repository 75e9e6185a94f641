//! Core library for the stagehand deployment orchestrator.
//!
//! A deployment is a [`DeploymentPlan`]: named [`Step`]s that each apply one
//! [`StepAction`], declare the steps they depend on, and optionally wait for a
//! readiness condition. The [`Orchestrator`] executes a plan against a
//! [`ClusterHandle`], running independent branches concurrently, skipping
//! steps whose desired state already holds, and isolating failures to the
//! branch they occur in. It also tears deployments down.
//!
//! # Modules
//!
//! - [`plan`]: plan validation, topological order and plan files
//! - [`orchestrator`]: execution, readiness waits, cancellation, teardown
//! - [`cluster`]: the cluster capability with command-line and in-memory
//!   implementations
//! - [`display`]: markdown formatting of plans and reports
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stagehand_core::{
//!     DeploymentPlan, MemoryCluster, OrchestratorBuilder, Readiness, Step, StepAction,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = |path: &str| StepAction::ApplyManifest {
//!     path: path.into(),
//!     namespace: None,
//! };
//! let plan = DeploymentPlan::new(vec![
//!     Step::new("database", manifest("k8s/database.yaml"))
//!         .with_readiness(Readiness::pods("app=database", 120))
//!         .idempotent(),
//!     Step::new("backend", manifest("k8s/backend.yaml"))
//!         .depends_on(["database"])
//!         .idempotent(),
//! ])?;
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_cache_dir(Some("/tmp/stagehand-quickstart"))
//!     .with_cluster(Arc::new(MemoryCluster::new("webstack")))
//!     .build()?;
//!
//! let report = orchestrator.run(&plan).await;
//! println!("{report}");
//! assert!(report.success());
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod plan;

// Re-export commonly used types
pub use cluster::{ClusterHandle, ClusterResource, KubectlCluster, MemoryCluster, ReadinessQuery};
pub use config::DeploymentConfig;
pub use display::{OperationStatus, PlanRounds};
pub use error::{ClusterError, OrchestratorError, Result, StepError};
pub use models::{
    ChartRepo, Readiness, RunReport, RunResult, SkipReason, Step, StepAction, StepOutcome,
    TeardownScope,
};
pub use orchestrator::{CancellationToken, Orchestrator, OrchestratorBuilder};
pub use plan::DeploymentPlan;

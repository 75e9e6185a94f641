//! The deployment orchestrator: executes plans and tears deployments down.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ DeploymentPlan  │    │  Orchestrator   │    │  ClusterHandle  │
//! │ (validated DAG) │───▶│ (run, teardown) │───▶│ (kubectl/memory)│
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!    Static input          Scheduling            Side effects
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`Orchestrator`] instances with configuration
//! - `run`: Kahn-style scheduler with a bounded set of in-flight steps
//! - `readiness`: Fixed-interval polling with an overall deadline
//! - `teardown`: Scoped, idempotent removal of the deployment
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stagehand_core::{
//!     DeploymentPlan, MemoryCluster, OrchestratorBuilder, Step, StepAction, TeardownScope,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cluster = Arc::new(MemoryCluster::new("webstack"));
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_cache_dir(Some("/tmp/stagehand-example"))
//!     .with_cluster(cluster.clone())
//!     .build()?;
//!
//! let plan = DeploymentPlan::new(vec![Step::new(
//!     "namespace",
//!     StepAction::ApplyManifest { path: "k8s/namespace.yaml".into(), namespace: None },
//! )])?;
//!
//! let report = orchestrator.run(&plan).await;
//! assert!(report.success());
//!
//! let result = orchestrator.teardown(TeardownScope::Workload).await;
//! assert!(result.is_ok());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::{cluster::ClusterHandle, config::DeploymentConfig};

pub mod builder;
mod readiness;
mod run;
mod teardown;


pub use builder::OrchestratorBuilder;
pub use tokio_util::sync::CancellationToken;

/// Executes deployment plans against one cluster.
pub struct Orchestrator {
    pub(crate) config: DeploymentConfig,
    pub(crate) cluster: Arc<dyn ClusterHandle>,
}

impl Orchestrator {
    /// Creates an orchestrator from a validated configuration.
    pub(crate) fn new(config: DeploymentConfig, cluster: Arc<dyn ClusterHandle>) -> Self {
        Self { config, cluster }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn cluster(&self) -> &Arc<dyn ClusterHandle> {
        &self.cluster
    }
}

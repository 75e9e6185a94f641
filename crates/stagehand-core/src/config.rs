//! Deployment configuration shared by planning, execution and teardown.

use std::path::PathBuf;
use std::time::Duration;

/// Cluster created by the `createCluster` action and removed by a full
/// teardown when no other name is configured.
pub const DEFAULT_CLUSTER_NAME: &str = "webstack";

/// Namespace the application is deployed into by default.
pub const DEFAULT_NAMESPACE: &str = "webstack";

pub const DEFAULT_CONCURRENCY: usize = 4;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Explicit environment of a deployment: which cluster, which namespace, and
/// how the executor behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Name of the local cluster
    pub cluster_name: String,

    /// Default namespace for actions and readiness queries that name none
    pub namespace: String,

    /// Kube context passed to `kubectl` and `helm`; the current one if unset
    pub kube_context: Option<String>,

    /// Directory holding locally cached build artifacts
    pub cache_dir: PathBuf,

    /// Maximum number of steps running at the same time
    pub concurrency: usize,

    /// Pause between two readiness queries
    pub poll_interval: Duration,
}

//! The cluster capability the orchestrator drives.
//!
//! The orchestrator only talks to a [`ClusterHandle`]; it never names a
//! specific tool or API. Two implementations ship with the crate:
//!
//! - [`KubectlCluster`] runs `kubectl`, `kind`, `helm` and `docker` as child
//!   processes against a local cluster.
//! - [`MemoryCluster`] keeps the cluster in memory and records every
//!   mutating call. Tests and dry runs use it.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::ClusterError,
    models::{Readiness, StepAction},
};

pub mod kubectl;
pub mod memory;

pub use kubectl::KubectlCluster;
pub use memory::MemoryCluster;

/// Abstract capability over a live cluster.
///
/// `namespace` arguments are already resolved: an action that names its own
/// namespace gets that one, otherwise the configured default.
#[async_trait]
pub trait ClusterHandle: Send + Sync {
    /// Applies the action's declarative resource description.
    async fn apply(&self, action: &StepAction, namespace: &str) -> Result<(), ClusterError>;

    /// Whether the cluster already matches what the action would produce.
    /// Must not mutate anything.
    async fn is_satisfied(&self, action: &StepAction, namespace: &str)
        -> Result<bool, ClusterError>;

    /// Whether the resources matched by the query report the condition.
    async fn is_ready(&self, query: &ReadinessQuery) -> Result<bool, ClusterError>;

    /// Whether a named resource is present.
    async fn exists(&self, resource: &ClusterResource) -> Result<bool, ClusterError>;

    /// Deletes a named resource.
    async fn delete(&self, resource: &ClusterResource) -> Result<(), ClusterError>;
}

/// A readiness predicate with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadinessQuery {
    pub kind: String,
    pub selector: String,
    pub namespace: String,
    pub condition: String,
}

impl ReadinessQuery {
    /// Resolves a step's readiness predicate against the namespace the step
    /// targets.
    pub fn resolve(readiness: &Readiness, namespace: &str) -> Self {
        Self {
            kind: readiness.kind.clone(),
            selector: readiness.selector.clone(),
            namespace: readiness
                .namespace
                .clone()
                .unwrap_or_else(|| namespace.to_string()),
            condition: readiness.condition.clone(),
        }
    }
}

impl fmt::Display for ReadinessQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' in {} ({})",
            self.kind, self.selector, self.namespace, self.condition
        )
    }
}

/// Named resources that teardown removes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusterResource {
    Namespace(String),
    Cluster(String),
    /// Local directory holding image build records
    BuildCache(PathBuf),
}

impl fmt::Display for ClusterResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterResource::Namespace(name) => write!(f, "namespace '{name}'"),
            ClusterResource::Cluster(name) => write!(f, "cluster '{name}'"),
            ClusterResource::BuildCache(dir) => write!(f, "build cache {}", dir.display()),
        }
    }
}

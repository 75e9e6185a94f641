//! Builder for creating and configuring Orchestrator instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::Orchestrator;
use crate::{
    cluster::{ClusterHandle, KubectlCluster},
    config::{
        DeploymentConfig, DEFAULT_CLUSTER_NAME, DEFAULT_CONCURRENCY, DEFAULT_NAMESPACE,
        DEFAULT_POLL_INTERVAL,
    },
    error::{OrchestratorError, Result},
};

/// Builder for creating and configuring Orchestrator instances.
#[derive(Clone)]
pub struct OrchestratorBuilder {
    cluster_name: String,
    namespace: String,
    kube_context: Option<String>,
    cache_dir: Option<PathBuf>,
    concurrency: usize,
    poll_interval: Duration,
    cluster: Option<Arc<dyn ClusterHandle>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            kube_context: None,
            cache_dir: None,
            concurrency: DEFAULT_CONCURRENCY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cluster: None,
        }
    }

    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_kube_context(mut self, context: Option<String>) -> Self {
        self.kube_context = context;
        self
    }

    /// Sets a custom build cache directory.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_CACHE_HOME/stagehand/builds` or `~/.cache/stagehand/builds`
    pub fn with_cache_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.cache_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Uses the given cluster handle instead of the command-line backed one.
    pub fn with_cluster(mut self, cluster: Arc<dyn ClusterHandle>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Builds the configured orchestrator instance.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidInput` for an empty cluster name or
    /// namespace, a zero concurrency or a zero poll interval.
    /// Returns `OrchestratorError::XdgDirectory` if no cache directory was
    /// given and the default one cannot be resolved.
    pub fn build(self) -> Result<Orchestrator> {
        if self.cluster_name.trim().is_empty() {
            return Err(OrchestratorError::invalid_input("cluster_name")
                .with_reason("cluster name cannot be empty"));
        }
        if self.namespace.trim().is_empty() {
            return Err(
                OrchestratorError::invalid_input("namespace").with_reason("namespace cannot be empty")
            );
        }
        if self.concurrency == 0 {
            return Err(OrchestratorError::invalid_input("concurrency")
                .with_reason("must be at least 1"));
        }
        if self.poll_interval.is_zero() {
            return Err(OrchestratorError::invalid_input("poll_interval")
                .with_reason("must be greater than zero"));
        }

        let cache_dir = match self.cache_dir {
            Some(dir) => dir,
            None => Self::default_cache_dir()?,
        };

        let config = DeploymentConfig {
            cluster_name: self.cluster_name,
            namespace: self.namespace,
            kube_context: self.kube_context,
            cache_dir,
            concurrency: self.concurrency,
            poll_interval: self.poll_interval,
        };

        let cluster = match self.cluster {
            Some(cluster) => cluster,
            None => Arc::new(KubectlCluster::new(&config)),
        };

        Ok(Orchestrator::new(config, cluster))
    }

    /// Returns the default cache directory following XDG Base Directory
    /// specification.
    fn default_cache_dir() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("stagehand")
            .place_cache_file("builds")
            .map_err(|e| OrchestratorError::XdgDirectory(e.to_string()))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

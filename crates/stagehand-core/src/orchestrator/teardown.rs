//! Scoped removal of a deployment.

use jiff::Timestamp;
use log::{info, warn};

use super::Orchestrator;
use crate::{
    cluster::ClusterResource,
    error::StepError,
    models::{RunResult, TeardownScope},
};

impl Orchestrator {
    /// Removes the deployment at the given scope.
    ///
    /// `Workload` deletes the application namespace. `All` deletes the whole
    /// cluster and the local build cache. Only resources that are present get
    /// deleted, so tearing down twice makes no mutation the second time.
    /// Every removal is attempted even if an earlier one failed.
    pub async fn teardown(&self, scope: TeardownScope) -> RunResult {
        let started_at = Timestamp::now();
        let step_id = format!("teardown:{}", scope.as_str());
        info!("Tearing down scope '{}'", scope.as_str());

        let resources = match scope {
            TeardownScope::Workload => {
                vec![ClusterResource::Namespace(self.config.namespace.clone())]
            }
            TeardownScope::All => vec![
                ClusterResource::Cluster(self.config.cluster_name.clone()),
                ClusterResource::BuildCache(self.config.cache_dir.clone()),
            ],
        };

        let mut failures = Vec::new();
        for resource in &resources {
            if let Err(message) = self.remove(resource).await {
                failures.push(message);
            }
        }

        if failures.is_empty() {
            RunResult::succeeded(step_id, started_at)
        } else {
            let message = failures.join("; ");
            warn!("Teardown incomplete: {message}");
            RunResult::failed(step_id, started_at, StepError::Teardown { message })
        }
    }

    async fn remove(&self, resource: &ClusterResource) -> Result<(), String> {
        let present = self
            .cluster
            .exists(resource)
            .await
            .map_err(|e| format!("checking {resource}: {e}"))?;
        if !present {
            info!("{resource} is already absent");
            return Ok(());
        }

        self.cluster
            .delete(resource)
            .await
            .map_err(|e| format!("deleting {resource}: {e}"))?;
        info!("Deleted {resource}");
        Ok(())
    }
}

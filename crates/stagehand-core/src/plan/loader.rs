//! Plan file loading.
//!
//! A plan file is a JSON array of [`Step`] records:
//!
//! ```json
//! [
//!   { "id": "namespace", "action": { "type": "applyManifest", "path": "k8s/namespace.yaml" },
//!     "idempotent": true },
//!   { "id": "database", "dependsOn": ["namespace"],
//!     "action": { "type": "applyManifest", "path": "k8s/postgres.yaml" },
//!     "readiness": { "selector": "app=postgres", "timeoutSeconds": 120 },
//!     "idempotent": true }
//! ]
//! ```

use std::path::Path;

use log::debug;

use super::DeploymentPlan;
use crate::{
    error::{OrchestratorError, Result},
    models::Step,
};

impl DeploymentPlan {
    /// Reads, parses and validates a plan file.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::FileSystem` if the file cannot be read,
    /// `OrchestratorError::PlanFile` if it is not a valid step list, and any
    /// error of [`DeploymentPlan::new`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| OrchestratorError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;

        let steps: Vec<Step> =
            serde_json::from_str(&text).map_err(|e| OrchestratorError::PlanFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!("Parsed {} steps from {}", steps.len(), path.display());

        Self::new(steps)
    }
}

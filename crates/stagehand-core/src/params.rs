//! Parameter structures for orchestrator operations.
//!
//! These structures are shared by every front end without framework-specific
//! derives. A front end defines its own argument types (e.g. with clap
//! derives) and converts them into these with `From`:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │    │  Orchestrator   │
//! │  (clap derives) │───▶│ (minimal deps)  │───▶│   operations    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ```ignore
//! #[derive(Args)]
//! pub struct TeardownArgs {
//!     #[arg(long, value_enum, default_value = "workload")]
//!     pub scope: ScopeArg,
//! }
//!
//! impl From<TeardownArgs> for Teardown {
//!     fn from(args: TeardownArgs) -> Self {
//!         Teardown { scope: args.scope.into() }
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{models::TeardownScope, orchestrator::OrchestratorBuilder};

/// Overrides for the deployment environment. Unset fields keep the
/// builder's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Name of the local cluster
    pub cluster_name: Option<String>,
    /// Namespace the application is deployed into
    pub namespace: Option<String>,
    /// Kube context for `kubectl` and `helm`
    pub kube_context: Option<String>,
    /// Directory for cached build artifacts
    pub cache_dir: Option<PathBuf>,
    /// Maximum number of steps running at the same time
    pub concurrency: Option<usize>,
    /// Pause between readiness queries, in milliseconds
    pub poll_interval_ms: Option<u64>,
}

impl From<&Settings> for OrchestratorBuilder {
    fn from(settings: &Settings) -> Self {
        let mut builder = OrchestratorBuilder::new()
            .with_kube_context(settings.kube_context.clone())
            .with_cache_dir(settings.cache_dir.as_ref());
        if let Some(name) = &settings.cluster_name {
            builder = builder.with_cluster_name(name);
        }
        if let Some(namespace) = &settings.namespace {
            builder = builder.with_namespace(namespace);
        }
        if let Some(concurrency) = settings.concurrency {
            builder = builder.with_concurrency(concurrency);
        }
        if let Some(ms) = settings.poll_interval_ms {
            builder = builder.with_poll_interval(Duration::from_millis(ms));
        }
        builder
    }
}

/// Parameters for executing a plan file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RunPlan {
    /// Path of the JSON plan file
    pub plan_file: PathBuf,
}

/// Parameters for validating a plan file and showing its rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShowPlan {
    /// Path of the JSON plan file
    pub plan_file: PathBuf,
}

/// Parameters for removing a deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Teardown {
    /// How much to remove
    #[serde(default)]
    pub scope: TeardownScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_override_builder_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            cluster_name: Some("demo".to_string()),
            namespace: Some("shop".to_string()),
            kube_context: Some("kind-demo".to_string()),
            cache_dir: Some(temp_dir.path().to_path_buf()),
            concurrency: Some(2),
            poll_interval_ms: Some(250),
        };

        let orchestrator = OrchestratorBuilder::from(&settings).build().unwrap();
        let config = orchestrator.config();
        assert_eq!(config.cluster_name, "demo");
        assert_eq!(config.namespace, "shop");
        assert_eq!(config.kube_context.as_deref(), Some("kind-demo"));
        assert_eq!(config.cache_dir, temp_dir.path());
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            cache_dir: Some(temp_dir.path().to_path_buf()),
            concurrency: Some(0),
            ..Settings::default()
        };

        let err = OrchestratorBuilder::from(&settings).build().err().unwrap();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_teardown_scope_defaults_to_workload() {
        let params: Teardown = serde_json::from_str("{}").unwrap();
        assert_eq!(params.scope, TeardownScope::Workload);
    }
}

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stagehand_core::{MemoryCluster, Orchestrator, OrchestratorBuilder};
use tempfile::TempDir;

/// The three-tier demo application: a cluster, an ingress controller, a
/// database, a backend image and service, and a frontend.
pub const WEBSTACK_PLAN: &str = r#"[
  { "id": "cluster", "action": { "type": "createCluster", "config": "kind-config.yaml" },
    "idempotent": true },
  { "id": "ingress-controller", "dependsOn": ["cluster"],
    "action": { "type": "applyManifest", "path": "k8s/ingress-nginx.yaml",
                "namespace": "ingress-nginx" },
    "readiness": { "selector": "app.kubernetes.io/component=controller",
                   "timeoutSeconds": 90, "namespace": "ingress-nginx" },
    "idempotent": true },
  { "id": "namespace", "dependsOn": ["cluster"],
    "action": { "type": "applyManifest", "path": "k8s/namespace.yaml" },
    "idempotent": true },
  { "id": "database", "dependsOn": ["namespace"],
    "action": { "type": "applyManifest", "path": "k8s/postgres.yaml" },
    "readiness": { "selector": "app=postgres", "timeoutSeconds": 120 },
    "idempotent": true },
  { "id": "backend-image", "dependsOn": ["cluster"],
    "action": { "type": "buildImage", "context": "backend", "tag": "webstack-backend:dev" },
    "idempotent": true },
  { "id": "backend", "dependsOn": ["database", "backend-image"],
    "action": { "type": "applyManifest", "path": "k8s/backend.yaml" },
    "readiness": { "selector": "app=backend", "timeoutSeconds": 120 },
    "idempotent": true },
  { "id": "frontend", "dependsOn": ["backend", "ingress-controller"],
    "action": { "type": "applyManifest", "path": "k8s/frontend.yaml" },
    "readiness": { "selector": "app=frontend", "timeoutSeconds": 120 },
    "idempotent": true }
]"#;

/// Writes a plan file into the directory and returns its path.
pub fn write_plan(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("plan.json");
    std::fs::write(&path, contents).expect("Failed to write plan file");
    path
}

/// Helper function to create a test orchestrator over an in-memory cluster
pub fn create_test_orchestrator(cluster: &Arc<MemoryCluster>) -> (TempDir, Orchestrator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let orchestrator = OrchestratorBuilder::new()
        .with_cache_dir(Some(temp_dir.path().join("cache")))
        .with_poll_interval(Duration::from_millis(10))
        .with_cluster(cluster.clone())
        .build()
        .expect("Failed to create orchestrator");
    (temp_dir, orchestrator)
}

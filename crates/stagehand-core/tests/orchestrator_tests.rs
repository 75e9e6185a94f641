mod common;

use std::sync::Arc;

use common::{create_test_orchestrator, write_plan, WEBSTACK_PLAN};
use stagehand_core::{
    DeploymentPlan, MemoryCluster, OrchestratorError, SkipReason, StepAction, StepOutcome,
    TeardownScope,
};
use tempfile::TempDir;

fn position(mutations: &[String], needle: &str) -> usize {
    mutations
        .iter()
        .position(|m| m.contains(needle))
        .unwrap_or_else(|| panic!("no mutation containing '{needle}' in {mutations:?}"))
}

#[tokio::test]
async fn test_complete_deployment_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let plan = DeploymentPlan::load(write_plan(temp_dir.path(), WEBSTACK_PLAN))
        .expect("Failed to load plan");
    assert_eq!(plan.len(), 7);

    let cluster = Arc::new(MemoryCluster::new("webstack"));
    let (_cache_dir, orchestrator) = create_test_orchestrator(&cluster);

    // First run applies everything
    let report = orchestrator.run(&plan).await;
    assert!(report.success(), "{report}");
    assert_eq!(report.succeeded_count(), 7);
    assert!(cluster.has_cluster("webstack"));
    assert!(cluster.has_namespace("webstack"));
    assert!(cluster.has_namespace("ingress-nginx"));

    let mutations = cluster.mutations();
    assert_eq!(mutations.len(), 7);
    assert_eq!(position(&mutations, "create cluster"), 0);
    assert!(position(&mutations, "postgres.yaml") < position(&mutations, "backend.yaml"));
    assert!(position(&mutations, "build image") < position(&mutations, "backend.yaml"));
    assert!(position(&mutations, "backend.yaml") < position(&mutations, "frontend.yaml"));
    assert!(position(&mutations, "ingress-nginx.yaml") < position(&mutations, "frontend.yaml"));

    // Re-running converges without touching the cluster
    let rerun = orchestrator.run(&plan).await;
    assert!(rerun.success());
    assert_eq!(rerun.skipped_count(), 7);
    assert_eq!(cluster.mutations(), mutations);

    // Workload teardown keeps the cluster and the ingress controller
    let result = orchestrator.teardown(TeardownScope::Workload).await;
    assert!(result.is_ok());
    assert!(!cluster.has_namespace("webstack"));
    assert!(cluster.has_namespace("ingress-nginx"));
    assert!(cluster.has_cluster("webstack"));

    // Only the workload is re-applied afterwards
    let redeploy = orchestrator.run(&plan).await;
    assert!(redeploy.success());
    assert_eq!(redeploy.outcome("namespace"), Some(&StepOutcome::Succeeded));
    assert_eq!(redeploy.outcome("frontend"), Some(&StepOutcome::Succeeded));
    assert_eq!(
        redeploy.outcome("cluster"),
        Some(&StepOutcome::Skipped {
            reason: SkipReason::AlreadySatisfied
        })
    );

    // Full teardown removes everything, twice without complaint
    assert!(orchestrator.teardown(TeardownScope::All).await.is_ok());
    assert!(!cluster.has_cluster("webstack"));
    let before = cluster.mutations().len();
    assert!(orchestrator.teardown(TeardownScope::All).await.is_ok());
    assert_eq!(cluster.mutations().len(), before);
}

#[tokio::test]
async fn test_failed_database_isolates_its_branch() {
    let temp_dir = TempDir::new().unwrap();
    let plan = DeploymentPlan::load(write_plan(temp_dir.path(), WEBSTACK_PLAN)).unwrap();

    let database = StepAction::ApplyManifest {
        path: "k8s/postgres.yaml".into(),
        namespace: None,
    };
    let cluster = Arc::new(MemoryCluster::new("webstack").fail_apply(&database));
    let (_cache_dir, orchestrator) = create_test_orchestrator(&cluster);

    let report = orchestrator.run(&plan).await;

    assert!(!report.success());
    assert_eq!(report.outcome("database"), Some(&StepOutcome::Failed));
    for blocked in ["backend", "frontend"] {
        assert!(
            matches!(
                report.outcome(blocked),
                Some(StepOutcome::Skipped {
                    reason: SkipReason::DependencyFailed { .. }
                })
            ),
            "{blocked} should be skipped"
        );
    }
    for independent in ["cluster", "namespace", "ingress-controller", "backend-image"] {
        assert_eq!(
            report.outcome(independent),
            Some(&StepOutcome::Succeeded),
            "{independent} should succeed"
        );
    }
}

#[tokio::test]
async fn test_cyclic_plan_file_is_rejected_before_any_call() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_plan(
        temp_dir.path(),
        r#"[
          { "id": "backend", "dependsOn": ["frontend"],
            "action": { "type": "applyManifest", "path": "k8s/backend.yaml" } },
          { "id": "frontend", "dependsOn": ["backend"],
            "action": { "type": "applyManifest", "path": "k8s/frontend.yaml" } }
        ]"#,
    );

    let err = DeploymentPlan::load(&path).unwrap_err();
    assert!(matches!(err, OrchestratorError::Cycle { .. }));
    assert_eq!(
        err.to_string(),
        "Dependency cycle detected: backend -> frontend -> backend"
    );
}

#[tokio::test]
async fn test_malformed_plan_file_names_the_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_plan(temp_dir.path(), r#"{ "steps": [] }"#);

    let err = DeploymentPlan::load(&path).unwrap_err();
    assert!(matches!(err, OrchestratorError::PlanFile { .. }));
    assert!(err.to_string().contains("plan.json"));
}

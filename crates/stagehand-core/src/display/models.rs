//! Display implementations for domain models.
//!
//! Short forms (`StepAction`, `Readiness`, `SkipReason`) render on one line
//! and are used in logs. `Step` and `RunResult` render as markdown sections.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{
    Readiness, RunResult, SkipReason, Step, StepAction, StepOutcome, TeardownScope,
};

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepAction::ApplyManifest { path, namespace } => {
                write!(f, "apply manifest {}", path.display())?;
                if let Some(namespace) = namespace {
                    write!(f, " in {namespace}")?;
                }
                Ok(())
            }
            StepAction::BuildImage {
                context,
                tag,
                dockerfile,
            } => {
                write!(f, "build image {tag} from {}", context.display())?;
                if let Some(dockerfile) = dockerfile {
                    write!(f, " ({})", dockerfile.display())?;
                }
                Ok(())
            }
            StepAction::InstallChart {
                release,
                chart,
                namespace,
                version,
                ..
            } => {
                write!(f, "install chart {chart}")?;
                if let Some(version) = version {
                    write!(f, "@{version}")?;
                }
                write!(f, " as {release}")?;
                if let Some(namespace) = namespace {
                    write!(f, " in {namespace}")?;
                }
                Ok(())
            }
            StepAction::CreateCluster { config } => match config {
                Some(config) => write!(f, "create cluster ({})", config.display()),
                None => write!(f, "create cluster"),
            },
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' {} within {}s",
            self.kind, self.selector, self.condition, self.timeout_seconds
        )?;
        if let Some(namespace) = &self.namespace {
            write!(f, " in {namespace}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadySatisfied => write!(f, "already in desired state"),
            SkipReason::DependencyFailed { dependency } => {
                write!(f, "dependency '{dependency}' did not complete")
            }
            SkipReason::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Skipped { reason } => write!(f, "skipped ({reason})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl fmt::Display for TeardownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Action: {}", self.action)?;
        if !self.depends_on.is_empty() {
            writeln!(f, "- Depends on: {}", self.depends_on.join(", "))?;
        }
        if let Some(readiness) = &self.readiness {
            writeln!(f, "- Waits for: {readiness}")?;
        }
        if self.idempotent {
            writeln!(f, "- Idempotent")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} ({})", self.step_id, self.outcome.with_icon())?;
        writeln!(f)?;

        if let StepOutcome::Skipped { reason } = &self.outcome {
            writeln!(f, "- Reason: {reason}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "- Error: {error}")?;
        }
        writeln!(f, "- Started: {}", LocalDateTime(&self.started_at))?;
        writeln!(
            f,
            "- Took: {}",
            Elapsed {
                from: &self.started_at,
                to: &self.finished_at,
            }
        )?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::{error::StepError, models::ChartRepo};

    #[test]
    fn test_action_display() {
        let manifest = StepAction::ApplyManifest {
            path: "k8s/backend.yaml".into(),
            namespace: None,
        };
        assert_eq!(manifest.to_string(), "apply manifest k8s/backend.yaml");

        let scoped = StepAction::ApplyManifest {
            path: "k8s/ingress.yaml".into(),
            namespace: Some("ingress-nginx".to_string()),
        };
        assert_eq!(scoped.to_string(), "apply manifest k8s/ingress.yaml in ingress-nginx");

        let image = StepAction::BuildImage {
            context: "frontend".into(),
            tag: "frontend:dev".to_string(),
            dockerfile: None,
        };
        assert_eq!(image.to_string(), "build image frontend:dev from frontend");

        let chart = StepAction::InstallChart {
            release: "ingress".to_string(),
            chart: "ingress-nginx/ingress-nginx".to_string(),
            namespace: None,
            version: Some("4.10.0".to_string()),
            repo: Some(ChartRepo {
                name: "ingress-nginx".to_string(),
                url: "https://kubernetes.github.io/ingress-nginx".to_string(),
            }),
            set: vec![],
        };
        assert_eq!(
            chart.to_string(),
            "install chart ingress-nginx/ingress-nginx@4.10.0 as ingress"
        );

        assert_eq!(StepAction::CreateCluster { config: None }.to_string(), "create cluster");
    }

    #[test]
    fn test_step_display_lists_details() {
        let step = Step::new(
            "backend",
            StepAction::ApplyManifest {
                path: "k8s/backend.yaml".into(),
                namespace: None,
            },
        )
        .depends_on(["database", "image"])
        .with_readiness(Readiness::pods("app=backend", 120))
        .idempotent();

        let output = step.to_string();
        assert!(output.starts_with("### backend\n"));
        assert!(output.contains("- Depends on: database, image"));
        assert!(output.contains("- Waits for: pod 'app=backend' Ready within 120s"));
        assert!(output.contains("- Idempotent"));
    }

    #[test]
    fn test_run_result_display() {
        let failed = RunResult::failed(
            "database",
            Timestamp::now(),
            StepError::ReadinessTimeout {
                selector: "app=database".to_string(),
                timeout: std::time::Duration::from_secs(90),
            },
        );
        let output = failed.to_string();
        assert!(output.contains("### database (✗ Failed)"));
        assert!(output.contains("- Error: 'app=database' not ready after 90s"));

        let skipped = RunResult::skipped(
            "backend",
            Timestamp::now(),
            SkipReason::DependencyFailed {
                dependency: "database".to_string(),
            },
        );
        let output = skipped.to_string();
        assert!(output.contains("### backend (○ Skipped)"));
        assert!(output.contains("- Reason: dependency 'database' did not complete"));
        assert!(!output.contains("- Error:"));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(StepOutcome::Succeeded.to_string(), "succeeded");
        let outcome = StepOutcome::Skipped {
            reason: SkipReason::AlreadySatisfied,
        };
        assert_eq!(outcome.to_string(), "skipped (already in desired state)");
    }
}

//! Deployment plans: validated, immutable DAGs of steps.
//!
//! A [`DeploymentPlan`] is built once per invocation, either from steps
//! assembled in code ([`DeploymentPlan::new`]) or from a plan file
//! ([`DeploymentPlan::load`]). Construction refuses graphs the orchestrator
//! could not execute, so no cluster call is ever made for an invalid plan:
//!
//! - duplicate or empty step identifiers,
//! - dependencies on identifiers that are not in the plan,
//! - dependency cycles (including a step depending on itself),
//! - readiness predicates with a zero timeout.
//!
//! # Examples
//!
//! ```rust
//! use stagehand_core::{DeploymentPlan, Step, StepAction};
//!
//! let manifest = |path: &str| StepAction::ApplyManifest {
//!     path: path.into(),
//!     namespace: None,
//! };
//!
//! let plan = DeploymentPlan::new(vec![
//!     Step::new("database", manifest("k8s/database.yaml")),
//!     Step::new("backend", manifest("k8s/backend.yaml")).depends_on(["database"]),
//!     Step::new("frontend", manifest("k8s/frontend.yaml")),
//! ])?;
//!
//! let order: Vec<&str> = plan.order().iter().map(|s| s.id.as_str()).collect();
//! assert_eq!(order, ["database", "backend", "frontend"]);
//! assert_eq!(plan.rounds().len(), 2);
//! # Ok::<(), stagehand_core::OrchestratorError>(())
//! ```

use std::collections::HashMap;

use crate::{
    error::{OrchestratorError, Result},
    models::Step,
};

mod graph;
pub mod loader;


/// An ordered set of steps forming a directed acyclic graph.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    rounds: Vec<Vec<usize>>,
}

impl DeploymentPlan {
    /// Validates the steps and builds the plan.
    ///
    /// # Errors
    ///
    /// - `OrchestratorError::InvalidInput` for an empty id or zero timeout
    /// - `OrchestratorError::DuplicateStep` for a repeated id
    /// - `OrchestratorError::UnknownDependency` for an unresolved dependency
    /// - `OrchestratorError::Cycle` when the graph is not acyclic
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let mut index = HashMap::with_capacity(steps.len());
        for (pos, step) in steps.iter().enumerate() {
            validate_step(step)?;
            if index.insert(step.id.clone(), pos).is_some() {
                return Err(OrchestratorError::DuplicateStep {
                    id: step.id.clone(),
                });
            }
        }

        let mut dependencies = Vec::with_capacity(steps.len());
        let mut dependents = vec![Vec::new(); steps.len()];
        for (pos, step) in steps.iter().enumerate() {
            let mut deps: Vec<usize> = Vec::with_capacity(step.depends_on.len());
            for dep_id in &step.depends_on {
                let dep = *index.get(dep_id).ok_or_else(|| {
                    OrchestratorError::UnknownDependency {
                        step: step.id.clone(),
                        dependency: dep_id.clone(),
                    }
                })?;
                if !deps.contains(&dep) {
                    deps.push(dep);
                    dependents[dep].push(pos);
                }
            }
            dependencies.push(deps);
        }

        let rounds = graph::rounds(&dependencies, &dependents).map_err(|leftover| {
            let cycle = graph::find_cycle(&dependencies, &leftover)
                .into_iter()
                .map(|pos| steps[pos].id.clone())
                .collect();
            OrchestratorError::Cycle { cycle }
        })?;

        Ok(Self {
            steps,
            index,
            dependencies,
            dependents,
            rounds,
        })
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Looks up a step by identifier.
    pub fn get(&self, id: &str) -> Option<&Step> {
        self.index.get(id).map(|&pos| &self.steps[pos])
    }

    /// Topological order, breaking ties by declaration order.
    pub fn order(&self) -> Vec<&Step> {
        graph::order(&self.dependencies, &self.dependents)
            .into_iter()
            .map(|pos| &self.steps[pos])
            .collect()
    }

    /// Kahn rounds: each round holds the steps whose dependencies all lie in
    /// earlier rounds.
    pub fn rounds(&self) -> Vec<Vec<&Step>> {
        self.rounds
            .iter()
            .map(|round| round.iter().map(|&pos| &self.steps[pos]).collect())
            .collect()
    }

    pub(crate) fn step(&self, pos: usize) -> &Step {
        &self.steps[pos]
    }

    pub(crate) fn dependencies_of(&self, pos: usize) -> &[usize] {
        &self.dependencies[pos]
    }

    pub(crate) fn dependents_of(&self, pos: usize) -> &[usize] {
        &self.dependents[pos]
    }
}

fn validate_step(step: &Step) -> Result<()> {
    if step.id.trim().is_empty() {
        return Err(OrchestratorError::invalid_input("id").with_reason("step id cannot be empty"));
    }
    if let Some(readiness) = &step.readiness {
        if readiness.timeout_seconds == 0 {
            return Err(OrchestratorError::invalid_input("readiness.timeoutSeconds")
                .with_reason(format!("step '{}' must wait at least one second", step.id)));
        }
        if readiness.selector.trim().is_empty() {
            return Err(OrchestratorError::invalid_input("readiness.selector")
                .with_reason(format!("step '{}' has an empty selector", step.id)));
        }
    }
    Ok(())
}

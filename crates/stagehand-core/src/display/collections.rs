//! Display wrappers for a plan's execution rounds.

use std::fmt;

use crate::{models::Step, plan::DeploymentPlan};

/// Newtype wrapper formatting a plan as its Kahn rounds.
///
/// Every step in a round depends only on steps from earlier rounds, so the
/// steps of one round may run in parallel.
///
/// # Examples
///
/// ```rust
/// use stagehand_core::{display::PlanRounds, DeploymentPlan, Step, StepAction};
///
/// let manifest = |path: &str| StepAction::ApplyManifest {
///     path: path.into(),
///     namespace: None,
/// };
/// let plan = DeploymentPlan::new(vec![
///     Step::new("database", manifest("k8s/database.yaml")),
///     Step::new("backend", manifest("k8s/backend.yaml")).depends_on(["database"]),
/// ])?;
///
/// let output = PlanRounds::new(&plan).to_string();
/// assert!(output.contains("## Round 1"));
/// assert!(output.contains("## Round 2"));
/// # Ok::<(), stagehand_core::OrchestratorError>(())
/// ```
pub struct PlanRounds<'a>(pub Vec<Vec<&'a Step>>);

impl<'a> PlanRounds<'a> {
    pub fn new(plan: &'a DeploymentPlan) -> Self {
        Self(plan.rounds())
    }

    /// Number of rounds, i.e. the length of the longest dependency chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps across all rounds.
    pub fn step_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }
}

impl fmt::Display for PlanRounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Deployment plan")?;
        writeln!(f)?;

        if self.0.is_empty() {
            return writeln!(f, "No steps in this plan.");
        }

        writeln!(
            f,
            "{} step(s) in {} round(s).",
            self.step_count(),
            self.len()
        )?;
        writeln!(f)?;

        for (i, round) in self.0.iter().enumerate() {
            writeln!(f, "## Round {}", i + 1)?;
            writeln!(f)?;
            for step in round {
                write!(f, "{step}")?;
            }
        }
        Ok(())
    }
}

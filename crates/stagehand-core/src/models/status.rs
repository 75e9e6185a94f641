//! Outcome enumerations for steps and the teardown scope.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What happened to a step during one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepOutcome {
    /// The action was applied and its readiness predicate held
    Succeeded,

    /// The action or its readiness wait failed
    Failed,

    /// The step was not applied
    Skipped { reason: SkipReason },
}

/// Why a step was not applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    /// The cluster already matched the desired state
    AlreadySatisfied,

    /// A dependency failed or was itself skipped because of a failure
    DependencyFailed { dependency: String },

    /// The run was cancelled before the step started
    Cancelled,
}

impl StepOutcome {
    /// True for outcomes that count as success for the overall run.
    pub fn is_ok(&self) -> bool {
        matches!(
            self,
            StepOutcome::Succeeded
                | StepOutcome::Skipped {
                    reason: SkipReason::AlreadySatisfied
                }
        )
    }

    /// True when the step was skipped for any reason.
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }

    /// Short machine-friendly name of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Succeeded => "succeeded",
            StepOutcome::Failed => "failed",
            StepOutcome::Skipped { .. } => "skipped",
        }
    }

    /// Get the outcome with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stagehand_core::models::{SkipReason, StepOutcome};
    ///
    /// assert_eq!(StepOutcome::Succeeded.with_icon(), "✓ Succeeded");
    /// assert_eq!(StepOutcome::Failed.with_icon(), "✗ Failed");
    /// let skipped = StepOutcome::Skipped { reason: SkipReason::Cancelled };
    /// assert_eq!(skipped.with_icon(), "○ Skipped");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepOutcome::Succeeded => "✓ Succeeded",
            StepOutcome::Failed => "✗ Failed",
            StepOutcome::Skipped { .. } => "○ Skipped",
        }
    }
}

/// How much of the deployment a teardown removes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum TeardownScope {
    /// Delete the application namespace only
    #[default]
    Workload,

    /// Delete the whole cluster and the local build cache
    All,
}

impl FromStr for TeardownScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workload" => Ok(TeardownScope::Workload),
            "all" => Ok(TeardownScope::All),
            _ => Err(format!("Invalid teardown scope: {s}")),
        }
    }
}

impl TeardownScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeardownScope::Workload => "workload",
            TeardownScope::All => "all",
        }
    }
}

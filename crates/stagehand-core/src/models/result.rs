//! Per-step results and the report of a whole run.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{SkipReason, StepOutcome};
use crate::error::StepError;

/// The outcome of one step (or one teardown) during a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Identifier of the step this result belongs to
    pub step_id: String,

    /// What happened to the step
    pub outcome: StepOutcome,

    /// When work on the step began (UTC)
    pub started_at: Timestamp,

    /// When the outcome was decided (UTC)
    pub finished_at: Timestamp,

    /// Failure detail, present only for failed steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl RunResult {
    /// A step that was applied and became ready.
    pub fn succeeded(step_id: impl Into<String>, started_at: Timestamp) -> Self {
        Self {
            step_id: step_id.into(),
            outcome: StepOutcome::Succeeded,
            started_at,
            finished_at: Timestamp::now(),
            error: None,
        }
    }

    /// A step whose action or readiness wait failed.
    pub fn failed(step_id: impl Into<String>, started_at: Timestamp, error: StepError) -> Self {
        Self {
            step_id: step_id.into(),
            outcome: StepOutcome::Failed,
            started_at,
            finished_at: Timestamp::now(),
            error: Some(error),
        }
    }

    /// A step that was not applied.
    pub fn skipped(step_id: impl Into<String>, started_at: Timestamp, reason: SkipReason) -> Self {
        Self {
            step_id: step_id.into(),
            outcome: StepOutcome::Skipped { reason },
            started_at,
            finished_at: Timestamp::now(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// All results of one `run`, in plan declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// True when every step succeeded or was skipped as already satisfied.
    pub fn success(&self) -> bool {
        self.results.iter().all(RunResult::is_ok)
    }

    /// Looks up the result of a step by identifier.
    pub fn get(&self, step_id: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.step_id == step_id)
    }

    /// Looks up the outcome of a step by identifier.
    pub fn outcome(&self, step_id: &str) -> Option<&StepOutcome> {
        self.get(step_id).map(|r| &r.outcome)
    }

    pub fn succeeded_count(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Succeeded))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Failed))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(StepOutcome::is_skipped)
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

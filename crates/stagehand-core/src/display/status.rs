//! One-line status messages for commands that produce a single outcome.

use std::fmt;

use crate::models::RunResult;

/// A success or failure message, e.g. the outcome of a teardown.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
        }
    }
}

impl From<&RunResult> for OperationStatus {
    fn from(result: &RunResult) -> Self {
        match (&result.error, result.is_ok()) {
            (_, true) => Self::success(format!("{} completed", result.step_id)),
            (Some(error), false) => Self::failure(format!("{}: {error}", result.step_id)),
            (None, false) => Self::failure(format!("{} {}", result.step_id, result.outcome)),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            if self.success { "Success:" } else { "Error:" },
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::error::StepError;

    #[test]
    fn test_status_from_teardown_result() {
        let ok = RunResult::succeeded("teardown:workload", Timestamp::now());
        assert_eq!(
            OperationStatus::from(&ok).to_string(),
            "Success: teardown:workload completed\n"
        );

        let failed = RunResult::failed(
            "teardown:all",
            Timestamp::now(),
            StepError::Teardown {
                message: "deleting cluster 'webstack': kind not found".to_string(),
            },
        );
        let status = OperationStatus::from(&failed);
        assert!(!status.success);
        assert_eq!(
            status.to_string(),
            "Error: teardown:all: teardown failed: deleting cluster 'webstack': kind not found\n"
        );
    }
}

//! Error types for the orchestrator library.
//!
//! Three layers of failure are kept apart:
//!
//! - [`OrchestratorError`]: plan construction, plan files and configuration.
//!   These abort before any cluster call is made.
//! - [`ClusterError`]: a cluster backend could not perform a request.
//! - [`StepError`]: why a single step failed. Recorded in its
//!   [`RunResult`](crate::models::RunResult), never propagated out of a run.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a plan or configuring the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The dependency graph contains a cycle
    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
    /// A step depends on an identifier that is not in the plan
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },
    /// Two steps share the same identifier
    #[error("Step '{id}' is declared more than once")]
    DuplicateStep { id: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A plan file could not be parsed
    #[error("Invalid plan file '{path}': {source}")]
    PlanFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrchestratorError {
        OrchestratorError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrchestratorError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Returns true for errors detected while validating a plan's graph.
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::UnknownDependency { .. } | Self::DuplicateStep { .. }
        )
    }
}

/// Failures reported by a [`ClusterHandle`](crate::cluster::ClusterHandle).
#[derive(Error, Debug)]
pub enum ClusterError {
    /// An external tool could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// An external tool exited unsuccessfully
    #[error("'{command}' failed with status {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },
    /// Tool output could not be interpreted
    #[error("Unexpected output from '{command}': {reason}")]
    Output { command: String, reason: String },
    /// A local file or directory could not be read or written
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The backend refused the request
    #[error("{0}")]
    Rejected(String),
}

/// Why a single step did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepError {
    /// Applying the step's action failed
    #[error("apply failed: {message}")]
    Apply { message: String },
    /// The readiness predicate did not hold before the deadline
    #[error("'{selector}' not ready after {}s", timeout.as_secs())]
    ReadinessTimeout { selector: String, timeout: Duration },
    /// The run was interrupted while the step was in flight
    #[error("cancelled while in progress")]
    Cancelled,
    /// A teardown action failed
    #[error("teardown failed: {message}")]
    Teardown { message: String },
    /// The step's task ended abnormally
    #[error("step task aborted: {message}")]
    Aborted { message: String },
}

impl From<ClusterError> for StepError {
    fn from(err: ClusterError) -> Self {
        StepError::Apply {
            message: err.to_string(),
        }
    }
}

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

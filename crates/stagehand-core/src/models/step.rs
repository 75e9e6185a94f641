//! Step model definition: what a step does, what it waits for, and what it
//! depends on.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One unit of orchestrated work with declared dependencies.
///
/// This is also the record type of plan files, which are JSON arrays of
/// steps using camelCase field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Step {
    /// Unique identifier of the step within its plan
    pub id: String,

    /// Identifiers of the steps that must complete before this one runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// The resource-application action this step performs
    pub action: StepAction,

    /// Condition polled after the action is applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Readiness>,

    /// Whether an already-satisfied action may be skipped instead of
    /// re-applied
    #[serde(default)]
    pub idempotent: bool,
}

impl Step {
    /// Creates a step with no dependencies, no readiness predicate and
    /// idempotency disabled.
    pub fn new(id: impl Into<String>, action: StepAction) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            action,
            readiness: None,
            idempotent: false,
        }
    }

    /// Adds dependencies to the step.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets the readiness predicate of the step.
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = Some(readiness);
        self
    }

    /// Marks the step as safe to skip when its action is already satisfied.
    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

/// The resource-application actions a step can perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StepAction {
    /// Apply a declarative resource file
    ApplyManifest {
        path: PathBuf,
        /// Target namespace; the configured namespace when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
    },
    /// Build a container image and load it into the local cluster
    BuildImage {
        context: PathBuf,
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dockerfile: Option<PathBuf>,
    },
    /// Install or upgrade a packaged chart release
    InstallChart {
        release: String,
        chart: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repo: Option<ChartRepo>,
        /// `key=value` overrides
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        set: Vec<String>,
    },
    /// Create the local cluster itself
    CreateCluster {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<PathBuf>,
    },
}

impl StepAction {
    /// The namespace the action targets when it names one explicitly.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            StepAction::ApplyManifest { namespace, .. }
            | StepAction::InstallChart { namespace, .. } => namespace.as_deref(),
            StepAction::BuildImage { .. } | StepAction::CreateCluster { .. } => None,
        }
    }
}

/// A chart repository registered before a chart is installed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ChartRepo {
    pub name: String,
    pub url: String,
}

/// A resource selector reaching a target condition, polled until true or
/// timeout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Readiness {
    /// Label selector, e.g. `app=backend`
    pub selector: String,

    /// Overall deadline for the predicate to hold
    pub timeout_seconds: u64,

    /// Resource kind the selector applies to
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Status condition that must be `True` on every match
    #[serde(default = "default_condition")]
    pub condition: String,

    /// Namespace to query; the configured namespace when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

fn default_kind() -> String {
    "pod".to_string()
}

fn default_condition() -> String {
    "Ready".to_string()
}

impl Readiness {
    /// Creates a pod readiness predicate for the given selector.
    pub fn pods(selector: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            selector: selector.into(),
            timeout_seconds,
            kind: default_kind(),
            condition: default_condition(),
            namespace: None,
        }
    }

    /// The overall deadline as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

//! In-memory cluster used by tests and dry runs.
//!
//! Every mutating call (`apply`, `delete`) is appended to a log, so callers
//! can assert both what happened and in which order. Readiness and failures
//! are controlled per action or per selector.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::{ClusterHandle, ClusterResource, ReadinessQuery};
use crate::{error::ClusterError, models::StepAction};

#[derive(Debug, Default)]
struct MemoryState {
    /// Applied actions and the namespace they were applied into
    applied: HashMap<String, String>,
    namespaces: BTreeSet<String>,
    clusters: BTreeSet<String>,
    build_caches: BTreeSet<PathBuf>,
    mutations: Vec<String>,
    polls: HashMap<String, u32>,
}

/// A cluster that lives in memory.
#[derive(Debug)]
pub struct MemoryCluster {
    cluster_name: String,
    state: Mutex<MemoryState>,
    failing: HashSet<String>,
    never_ready: HashSet<String>,
    ready_after: HashMap<String, u32>,
    apply_delay: Duration,
}

impl MemoryCluster {
    /// Creates an empty cluster. Applying a `createCluster` action brings a
    /// cluster with this name into existence.
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            state: Mutex::new(MemoryState::default()),
            failing: HashSet::new(),
            never_ready: HashSet::new(),
            ready_after: HashMap::new(),
            apply_delay: Duration::ZERO,
        }
    }

    /// Makes every `apply` of this action fail.
    pub fn fail_apply(mut self, action: &StepAction) -> Self {
        self.failing.insert(action.to_string());
        self
    }

    /// Marks an action as already applied into a namespace.
    pub fn with_applied(self, action: &StepAction, namespace: &str) -> Self {
        self.lock()
            .applied
            .insert(action.to_string(), namespace.to_string());
        self
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.lock().namespaces.insert(name.to_string());
        self
    }

    pub fn with_cluster(self, name: &str) -> Self {
        self.lock().clusters.insert(name.to_string());
        self
    }

    /// Marks a build cache directory as present. The directory itself is
    /// never touched.
    pub fn with_build_cache(self, dir: impl Into<PathBuf>) -> Self {
        self.lock().build_caches.insert(dir.into());
        self
    }

    /// Resources matched by this selector never become ready.
    pub fn never_ready(mut self, selector: &str) -> Self {
        self.never_ready.insert(selector.to_string());
        self
    }

    /// Resources matched by this selector report ready from the given poll
    /// onwards (1 = first poll).
    pub fn ready_after(mut self, selector: &str, polls: u32) -> Self {
        self.ready_after.insert(selector.to_string(), polls);
        self
    }

    /// Delays every `apply` call.
    pub fn with_apply_delay(mut self, delay: Duration) -> Self {
        self.apply_delay = delay;
        self
    }

    /// Mutating calls in the order they were made, e.g.
    /// `apply apply manifest k8s/backend.yaml` or `delete namespace 'webstack'`.
    pub fn mutations(&self) -> Vec<String> {
        self.lock().mutations.clone()
    }

    /// Whether the action has been applied and not removed since.
    pub fn is_applied(&self, action: &StepAction) -> bool {
        self.lock().applied.contains_key(&action.to_string())
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.lock().namespaces.contains(name)
    }

    pub fn has_cluster(&self, name: &str) -> bool {
        self.lock().clusters.contains(name)
    }

    pub fn has_build_cache(&self, dir: &Path) -> bool {
        self.lock().build_caches.contains(dir)
    }

    /// How many times readiness was queried for a selector.
    pub fn poll_count(&self, selector: &str) -> u32 {
        self.lock().polls.get(selector).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ClusterHandle for MemoryCluster {
    async fn apply(&self, action: &StepAction, namespace: &str) -> Result<(), ClusterError> {
        if !self.apply_delay.is_zero() {
            tokio::time::sleep(self.apply_delay).await;
        }

        let key = action.to_string();
        let mut state = self.lock();
        state.mutations.push(format!("apply {key}"));
        if self.failing.contains(&key) {
            return Err(ClusterError::Rejected(format!("{key} was rejected")));
        }

        match action {
            StepAction::CreateCluster { .. } => {
                state.clusters.insert(self.cluster_name.clone());
            }
            StepAction::ApplyManifest { .. } | StepAction::InstallChart { .. } => {
                state.namespaces.insert(namespace.to_string());
            }
            StepAction::BuildImage { .. } => {}
        }
        debug!("Applied {key} into {namespace}");
        state.applied.insert(key, namespace.to_string());
        Ok(())
    }

    async fn is_satisfied(
        &self,
        action: &StepAction,
        _namespace: &str,
    ) -> Result<bool, ClusterError> {
        Ok(self.lock().applied.contains_key(&action.to_string()))
    }

    async fn is_ready(&self, query: &ReadinessQuery) -> Result<bool, ClusterError> {
        let mut state = self.lock();
        let polls = state.polls.entry(query.selector.clone()).or_insert(0);
        *polls += 1;

        if self.never_ready.contains(&query.selector) {
            return Ok(false);
        }
        Ok(self
            .ready_after
            .get(&query.selector)
            .map_or(true, |&needed| *polls >= needed))
    }

    async fn exists(&self, resource: &ClusterResource) -> Result<bool, ClusterError> {
        let state = self.lock();
        Ok(match resource {
            ClusterResource::Namespace(name) => state.namespaces.contains(name),
            ClusterResource::Cluster(name) => state.clusters.contains(name),
            ClusterResource::BuildCache(dir) => state.build_caches.contains(dir),
        })
    }

    async fn delete(&self, resource: &ClusterResource) -> Result<(), ClusterError> {
        let mut state = self.lock();
        state.mutations.push(format!("delete {resource}"));
        match resource {
            ClusterResource::Namespace(name) => {
                state.namespaces.remove(name);
                state.applied.retain(|_, namespace| namespace != name);
            }
            ClusterResource::Cluster(name) => {
                if state.clusters.remove(name) {
                    state.namespaces.clear();
                    state.applied.clear();
                }
            }
            ClusterResource::BuildCache(dir) => {
                state.build_caches.remove(dir);
            }
        }
        Ok(())
    }
}

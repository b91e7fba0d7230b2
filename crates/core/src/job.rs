//! Job domain entity
//!
//! Jobs are opaque to scheduling except for their pod resource requests,
//! required node labels and in-queue priority. Everything else inside the
//! pod spec is carried through untouched for the worker cluster.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resources::ComputeResources;

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested and limit quantities for one container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub requests: ComputeResources,
    pub limits: ComputeResources,
}

impl ResourceRequirements {
    /// Effective per-resource demand: the max of request and limit, per pod
    /// semantics.
    pub fn effective(&self) -> ComputeResources {
        let mut effective = ComputeResources::new();
        for (resource, quantity) in self.requests.iter() {
            effective.insert(resource.clone(), *quantity);
        }
        for (resource, quantity) in self.limits.iter() {
            let current = effective.get(resource);
            effective.insert(resource.clone(), current.max(*quantity));
        }
        effective
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// The scheduling-relevant slice of a pod descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,
}

/// A queued unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub queue: String,
    pub job_set_id: String,
    /// Ordering hint within the queue; the repository's peek order is
    /// authoritative.
    pub priority: f64,
    /// Every label must be satisfied by a single node-labeling group
    /// advertised by the leasing cluster.
    #[serde(default)]
    pub required_node_labels: BTreeMap<String, String>,
    pub pod_spec: PodSpec,
    pub created: DateTime<Utc>,
}

impl Job {
    pub fn new(queue: impl Into<String>, job_set_id: impl Into<String>, pod_spec: PodSpec) -> Self {
        Self {
            id: JobId::new(),
            queue: queue.into(),
            job_set_id: job_set_id.into(),
            priority: 0.0,
            required_node_labels: BTreeMap::new(),
            pod_spec,
            created: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_required_node_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.required_node_labels = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Total resource request of the job: the per-resource sum across
    /// containers of max(request, limit).
    pub fn total_resource_request(&self) -> ComputeResources {
        let mut total = ComputeResources::new();
        for container in &self.pod_spec.containers {
            total.add(&container.resources.effective());
        }
        total
    }
}

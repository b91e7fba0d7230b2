//! Scheduling configuration

use std::time::Duration;

use serde::Deserialize;

use armada_core::{ComputeResources, ComputeResourcesFloat};

/// Tuning knobs for the lease engine.
///
/// The per-queue limit maps may list any subset of resources; a resource
/// missing from a map is unconstrained there.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// How many jobs one peek pulls from the head of a queue.
    pub queue_lease_batch_size: usize,
    /// Hard cap on jobs handed out by a single lease call.
    pub maximum_jobs_to_schedule: usize,
    /// Absolute cap on what any one queue may be granted per lease call.
    pub scheduling_limit_per_queue: ComputeResourcesFloat,
    /// Steady-state cap on the total resources held per queue.
    pub resource_limit_per_queue: ComputeResourcesFloat,
    /// Smallest job worth leasing when the request does not name one.
    pub minimum_job_size: ComputeResources,
    /// The engine stops this long before the call deadline.
    pub lease_deadline_safety_margin_ms: u64,
    /// Attempts per queue per pass before a failing repository call makes
    /// the engine skip the queue for the rest of the call.
    pub max_repository_retries: usize,
    /// Resource the scarcity weights are normalized against.
    pub baseline_resource: String,
}

impl SchedulingConfig {
    pub fn lease_deadline_safety_margin(&self) -> Duration {
        Duration::from_millis(self.lease_deadline_safety_margin_ms)
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            queue_lease_batch_size: 100,
            maximum_jobs_to_schedule: 1000,
            scheduling_limit_per_queue: ComputeResourcesFloat::new(),
            resource_limit_per_queue: ComputeResourcesFloat::new(),
            minimum_job_size: ComputeResources::new(),
            lease_deadline_safety_margin_ms: 1000,
            max_repository_retries: 3,
            baseline_resource: "cpu".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_unconstrained() {
        let config = SchedulingConfig::default();
        assert_eq!(config.queue_lease_batch_size, 100);
        assert_eq!(config.lease_deadline_safety_margin(), Duration::from_secs(1));
        assert!(config.scheduling_limit_per_queue.is_empty());
        assert!(config.minimum_job_size.is_empty());
    }

    #[test]
    fn deserializes_partial_config() {
        let config: SchedulingConfig = serde_json::from_str(
            r#"{
                "queue_lease_batch_size": 10,
                "scheduling_limit_per_queue": {"cpu": 300.0},
                "minimum_job_size": {"cpu": "100m"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.queue_lease_batch_size, 10);
        assert_eq!(config.scheduling_limit_per_queue.get("cpu"), 300.0);
        assert_eq!(config.minimum_job_size.get("cpu"), "100m".parse().unwrap());
        // untouched fields keep their defaults
        assert_eq!(config.maximum_jobs_to_schedule, 1000);
        assert_eq!(config.baseline_resource, "cpu");
    }
}

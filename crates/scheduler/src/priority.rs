//! Queue priority and resource scarcity
//!
//! Queues pay for what they already hold: the more of the cluster a queue
//! uses, the higher (worse) its effective priority, scaled by its configured
//! priority factor. Scarce resources count for more through the scarcity
//! weights, so a queue sitting on all the GPUs cannot hide behind a small
//! CPU footprint.

use std::collections::BTreeMap;

use armada_core::{ComputeResources, Queue};

/// Per-resource multiplier elevating scarce resources in priority
/// computation; keyed by resource name.
pub type ResourceScarcity = BTreeMap<String, f64>;

/// Floor for the usage term of the effective priority. Keeps a queue with
/// zero historical usage from being advantaged infinitely.
pub const MIN_PRIORITY: f64 = 0.5;

/// Priority snapshot for one queue, fixed for the duration of a lease call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePriorityInfo {
    /// Effective priority; lower is better.
    pub priority: f64,
    pub current_usage: ComputeResources,
}

/// Scarcity weight of each resource present in the cluster-wide capacity:
/// `capacity[baseline] / capacity[resource]`, so the baseline sits at 1 and
/// rarer resources weigh proportionally more.
pub fn resource_scarcity(total_capacity: &ComputeResources, baseline_resource: &str) -> ResourceScarcity {
    let capacity = total_capacity.as_float();
    let baseline = capacity.get(baseline_resource);
    if baseline <= 0.0 {
        return ResourceScarcity::new();
    }
    capacity
        .0
        .iter()
        .filter(|(_, total)| **total > 0.0)
        .map(|(resource, total)| (resource.clone(), baseline / total))
        .collect()
}

/// Effective priority of every queue over the aggregated usage snapshot:
/// `priority_factor * max(MIN_PRIORITY, dominant_share(current_usage))`.
/// Deterministic in its inputs.
pub fn calculate_queue_priority(
    queues: &[Queue],
    usage_by_queue: &BTreeMap<String, ComputeResources>,
    total_capacity: &ComputeResources,
    scarcity: &ResourceScarcity,
) -> BTreeMap<String, QueuePriorityInfo> {
    let capacity = total_capacity.as_float();
    queues
        .iter()
        .map(|queue| {
            let current_usage = usage_by_queue.get(&queue.name).cloned().unwrap_or_default();
            let usage_share = current_usage.as_float().dominant_share(&capacity, scarcity);
            let priority = queue.priority_factor * usage_share.max(MIN_PRIORITY);
            (
                queue.name.clone(),
                QueuePriorityInfo {
                    priority,
                    current_usage,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(name: &str, priority_factor: f64) -> Queue {
        Queue::new(name, priority_factor).unwrap()
    }

    #[test]
    fn scarcity_is_relative_to_baseline() {
        let capacity = ComputeResources::from_pairs([("cpu", "1000"), ("gpu", "10")]);
        let scarcity = resource_scarcity(&capacity, "cpu");

        assert_eq!(scarcity["cpu"], 1.0);
        assert_eq!(scarcity["gpu"], 100.0);
    }

    #[test]
    fn scarcity_is_empty_without_baseline_capacity() {
        let capacity = ComputeResources::from_pairs([("gpu", "10")]);
        assert!(resource_scarcity(&capacity, "cpu").is_empty());
        assert!(resource_scarcity(&ComputeResources::new(), "cpu").is_empty());
    }

    #[test]
    fn idle_queue_gets_minimum_priority() {
        let queues = vec![queue("idle", 2.0)];
        let capacity = ComputeResources::from_pairs([("cpu", "100")]);
        let scarcity = resource_scarcity(&capacity, "cpu");

        let priorities =
            calculate_queue_priority(&queues, &BTreeMap::new(), &capacity, &scarcity);
        assert_eq!(priorities["idle"].priority, 2.0 * MIN_PRIORITY);
        assert!(priorities["idle"].current_usage.is_empty());
    }

    #[test]
    fn heavy_usage_raises_priority() {
        let queues = vec![queue("busy", 1.0), queue("idle", 1.0)];
        let capacity = ComputeResources::from_pairs([("cpu", "100"), ("memory", "100Gi")]);
        let scarcity = resource_scarcity(&capacity, "cpu");
        let usage = BTreeMap::from([(
            "busy".to_string(),
            ComputeResources::from_pairs([("cpu", "80")]),
        )]);

        let priorities = calculate_queue_priority(&queues, &usage, &capacity, &scarcity);
        assert!(priorities["busy"].priority > priorities["idle"].priority);
        assert_eq!(priorities["idle"].priority, MIN_PRIORITY);
        assert!((priorities["busy"].priority - 0.8).abs() < 1e-9);
    }

    #[test]
    fn priority_is_deterministic_over_a_snapshot() {
        let queues = vec![queue("a", 1.5), queue("b", 1.0)];
        let capacity = ComputeResources::from_pairs([("cpu", "100"), ("gpu", "4")]);
        let scarcity = resource_scarcity(&capacity, "cpu");
        let usage = BTreeMap::from([
            ("a".to_string(), ComputeResources::from_pairs([("gpu", "2")])),
            ("b".to_string(), ComputeResources::from_pairs([("cpu", "10")])),
        ]);

        let first = calculate_queue_priority(&queues, &usage, &capacity, &scarcity);
        let second = calculate_queue_priority(&queues, &usage, &capacity, &scarcity);
        assert_eq!(first, second);
    }
}

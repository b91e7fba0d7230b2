//! Per-queue scheduling limits
//!
//! Combines the global per-call scheduling limit, the global steady-state
//! resource cap, any per-queue fraction overrides, and the resources a queue
//! already holds into the budget one lease call may grant it. A resource
//! missing from every limit map is unconstrained.

use std::collections::BTreeMap;

use tracing::debug;

use armada_core::{ComputeResources, ComputeResourcesFloat, Queue};

/// Mutable share state for one queue, alive for a single lease call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSchedulingInfo {
    /// Budget left for this queue in this call; never negative, decremented
    /// only when a lease is successfully recorded.
    pub remaining_scheduling_limit: ComputeResourcesFloat,
    /// The queue's proportional slice of the request.
    pub scheduling_share: ComputeResourcesFloat,
    /// The slice still open, shrinking with each lease and growing with
    /// redistributed remainder.
    pub adjusted_share: ComputeResourcesFloat,
}

impl QueueSchedulingInfo {
    pub fn new(remaining_scheduling_limit: ComputeResourcesFloat) -> Self {
        Self {
            remaining_scheduling_limit,
            scheduling_share: ComputeResourcesFloat::new(),
            adjusted_share: ComputeResourcesFloat::new(),
        }
    }

    /// Install the sliced share for this call.
    pub fn update_share(&mut self, share: ComputeResourcesFloat) {
        self.scheduling_share = share.clone();
        self.adjusted_share = share;
    }

    /// Account a successful lease against the share and the limit.
    pub fn subtract_leased(&mut self, amount: &ComputeResourcesFloat) {
        self.adjusted_share.sub(amount);
        self.adjusted_share.limit_to_zero();
        self.remaining_scheduling_limit.sub(amount);
        self.remaining_scheduling_limit.limit_to_zero();
    }
}

/// Compute each queue's remaining scheduling limit:
///
/// 1. the steady-state cap is the global `resource_limit_per_queue`, with any
///    per-queue fraction override replacing the global entry (in either
///    direction);
/// 2. headroom is the cap minus the queue's current allocation, clamped at
///    zero;
/// 3. the remaining limit is the element-wise minimum of headroom and the
///    per-call `scheduling_limit_per_queue`, resources missing from a map
///    being unconstrained there.
pub fn calculate_queue_scheduling_limits(
    active_queues: &[Queue],
    scheduling_limit_per_queue: &ComputeResourcesFloat,
    resource_limit_per_queue: &ComputeResourcesFloat,
    total_capacity: &ComputeResources,
    current_queue_allocation: &BTreeMap<String, ComputeResources>,
) -> BTreeMap<String, QueueSchedulingInfo> {
    let capacity = total_capacity.as_float();
    let mut scheduling_info = BTreeMap::new();

    for queue in active_queues {
        let mut headroom = resource_limit_per_queue.clone();
        for (resource, fraction) in &queue.resource_limits {
            headroom
                .0
                .insert(resource.clone(), capacity.get(resource) * fraction);
        }
        if let Some(allocation) = current_queue_allocation.get(&queue.name) {
            // Only capped resources consume headroom; the rest stay
            // unconstrained.
            let allocated = allocation.as_float();
            for (resource, value) in headroom.0.iter_mut() {
                *value -= allocated.get(resource);
            }
            headroom.limit_to_zero();
        }

        // Element-wise min of headroom and the per-call limit over the union
        // of their keys.
        let mut remaining = headroom.limit_to(scheduling_limit_per_queue);
        for (resource, limit) in &scheduling_limit_per_queue.0 {
            remaining.0.entry(resource.clone()).or_insert(*limit);
        }

        debug!(
            queue = %queue.name,
            limit = ?remaining,
            "computed remaining scheduling limit"
        );
        scheduling_info.insert(queue.name.clone(), QueueSchedulingInfo::new(remaining));
    }

    scheduling_info
}

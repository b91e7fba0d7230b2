//! Cluster usage snapshot
//!
//! Worker clusters periodically report their capacity and the resources each
//! queue currently holds on them. The scheduler aggregates these reports
//! into cluster-wide capacity and per-queue usage, which feed the priority
//! model. Reports are eventually consistent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resources::ComputeResources;

/// Resources one queue currently holds inside a single cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueReport {
    pub name: String,
    pub resources: ComputeResources,
}

/// One worker cluster's periodic usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterUsageReport {
    pub cluster_id: String,
    pub report_time: DateTime<Utc>,
    #[serde(default)]
    pub queues: Vec<QueueReport>,
    pub cluster_capacity: ComputeResources,
    pub cluster_available_capacity: ComputeResources,
}

/// Cluster-wide capacity aggregate across all reporting clusters.
pub fn sum_capacity(reports: &[ClusterUsageReport]) -> ComputeResources {
    let mut total = ComputeResources::new();
    for report in reports {
        total.add(&report.cluster_capacity);
    }
    total
}

/// Per-queue usage aggregated across all reporting clusters.
pub fn aggregate_queue_usage(reports: &[ClusterUsageReport]) -> BTreeMap<String, ComputeResources> {
    let mut usage: BTreeMap<String, ComputeResources> = BTreeMap::new();
    for report in reports {
        for queue in &report.queues {
            usage
                .entry(queue.name.clone())
                .or_default()
                .add(&queue.resources);
        }
    }
    usage
}

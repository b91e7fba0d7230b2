//! Usage Snapshot Port
//!
//! Source of the per-cluster usage reports the priority model runs over.
//! Snapshots are eventually consistent; the engine only reads them once per
//! lease call.

use armada_core::ClusterUsageReport;
use async_trait::async_trait;

/// Usage snapshot port
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// The most recent usage report of every active cluster.
    async fn cluster_usage_reports(&self) -> Result<Vec<ClusterUsageReport>, UsageError>;
}

/// Usage snapshot port error
#[derive(thiserror::Error, Debug)]
pub enum UsageError {
    #[error("storage error: {0}")]
    Storage(String),
}

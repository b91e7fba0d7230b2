//! Domain Core - Pure Business Logic
//!
//! This crate contains the domain entities and resource arithmetic of the
//! fair-share scheduler. It has NO dependencies on ports, the lease engine,
//! or any infrastructure.

pub mod error;
pub mod job;
pub mod lease;
pub mod queue;
pub mod resources;
pub mod usage;

pub use crate::error::{DomainError, Result};
pub use crate::job::{Container, Job, JobId, PodSpec, ResourceRequirements};
pub use crate::lease::{LeaseRequest, NodeLabeling};
pub use crate::queue::Queue;
pub use crate::resources::{ComputeResources, ComputeResourcesFloat, Quantity, QuantityParseError};
pub use crate::usage::{aggregate_queue_usage, sum_capacity, ClusterUsageReport, QueueReport};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;

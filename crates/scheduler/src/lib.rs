//! Fair-share lease engine
//!
//! The central scheduler's leasing core. Worker clusters call in with their
//! spare capacity; this crate decides which pending jobs they take home.
//!
//! Architecture:
//! - Priority model: effective queue priority from historical usage,
//!   priority factors and resource scarcity
//! - Limit calculator: per-queue budgets from global and custom caps
//! - Lease engine: proportional slicing, iterative queue draining and
//!   remainder redistribution against the repository ports
//!
//! Everything mutable lives inside a single lease call; the repository's
//! `try_lease_jobs` is the only atomicity boundary between concurrent calls.

pub mod config;
pub mod lease;
pub mod limits;
pub mod priority;

pub use config::SchedulingConfig;
pub use lease::{
    lease_jobs, match_requirements, slice_resources, LeaseContext, LeaseError, LeaseOutcome,
    LeaseResult,
};
pub use limits::{calculate_queue_scheduling_limits, QueueSchedulingInfo};
pub use priority::{
    calculate_queue_priority, resource_scarcity, QueuePriorityInfo, ResourceScarcity, MIN_PRIORITY,
};

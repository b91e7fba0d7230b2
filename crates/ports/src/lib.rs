//! Ports - Abstraction Layer
//!
//! This crate defines the ports (traits) the lease engine consumes. The
//! engine never touches storage directly; adapters implement these against
//! whatever backs the queues and the usage reports.

pub mod job_queue_repository;
pub mod usage_repository;

pub use crate::job_queue_repository::{JobQueueError, JobQueueRepository};
pub use crate::usage_repository::{UsageError, UsageRepository};

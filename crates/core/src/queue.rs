//! Queue domain entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// A named bucket of pending jobs owned by a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    /// Positive weight on the queue's effective priority; smaller means
    /// higher priority.
    pub priority_factor: f64,
    /// Optional per-resource caps as fractions of cluster capacity in [0, 1].
    /// Overrides the global per-queue resource limit for listed resources.
    #[serde(default)]
    pub resource_limits: BTreeMap<String, f64>,
}

impl Queue {
    pub fn new(name: impl Into<String>, priority_factor: f64) -> Result<Self> {
        if priority_factor <= 0.0 {
            return Err(DomainError::Validation(format!(
                "queue priority factor must be positive, got {priority_factor}"
            )));
        }
        Ok(Self {
            name: name.into(),
            priority_factor,
            resource_limits: BTreeMap::new(),
        })
    }

    pub fn with_resource_limits<I, K>(mut self, limits: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        for (resource, fraction) in limits {
            let resource = resource.into();
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DomainError::Validation(format!(
                    "resource limit for {resource} must be a fraction in [0, 1], got {fraction}"
                )));
            }
            self.resource_limits.insert(resource, fraction);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_priority_factor() {
        assert!(Queue::new("queue-a", 0.0).is_err());
        assert!(Queue::new("queue-a", -1.0).is_err());
        assert!(Queue::new("queue-a", 1.0).is_ok());
    }

    #[test]
    fn rejects_resource_limit_fractions_outside_unit_interval() {
        let queue = Queue::new("queue-a", 1.0).unwrap();
        assert!(queue.clone().with_resource_limits([("cpu", 1.5)]).is_err());
        assert!(queue.clone().with_resource_limits([("cpu", -0.1)]).is_err());
        let queue = queue.with_resource_limits([("cpu", 0.3)]).unwrap();
        assert_eq!(queue.resource_limits.get("cpu"), Some(&0.3));
    }
}

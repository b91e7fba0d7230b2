//! Lease request model
//!
//! A worker cluster reports its spare capacity and the label sets of its
//! node groups; the scheduler answers with a set of leased jobs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::resources::ComputeResources;

/// The labels carried by one group of nodes inside a worker cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLabeling {
    pub labels: BTreeMap<String, String>,
}

impl NodeLabeling {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// One worker cluster's capacity report, the input of a lease call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaseRequest {
    pub cluster_id: String,
    /// Resources the cluster can take on right now.
    pub resources: ComputeResources,
    /// Label sets of the cluster's node groups, used to match jobs'
    /// required node labels.
    #[serde(default)]
    pub available_labels: Vec<NodeLabeling>,
    /// Smallest job worth leasing to this cluster; empty means any size.
    #[serde(default)]
    pub minimum_job_size: ComputeResources,
}

impl LeaseRequest {
    /// Reject malformed requests before any scheduling work starts.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_id.is_empty() {
            return Err(DomainError::Validation(
                "lease request is missing a cluster id".to_string(),
            ));
        }
        if self.resources.has_negative() {
            return Err(DomainError::Validation(format!(
                "lease request from {} reports negative capacity",
                self.cluster_id
            )));
        }
        if self.minimum_job_size.has_negative() {
            return Err(DomainError::Validation(format!(
                "lease request from {} has a negative minimum job size",
                self.cluster_id
            )));
        }
        for labeling in &self.available_labels {
            if labeling.labels.keys().any(|key| key.is_empty()) {
                return Err(DomainError::Validation(format!(
                    "lease request from {} advertises a label with an empty key",
                    self.cluster_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Quantity;

    fn request() -> LeaseRequest {
        LeaseRequest {
            cluster_id: "cluster-1".to_string(),
            resources: ComputeResources::from_pairs([("cpu", "10"), ("memory", "1Gi")]),
            available_labels: vec![],
            minimum_job_size: ComputeResources::new(),
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn rejects_missing_cluster_id() {
        let mut bad = request();
        bad.cluster_id.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_negative_capacity() {
        let mut bad = request();
        bad.resources.insert("cpu", Quantity::from_millis(-1));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_empty_label_key() {
        let mut bad = request();
        bad.available_labels = vec![NodeLabeling::from_pairs([("", "eu")])];
        assert!(bad.validate().is_err());
    }
}

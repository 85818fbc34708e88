//! Node Metadata - provider-neutral view of a compute instance

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Normalized node status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Running,
    Suspended,
    Terminated,
    Error,
    Unrecognized,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Pending => write!(f, "pending"),
            NodeStatus::Running => write!(f, "running"),
            NodeStatus::Suspended => write!(f, "suspended"),
            NodeStatus::Terminated => write!(f, "terminated"),
            NodeStatus::Error => write!(f, "error"),
            NodeStatus::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

impl std::str::FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(NodeStatus::Pending),
            "running" => Ok(NodeStatus::Running),
            "suspended" => Ok(NodeStatus::Suspended),
            "terminated" => Ok(NodeStatus::Terminated),
            "error" => Ok(NodeStatus::Error),
            "unrecognized" => Ok(NodeStatus::Unrecognized),
            other => Err(format!("unknown node status: {}", other)),
        }
    }
}

/// Snapshot of the provider-native record a node was derived from.
///
/// Diagnostics only; never part of node equality.
pub type BackendRecord = Arc<serde_json::Value>;

/// Provider-neutral description of a compute instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Encoded handle (`region/local-id`)
    pub id: String,
    /// Provider id (e.g. `aws-ec2`)
    pub provider: String,
    /// Human readable name, when the provider has one
    pub name: Option<String>,
    pub status: NodeStatus,
    /// Region or zone
    pub location: Option<String>,
    /// Public and private addresses
    pub addresses: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendRecord>,
}

impl NodeMetadata {
    /// `id` is an encoded handle, see [`encode_handle`](crate::domain::handle::encode_handle)
    pub fn new(id: impl Into<String>, provider: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            name: None,
            status,
            location: None,
            addresses: BTreeSet::new(),
            backend: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add addresses, skipping empty strings
    pub fn with_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addresses.extend(
            addresses
                .into_iter()
                .map(Into::into)
                .filter(|a: &String| !a.is_empty()),
        );
        self
    }

    /// Attach a serializable snapshot of the native record
    pub fn with_backend<T: Serialize>(mut self, record: &T) -> Self {
        self.backend = serde_json::to_value(record).ok().map(Arc::new);
        self
    }

    pub fn is_running(&self) -> bool {
        self.status == NodeStatus::Running
    }
}

impl PartialEq for NodeMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.provider == other.provider
            && self.name == other.name
            && self.status == other.status
            && self.location == other.location
            && self.addresses == other.addresses
    }
}

impl Eq for NodeMetadata {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::handle::encode_handle;

    fn handle() -> String {
        encode_handle("us-east-1", "i-1")
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(format!("{}", NodeStatus::Running), "running");
        assert_eq!(format!("{}", NodeStatus::Unrecognized), "unrecognized");
        assert_eq!("SUSPENDED".parse::<NodeStatus>(), Ok(NodeStatus::Suspended));
        assert!("hibernating".parse::<NodeStatus>().is_err());
    }

    #[test]
    fn test_equality_ignores_backend() {
        let plain = NodeMetadata::new(handle(), "aws-ec2", NodeStatus::Running)
            .with_addresses(["10.0.0.1", "54.1.2.3"]);
        let with_backend = plain
            .clone()
            .with_backend(&serde_json::json!({ "instanceId": "i-1" }));

        assert!(with_backend.backend.is_some());
        assert_eq!(plain, with_backend);
    }

    #[test]
    fn test_addresses_are_order_irrelevant() {
        let a = NodeMetadata::new(handle(), "aws-ec2", NodeStatus::Running)
            .with_addresses(["10.0.0.1", "54.1.2.3", ""]);
        let b = NodeMetadata::new(handle(), "aws-ec2", NodeStatus::Running)
            .with_addresses(["54.1.2.3", "10.0.0.1"]);

        assert_eq!(a, b);
        assert_eq!(a.addresses.len(), 2);
    }

    #[test]
    fn test_serialized_status_is_lowercase() {
        let node = NodeMetadata::new(handle(), "gogrid", NodeStatus::Suspended);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["status"], "suspended");
        assert_eq!(json["id"], "us-east-1/i-1");
        assert!(json.get("backend").is_none());
    }
}

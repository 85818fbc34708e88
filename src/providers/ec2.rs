//! AWS EC2 Provider
//!
//! In-process EC2 instance client. Instances are keyed by region and
//! instance id; state transitions follow the EC2 instance lifecycle
//! (`pending` → `running` → `stopping`/`stopped` → `terminated`).

use crate::config::SeedNode;
use crate::domain::handle::encode_handle;
use crate::domain::node::{NodeMetadata, NodeStatus};
use crate::domain::ports::ComputeApi;
use crate::error::{Error, RejectionKind, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

pub const PROVIDER_ID: &str = "aws-ec2";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the EC2 client
#[derive(Debug, Clone)]
pub struct Ec2Config {
    /// Regions in scope
    pub regions: Vec<String>,
    /// Instance type recorded for launched instances
    pub default_instance_type: String,
}

impl Default for Ec2Config {
    fn default() -> Self {
        Self {
            regions: vec!["us-east-1".to_string()],
            default_instance_type: "m1.small".to_string(),
        }
    }
}

// =============================================================================
// EC2 Resource Types
// =============================================================================

/// EC2 instance state name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unrecognized(String),
}

impl InstanceState {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::Unrecognized(raw) => raw,
        }
    }

    pub fn to_node_status(&self) -> NodeStatus {
        match self {
            InstanceState::Pending | InstanceState::Stopping | InstanceState::ShuttingDown => {
                NodeStatus::Pending
            }
            InstanceState::Running => NodeStatus::Running,
            InstanceState::Stopped => NodeStatus::Suspended,
            InstanceState::Terminated => NodeStatus::Terminated,
            InstanceState::Unrecognized(_) => NodeStatus::Unrecognized,
        }
    }
}

impl From<String> for InstanceState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            "shutting-down" => InstanceState::ShuttingDown,
            "terminated" => InstanceState::Terminated,
            "stopping" => InstanceState::Stopping,
            "stopped" => InstanceState::Stopped,
            _ => InstanceState::Unrecognized(raw),
        }
    }
}

impl From<InstanceState> for String {
    fn from(state: InstanceState) -> Self {
        state.as_str().to_string()
    }
}

/// Running instance as EC2 describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ec2Instance {
    pub instance_id: String,
    pub region: String,
    pub availability_zone: String,
    pub state: InstanceState,
    pub instance_type: String,
    /// Value of the `Name` tag
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub private_ip_address: Option<String>,
    pub launch_time: DateTime<Utc>,
    /// Memory state was kept on the last stop
    pub hibernated: bool,
}

/// Normalize an EC2 instance
pub fn instance_to_node_metadata(instance: &Ec2Instance) -> NodeMetadata {
    let mut node = NodeMetadata::new(
        encode_handle(&instance.region, &instance.instance_id),
        PROVIDER_ID,
        instance.state.to_node_status(),
    )
    .with_location(instance.availability_zone.as_str())
    .with_addresses(
        instance
            .ip_address
            .iter()
            .chain(instance.private_ip_address.iter())
            .cloned(),
    )
    .with_backend(instance);

    if let Some(name) = &instance.name {
        node = node.with_name(name.as_str());
    }
    node
}

// =============================================================================
// EC2 Client
// =============================================================================

type InstanceKey = (String, String);

/// EC2 instance client
pub struct Ec2Client {
    config: Ec2Config,
    /// Instances by (region, instance id), in launch order
    instances: RwLock<IndexMap<InstanceKey, Ec2Instance>>,
}

impl Ec2Client {
    /// Create a new EC2 client
    pub fn new(config: Ec2Config) -> Self {
        Self {
            config,
            instances: RwLock::new(IndexMap::new()),
        }
    }

    /// Register an instance from configuration
    pub async fn seed(&self, node: &SeedNode) -> Result<()> {
        self.ensure_region(&node.region, "seed")?;

        let instance = Ec2Instance {
            instance_id: node.id.clone(),
            region: node.region.clone(),
            availability_zone: format!("{}a", node.region),
            state: InstanceState::from(node.state.clone()),
            instance_type: self.config.default_instance_type.clone(),
            name: node.name.clone(),
            ip_address: node.addresses.first().cloned(),
            private_ip_address: node.addresses.get(1).cloned(),
            launch_time: Utc::now(),
            hibernated: false,
        };

        self.instances
            .write()
            .await
            .insert((node.region.clone(), node.id.clone()), instance);
        Ok(())
    }

    fn ensure_region(&self, region: &str, operation: &str) -> Result<()> {
        if self.config.regions.iter().any(|r| r == region) {
            Ok(())
        } else {
            Err(Error::rejected(
                PROVIDER_ID,
                operation,
                RejectionKind::NotFound,
                format!("region {} is not in scope", region),
            ))
        }
    }

    /// Apply `f` to an existing, non-terminated instance
    async fn transition<F>(&self, operation: &str, region: &str, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Ec2Instance) -> Result<()>,
    {
        self.ensure_region(region, operation)?;

        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(&(region.to_string(), id.to_string()))
            .ok_or_else(|| {
                Error::rejected(
                    PROVIDER_ID,
                    operation,
                    RejectionKind::NotFound,
                    format!("InvalidInstanceID.NotFound: {}", id),
                )
            })?;

        if matches!(
            instance.state,
            InstanceState::Terminated | InstanceState::ShuttingDown
        ) {
            return Err(incorrect_state(operation, instance));
        }

        f(&mut *instance)?;
        info!(
            "EC2 {} {} in {}: now {}",
            operation,
            id,
            region,
            instance.state.as_str()
        );
        Ok(())
    }
}

fn incorrect_state(operation: &str, instance: &Ec2Instance) -> Error {
    Error::rejected(
        PROVIDER_ID,
        operation,
        RejectionKind::InvalidState,
        format!(
            "IncorrectInstanceState: {} is {}",
            instance.instance_id,
            instance.state.as_str()
        ),
    )
}

#[async_trait]
impl ComputeApi for Ec2Client {
    type Record = Ec2Instance;

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn regions(&self) -> Vec<String> {
        self.config.regions.clone()
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<Ec2Instance>> {
        self.ensure_region(region, "describe_instances")?;

        let instances = self.instances.read().await;
        Ok(instances
            .values()
            .filter(|i| i.region == region)
            .cloned()
            .collect())
    }

    async fn describe_instance(&self, region: &str, id: &str) -> Result<Option<Ec2Instance>> {
        self.ensure_region(region, "describe_instances")?;

        let instances = self.instances.read().await;
        Ok(instances
            .get(&(region.to_string(), id.to_string()))
            .cloned())
    }

    async fn stop_instance(&self, region: &str, id: &str, preserve_state: bool) -> Result<()> {
        self.transition("stop_instances", region, id, |instance| {
            instance.state = InstanceState::Stopped;
            instance.hibernated = preserve_state;
            instance.ip_address = None;
            Ok(())
        })
        .await
    }

    async fn start_instance(&self, region: &str, id: &str) -> Result<()> {
        self.transition("start_instances", region, id, |instance| {
            if instance.state == InstanceState::Stopping {
                return Err(incorrect_state("start_instances", instance));
            }
            instance.state = InstanceState::Running;
            instance.hibernated = false;
            Ok(())
        })
        .await
    }

    async fn reboot_instance(&self, region: &str, id: &str) -> Result<()> {
        self.transition("reboot_instances", region, id, |instance| {
            if instance.state != InstanceState::Running {
                return Err(incorrect_state("reboot_instances", instance));
            }
            Ok(())
        })
        .await
    }

    async fn terminate_instance(&self, region: &str, id: &str) -> Result<()> {
        self.transition("terminate_instances", region, id, |instance| {
            instance.state = InstanceState::Terminated;
            instance.ip_address = None;
            instance.private_ip_address = None;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn seed(region: &str, id: &str, state: &str) -> SeedNode {
        SeedNode {
            region: region.into(),
            id: id.into(),
            name: Some(format!("node-{}", id)),
            state: state.into(),
            addresses: vec!["54.1.2.3".into(), "10.0.0.1".into()],
        }
    }

    async fn client() -> Ec2Client {
        let client = Ec2Client::new(Ec2Config {
            regions: vec!["us-east-1".into(), "eu-west-1".into()],
            ..Default::default()
        });
        client.seed(&seed("us-east-1", "i-1", "running")).await.unwrap();
        client.seed(&seed("us-east-1", "i-2", "stopped")).await.unwrap();
        client.seed(&seed("eu-west-1", "i-3", "terminated")).await.unwrap();
        client
    }

    #[test]
    fn test_state_mapping() {
        let cases = [
            ("pending", NodeStatus::Pending),
            ("running", NodeStatus::Running),
            ("shutting-down", NodeStatus::Pending),
            ("terminated", NodeStatus::Terminated),
            ("stopping", NodeStatus::Pending),
            ("stopped", NodeStatus::Suspended),
            ("hibernating", NodeStatus::Unrecognized),
            ("", NodeStatus::Unrecognized),
        ];
        for (raw, expected) in cases {
            assert_eq!(InstanceState::from(raw.to_string()).to_node_status(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_normalization() {
        let instance = Ec2Instance {
            instance_id: "i-0abc123".into(),
            region: "us-east-1".into(),
            availability_zone: "us-east-1a".into(),
            state: InstanceState::Running,
            instance_type: "m1.small".into(),
            name: Some("web".into()),
            ip_address: Some("54.1.2.3".into()),
            private_ip_address: Some("10.0.0.1".into()),
            launch_time: Utc::now(),
            hibernated: false,
        };

        let node = instance_to_node_metadata(&instance);
        assert_eq!(node.id, "us-east-1/i-0abc123");
        assert_eq!(node.provider, "aws-ec2");
        assert_eq!(node.status, NodeStatus::Running);
        assert_eq!(node.location.as_deref(), Some("us-east-1a"));
        assert_eq!(node.name.as_deref(), Some("web"));
        assert_eq!(node.addresses.len(), 2);
        assert_eq!(node.backend.as_ref().unwrap()["instanceId"], "i-0abc123");
        assert_eq!(node.backend.as_ref().unwrap()["state"], "running");
    }

    #[tokio::test]
    async fn test_list_is_per_region() {
        let client = client().await;
        let east = client.list_instances("us-east-1").await.unwrap();
        assert_eq!(east.len(), 2);
        assert_eq!(east[0].instance_id, "i-1");
        assert_eq!(client.list_instances("eu-west-1").await.unwrap().len(), 1);

        assert_matches!(
            client.list_instances("ap-south-1").await,
            Err(Error::ProviderRejected { .. })
        );
    }

    #[tokio::test]
    async fn test_stop_records_hibernation() {
        let client = client().await;
        client.stop_instance("us-east-1", "i-1", true).await.unwrap();

        let instance = client.describe_instance("us-east-1", "i-1").await.unwrap().unwrap();
        assert_eq!(instance.state, InstanceState::Stopped);
        assert!(instance.hibernated);
        assert!(instance.ip_address.is_none());

        client.start_instance("us-east-1", "i-1").await.unwrap();
        let instance = client.describe_instance("us-east-1", "i-1").await.unwrap().unwrap();
        assert_eq!(instance.state, InstanceState::Running);
        assert!(!instance.hibernated);
    }

    #[tokio::test]
    async fn test_unknown_instance_not_found() {
        let client = client().await;
        assert_matches!(
            client.stop_instance("us-east-1", "i-404", true).await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::NotFound,
                message,
                ..
            }) if message.contains("InvalidInstanceID.NotFound")
        );
    }

    #[tokio::test]
    async fn test_terminated_instance_rejects_actions() {
        let client = client().await;
        assert_matches!(
            client.start_instance("eu-west-1", "i-3").await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::InvalidState,
                ..
            })
        );
    }

    #[tokio::test]
    async fn test_reboot_requires_running() {
        let client = client().await;
        client.reboot_instance("us-east-1", "i-1").await.unwrap();
        assert_matches!(
            client.reboot_instance("us-east-1", "i-2").await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::InvalidState,
                ..
            })
        );
    }

    #[tokio::test]
    async fn test_terminated_instances_stay_listed() {
        let client = client().await;
        client.terminate_instance("us-east-1", "i-1").await.unwrap();

        let instance = client.describe_instance("us-east-1", "i-1").await.unwrap().unwrap();
        assert_eq!(instance.state, InstanceState::Terminated);
        assert_eq!(client.list_instances("us-east-1").await.unwrap().len(), 2);
    }
}

//! GoGrid Provider
//!
//! In-process GoGrid server client. GoGrid has no notion of suspending with
//! memory state, so every stop is a plain power-off and the
//! `preserve_state` flag is ignored.

use crate::config::SeedNode;
use crate::domain::handle::encode_handle;
use crate::domain::node::{NodeMetadata, NodeStatus};
use crate::domain::ports::ComputeApi;
use crate::error::{Error, RejectionKind, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const PROVIDER_ID: &str = "gogrid";

/// Configuration for the GoGrid client
#[derive(Debug, Clone)]
pub struct GoGridConfig {
    /// Datacenters in scope
    pub datacenters: Vec<String>,
    /// RAM size recorded for servers
    pub default_ram: String,
}

impl Default for GoGridConfig {
    fn default() -> Self {
        Self {
            datacenters: vec!["US-West-1".to_string()],
            default_ram: "1GB".to_string(),
        }
    }
}

/// GoGrid server state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerState {
    On,
    Off,
    Starting,
    Saving,
    Restarting,
    Restoring,
    Unrecognized(String),
}

impl ServerState {
    pub fn as_str(&self) -> &str {
        match self {
            ServerState::On => "On",
            ServerState::Off => "Off",
            ServerState::Starting => "Starting",
            ServerState::Saving => "Saving",
            ServerState::Restarting => "Restarting",
            ServerState::Restoring => "Restoring",
            ServerState::Unrecognized(raw) => raw,
        }
    }

    pub fn to_node_status(&self) -> NodeStatus {
        match self {
            ServerState::On => NodeStatus::Running,
            ServerState::Off => NodeStatus::Suspended,
            ServerState::Starting
            | ServerState::Saving
            | ServerState::Restarting
            | ServerState::Restoring => NodeStatus::Pending,
            ServerState::Unrecognized(_) => NodeStatus::Unrecognized,
        }
    }
}

impl From<String> for ServerState {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "on" => ServerState::On,
            "off" => ServerState::Off,
            "starting" => ServerState::Starting,
            "saving" => ServerState::Saving,
            "restarting" => ServerState::Restarting,
            "restoring" => ServerState::Restoring,
            _ => ServerState::Unrecognized(raw),
        }
    }
}

impl From<ServerState> for String {
    fn from(state: ServerState) -> Self {
        state.as_str().to_string()
    }
}

/// Server as returned by `grid/server/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoGridServer {
    pub id: String,
    pub datacenter: String,
    pub name: String,
    pub state: ServerState,
    pub ip: Option<String>,
    pub ram: String,
    pub is_sandbox: bool,
}

/// Normalize a GoGrid server
pub fn server_to_node_metadata(server: &GoGridServer) -> NodeMetadata {
    NodeMetadata::new(
        encode_handle(&server.datacenter, &server.id),
        PROVIDER_ID,
        server.state.to_node_status(),
    )
    .with_name(server.name.as_str())
    .with_location(server.datacenter.as_str())
    .with_addresses(server.ip.iter().cloned())
    .with_backend(server)
}

type ServerKey = (String, String);

/// GoGrid server client
pub struct GoGridClient {
    config: GoGridConfig,
    servers: RwLock<IndexMap<ServerKey, GoGridServer>>,
}

impl GoGridClient {
    pub fn new(config: GoGridConfig) -> Self {
        Self {
            config,
            servers: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a server from configuration
    pub async fn seed(&self, node: &SeedNode) -> Result<()> {
        self.ensure_datacenter(&node.region, "seed")?;

        let server = GoGridServer {
            id: node.id.clone(),
            datacenter: node.region.clone(),
            name: node.name.clone().unwrap_or_else(|| node.id.clone()),
            state: ServerState::from(node.state.clone()),
            ip: node.addresses.first().cloned(),
            ram: self.config.default_ram.clone(),
            is_sandbox: false,
        };

        self.servers
            .write()
            .await
            .insert((node.region.clone(), node.id.clone()), server);
        Ok(())
    }

    fn ensure_datacenter(&self, datacenter: &str, operation: &str) -> Result<()> {
        if self.config.datacenters.iter().any(|d| d == datacenter) {
            Ok(())
        } else {
            Err(Error::rejected(
                PROVIDER_ID,
                operation,
                RejectionKind::NotFound,
                format!("datacenter {} is not in scope", datacenter),
            ))
        }
    }

    /// `grid/server/power` with the given option
    async fn power(&self, datacenter: &str, id: &str, power: &str) -> Result<()> {
        let operation = format!("power_{}", power);
        self.ensure_datacenter(datacenter, &operation)?;

        let mut servers = self.servers.write().await;
        let server = servers
            .get_mut(&(datacenter.to_string(), id.to_string()))
            .ok_or_else(|| {
                Error::rejected(
                    PROVIDER_ID,
                    operation.as_str(),
                    RejectionKind::NotFound,
                    format!("server {} does not exist", id),
                )
            })?;

        let next = match (power, &server.state) {
            ("stop", ServerState::On) => ServerState::Off,
            ("start", ServerState::Off) => ServerState::On,
            ("restart", ServerState::On) => ServerState::On,
            _ => {
                return Err(Error::rejected(
                    PROVIDER_ID,
                    operation.as_str(),
                    RejectionKind::InvalidState,
                    format!("cannot {} server {} while {}", power, id, server.state.as_str()),
                ))
            }
        };

        server.state = next;
        info!("GoGrid server {} powered {}: now {}", id, power, server.state.as_str());
        Ok(())
    }
}

#[async_trait]
impl ComputeApi for GoGridClient {
    type Record = GoGridServer;

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn regions(&self) -> Vec<String> {
        self.config.datacenters.clone()
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<GoGridServer>> {
        self.ensure_datacenter(region, "server_list")?;

        let servers = self.servers.read().await;
        Ok(servers
            .values()
            .filter(|s| s.datacenter == region)
            .cloned()
            .collect())
    }

    async fn describe_instance(&self, region: &str, id: &str) -> Result<Option<GoGridServer>> {
        self.ensure_datacenter(region, "server_get")?;

        let servers = self.servers.read().await;
        Ok(servers.get(&(region.to_string(), id.to_string())).cloned())
    }

    async fn stop_instance(&self, region: &str, id: &str, preserve_state: bool) -> Result<()> {
        if preserve_state {
            debug!("GoGrid cannot preserve state, powering off {}", id);
        }
        self.power(region, id, "stop").await
    }

    async fn start_instance(&self, region: &str, id: &str) -> Result<()> {
        self.power(region, id, "start").await
    }

    async fn reboot_instance(&self, region: &str, id: &str) -> Result<()> {
        self.power(region, id, "restart").await
    }

    async fn terminate_instance(&self, region: &str, id: &str) -> Result<()> {
        self.ensure_datacenter(region, "server_delete")?;

        let mut servers = self.servers.write().await;
        match servers.shift_remove(&(region.to_string(), id.to_string())) {
            Some(server) => {
                info!("GoGrid server {} ({}) deleted", server.id, server.name);
                Ok(())
            }
            None => Err(Error::rejected(
                PROVIDER_ID,
                "server_delete",
                RejectionKind::NotFound,
                format!("server {} does not exist", id),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ComputeService;
    use crate::domain::ports::{NodeLifecycleStrategy, SuspendOptions};
    use crate::domain::predicate::NodePredicate;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    async fn client() -> Arc<GoGridClient> {
        let client = GoGridClient::new(GoGridConfig {
            datacenters: vec!["US-West-1".into(), "US-East-1".into()],
            ..Default::default()
        });
        for (dc, id, state) in [
            ("US-West-1", "101", "On"),
            ("US-West-1", "102", "Off"),
            ("US-East-1", "201", "On"),
            ("US-West-1", "103", "Migrating"),
        ] {
            client
                .seed(&SeedNode {
                    region: dc.into(),
                    id: id.into(),
                    name: Some(format!("srv-{}", id)),
                    state: state.into(),
                    addresses: vec![format!("173.204.0.{}", &id[1..])],
                })
                .await
                .unwrap();
        }
        Arc::new(client)
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(ServerState::from("On".to_string()).to_node_status(), NodeStatus::Running);
        assert_eq!(ServerState::from("Off".to_string()).to_node_status(), NodeStatus::Suspended);
        assert_eq!(ServerState::from("Saving".to_string()).to_node_status(), NodeStatus::Pending);
        assert_eq!(
            ServerState::from("Migrating".to_string()),
            ServerState::Unrecognized("Migrating".into())
        );
        assert_eq!(
            ServerState::from("Migrating".to_string()).to_node_status(),
            NodeStatus::Unrecognized
        );
    }

    #[tokio::test]
    async fn test_list_nodes_strategy() {
        let compute = ComputeService::new(
            client().await,
            server_to_node_metadata,
            SuspendOptions::default(),
        );

        let all = compute.list_nodes().await.unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["US-West-1/101", "US-West-1/102", "US-West-1/103", "US-East-1/201"]);
        assert_eq!(all[2].status, NodeStatus::Unrecognized);
        assert_eq!(all[0].name.as_deref(), Some("srv-101"));

        let west = NodePredicate::running().and(NodePredicate::in_location("US-West-1"));
        let running_west = compute.list_nodes_matching(&west).await.unwrap();
        assert_eq!(running_west.len(), 1);
        assert_eq!(running_west[0].id, "US-West-1/101");
    }

    #[tokio::test]
    async fn test_suspend_falls_back_to_power_off() {
        let compute = ComputeService::new(
            client().await,
            server_to_node_metadata,
            SuspendOptions::default(),
        );

        let node = compute.suspend_node("US-West-1/101").await.unwrap();
        assert_eq!(node.status, NodeStatus::Suspended);

        assert_matches!(
            compute.suspend_node("US-West-1/101").await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::InvalidState,
                ..
            })
        );
    }

    #[tokio::test]
    async fn test_destroy_removes_server() {
        let client = client().await;
        client.terminate_instance("US-West-1", "102").await.unwrap();
        assert!(client.describe_instance("US-West-1", "102").await.unwrap().is_none());
        assert_matches!(
            client.terminate_instance("US-West-1", "102").await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::NotFound,
                ..
            })
        );
    }
}

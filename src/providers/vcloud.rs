//! VMware vCloud Provider
//!
//! In-process vCloud VM client scoped to a set of VDCs. Power operations
//! complete synchronously here; the vCloud task protocol is not modelled.
//!
//! Suspend maps to "undeploy and save state" when state preservation is
//! requested and to a plain power-off otherwise. The vApp-level suspend
//! action is not used: it keeps the VM deployed and holding its resources,
//! while undeploying with saved state releases them and resumes to the same
//! memory image.

use crate::config::SeedNode;
use crate::domain::handle::encode_handle;
use crate::domain::node::{NodeMetadata, NodeStatus};
use crate::domain::ports::ComputeApi;
use crate::error::{Error, RejectionKind, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

pub const PROVIDER_ID: &str = "vcloud";

/// Configuration for the vCloud client
#[derive(Debug, Clone)]
pub struct VcloudConfig {
    /// Organization the session belongs to
    pub org: String,
    /// VDCs in scope
    pub vdcs: Vec<String>,
}

impl Default for VcloudConfig {
    fn default() -> Self {
        Self {
            org: "default".to_string(),
            vdcs: vec!["vdc-default".to_string()],
        }
    }
}

/// vCloud entity status, carried as its numeric code on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum VappStatus {
    Error,
    Unresolved,
    Resolved,
    Suspended,
    On,
    Unknown,
    Off,
    Inconsistent,
    Unrecognized(i32),
}

impl VappStatus {
    pub fn code(&self) -> i32 {
        match self {
            VappStatus::Error => -1,
            VappStatus::Unresolved => 0,
            VappStatus::Resolved => 1,
            VappStatus::Suspended => 3,
            VappStatus::On => 4,
            VappStatus::Unknown => 6,
            VappStatus::Off => 8,
            VappStatus::Inconsistent => 9,
            VappStatus::Unrecognized(code) => *code,
        }
    }

    /// Parse a status name (`on`, `suspended`, ...) or numeric code.
    ///
    /// Any integer is accepted and unknown codes are kept as
    /// `Unrecognized`. An unknown name has no code to keep, so it yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(code) = raw.trim().parse::<i32>() {
            return Some(VappStatus::from(code));
        }
        let status = match raw.trim().to_ascii_lowercase().as_str() {
            "error" => VappStatus::Error,
            "unresolved" => VappStatus::Unresolved,
            "resolved" => VappStatus::Resolved,
            "suspended" => VappStatus::Suspended,
            "on" | "powered_on" => VappStatus::On,
            "unknown" => VappStatus::Unknown,
            "off" | "powered_off" => VappStatus::Off,
            "inconsistent" => VappStatus::Inconsistent,
            _ => return None,
        };
        Some(status)
    }

    pub fn to_node_status(&self) -> NodeStatus {
        match self {
            VappStatus::Error => NodeStatus::Error,
            VappStatus::Unresolved | VappStatus::Resolved | VappStatus::Inconsistent => {
                NodeStatus::Pending
            }
            VappStatus::On => NodeStatus::Running,
            VappStatus::Suspended | VappStatus::Off => NodeStatus::Suspended,
            VappStatus::Unknown | VappStatus::Unrecognized(_) => NodeStatus::Unrecognized,
        }
    }
}

impl From<i32> for VappStatus {
    fn from(code: i32) -> Self {
        match code {
            -1 => VappStatus::Error,
            0 => VappStatus::Unresolved,
            1 => VappStatus::Resolved,
            3 => VappStatus::Suspended,
            4 => VappStatus::On,
            6 => VappStatus::Unknown,
            8 => VappStatus::Off,
            9 => VappStatus::Inconsistent,
            other => VappStatus::Unrecognized(other),
        }
    }
}

impl From<VappStatus> for i32 {
    fn from(status: VappStatus) -> Self {
        status.code()
    }
}

/// Network connection of a VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConnection {
    pub network: String,
    pub ip_address: Option<String>,
    pub is_connected: bool,
}

/// Virtual machine inside a VDC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcloudVm {
    pub id: String,
    pub vdc: String,
    pub name: String,
    pub status: VappStatus,
    pub deployed: bool,
    pub network_connections: Vec<NetworkConnection>,
}

/// Normalize a vCloud VM
pub fn vm_to_node_metadata(vm: &VcloudVm) -> NodeMetadata {
    NodeMetadata::new(
        encode_handle(&vm.vdc, &vm.id),
        PROVIDER_ID,
        vm.status.to_node_status(),
    )
    .with_name(vm.name.as_str())
    .with_location(vm.vdc.as_str())
    .with_addresses(
        vm.network_connections
            .iter()
            .filter(|c| c.is_connected)
            .filter_map(|c| c.ip_address.clone()),
    )
    .with_backend(vm)
}

type VmKey = (String, String);

/// vCloud VM client
pub struct VcloudClient {
    config: VcloudConfig,
    vms: RwLock<IndexMap<VmKey, VcloudVm>>,
}

impl VcloudClient {
    pub fn new(config: VcloudConfig) -> Self {
        Self {
            config,
            vms: RwLock::new(IndexMap::new()),
        }
    }

    pub fn org(&self) -> &str {
        &self.config.org
    }

    /// Register a VM from configuration
    pub async fn seed(&self, node: &SeedNode) -> Result<()> {
        self.ensure_vdc(&node.region, "seed")?;

        let status = VappStatus::parse(&node.state).ok_or_else(|| {
            Error::Configuration(format!(
                "vm {}: unknown vCloud status {:?}",
                node.id, node.state
            ))
        })?;
        let vm = VcloudVm {
            id: node.id.clone(),
            vdc: node.region.clone(),
            name: node.name.clone().unwrap_or_else(|| node.id.clone()),
            status,
            deployed: status == VappStatus::On,
            network_connections: node
                .addresses
                .iter()
                .enumerate()
                .map(|(i, ip)| NetworkConnection {
                    network: format!("network-{}", i),
                    ip_address: Some(ip.clone()),
                    is_connected: true,
                })
                .collect(),
        };

        self.vms
            .write()
            .await
            .insert((node.region.clone(), node.id.clone()), vm);
        Ok(())
    }

    fn ensure_vdc(&self, vdc: &str, operation: &str) -> Result<()> {
        if self.config.vdcs.iter().any(|v| v == vdc) {
            Ok(())
        } else {
            Err(Error::rejected(
                PROVIDER_ID,
                operation,
                RejectionKind::NotFound,
                format!("vdc {} not found in org {}", vdc, self.config.org),
            ))
        }
    }

    /// Run one VM action. `allowed` lists the statuses the action accepts.
    async fn action(
        &self,
        operation: &str,
        vdc: &str,
        id: &str,
        allowed: &[VappStatus],
        next: VappStatus,
    ) -> Result<()> {
        self.ensure_vdc(vdc, operation)?;

        let mut vms = self.vms.write().await;
        let vm = vms
            .get_mut(&(vdc.to_string(), id.to_string()))
            .ok_or_else(|| {
                Error::rejected(
                    PROVIDER_ID,
                    operation,
                    RejectionKind::NotFound,
                    format!("vm {} not found in {}", id, vdc),
                )
            })?;

        if !allowed.contains(&vm.status) {
            return Err(Error::rejected(
                PROVIDER_ID,
                operation,
                RejectionKind::InvalidState,
                format!("vm {} has status {}", id, vm.status.code()),
            ));
        }

        vm.status = next;
        vm.deployed = next == VappStatus::On;
        info!("vCloud {} on {}/{}: status {}", operation, vdc, id, next.code());
        Ok(())
    }
}

#[async_trait]
impl ComputeApi for VcloudClient {
    type Record = VcloudVm;

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn regions(&self) -> Vec<String> {
        self.config.vdcs.clone()
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<VcloudVm>> {
        self.ensure_vdc(region, "list_vms")?;

        let vms = self.vms.read().await;
        Ok(vms.values().filter(|vm| vm.vdc == region).cloned().collect())
    }

    async fn describe_instance(&self, region: &str, id: &str) -> Result<Option<VcloudVm>> {
        self.ensure_vdc(region, "get_vm")?;

        let vms = self.vms.read().await;
        Ok(vms.get(&(region.to_string(), id.to_string())).cloned())
    }

    async fn stop_instance(&self, region: &str, id: &str, preserve_state: bool) -> Result<()> {
        if preserve_state {
            self.action(
                "undeploy_and_save_state",
                region,
                id,
                &[VappStatus::On],
                VappStatus::Suspended,
            )
            .await
        } else {
            self.action(
                "power_off",
                region,
                id,
                &[VappStatus::On, VappStatus::Suspended],
                VappStatus::Off,
            )
            .await
        }
    }

    async fn start_instance(&self, region: &str, id: &str) -> Result<()> {
        self.action(
            "power_on",
            region,
            id,
            &[VappStatus::Off, VappStatus::Suspended, VappStatus::Resolved],
            VappStatus::On,
        )
        .await
    }

    async fn reboot_instance(&self, region: &str, id: &str) -> Result<()> {
        self.action("reset", region, id, &[VappStatus::On], VappStatus::On)
            .await
    }

    /// Undeploys a powered-on VM, then deletes it
    async fn terminate_instance(&self, region: &str, id: &str) -> Result<()> {
        self.ensure_vdc(region, "delete_vm")?;

        let mut vms = self.vms.write().await;
        match vms.shift_remove(&(region.to_string(), id.to_string())) {
            Some(vm) => {
                info!(
                    "vCloud vm {}/{} deleted (was deployed: {})",
                    region, vm.id, vm.deployed
                );
                Ok(())
            }
            None => Err(Error::rejected(
                PROVIDER_ID,
                "delete_vm",
                RejectionKind::NotFound,
                format!("vm {} not found in {}", id, region),
            )),
        }
    }
}

//! Provider Clients
//!
//! In-process clients for the supported compute providers:
//! - Amazon EC2 (regions)
//! - GoGrid (datacenters)
//! - VMware vCloud (VDCs)
//!
//! Each client implements [`ComputeApi`](crate::domain::ports::ComputeApi)
//! and ships a normalizer; the factory wires both into a
//! [`ComputeService`].

pub mod ec2;
pub mod gogrid;
pub mod metadata;
pub mod vcloud;

pub use metadata::*;

use crate::compute::ComputeService;
use crate::config::ProfileConfig;
use crate::domain::ports::NodeLifecycleStrategyRef;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Supported compute providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "aws-ec2")]
    AwsEc2,
    #[serde(rename = "gogrid")]
    GoGrid,
    #[serde(rename = "vcloud")]
    Vcloud,
}

impl ProviderKind {
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderKind::AwsEc2 => ec2::PROVIDER_ID,
            ProviderKind::GoGrid => gogrid::PROVIDER_ID,
            ProviderKind::Vcloud => vcloud::PROVIDER_ID,
        }
    }

    pub fn metadata(&self) -> ProviderMetadata {
        match self {
            ProviderKind::AwsEc2 => ProviderMetadata::aws_ec2(),
            ProviderKind::GoGrid => ProviderMetadata::gogrid(),
            ProviderKind::Vcloud => ProviderMetadata::vcloud(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_id())
    }
}

/// Factory for creating per-profile lifecycle strategies
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the provider client for a profile, seed its inventory and
    /// wrap it in a compute service
    pub async fn create(profile: &ProfileConfig) -> Result<NodeLifecycleStrategyRef> {
        profile.validate()?;

        let strategy: NodeLifecycleStrategyRef = match profile.provider {
            ProviderKind::AwsEc2 => {
                let client = ec2::Ec2Client::new(ec2::Ec2Config {
                    regions: profile.regions.clone(),
                    ..Default::default()
                });
                for node in &profile.nodes {
                    client.seed(node).await?;
                }
                Arc::new(ComputeService::new(
                    Arc::new(client),
                    ec2::instance_to_node_metadata,
                    profile.suspend,
                ))
            }
            ProviderKind::GoGrid => {
                let client = gogrid::GoGridClient::new(gogrid::GoGridConfig {
                    datacenters: profile.regions.clone(),
                    ..Default::default()
                });
                for node in &profile.nodes {
                    client.seed(node).await?;
                }
                Arc::new(ComputeService::new(
                    Arc::new(client),
                    gogrid::server_to_node_metadata,
                    profile.suspend,
                ))
            }
            ProviderKind::Vcloud => {
                let client = vcloud::VcloudClient::new(vcloud::VcloudConfig {
                    org: profile.name.clone(),
                    vdcs: profile.regions.clone(),
                });
                for node in &profile.nodes {
                    client.seed(node).await?;
                }
                Arc::new(ComputeService::new(
                    Arc::new(client),
                    vcloud::vm_to_node_metadata,
                    profile.suspend,
                ))
            }
        };

        info!(
            "Created {} strategy for profile {} ({} seeded node(s))",
            profile.provider,
            profile.name,
            profile.nodes.len()
        );
        Ok(strategy)
    }
}

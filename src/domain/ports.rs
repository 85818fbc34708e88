//! Domain Ports - Core trait definitions for the compute toolkit
//!
//! These traits define the boundaries between the lifecycle strategies and
//! the provider clients they drive. Provider modules implement
//! [`ComputeApi`] and a [`NodeNormalizer`]; strategies are written once
//! against those traits.

use crate::domain::node::NodeMetadata;
use crate::domain::predicate::NodePredicate;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Provider Collaborator
// =============================================================================

/// Raw compute operations of one provider account.
///
/// Implementations report provider refusals as
/// [`Error::ProviderRejected`](crate::Error::ProviderRejected) and network
/// problems as [`Error::Transport`](crate::Error::Transport).
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Provider-native instance record
    type Record: Send + Sync + 'static;

    /// Provider id (e.g. `aws-ec2`)
    fn provider_id(&self) -> &str;

    /// Regions in scope for this account, in listing order
    fn regions(&self) -> Vec<String>;

    /// List every instance in a region
    async fn list_instances(&self, region: &str) -> Result<Vec<Self::Record>>;

    /// Describe one instance, `None` if it does not exist
    async fn describe_instance(&self, region: &str, id: &str) -> Result<Option<Self::Record>>;

    /// Stop an instance, preserving memory state when asked and supported
    async fn stop_instance(&self, region: &str, id: &str, preserve_state: bool) -> Result<()>;

    async fn start_instance(&self, region: &str, id: &str) -> Result<()>;

    /// Resume a suspended instance
    async fn resume_instance(&self, region: &str, id: &str) -> Result<()> {
        self.start_instance(region, id).await
    }

    async fn reboot_instance(&self, region: &str, id: &str) -> Result<()>;

    async fn terminate_instance(&self, region: &str, id: &str) -> Result<()>;
}

/// Maps a provider-native record to [`NodeMetadata`]. Must be total.
pub trait NodeNormalizer<R>: Send + Sync {
    fn to_node_metadata(&self, record: &R) -> NodeMetadata;
}

impl<R, F> NodeNormalizer<R> for F
where
    F: Fn(&R) -> NodeMetadata + Send + Sync,
{
    fn to_node_metadata(&self, record: &R) -> NodeMetadata {
        self(record)
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options for the suspend strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspendOptions {
    /// Ask the provider to keep memory state (hibernate / save state)
    pub preserve_state: bool,
}

impl Default for SuspendOptions {
    fn default() -> Self {
        Self {
            preserve_state: true,
        }
    }
}

// =============================================================================
// Strategy Family
// =============================================================================

/// Enumerate nodes visible to the account
#[async_trait]
pub trait ListNodesStrategy: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<NodeMetadata>>;

    /// `list_nodes` filtered by `filter`, preserving order
    async fn list_nodes_matching(&self, filter: &NodePredicate) -> Result<Vec<NodeMetadata>> {
        Ok(self
            .list_nodes()
            .await?
            .into_iter()
            .filter(|node| filter.matches(node))
            .collect())
    }
}

/// Fetch the current metadata for a handle
#[async_trait]
pub trait GetNodeMetadataStrategy: Send + Sync {
    /// `None` if the node no longer exists
    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>>;
}

#[async_trait]
pub trait SuspendNodeStrategy: Send + Sync {
    async fn suspend_node(&self, id: &str) -> Result<NodeMetadata>;
}

#[async_trait]
pub trait ResumeNodeStrategy: Send + Sync {
    async fn resume_node(&self, id: &str) -> Result<NodeMetadata>;
}

#[async_trait]
pub trait StartNodeStrategy: Send + Sync {
    async fn start_node(&self, id: &str) -> Result<NodeMetadata>;
}

#[async_trait]
pub trait StopNodeStrategy: Send + Sync {
    async fn stop_node(&self, id: &str) -> Result<NodeMetadata>;
}

#[async_trait]
pub trait RebootNodeStrategy: Send + Sync {
    async fn reboot_node(&self, id: &str) -> Result<NodeMetadata>;
}

#[async_trait]
pub trait DestroyNodeStrategy: Send + Sync {
    async fn destroy_node(&self, id: &str) -> Result<()>;
}

// =============================================================================
// Unified Lifecycle Port
// =============================================================================

/// Every lifecycle operation of one provider profile behind one object.
///
/// Mutating operations share a shape: decode handle, one provider call,
/// re-fetch (except destroy).
#[async_trait]
pub trait NodeLifecycleStrategy: Send + Sync {
    /// Provider id the strategy drives
    fn provider_id(&self) -> &str;

    async fn list_nodes(&self) -> Result<Vec<NodeMetadata>>;

    async fn list_nodes_matching(&self, filter: &NodePredicate) -> Result<Vec<NodeMetadata>>;

    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>>;

    async fn suspend_node(&self, id: &str) -> Result<NodeMetadata>;

    async fn resume_node(&self, id: &str) -> Result<NodeMetadata>;

    async fn start_node(&self, id: &str) -> Result<NodeMetadata>;

    async fn stop_node(&self, id: &str) -> Result<NodeMetadata>;

    async fn reboot_node(&self, id: &str) -> Result<NodeMetadata>;

    async fn destroy_node(&self, id: &str) -> Result<()>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type GetNodeMetadataStrategyRef = Arc<dyn GetNodeMetadataStrategy>;
pub type NodeLifecycleStrategyRef = Arc<dyn NodeLifecycleStrategy>;

//! Resume / Start / Stop / Reboot / Destroy Strategies
//!
//! Same shape as suspend: decode the handle, issue exactly one provider
//! call, then re-fetch. Destroy skips the re-fetch.

use super::refetch;
use crate::domain::handle::{decode_handle, Handle};
use crate::domain::node::NodeMetadata;
use crate::domain::ports::{
    ComputeApi, DestroyNodeStrategy, GetNodeMetadataStrategyRef, RebootNodeStrategy,
    ResumeNodeStrategy, StartNodeStrategy, StopNodeStrategy,
};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Provider call issued by a lifecycle strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Resume,
    Start,
    Stop,
    Reboot,
    Destroy,
}

impl std::fmt::Display for NodeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeAction::Resume => write!(f, "resume"),
            NodeAction::Start => write!(f, "start"),
            NodeAction::Stop => write!(f, "stop"),
            NodeAction::Reboot => write!(f, "reboot"),
            NodeAction::Destroy => write!(f, "destroy"),
        }
    }
}

async fn issue<A: ComputeApi>(api: &A, handle: &Handle, action: NodeAction) -> Result<()> {
    debug!(provider = api.provider_id(), %handle, %action, "issuing node action");

    let (region, id) = (handle.region(), handle.local_id());
    match action {
        NodeAction::Resume => api.resume_instance(region, id).await,
        NodeAction::Start => api.start_instance(region, id).await,
        // Plain stop, suspend is the state-preserving variant
        NodeAction::Stop => api.stop_instance(region, id, false).await,
        NodeAction::Reboot => api.reboot_instance(region, id).await,
        NodeAction::Destroy => api.terminate_instance(region, id).await,
    }
}

/// Decode, act, re-fetch
struct ActionThenRefetch<A: ComputeApi> {
    api: Arc<A>,
    get_node: GetNodeMetadataStrategyRef,
}

impl<A: ComputeApi> ActionThenRefetch<A> {
    async fn run(&self, id: &str, action: NodeAction) -> Result<NodeMetadata> {
        let handle = decode_handle(id)?;
        issue(self.api.as_ref(), &handle, action).await?;
        refetch(
            self.get_node.as_ref(),
            self.api.provider_id(),
            id,
            &action.to_string(),
        )
        .await
    }
}

macro_rules! refetching_strategy {
    ($(#[$doc:meta])* $name:ident, $trait_:ident, $method:ident, $action:expr) => {
        $(#[$doc])*
        pub struct $name<A: ComputeApi>(ActionThenRefetch<A>);

        impl<A: ComputeApi> $name<A> {
            pub fn new(api: Arc<A>, get_node: GetNodeMetadataStrategyRef) -> Self {
                Self(ActionThenRefetch { api, get_node })
            }
        }

        #[async_trait]
        impl<A: ComputeApi + 'static> $trait_ for $name<A> {
            async fn $method(&self, id: &str) -> Result<NodeMetadata> {
                self.0.run(id, $action).await
            }
        }
    };
}

refetching_strategy!(
    /// Resume a suspended node
    ResumeNode, ResumeNodeStrategy, resume_node, NodeAction::Resume
);
refetching_strategy!(StartNode, StartNodeStrategy, start_node, NodeAction::Start);
refetching_strategy!(
    /// Stop without state preservation
    StopNode, StopNodeStrategy, stop_node, NodeAction::Stop
);
refetching_strategy!(RebootNode, RebootNodeStrategy, reboot_node, NodeAction::Reboot);

/// Terminate a node. Nothing is re-fetched, the node ceases to exist.
pub struct DestroyNode<A: ComputeApi> {
    api: Arc<A>,
}

impl<A: ComputeApi> DestroyNode<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: ComputeApi + 'static> DestroyNodeStrategy for DestroyNode<A> {
    async fn destroy_node(&self, id: &str) -> Result<()> {
        let handle = decode_handle(id)?;
        issue(self.api.as_ref(), &handle, NodeAction::Destroy).await
    }
}

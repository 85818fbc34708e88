//! Suspend Node Strategy
//!
//! Stops a node, asking the provider to keep its state when
//! [`SuspendOptions::preserve_state`] is set, and returns the metadata the
//! provider reports right after accepting the call. The strategy does not
//! wait for the node to settle.

use super::refetch;
use crate::domain::handle::decode_handle;
use crate::domain::node::NodeMetadata;
use crate::domain::ports::{
    ComputeApi, GetNodeMetadataStrategyRef, SuspendNodeStrategy, SuspendOptions,
};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct SuspendNode<A: ComputeApi> {
    api: Arc<A>,
    get_node: GetNodeMetadataStrategyRef,
    options: SuspendOptions,
}

impl<A: ComputeApi> SuspendNode<A> {
    pub fn new(api: Arc<A>, get_node: GetNodeMetadataStrategyRef, options: SuspendOptions) -> Self {
        Self {
            api,
            get_node,
            options,
        }
    }

    pub fn options(&self) -> SuspendOptions {
        self.options
    }
}

#[async_trait]
impl<A: ComputeApi + 'static> SuspendNodeStrategy for SuspendNode<A> {
    async fn suspend_node(&self, id: &str) -> Result<NodeMetadata> {
        let handle = decode_handle(id)?;
        debug!(
            provider = self.api.provider_id(),
            %handle,
            preserve_state = self.options.preserve_state,
            "suspending node"
        );

        self.api
            .stop_instance(handle.region(), handle.local_id(), self.options.preserve_state)
            .await?;

        refetch(self.get_node.as_ref(), self.api.provider_id(), id, "suspend").await
    }
}

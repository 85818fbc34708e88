//! Compute Service
//!
//! Composes the strategy family over one provider client into a single
//! [`NodeLifecycleStrategy`].

use crate::compute::strategy::{
    DestroyNode, GetNodeMetadata, ListNodes, RebootNode, ResumeNode, StartNode, StopNode,
    SuspendNode,
};
use crate::domain::node::NodeMetadata;
use crate::domain::ports::{
    ComputeApi, DestroyNodeStrategy, GetNodeMetadataStrategy, ListNodesStrategy,
    NodeLifecycleStrategy, NodeNormalizer, RebootNodeStrategy, ResumeNodeStrategy,
    StartNodeStrategy, StopNodeStrategy, SuspendNodeStrategy, SuspendOptions,
};
use crate::domain::predicate::NodePredicate;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// All lifecycle strategies of one provider profile
pub struct ComputeService<A: ComputeApi> {
    api: Arc<A>,
    list: ListNodes<A>,
    get: Arc<GetNodeMetadata<A>>,
    suspend: SuspendNode<A>,
    resume: ResumeNode<A>,
    start: StartNode<A>,
    stop: StopNode<A>,
    reboot: RebootNode<A>,
    destroy: DestroyNode<A>,
}

impl<A: ComputeApi + 'static> ComputeService<A> {
    /// Build every strategy around one client and normalizer
    pub fn new<N>(api: Arc<A>, normalizer: N, suspend_options: SuspendOptions) -> Self
    where
        N: NodeNormalizer<A::Record> + 'static,
    {
        let normalizer: Arc<dyn NodeNormalizer<A::Record>> = Arc::new(normalizer);
        let get = Arc::new(GetNodeMetadata::new(api.clone(), normalizer.clone()));

        Self {
            list: ListNodes::new(api.clone(), normalizer),
            suspend: SuspendNode::new(api.clone(), get.clone(), suspend_options),
            resume: ResumeNode::new(api.clone(), get.clone()),
            start: StartNode::new(api.clone(), get.clone()),
            stop: StopNode::new(api.clone(), get.clone()),
            reboot: RebootNode::new(api.clone(), get.clone()),
            destroy: DestroyNode::new(api.clone()),
            get,
            api,
        }
    }

    /// Underlying provider client
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn suspend_options(&self) -> SuspendOptions {
        self.suspend.options()
    }
}

#[async_trait]
impl<A: ComputeApi + 'static> NodeLifecycleStrategy for ComputeService<A> {
    fn provider_id(&self) -> &str {
        self.api.provider_id()
    }

    async fn list_nodes(&self) -> Result<Vec<NodeMetadata>> {
        self.list.list_nodes().await
    }

    async fn list_nodes_matching(&self, filter: &NodePredicate) -> Result<Vec<NodeMetadata>> {
        self.list.list_nodes_matching(filter).await
    }

    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        self.get.get_node(id).await
    }

    async fn suspend_node(&self, id: &str) -> Result<NodeMetadata> {
        self.suspend.suspend_node(id).await
    }

    async fn resume_node(&self, id: &str) -> Result<NodeMetadata> {
        self.resume.resume_node(id).await
    }

    async fn start_node(&self, id: &str) -> Result<NodeMetadata> {
        self.start.start_node(id).await
    }

    async fn stop_node(&self, id: &str) -> Result<NodeMetadata> {
        self.stop.stop_node(id).await
    }

    async fn reboot_node(&self, id: &str) -> Result<NodeMetadata> {
        self.reboot.reboot_node(id).await
    }

    async fn destroy_node(&self, id: &str) -> Result<()> {
        self.destroy.destroy_node(id).await
    }
}

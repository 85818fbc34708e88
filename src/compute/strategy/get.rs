//! Get Node Metadata Strategy

use crate::domain::handle::decode_handle;
use crate::domain::node::NodeMetadata;
use crate::domain::ports::{ComputeApi, GetNodeMetadataStrategy, NodeNormalizer};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Reads one node through the provider's describe call
pub struct GetNodeMetadata<A: ComputeApi> {
    api: Arc<A>,
    normalizer: Arc<dyn NodeNormalizer<A::Record>>,
}

impl<A: ComputeApi> GetNodeMetadata<A> {
    pub fn new(api: Arc<A>, normalizer: Arc<dyn NodeNormalizer<A::Record>>) -> Self {
        Self { api, normalizer }
    }
}

#[async_trait]
impl<A: ComputeApi + 'static> GetNodeMetadataStrategy for GetNodeMetadata<A> {
    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let handle = decode_handle(id)?;
        debug!(provider = self.api.provider_id(), %handle, "describing instance");

        let record = self
            .api
            .describe_instance(handle.region(), handle.local_id())
            .await?;

        Ok(record.map(|r| self.normalizer.to_node_metadata(&r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::stub::{stub_normalizer, Call, StubApi};
    use crate::domain::node::NodeStatus;
    use crate::error::Error;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_get_existing_node() {
        let api = Arc::new(StubApi::new(&["us-east-1"]).with_node("us-east-1", "i-1", "running"));
        let get = GetNodeMetadata::new(api.clone(), stub_normalizer());

        let node = get.get_node("us-east-1/i-1").await.unwrap().unwrap();
        assert_eq!(node.status, NodeStatus::Running);
        assert_eq!(node.location.as_deref(), Some("us-east-1"));
        assert_eq!(
            api.calls(),
            vec![Call::Describe("us-east-1".into(), "i-1".into())]
        );
    }

    #[tokio::test]
    async fn test_missing_node_is_none() {
        let api = Arc::new(StubApi::new(&["us-east-1"]));
        let get = GetNodeMetadata::new(api, stub_normalizer());

        assert!(get.get_node("us-east-1/i-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_handle_never_reaches_provider() {
        let api = Arc::new(StubApi::new(&["us-east-1"]).with_node("us-east-1", "i-1", "running"));
        let get = GetNodeMetadata::new(api.clone(), stub_normalizer());

        assert_matches!(get.get_node("i-1").await, Err(Error::MalformedHandle { .. }));
        assert!(api.calls().is_empty());
    }
}

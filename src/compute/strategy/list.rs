//! List Nodes Strategy

use crate::domain::node::NodeMetadata;
use crate::domain::ports::{ComputeApi, ListNodesStrategy, NodeNormalizer};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Lists every instance in every region in scope, normalized.
///
/// Regions are visited in the order the client reports them and records keep
/// the provider's listing order.
pub struct ListNodes<A: ComputeApi> {
    api: Arc<A>,
    normalizer: Arc<dyn NodeNormalizer<A::Record>>,
}

impl<A: ComputeApi> ListNodes<A> {
    pub fn new(api: Arc<A>, normalizer: Arc<dyn NodeNormalizer<A::Record>>) -> Self {
        Self { api, normalizer }
    }
}

#[async_trait]
impl<A: ComputeApi + 'static> ListNodesStrategy for ListNodes<A> {
    async fn list_nodes(&self) -> Result<Vec<NodeMetadata>> {
        let mut nodes = Vec::new();

        for region in self.api.regions() {
            debug!(provider = self.api.provider_id(), %region, "listing instances");
            let records = self.api.list_instances(&region).await?;
            nodes.extend(records.iter().map(|r| self.normalizer.to_node_metadata(r)));
        }

        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::stub::{stub_normalizer, Call, StubApi};
    use crate::domain::node::NodeStatus;
    use crate::domain::predicate::NodePredicate;
    use crate::error::{Error, RejectionKind};
    use assert_matches::assert_matches;

    fn strategy(api: Arc<StubApi>) -> ListNodes<StubApi> {
        ListNodes::new(api, stub_normalizer())
    }

    #[tokio::test]
    async fn test_list_all_normalizes_every_record() {
        let api = Arc::new(
            StubApi::new(&["us-east-1"])
                .with_node("us-east-1", "i-1", "running")
                .with_node("us-east-1", "i-2", "stopped"),
        );

        let nodes = strategy(api.clone()).list_nodes().await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "us-east-1/i-1");
        assert_eq!(nodes[0].status, NodeStatus::Running);
        assert_eq!(nodes[1].status, NodeStatus::Suspended);
        assert_eq!(api.calls(), vec![Call::List("us-east-1".into())]);
    }

    #[tokio::test]
    async fn test_list_matching_running() {
        let api = Arc::new(
            StubApi::new(&["us-east-1"])
                .with_node("us-east-1", "i-1", "running")
                .with_node("us-east-1", "i-2", "stopped"),
        );

        let nodes = strategy(api)
            .list_nodes_matching(&NodePredicate::running())
            .await
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "us-east-1/i-1");
        assert_eq!(nodes[0].status, NodeStatus::Running);
    }

    #[tokio::test]
    async fn test_list_matching_is_ordered_subset() {
        let api = Arc::new(
            StubApi::new(&["us-east-1", "eu-west-1"])
                .with_node("us-east-1", "i-9", "running")
                .with_node("eu-west-1", "i-3", "running")
                .with_node("us-east-1", "i-1", "stopped")
                .with_node("us-east-1", "i-5", "running")
                .with_node("eu-west-1", "i-7", "martian"),
        );
        let list = strategy(api);

        let all = list.list_nodes().await.unwrap();
        let filter =
            NodePredicate::running().or(NodePredicate::with_status(NodeStatus::Unrecognized));
        let matching = list.list_nodes_matching(&filter).await.unwrap();

        let expected: Vec<_> = all.into_iter().filter(|n| filter.matches(n)).collect();
        assert_eq!(matching, expected);
        let ids: Vec<_> = matching.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["us-east-1/i-9", "us-east-1/i-5", "eu-west-1/i-3", "eu-west-1/i-7"]
        );
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let api = Arc::new(
            StubApi::new(&["us-east-1"])
                .with_node("us-east-1", "i-1", "running")
                .failing_list(Error::Transport {
                    provider: "stub".into(),
                    message: "rate limited".into(),
                }),
        );

        let result = strategy(api.clone()).list_nodes().await;
        assert_matches!(result, Err(Error::Transport { message, .. }) if message == "rate limited");
        assert_eq!(api.calls().len(), 1);

        let api = Arc::new(StubApi::new(&["us-east-1"]).failing_list(Error::rejected(
            "stub",
            "list_instances",
            RejectionKind::PermissionDenied,
            "AuthFailure",
        )));
        assert_matches!(
            strategy(api).list_nodes().await,
            Err(Error::ProviderRejected {
                kind: RejectionKind::PermissionDenied,
                ..
            })
        );
    }
}

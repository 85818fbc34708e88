//! Node Predicates
//!
//! Client-side filters for node listings. A predicate only looks at the
//! normalized attributes of [`NodeMetadata`], so the same filter works
//! against every provider.

use crate::domain::node::{NodeMetadata, NodeStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter over normalized node attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum NodePredicate {
    All,
    StatusIs(NodeStatus),
    InLocation(String),
    IdIn(BTreeSet<String>),
    And(Vec<NodePredicate>),
    Or(Vec<NodePredicate>),
    Not(Box<NodePredicate>),
}

impl NodePredicate {
    pub fn all() -> Self {
        NodePredicate::All
    }

    pub fn running() -> Self {
        NodePredicate::StatusIs(NodeStatus::Running)
    }

    pub fn with_status(status: NodeStatus) -> Self {
        NodePredicate::StatusIs(status)
    }

    pub fn in_location(location: impl Into<String>) -> Self {
        NodePredicate::InLocation(location.into())
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NodePredicate::IdIn(ids.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: NodePredicate) -> Self {
        match self {
            NodePredicate::All => other,
            NodePredicate::And(mut preds) => {
                preds.push(other);
                NodePredicate::And(preds)
            }
            this => NodePredicate::And(vec![this, other]),
        }
    }

    pub fn or(self, other: NodePredicate) -> Self {
        match self {
            NodePredicate::Or(mut preds) => {
                preds.push(other);
                NodePredicate::Or(preds)
            }
            this => NodePredicate::Or(vec![this, other]),
        }
    }

    pub fn negate(self) -> Self {
        NodePredicate::Not(Box::new(self))
    }

    /// Evaluate against a node
    pub fn matches(&self, node: &NodeMetadata) -> bool {
        match self {
            NodePredicate::All => true,
            NodePredicate::StatusIs(status) => node.status == *status,
            NodePredicate::InLocation(location) => node.location.as_deref() == Some(location),
            NodePredicate::IdIn(ids) => ids.contains(&node.id),
            NodePredicate::And(preds) => preds.iter().all(|p| p.matches(node)),
            NodePredicate::Or(preds) => preds.iter().any(|p| p.matches(node)),
            NodePredicate::Not(pred) => !pred.matches(node),
        }
    }
}

impl Default for NodePredicate {
    fn default() -> Self {
        NodePredicate::All
    }
}

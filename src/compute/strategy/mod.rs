//! Lifecycle Strategies
//!
//! One strategy per normalized operation, written once against
//! [`ComputeApi`](crate::domain::ports::ComputeApi):
//! - List / GetNodeMetadata: read paths with normalization
//! - Suspend: stop with optional state preservation, then re-fetch
//! - Resume / Start / Stop / Reboot: one provider call, then re-fetch
//! - Destroy: one provider call, no re-fetch

pub mod get;
pub mod lifecycle;
pub mod list;
pub mod suspend;

pub use get::*;
pub use lifecycle::*;
pub use list::*;
pub use suspend::*;

use crate::domain::node::NodeMetadata;
use crate::domain::ports::GetNodeMetadataStrategy;
use crate::error::{Error, RejectionKind, Result};

/// Re-read a node after a mutating call.
///
/// A node that vanished between the call and the read surfaces as a
/// `NotFound` rejection.
pub(crate) async fn refetch(
    get_node: &dyn GetNodeMetadataStrategy,
    provider: &str,
    id: &str,
    operation: &str,
) -> Result<NodeMetadata> {
    get_node.get_node(id).await?.ok_or_else(|| {
        Error::rejected(
            provider,
            operation,
            RejectionKind::NotFound,
            format!("node {} not found after {}", id, operation),
        )
    })
}

//! Unified Compute - Provider-Agnostic Node Lifecycle
//!
//! One lifecycle vocabulary (list, inspect, suspend, resume, start, stop,
//! reboot, destroy) over heterogeneous compute providers. Each provider
//! contributes a client and a normalizer; the strategies are written once.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                       REST API (axum) + Prometheus                          │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                    Profile Registry (name → strategy)                       │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                          Compute Service                                    │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌───────────────────────┐  │
//! │  │   List     │  │  Get Node  │  │  Suspend   │  │ Resume/Start/Stop/    │  │
//! │  │   Nodes    │  │  Metadata  │  │  Node      │  │ Reboot/Destroy        │  │
//! │  └─────┬──────┘  └─────┬──────┘  └─────┬──────┘  └──────────┬────────────┘  │
//! │        └───────────────┴───────┬───────┴────────────────────┘               │
//! │                    ComputeApi + NodeNormalizer                              │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                           Provider Clients                                  │
//! │  ┌─────────────────────┐  ┌─────────────────────┐  ┌─────────────────────┐  │
//! │  │      AWS EC2        │  │       GoGrid        │  │   VMware vCloud     │  │
//! │  │     (regions)       │  │   (datacenters)     │  │       (VDCs)        │  │
//! │  └─────────────────────┘  └─────────────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: REST API, server and metrics
//! - [`compute`]: Lifecycle strategies, compute service, profile registry
//! - [`config`]: YAML profile configuration
//! - [`domain`]: Handles, node metadata, predicates and ports
//! - [`providers`]: EC2, GoGrid and vCloud clients plus provider metadata
//! - [`error`]: Error types and handling

pub mod api;
pub mod compute;
pub mod config;
pub mod domain;
pub mod error;
pub mod providers;

// Re-export commonly used types
pub use api::{ApiMetrics, ApiServer, ApiServerConfig, RestRouter};

pub use compute::{ComputeService, ProfileRegistry, RegisteredProfile};

pub use config::{ComputeConfig, ProfileConfig, SeedNode};

pub use domain::handle::{decode_handle, encode_handle, Handle};
pub use domain::node::{NodeMetadata, NodeStatus};
pub use domain::ports::{
    ComputeApi, NodeLifecycleStrategy, NodeLifecycleStrategyRef, NodeNormalizer, SuspendOptions,
};
pub use domain::predicate::NodePredicate;

pub use error::{Error, ErrorAction, RejectionKind, Result};

pub use providers::{ProviderCatalog, ProviderFactory, ProviderKind, ProviderMetadata, ProviderType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

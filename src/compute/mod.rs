//! Compute Module
//!
//! Lifecycle strategies, the per-profile compute service that composes
//! them, and the explicit profile registry.

pub mod registry;
pub mod service;
pub mod strategy;

#[cfg(test)]
pub(crate) mod stub;

pub use registry::*;
pub use service::*;
pub use strategy::*;

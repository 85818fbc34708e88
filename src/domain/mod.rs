//! Domain layer - Node model and port definitions
//!
//! This module defines the provider-neutral node model and the traits
//! (ports) that provider clients and lifecycle strategies implement.

pub mod handle;
pub mod node;
pub mod ports;
pub mod predicate;

pub use handle::*;
pub use node::*;
pub use ports::*;
pub use predicate::*;

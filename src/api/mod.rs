//! API Module
//!
//! REST API over the configured profiles, plus the Prometheus counters it
//! maintains.

pub mod metrics;
pub mod rest;
pub mod server;

pub use metrics::*;
pub use rest::*;
pub use server::*;

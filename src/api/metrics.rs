//! API Metrics
//!
//! Prometheus counters for node operations served by the REST layer.

use crate::error::{Error, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Operation outcome label values
pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_ERROR: &str = "error";

/// Counters owned by the API
#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    node_operations: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let node_operations = IntCounterVec::new(
            Opts::new(
                "unified_compute_node_operations_total",
                "Node operations served, by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .map_err(|e| Error::Internal(format!("Failed to create metric: {}", e)))?;

        registry
            .register(Box::new(node_operations.clone()))
            .map_err(|e| Error::Internal(format!("Failed to register metric: {}", e)))?;

        Ok(Self {
            registry,
            node_operations,
        })
    }

    /// Count one operation
    pub fn record<T>(&self, operation: &str, result: &Result<T>) {
        let outcome = if result.is_ok() {
            OUTCOME_OK
        } else {
            OUTCOME_ERROR
        };
        self.node_operations
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn operation_count(&self, operation: &str, outcome: &str) -> u64 {
        self.node_operations
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Text exposition of every registered metric, with its content type
    pub fn encode(&self) -> Result<(String, Vec<u8>)> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| Error::Internal(format!("Failed to encode metrics: {}", e)))?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_encode() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.record("suspend", &Ok::<_, Error>(()));
        metrics.record::<()>("suspend", &Err(Error::Internal("boom".into())));
        metrics.record("suspend", &Ok::<_, Error>(()));

        assert_eq!(metrics.operation_count("suspend", OUTCOME_OK), 2);
        assert_eq!(metrics.operation_count("suspend", OUTCOME_ERROR), 1);

        let (content_type, body) = metrics.encode().unwrap();
        assert!(content_type.starts_with("text/plain"));
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains(
            "unified_compute_node_operations_total{operation=\"suspend\",outcome=\"ok\"} 2"
        ));
    }
}

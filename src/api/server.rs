//! API Server
//!
//! Runs the REST API over the profile registry until shutdown is signalled.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::metrics::ApiMetrics;
use super::rest::RestRouter;
use crate::compute::ProfileRegistry;
use crate::providers::ProviderCatalog;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// REST API bind address
    pub rest_addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: SocketAddr::from(([0, 0, 0, 0], 8090)),
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// REST API server
pub struct ApiServer {
    config: ApiServerConfig,
    registry: Arc<ProfileRegistry>,
    catalog: Arc<ProviderCatalog>,
    metrics: Arc<ApiMetrics>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    pub fn new(
        config: ApiServerConfig,
        registry: Arc<ProfileRegistry>,
        catalog: Arc<ProviderCatalog>,
        metrics: Arc<ApiMetrics>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            registry,
            catalog,
            metrics,
            shutdown_tx,
        }
    }

    /// Run the API server
    pub async fn run(&self) -> Result<()> {
        info!("Starting API server");
        info!("  REST API: {}", self.config.rest_addr);
        info!("  Profiles: {}", self.registry.names().collect::<Vec<_>>().join(", "));

        let rest_handle = self.spawn_rest_server();

        match rest_handle.await {
            Ok(result) => result,
            Err(e) => {
                error!("REST server task failed: {:?}", e);
                Err(Error::Internal(format!("REST server task failed: {}", e)))
            }
        }
    }

    /// Spawn the REST server
    fn spawn_rest_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let addr = self.config.rest_addr;
        let router = RestRouter::new(
            self.registry.clone(),
            self.catalog.clone(),
            self.metrics.clone(),
        );
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move { run_rest_server(addr, router, shutdown_rx).await })
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Run the REST API server
async fn run_rest_server(
    addr: SocketAddr,
    router: RestRouter,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let app = router
        .build()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind REST server: {}", e)))?;

    info!("REST API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("REST server shutting down");
        })
        .await
        .map_err(|e| Error::Internal(format!("REST server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = ApiServerConfig::default();
        assert_eq!(config.rest_addr.port(), 8090);
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let server = Arc::new(ApiServer::new(
            ApiServerConfig {
                rest_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            },
            Arc::new(ProfileRegistry::new()),
            Arc::new(ProviderCatalog::builtin()),
            Arc::new(ApiMetrics::new().unwrap()),
        ));

        let running = server.clone();
        let handle = tokio::spawn(async move { running.run().await });

        // Retry until the listener task has subscribed
        let result = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                server.shutdown();
                if handle.is_finished() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            handle.await
        })
        .await
        .unwrap();

        assert!(result.unwrap().is_ok());
    }
}

//! Unified Compute
//!
//! Serves the node lifecycle of every configured provider profile over a
//! REST API, with health and Prometheus metrics endpoints alongside.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unified_compute::{
    ApiMetrics, ApiServer, ApiServerConfig, ComputeConfig, Error, ProfileRegistry,
    ProviderCatalog, Result,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Unified Compute - provider-agnostic node lifecycle for EC2, GoGrid and vCloud
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Profile configuration file (YAML)
    #[arg(long, env = "COMPUTE_CONFIG")]
    config: Option<PathBuf>,

    /// REST API bind address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8090")]
    api_addr: String,

    /// Health server bind address
    #[arg(long, env = "HEALTH_ADDR", default_value = "0.0.0.0:8081")]
    health_addr: String,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:8080")]
    metrics_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Print the provider catalog as JSON and exit
    #[arg(long)]
    list_providers: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = Arc::new(ProviderCatalog::builtin());
    if args.list_providers {
        println!("{}", serde_json::to_string_pretty(catalog.all())?);
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting Unified Compute");
    info!("  Version: {}", unified_compute::VERSION);
    info!("  REST API: {}", args.api_addr);

    let config = match &args.config {
        Some(path) => ComputeConfig::from_file(path)?,
        None => {
            info!("No configuration file given, starting without profiles");
            ComputeConfig::default()
        }
    };

    let registry = Arc::new(ProfileRegistry::from_config(&config).await?);
    let metrics = Arc::new(ApiMetrics::new()?);

    // Start health server
    let health_addr = args.health_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = run_health_server(&health_addr).await {
            error!("Health server error: {}", e);
        }
    });

    // Start metrics server
    let metrics_addr = args.metrics_addr.clone();
    let server_metrics = metrics.clone();
    tokio::spawn(async move {
        if let Err(e) = run_metrics_server(&metrics_addr, server_metrics).await {
            error!("Metrics server error: {}", e);
        }
    });

    let api_config = ApiServerConfig {
        rest_addr: args
            .api_addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid REST API address: {}", e)))?,
    };

    let api_server = Arc::new(ApiServer::new(api_config, registry, catalog, metrics));

    let signal_server = api_server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down");
            signal_server.shutdown();
        }
    });

    api_server.run().await?;

    info!("Shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive(directive("hyper=warn")?)
        .add_directive(directive("tower=warn")?)
        .add_directive(directive("tower_http=info")?)
        .add_directive(directive("axum=info")?);

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

fn directive(raw: &str) -> Result<Directive> {
    raw.parse()
        .map_err(|e| Error::Configuration(format!("Invalid log directive {}: {}", raw, e)))
}

// =============================================================================
// Health Server
// =============================================================================

fn plain_response(
    status: hyper::StatusCode,
    body: &'static str,
) -> hyper::Response<hyper::Body> {
    let mut response = hyper::Response::new(hyper::Body::from(body));
    *response.status_mut() = status;
    response
}

async fn run_health_server(addr: &str) -> Result<()> {
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Request, Server, StatusCode};

    let make_svc = make_service_fn(|_conn| async {
        Ok::<_, std::convert::Infallible>(service_fn(|req: Request<Body>| async move {
            let response = match req.uri().path() {
                "/healthz" | "/livez" | "/readyz" => plain_response(StatusCode::OK, "ok"),
                _ => plain_response(StatusCode::NOT_FOUND, "not found"),
            };
            Ok::<_, std::convert::Infallible>(response)
        }))
    });

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid health server address: {}", e)))?;

    info!("Health server listening on {}", addr);
    Server::bind(&addr)
        .serve(make_svc)
        .await
        .map_err(|e| Error::Internal(format!("Health server error: {}", e)))?;

    Ok(())
}

// =============================================================================
// Metrics Server
// =============================================================================

async fn run_metrics_server(addr: &str, metrics: Arc<ApiMetrics>) -> Result<()> {
    use hyper::header::CONTENT_TYPE;
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Request, Response, Server, StatusCode};

    let make_svc = make_service_fn(move |_conn| {
        let metrics = metrics.clone();
        async move {
            Ok::<_, std::convert::Infallible>(service_fn(move |req: Request<Body>| {
                let metrics = metrics.clone();
                async move {
                    let response = match req.uri().path() {
                        "/metrics" => match metrics.encode() {
                            Ok((content_type, buffer)) => {
                                let mut response = Response::new(Body::from(buffer));
                                if let Ok(value) = content_type.parse() {
                                    response.headers_mut().insert(CONTENT_TYPE, value);
                                }
                                response
                            }
                            Err(e) => {
                                error!("Metrics encoding failed: {}", e);
                                plain_response(StatusCode::INTERNAL_SERVER_ERROR, "encoding failed")
                            }
                        },
                        _ => plain_response(StatusCode::NOT_FOUND, "not found"),
                    };
                    Ok::<_, std::convert::Infallible>(response)
                }
            }))
        }
    });

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid metrics server address: {}", e)))?;

    info!("Metrics server listening on {}", addr);
    Server::bind(&addr)
        .serve(make_svc)
        .await
        .map_err(|e| Error::Internal(format!("Metrics server error: {}", e)))?;

    Ok(())
}

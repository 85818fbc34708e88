//! REST API Handlers
//!
//! Exposes the provider catalog, the configured profiles and the node
//! lifecycle operations of each profile.

use crate::api::metrics::ApiMetrics;
use crate::compute::ProfileRegistry;
use crate::domain::handle::encode_handle;
use crate::domain::node::{NodeMetadata, NodeStatus};
use crate::domain::ports::NodeLifecycleStrategyRef;
use crate::domain::predicate::NodePredicate;
use crate::error::{Error, RejectionKind};
use crate::providers::{ProviderCatalog, ProviderMetadata};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Node listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Configured profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub provider: String,
    pub provider_name: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                error: error.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// HTTP status and error code for a toolkit error
pub fn status_for(error: &Error) -> (StatusCode, &'static str) {
    match error {
        Error::MalformedHandle { .. } => (StatusCode::BAD_REQUEST, "malformed_handle"),
        Error::ProviderRejected { kind, .. } => match kind {
            RejectionKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            RejectionKind::InvalidState => (StatusCode::CONFLICT, "invalid_state"),
            RejectionKind::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
            RejectionKind::Other => (StatusCode::INTERNAL_SERVER_ERROR, "provider_rejected"),
        },
        Error::Transport { .. } => (StatusCode::BAD_GATEWAY, "transport"),
        Error::UnknownProfile(_) => (StatusCode::NOT_FOUND, "unknown_profile"),
        Error::UnknownProvider(_) => (StatusCode::NOT_FOUND, "unknown_provider"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let (status, code) = status_for(&error);
        if status.is_server_error() {
            warn!("Request failed: {}", error);
        }
        let mut api_error = ApiError::new(status, code, error.to_string());
        if let Error::ProviderRejected { provider, .. } | Error::Transport { provider, .. } =
            &error
        {
            api_error.body.details = Some(format!("provider: {}", provider));
        }
        api_error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    registry: Arc<ProfileRegistry>,
    catalog: Arc<ProviderCatalog>,
    metrics: Arc<ApiMetrics>,
}

impl RestRouter {
    pub fn new(
        registry: Arc<ProfileRegistry>,
        catalog: Arc<ProviderCatalog>,
        metrics: Arc<ApiMetrics>,
    ) -> Self {
        Self {
            registry,
            catalog,
            metrics,
        }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            registry: self.registry,
            catalog: self.catalog,
            metrics: self.metrics,
        };

        Router::new()
            // Provider catalog
            .route("/v1/providers", get(list_providers))
            .route("/v1/providers/:id", get(get_provider))
            // Profiles and nodes
            .route("/v1/profiles", get(list_profiles))
            .route("/v1/profiles/:profile/nodes", get(list_nodes))
            .route(
                "/v1/profiles/:profile/nodes/:region/:node",
                get(get_node).delete(destroy_node),
            )
            .route(
                "/v1/profiles/:profile/nodes/:region/:node/:action",
                post(node_action),
            )
            // Health endpoint
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: Arc<ProfileRegistry>,
    catalog: Arc<ProviderCatalog>,
    metrics: Arc<ApiMetrics>,
}

impl AppState {
    fn strategy(&self, profile: &str) -> ApiResult<NodeLifecycleStrategyRef> {
        Ok(self.registry.strategy(profile)?)
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderMetadata>> {
    Json(state.catalog.all().to_vec())
}

async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProviderMetadata>> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::UnknownProvider(id).into())
}

async fn list_profiles(State(state): State<AppState>) -> Json<Vec<ProfileSummary>> {
    let profiles = state
        .registry
        .profiles()
        .map(|p| ProfileSummary {
            name: p.name.clone(),
            provider: p.provider.provider_id().to_string(),
            provider_name: p.provider.metadata().name,
        })
        .collect();
    Json(profiles)
}

/// List nodes of a profile, optionally filtered by status and location
async fn list_nodes(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Query(query): Query<NodeQuery>,
) -> ApiResult<Json<Vec<NodeMetadata>>> {
    let strategy = state.strategy(&profile)?;

    let mut predicate = NodePredicate::all();
    if let Some(status) = &query.status {
        let status: NodeStatus = status
            .parse()
            .map_err(|e: String| ApiError::new(StatusCode::BAD_REQUEST, "invalid_query", e))?;
        predicate = predicate.and(NodePredicate::with_status(status));
    }
    if let Some(location) = &query.location {
        predicate = predicate.and(NodePredicate::in_location(location.as_str()));
    }

    debug!("Listing nodes of profile {} matching {:?}", profile, predicate);
    let result = strategy.list_nodes_matching(&predicate).await;
    state.metrics.record("list", &result);
    Ok(Json(result?))
}

async fn get_node(
    State(state): State<AppState>,
    Path((profile, region, node)): Path<(String, String, String)>,
) -> ApiResult<Json<NodeMetadata>> {
    let strategy = state.strategy(&profile)?;
    let handle = encode_handle(&region, &node);

    let result = strategy.get_node(&handle).await;
    state.metrics.record("get", &result);
    match result? {
        Some(node) => Ok(Json(node)),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "node_not_found",
            format!("node {} not found in profile {}", handle, profile),
        )),
    }
}

/// Run a lifecycle action and return the refreshed node
async fn node_action(
    State(state): State<AppState>,
    Path((profile, region, node, action)): Path<(String, String, String, String)>,
) -> ApiResult<Json<NodeMetadata>> {
    let strategy = state.strategy(&profile)?;
    let handle = encode_handle(&region, &node);

    let result = match action.as_str() {
        "suspend" => strategy.suspend_node(&handle).await,
        "resume" => strategy.resume_node(&handle).await,
        "start" => strategy.start_node(&handle).await,
        "stop" => strategy.stop_node(&handle).await,
        "reboot" => strategy.reboot_node(&handle).await,
        other => {
            return Err(ApiError::new(
                StatusCode::NOT_FOUND,
                "unknown_action",
                format!("unknown node action: {}", other),
            ))
        }
    };
    state.metrics.record(&action, &result);

    let node = result?;
    info!("{} {} in profile {}: now {}", action, handle, profile, node.status);
    Ok(Json(node))
}

async fn destroy_node(
    State(state): State<AppState>,
    Path((profile, region, node)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let strategy = state.strategy(&profile)?;
    let handle = encode_handle(&region, &node);

    let result = strategy.destroy_node(&handle).await;
    state.metrics.record("destroy", &result);
    result?;

    info!("Destroyed {} in profile {}", handle, profile);
    Ok(StatusCode::NO_CONTENT)
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

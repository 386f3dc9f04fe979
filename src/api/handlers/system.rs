//! System endpoints: health check and deployment description.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::service::DeploymentInfo;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Addresses and settings of the running deployment.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentResponse {
    /// The wrapper's custody address.
    pub dex_address: String,
    /// First configured asset.
    pub asset_a: String,
    /// Second configured asset.
    pub asset_b: String,
    /// Configured router.
    pub router: String,
    /// Configured factory.
    pub factory: String,
    /// Current owner.
    pub owner: String,
    /// Pair of the configured assets, `null` while no pool exists.
    pub pair_id: Option<String>,
    /// Pool swap fee in basis points.
    pub fee_bps: u32,
}

impl From<DeploymentInfo> for DeploymentResponse {
    fn from(info: DeploymentInfo) -> Self {
        Self {
            dex_address: info.dex_address.to_string(),
            asset_a: info.asset_a.to_string(),
            asset_b: info.asset_b.to_string(),
            router: info.router.to_string(),
            factory: info.factory.to_string(),
            owner: info.owner.to_string(),
            pair_id: info.pair_id.map(|id| id.to_string()),
            fee_bps: info.fee_bps,
        }
    }
}

/// `GET /deployment`: Configured assets, router, factory, owner and pair.
#[utoipa::path(
    get,
    path = "/deployment",
    tag = "System",
    summary = "Deployment description",
    responses(
        (status = 200, description = "Deployment", body = DeploymentResponse),
    )
)]
pub async fn deployment_handler(State(state): State<AppState>) -> impl IntoResponse {
    let info = state.dex_service.deployment_info().await;
    Json(DeploymentResponse::from(info))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/deployment", get(deployment_handler))
}

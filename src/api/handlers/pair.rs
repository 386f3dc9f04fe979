//! Pair handlers: resolve and inspect the configured pool.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreatePairResponse, GetPairResponse, PairDetail};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::error::{DexError, ErrorResponse};

/// `POST /pair`: Find or create the pool of the configured assets.
///
/// # Errors
///
/// Returns [`DexError::ExternalProtocol`] if the factory fails.
#[utoipa::path(
    post,
    path = "/api/v1/pair",
    tag = "Pair",
    summary = "Create pair",
    description = "Idempotent: returns the existing pool of the configured assets or creates it.",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    responses(
        (status = 200, description = "Pair resolved", body = CreatePairResponse),
        (status = 502, description = "AMM protocol failure", body = ErrorResponse),
    )
)]
pub async fn create_pair(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, DexError> {
    let resolution = state.dex_service.create_pair(caller).await?;
    Ok(Json(CreatePairResponse::from(resolution)))
}

/// `GET /pair`: Pool of the configured assets, if any.
#[utoipa::path(
    get,
    path = "/api/v1/pair",
    tag = "Pair",
    summary = "Get pair",
    description = "Read-only lookup. `pair_id` is null while no pool exists.",
    responses(
        (status = 200, description = "Lookup result", body = GetPairResponse),
    )
)]
pub async fn get_pair(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dex_service.get_pair().await;
    Json(GetPairResponse {
        pair_id: snapshot.map(|s| s.pair_id.to_string()),
        pair: snapshot.map(PairDetail::from),
    })
}

/// Pair routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pair", get(get_pair).post(create_pair))
}

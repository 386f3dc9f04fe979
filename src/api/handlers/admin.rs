//! Owner-gated administration handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    SweepBody, SweepResponse, TransferOwnershipBody, TransferOwnershipResponse, parse_address,
    parse_amount,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::error::{DexError, ErrorResponse};

/// `POST /admin/ownership`: Hand the wrapper to a new owner.
///
/// # Errors
///
/// Returns [`DexError::Unauthorized`] unless the caller is the owner.
#[utoipa::path(
    post,
    path = "/api/v1/admin/ownership",
    tag = "Admin",
    summary = "Transfer ownership",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = TransferOwnershipBody,
    responses(
        (status = 200, description = "Ownership transferred", body = TransferOwnershipResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
    )
)]
pub async fn transfer_ownership(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<TransferOwnershipBody>,
) -> Result<impl IntoResponse, DexError> {
    let new_owner = parse_address("new_owner", &body.new_owner)?;
    let previous = state
        .dex_service
        .transfer_ownership(caller, new_owner)
        .await?;
    Ok(Json(TransferOwnershipResponse {
        previous_owner: previous.to_string(),
        new_owner: new_owner.to_string(),
    }))
}

/// `POST /admin/sweep`: Recover assets held in the wrapper's custody.
///
/// # Errors
///
/// Returns [`DexError::Unauthorized`] unless the caller is the owner,
/// or [`DexError::InsufficientBalance`] if custody holds less.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sweep",
    tag = "Admin",
    summary = "Sweep custody",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = SweepBody,
    responses(
        (status = 200, description = "Assets moved", body = SweepResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 422, description = "Custody balance too low", body = ErrorResponse),
    )
)]
pub async fn sweep(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<SweepBody>,
) -> Result<impl IntoResponse, DexError> {
    let asset = parse_address("asset", &body.asset)?;
    let to = parse_address("to", &body.to)?;
    let amount = body
        .amount
        .as_deref()
        .map(|raw| parse_amount("amount", raw))
        .transpose()?;
    let moved = state.dex_service.sweep(caller, asset, to, amount).await?;
    Ok(Json(SweepResponse {
        asset: asset.to_string(),
        to: to.to_string(),
        amount: moved.to_string(),
    }))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/ownership", post(transfer_ownership))
        .route("/admin/sweep", post(sweep))
}

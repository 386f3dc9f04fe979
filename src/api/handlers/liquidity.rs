//! Liquidity operation handlers: add and remove.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    AddLiquidityBody, AddLiquidityResponse, RemoveLiquidityBody, RemoveLiquidityResponse,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::error::{DexError, ErrorResponse};

/// `POST /liquidity/add`: Deposit both configured assets.
///
/// # Errors
///
/// Returns [`DexError`] on invalid amounts, missing allowance, expiry,
/// slippage or a gateway failure.
#[utoipa::path(
    post,
    path = "/api/v1/liquidity/add",
    tag = "Liquidity",
    summary = "Add liquidity",
    description = "Pulls up to the desired amounts of both configured assets from the caller, deposits them into their pool (creating it if needed) and refunds whatever the pool did not take. Pool shares go to the recipient.",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = AddLiquidityBody,
    responses(
        (status = 200, description = "Liquidity added", body = AddLiquidityResponse),
        (status = 400, description = "Invalid request or deadline expired", body = ErrorResponse),
        (status = 422, description = "Slippage exceeded or allowance too low", body = ErrorResponse),
        (status = 502, description = "AMM protocol failure", body = ErrorResponse),
    )
)]
pub async fn add_liquidity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<AddLiquidityBody>,
) -> Result<impl IntoResponse, DexError> {
    let req = body.into_request(caller, state.dex_service.default_deadline())?;
    let receipt = state.dex_service.add_liquidity(caller, req).await?;
    Ok(Json(AddLiquidityResponse::from(receipt)))
}

/// `POST /liquidity/remove`: Burn pool shares for both assets.
///
/// # Errors
///
/// Returns [`DexError`] on invalid amounts, missing pool, expiry,
/// slippage or a gateway failure.
#[utoipa::path(
    post,
    path = "/api/v1/liquidity/remove",
    tag = "Liquidity",
    summary = "Remove liquidity",
    description = "Pulls pool shares from the caller, burns them for both configured assets and delivers the proceeds to the recipient.",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = RemoveLiquidityBody,
    responses(
        (status = 200, description = "Liquidity removed", body = RemoveLiquidityResponse),
        (status = 400, description = "Invalid request or deadline expired", body = ErrorResponse),
        (status = 422, description = "Slippage exceeded or allowance too low", body = ErrorResponse),
        (status = 502, description = "AMM protocol failure", body = ErrorResponse),
    )
)]
pub async fn remove_liquidity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<RemoveLiquidityBody>,
) -> Result<impl IntoResponse, DexError> {
    let req = body.into_request(caller, state.dex_service.default_deadline())?;
    let burned = req.liquidity;
    let receipt = state.dex_service.remove_liquidity(caller, req).await?;
    Ok(Json(RemoveLiquidityResponse::new(receipt, burned)))
}

/// Liquidity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/liquidity/add", post(add_liquidity))
        .route("/liquidity/remove", post(remove_liquidity))
}

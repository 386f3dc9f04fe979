//! Asset handlers: allowances and balances on the ledger.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AllowanceResponse, ApproveBody, BalanceResponse, parse_address, parse_amount,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::error::{DexError, ErrorResponse};

/// `POST /assets/{asset}/approve`: Set an allowance over the caller's
/// asset.
///
/// # Errors
///
/// Returns [`DexError::InvalidRequest`] on malformed input.
#[utoipa::path(
    post,
    path = "/api/v1/assets/{asset}/approve",
    tag = "Assets",
    summary = "Approve spender",
    description = "Replaces the spender's allowance over the caller's balance of the asset.",
    params(
        ("asset" = String, Path, description = "Asset address"),
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = ApproveBody,
    responses(
        (status = 200, description = "Allowance set", body = AllowanceResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(asset): Path<String>,
    Json(body): Json<ApproveBody>,
) -> Result<impl IntoResponse, DexError> {
    let asset_addr = parse_address("asset", &asset)?;
    let spender = parse_address("spender", &body.spender)?;
    let amount = parse_amount("amount", &body.amount)?;
    state
        .dex_service
        .approve(caller, asset_addr, spender, amount)
        .await?;
    Ok(Json(AllowanceResponse {
        asset: asset_addr.to_string(),
        owner: caller.to_string(),
        spender: spender.to_string(),
        amount: amount.to_string(),
    }))
}

/// `GET /assets/{asset}/balances/{owner}`: Balance of a holder.
///
/// # Errors
///
/// Returns [`DexError::InvalidRequest`] on malformed addresses.
#[utoipa::path(
    get,
    path = "/api/v1/assets/{asset}/balances/{owner}",
    tag = "Assets",
    summary = "Get balance",
    params(
        ("asset" = String, Path, description = "Asset address"),
        ("owner" = String, Path, description = "Holder address"),
    ),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
    )
)]
pub async fn balance_of(
    State(state): State<AppState>,
    Path((asset, owner)): Path<(String, String)>,
) -> Result<impl IntoResponse, DexError> {
    let asset = parse_address("asset", &asset)?;
    let owner = parse_address("owner", &owner)?;
    let balance = state.dex_service.balance_of(asset, owner).await;
    Ok(Json(BalanceResponse {
        asset: asset.to_string(),
        owner: owner.to_string(),
        balance: balance.to_string(),
    }))
}

/// `GET /assets/{asset}/allowances/{owner}/{spender}`: Current allowance.
///
/// # Errors
///
/// Returns [`DexError::InvalidRequest`] on malformed addresses.
#[utoipa::path(
    get,
    path = "/api/v1/assets/{asset}/allowances/{owner}/{spender}",
    tag = "Assets",
    summary = "Get allowance",
    params(
        ("asset" = String, Path, description = "Asset address"),
        ("owner" = String, Path, description = "Holder address"),
        ("spender" = String, Path, description = "Spender address"),
    ),
    responses(
        (status = 200, description = "Allowance", body = AllowanceResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
    )
)]
pub async fn allowance(
    State(state): State<AppState>,
    Path((asset, owner, spender)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, DexError> {
    let asset = parse_address("asset", &asset)?;
    let owner = parse_address("owner", &owner)?;
    let spender = parse_address("spender", &spender)?;
    let amount = state.dex_service.allowance(asset, owner, spender).await;
    Ok(Json(AllowanceResponse {
        asset: asset.to_string(),
        owner: owner.to_string(),
        spender: spender.to_string(),
        amount: amount.to_string(),
    }))
}

/// Asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets/{asset}/approve", post(approve))
        .route("/assets/{asset}/balances/{owner}", get(balance_of))
        .route(
            "/assets/{asset}/allowances/{owner}/{spender}",
            get(allowance),
        )
}

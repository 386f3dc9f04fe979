//! Swap and quote endpoint handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{QuoteBody, QuoteResponse, SwapBody, SwapResponse};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::error::{DexError, ErrorResponse};

/// `POST /swap`: Exact-input swap along a path.
///
/// # Errors
///
/// Returns [`DexError`] on invalid parameters, an unroutable path,
/// missing allowance, expiry or slippage.
#[utoipa::path(
    post,
    path = "/api/v1/swap",
    tag = "Swaps",
    summary = "Execute a swap",
    description = "Sells exactly `amount_in` of the first path asset and delivers at least `amount_out_min` of the last one to the recipient.",
    params(
        ("x-caller-address" = String, Header, description = "Identity performing the call"),
    ),
    request_body = SwapBody,
    responses(
        (status = 200, description = "Swap executed", body = SwapResponse),
        (status = 400, description = "Invalid parameters, path or deadline", body = ErrorResponse),
        (status = 422, description = "Slippage exceeded or allowance too low", body = ErrorResponse),
        (status = 502, description = "AMM protocol failure", body = ErrorResponse),
    )
)]
pub async fn execute_swap(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<SwapBody>,
) -> Result<impl IntoResponse, DexError> {
    let req = body.into_request(caller, state.dex_service.default_deadline())?;
    let path = req.path.clone();
    let (swap_id, receipt) = state.dex_service.swap(caller, req).await?;
    Ok(Json(SwapResponse::new(swap_id, &path, &receipt)))
}

/// `POST /swap/quote`: Dry-run a swap (read-only).
///
/// # Errors
///
/// Returns [`DexError`] on invalid parameters or an unroutable path.
#[utoipa::path(
    post,
    path = "/api/v1/swap/quote",
    tag = "Swaps",
    summary = "Get swap quote",
    description = "Returns the amounts a swap would produce against the current reserves. Nothing is modified.",
    request_body = QuoteBody,
    responses(
        (status = 200, description = "Quote computed", body = QuoteResponse),
        (status = 400, description = "Invalid parameters or path", body = ErrorResponse),
    )
)]
pub async fn quote_swap(
    State(state): State<AppState>,
    Json(body): Json<QuoteBody>,
) -> Result<impl IntoResponse, DexError> {
    let (amount_in, path) = body.parse()?;
    let amounts = state.dex_service.quote_swap(amount_in, path).await?;
    Ok(Json(QuoteResponse::new(amount_in, &amounts)))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swap", post(execute_swap))
        .route("/swap/quote", post(quote_swap))
}

//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{admin, asset, liquidity, pair, swap, system};
use crate::error::{ErrorBody, ErrorCategory, ErrorResponse};

/// The REST surface's OpenAPI description.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "dex-wrapper",
        description = "Liquidity-management and swap-routing wrapper in front of an AMM router and pair factory."
    ),
    paths(
        pair::create_pair,
        pair::get_pair,
        liquidity::add_liquidity,
        liquidity::remove_liquidity,
        swap::execute_swap,
        swap::quote_swap,
        asset::approve,
        asset::balance_of,
        asset::allowance,
        admin::transfer_ownership,
        admin::sweep,
        system::health_handler,
        system::deployment_handler,
    ),
    components(schemas(
        dto::AddLiquidityBody,
        dto::AddLiquidityResponse,
        dto::RemoveLiquidityBody,
        dto::RemoveLiquidityResponse,
        dto::SwapBody,
        dto::SwapResponse,
        dto::QuoteBody,
        dto::QuoteResponse,
        dto::PairDetail,
        dto::GetPairResponse,
        dto::CreatePairResponse,
        dto::ApproveBody,
        dto::AllowanceResponse,
        dto::BalanceResponse,
        dto::TransferOwnershipBody,
        dto::TransferOwnershipResponse,
        dto::SweepBody,
        dto::SweepResponse,
        system::HealthResponse,
        system::DeploymentResponse,
        ErrorResponse,
        ErrorBody,
        ErrorCategory,
    )),
    tags(
        (name = "Pair", description = "Pool of the configured assets"),
        (name = "Liquidity", description = "Deposits and withdrawals"),
        (name = "Swaps", description = "Exact-input swaps and quotes"),
        (name = "Assets", description = "Balances and allowances"),
        (name = "Admin", description = "Owner-gated operations"),
        (name = "System", description = "Health and deployment"),
    )
)]
pub struct ApiDoc;

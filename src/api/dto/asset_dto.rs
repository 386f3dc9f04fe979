//! Asset balance and allowance DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /assets/{asset}/approve`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveBody {
    /// Account allowed to spend the caller's asset.
    pub spender: String,
    /// New allowance (string-encoded u128), replacing the previous one.
    pub amount: String,
}

/// Response body for `POST /assets/{asset}/approve` and
/// `GET /assets/{asset}/allowances/{owner}/{spender}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllowanceResponse {
    /// Asset concerned.
    pub asset: String,
    /// Holder of the asset.
    pub owner: String,
    /// Account allowed to spend.
    pub spender: String,
    /// Current allowance (string-encoded).
    pub amount: String,
}

/// Response body for `GET /assets/{asset}/balances/{owner}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Asset concerned.
    pub asset: String,
    /// Holder queried.
    pub owner: String,
    /// Balance (string-encoded).
    pub balance: String,
}

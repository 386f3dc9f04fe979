//! Liquidity operation DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{
    parse_amount, parse_min_amount, parse_recipient, resolve_deadline,
};
use crate::domain::{
    Address, Deadline, LiquidityReceipt, LiquidityRequest, RemoveLiquidityRequest,
    WithdrawalReceipt,
};
use crate::error::DexError;

/// Request body for `POST /liquidity/add`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLiquidityBody {
    /// Most of asset A to deposit (string-encoded u128).
    pub amount_a_desired: String,
    /// Most of asset B to deposit (string-encoded u128).
    pub amount_b_desired: String,
    /// Least of asset A that must be deposited. Defaults to `"0"`.
    #[serde(default)]
    pub amount_a_min: Option<String>,
    /// Least of asset B that must be deposited. Defaults to `"0"`.
    #[serde(default)]
    pub amount_b_min: Option<String>,
    /// Receiver of the pool shares. Defaults to the caller.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Absolute deadline (RFC 3339).
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Deadline as seconds from execution.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl AddLiquidityBody {
    /// Converts the body into a core request on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] for malformed amounts, recipient or
    /// deadline.
    pub fn into_request(
        self,
        caller: Address,
        default_deadline: Deadline,
    ) -> Result<LiquidityRequest, DexError> {
        Ok(LiquidityRequest {
            amount_a_desired: parse_amount("amount_a_desired", &self.amount_a_desired)?,
            amount_b_desired: parse_amount("amount_b_desired", &self.amount_b_desired)?,
            amount_a_min: parse_min_amount("amount_a_min", self.amount_a_min.as_deref())?,
            amount_b_min: parse_min_amount("amount_b_min", self.amount_b_min.as_deref())?,
            recipient: parse_recipient(self.recipient.as_deref(), caller)?,
            deadline: resolve_deadline(self.deadline, self.deadline_secs, default_deadline)?,
        })
    }
}

/// Response body for `POST /liquidity/add`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddLiquidityResponse {
    /// Pool that received the deposit.
    pub pair_id: String,
    /// Asset A deposited (string-encoded).
    pub amount_a: String,
    /// Asset B deposited (string-encoded).
    pub amount_b: String,
    /// Pool shares minted (string-encoded).
    pub liquidity: String,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl From<LiquidityReceipt> for AddLiquidityResponse {
    fn from(receipt: LiquidityReceipt) -> Self {
        Self {
            pair_id: receipt.pair_id.to_string(),
            amount_a: receipt.amount_a.to_string(),
            amount_b: receipt.amount_b.to_string(),
            liquidity: receipt.liquidity.to_string(),
            executed_at: Utc::now(),
        }
    }
}

/// Request body for `POST /liquidity/remove`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveLiquidityBody {
    /// Pool shares to burn (string-encoded u128).
    pub liquidity: String,
    /// Least of asset A to receive. Defaults to `"0"`.
    #[serde(default)]
    pub amount_a_min: Option<String>,
    /// Least of asset B to receive. Defaults to `"0"`.
    #[serde(default)]
    pub amount_b_min: Option<String>,
    /// Receiver of the assets. Defaults to the caller.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Absolute deadline (RFC 3339).
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Deadline as seconds from execution.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl RemoveLiquidityBody {
    /// Converts the body into a core request on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] for malformed fields.
    pub fn into_request(
        self,
        caller: Address,
        default_deadline: Deadline,
    ) -> Result<RemoveLiquidityRequest, DexError> {
        Ok(RemoveLiquidityRequest {
            liquidity: parse_amount("liquidity", &self.liquidity)?,
            amount_a_min: parse_min_amount("amount_a_min", self.amount_a_min.as_deref())?,
            amount_b_min: parse_min_amount("amount_b_min", self.amount_b_min.as_deref())?,
            recipient: parse_recipient(self.recipient.as_deref(), caller)?,
            deadline: resolve_deadline(self.deadline, self.deadline_secs, default_deadline)?,
        })
    }
}

/// Response body for `POST /liquidity/remove`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveLiquidityResponse {
    /// Pool the assets came from.
    pub pair_id: String,
    /// Asset A delivered (string-encoded).
    pub amount_a: String,
    /// Asset B delivered (string-encoded).
    pub amount_b: String,
    /// Pool shares burned (string-encoded).
    pub liquidity_burned: String,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl RemoveLiquidityResponse {
    /// Builds the response from the receipt and the burned share amount.
    #[must_use]
    pub fn new(receipt: WithdrawalReceipt, liquidity_burned: u128) -> Self {
        Self {
            pair_id: receipt.pair_id.to_string(),
            amount_a: receipt.amount_a.to_string(),
            amount_b: receipt.amount_b.to_string(),
            liquidity_burned: liquidity_burned.to_string(),
            executed_at: Utc::now(),
        }
    }
}

//! Swap and quote DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{
    parse_address, parse_amount, parse_min_amount, parse_recipient, resolve_deadline,
};
use crate::domain::{Address, Deadline, SwapReceipt, SwapRequest};
use crate::error::DexError;

/// Request body for `POST /swap`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SwapBody {
    /// Exact input amount of `path[0]` (string-encoded u128).
    pub amount_in: String,
    /// Least output of the last path asset. Defaults to `"0"`.
    #[serde(default)]
    pub amount_out_min: Option<String>,
    /// Asset addresses to route through, input first.
    pub path: Vec<String>,
    /// Receiver of the output. Defaults to the caller.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Absolute deadline (RFC 3339).
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Deadline as seconds from execution.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl SwapBody {
    /// Converts the body into a core request on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] for malformed fields.
    pub fn into_request(
        self,
        caller: Address,
        default_deadline: Deadline,
    ) -> Result<SwapRequest, DexError> {
        Ok(SwapRequest {
            amount_in: parse_amount("amount_in", &self.amount_in)?,
            amount_out_min: parse_min_amount("amount_out_min", self.amount_out_min.as_deref())?,
            path: parse_path(&self.path)?,
            recipient: parse_recipient(self.recipient.as_deref(), caller)?,
            deadline: resolve_deadline(self.deadline, self.deadline_secs, default_deadline)?,
        })
    }
}

/// Response body for `POST /swap`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SwapResponse {
    /// Unique swap identifier.
    pub swap_id: String,
    /// Route taken.
    pub path: Vec<String>,
    /// Input amount taken (string-encoded).
    pub amount_in: String,
    /// Output amount delivered (string-encoded).
    pub amount_out: String,
    /// Amount at every step of the path (string-encoded).
    pub amounts: Vec<String>,
    /// Execution timestamp.
    pub executed_at: DateTime<Utc>,
}

impl SwapResponse {
    /// Builds the response for a committed swap.
    #[must_use]
    pub fn new(swap_id: uuid::Uuid, path: &[Address], receipt: &SwapReceipt) -> Self {
        Self {
            swap_id: swap_id.to_string(),
            path: path.iter().map(ToString::to_string).collect(),
            amount_in: receipt.amount_in.to_string(),
            amount_out: receipt.amount_out.to_string(),
            amounts: receipt.amounts.iter().map(ToString::to_string).collect(),
            executed_at: Utc::now(),
        }
    }
}

/// Request body for `POST /swap/quote`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteBody {
    /// Input amount of `path[0]` (string-encoded u128).
    pub amount_in: String,
    /// Asset addresses to route through, input first.
    pub path: Vec<String>,
}

impl QuoteBody {
    /// Parses the amount and the path.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] for malformed fields.
    pub fn parse(&self) -> Result<(u128, Vec<Address>), DexError> {
        Ok((
            parse_amount("amount_in", &self.amount_in)?,
            parse_path(&self.path)?,
        ))
    }
}

/// Response body for `POST /swap/quote`.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    /// Input amount quoted (string-encoded).
    pub amount_in: String,
    /// Output the swap would deliver now (string-encoded).
    pub amount_out: String,
    /// Amount at every step of the path (string-encoded).
    pub amounts: Vec<String>,
    /// Quote timestamp.
    pub quoted_at: DateTime<Utc>,
}

impl QuoteResponse {
    /// Builds the response from per-hop amounts.
    #[must_use]
    pub fn new(amount_in: u128, amounts: &[u128]) -> Self {
        Self {
            amount_in: amount_in.to_string(),
            amount_out: amounts.last().copied().unwrap_or(0).to_string(),
            amounts: amounts.iter().map(ToString::to_string).collect(),
            quoted_at: Utc::now(),
        }
    }
}

fn parse_path(raw: &[String]) -> Result<Vec<Address>, DexError> {
    raw.iter().map(|hop| parse_address("path", hop)).collect()
}

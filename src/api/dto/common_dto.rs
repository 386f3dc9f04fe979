//! Shared DTO helpers: string-encoded amounts, addresses and deadlines.

use chrono::{DateTime, Utc};

use crate::domain::{Address, Deadline};
use crate::error::DexError;

/// Parses a string-encoded u128 amount.
///
/// # Errors
///
/// [`DexError::InvalidRequest`] naming `field` if `raw` is not a u128.
pub fn parse_amount(field: &str, raw: &str) -> Result<u128, DexError> {
    raw.parse()
        .map_err(|_| DexError::InvalidRequest(format!("invalid {field}: {raw}")))
}

/// Parses an optional string-encoded amount, treating absence as zero.
///
/// # Errors
///
/// [`DexError::InvalidRequest`] naming `field` if present and malformed.
pub fn parse_min_amount(field: &str, raw: Option<&str>) -> Result<u128, DexError> {
    raw.map_or(Ok(0), |raw| parse_amount(field, raw))
}

/// Parses a hex-encoded address.
///
/// # Errors
///
/// [`DexError::InvalidRequest`] naming `field` if `raw` is not an address.
pub fn parse_address(field: &str, raw: &str) -> Result<Address, DexError> {
    raw.parse()
        .map_err(|err| DexError::InvalidRequest(format!("invalid {field}: {err}")))
}

/// Parses an optional recipient, defaulting to the caller.
///
/// # Errors
///
/// [`DexError::InvalidRequest`] if present and malformed.
pub fn parse_recipient(raw: Option<&str>, caller: Address) -> Result<Address, DexError> {
    raw.map_or(Ok(caller), |raw| parse_address("recipient", raw))
}

/// Chooses the request deadline: an absolute instant, a window in
/// seconds, or `default` when neither is given.
///
/// # Errors
///
/// [`DexError::InvalidRequest`] if both forms are given.
pub fn resolve_deadline(
    at: Option<DateTime<Utc>>,
    within_secs: Option<u64>,
    default: Deadline,
) -> Result<Deadline, DexError> {
    match (at, within_secs) {
        (Some(_), Some(_)) => Err(DexError::InvalidRequest(
            "specify either deadline or deadline_secs, not both".to_string(),
        )),
        (Some(at), None) => Ok(Deadline::At(at)),
        (None, Some(secs)) => Ok(Deadline::Within(secs)),
        (None, None) => Ok(default),
    }
}

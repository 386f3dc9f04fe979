//! Caller identity extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::Address;
use crate::error::DexError;

/// Header carrying the identity a request acts as.
pub const CALLER_HEADER: &str = "x-caller-address";

/// The identity performing a request, taken from [`CALLER_HEADER`].
///
/// Plays the role of the transaction sender: every allowance and
/// ownership check is made against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Address);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = DexError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| DexError::InvalidRequest(format!("missing {CALLER_HEADER} header")))?
            .to_str()
            .map_err(|_| DexError::InvalidRequest(format!("{CALLER_HEADER} is not ASCII")))?;
        let caller: Address = raw
            .parse()
            .map_err(|err| DexError::InvalidRequest(format!("{CALLER_HEADER}: {err}")))?;
        if caller.is_zero() {
            return Err(DexError::InvalidRequest(format!(
                "{CALLER_HEADER} must not be zero"
            )));
        }
        Ok(Self(caller))
    }
}

//! Wrapper error types with HTTP status code mapping.
//!
//! [`DexError`] is the single failure type of the core and the service.
//! Each variant carries a numeric code, an HTTP status and an
//! [`ErrorCategory`] telling the caller whether to fix the request, try
//! again later, or stop because the call is not permitted.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Address;
use crate::gateway::AmmGatewayError;
use crate::ledger::LedgerError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "category": "request",
///     "message": "slippage exceeded: insufficient output amount: 9 < 10"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// What the caller should do about it.
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
}

/// Coarse classification of a failure from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request itself must change.
    Request,
    /// The request may succeed if retried later.
    Transient,
    /// The caller is not permitted to do this.
    Forbidden,
}

/// Wrapper error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category      | HTTP Status                     |
/// |-----------|---------------|---------------------------------|
/// | 1000–1999 | Validation    | 400 Bad Request                 |
/// | 2000–2999 | Authorization | 403 Forbidden                   |
/// | 3000–3999 | Server        | 500 / 502                       |
/// | 4000–4999 | Execution     | 422 Unprocessable Entity        |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DexError {
    /// Malformed amounts, addresses or configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Swap path too short, repeating, or with an unroutable hop.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The request's deadline is not after the execution time.
    #[error("deadline expired")]
    DeadlineExpired,

    /// A minimum amount was not met.
    #[error("slippage exceeded: {0}")]
    SlippageExceeded(String),

    /// The caller authorized less than the operation needs.
    #[error("insufficient allowance: {0}")]
    InsufficientAllowance(String),

    /// The caller holds less than the operation needs.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// The caller is not the owner.
    #[error("unauthorized: {0} is not the owner")]
    Unauthorized(Address),

    /// The AMM protocol failed for reasons outside the wrapper's control.
    #[error("external protocol error: {0}")]
    ExternalProtocol(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DexError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidPath(_) => 1002,
            Self::DeadlineExpired => 1003,
            Self::Unauthorized(_) => 2003,
            Self::Internal(_) => 3000,
            Self::ExternalProtocol(_) => 3002,
            Self::SlippageExceeded(_) => 4001,
            Self::InsufficientAllowance(_) => 4002,
            Self::InsufficientBalance(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidPath(_) | Self::DeadlineExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::SlippageExceeded(_)
            | Self::InsufficientAllowance(_)
            | Self::InsufficientBalance(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExternalProtocol(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the caller-facing category for this variant.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized(_) => ErrorCategory::Forbidden,
            Self::ExternalProtocol(_) | Self::Internal(_) => ErrorCategory::Transient,
            _ => ErrorCategory::Request,
        }
    }
}

impl From<AmmGatewayError> for DexError {
    fn from(err: AmmGatewayError) -> Self {
        if err.is_minimum_not_met() {
            return Self::SlippageExceeded(err.to_string());
        }
        match err {
            AmmGatewayError::Expired => Self::DeadlineExpired,
            AmmGatewayError::Ledger(inner) => inner.into(),
            other => Self::ExternalProtocol(other.to_string()),
        }
    }
}

impl From<LedgerError> for DexError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientAllowance { .. } => {
                Self::InsufficientAllowance(err.to_string())
            }
            LedgerError::InsufficientBalance { .. } => Self::InsufficientBalance(err.to_string()),
            LedgerError::Overflow(_) => Self::ExternalProtocol(err.to_string()),
        }
    }
}

impl IntoResponse for DexError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                category: self.category(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

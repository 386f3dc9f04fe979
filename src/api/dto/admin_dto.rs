//! Owner-gated administration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /admin/ownership`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferOwnershipBody {
    /// Address of the next owner.
    pub new_owner: String,
}

/// Response body for `POST /admin/ownership`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferOwnershipResponse {
    /// Owner before the call.
    pub previous_owner: String,
    /// Owner after the call.
    pub new_owner: String,
}

/// Request body for `POST /admin/sweep`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SweepBody {
    /// Asset to recover from the wrapper's custody.
    pub asset: String,
    /// Receiver of the recovered asset.
    pub to: String,
    /// Amount to move (string-encoded). The whole custody balance when
    /// absent.
    #[serde(default)]
    pub amount: Option<String>,
}

/// Response body for `POST /admin/sweep`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    /// Asset recovered.
    pub asset: String,
    /// Receiver.
    pub to: String,
    /// Amount moved (string-encoded).
    pub amount: String,
}

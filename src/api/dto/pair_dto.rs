//! Pair DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::gateway::PairSnapshot;
use crate::wrapper::PairResolution;

/// Pool of the configured assets as reported by the gateway.
#[derive(Debug, Serialize, ToSchema)]
pub struct PairDetail {
    /// Pair identifier, also the pool-share asset address.
    pub pair_id: String,
    /// Lower-sorted asset.
    pub token0: String,
    /// Higher-sorted asset.
    pub token1: String,
    /// Reserve of `token0` (string-encoded).
    pub reserve0: String,
    /// Reserve of `token1` (string-encoded).
    pub reserve1: String,
    /// Whether the pool has received its first deposit.
    pub seeded: bool,
    /// Pool shares outstanding (string-encoded).
    pub total_shares: String,
    /// Swaps executed against the pool.
    pub swap_count: u64,
    /// Cumulative input volume (string-encoded).
    pub total_volume: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PairSnapshot> for PairDetail {
    fn from(snap: PairSnapshot) -> Self {
        Self {
            pair_id: snap.pair_id.to_string(),
            token0: snap.token0.to_string(),
            token1: snap.token1.to_string(),
            reserve0: snap.reserve0.to_string(),
            reserve1: snap.reserve1.to_string(),
            seeded: snap.seeded,
            total_shares: snap.total_shares.to_string(),
            swap_count: snap.swap_count,
            total_volume: snap.total_volume.to_string(),
            created_at: snap.created_at,
        }
    }
}

/// Response body for `GET /pair`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GetPairResponse {
    /// Pair identifier, `null` while no pool exists.
    pub pair_id: Option<String>,
    /// Pool details, `null` while no pool exists.
    pub pair: Option<PairDetail>,
}

/// Response body for `POST /pair`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePairResponse {
    /// Pair identifier.
    pub pair_id: String,
    /// Whether this call created the pool.
    pub created: bool,
}

impl From<PairResolution> for CreatePairResponse {
    fn from(resolution: PairResolution) -> Self {
        Self {
            pair_id: resolution.pair_id.to_string(),
            created: resolution.created,
        }
    }
}

//! Domain events reflecting committed wrapper operations.
//!
//! Every committed mutation emits a [`DexEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, PairId};

/// Coarse event category used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTopic {
    /// Pair resolution and creation.
    Pair,
    /// Liquidity deposits and withdrawals.
    Liquidity,
    /// Swaps.
    Swap,
    /// Allowance changes made through the surface.
    Asset,
    /// Owner-gated operations.
    Admin,
}

impl EventTopic {
    /// Every topic, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pair,
        Self::Liquidity,
        Self::Swap,
        Self::Asset,
        Self::Admin,
    ];

    /// Topic name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "pair",
            Self::Liquidity => "liquidity",
            Self::Swap => "swap",
            Self::Asset => "asset",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {s}"))
    }
}

/// Domain event emitted after every committed operation.
///
/// Amounts are string-encoded to preserve u128 precision in JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DexEvent {
    /// The wrapper's pair became known, either found or freshly created.
    PairResolved {
        /// Resolved pair.
        pair_id: PairId,
        /// Whether this call created the pool.
        created: bool,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Both configured assets were deposited.
    LiquidityAdded {
        /// Pool that received the deposit.
        pair_id: PairId,
        /// Caller that supplied the assets.
        provider: Address,
        /// Receiver of the pool shares.
        recipient: Address,
        /// Asset A deposited.
        amount_a: String,
        /// Asset B deposited.
        amount_b: String,
        /// Pool shares minted.
        liquidity: String,
        /// Execution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Pool shares were burned for both configured assets.
    LiquidityRemoved {
        /// Pool the assets came from.
        pair_id: PairId,
        /// Caller that supplied the shares.
        provider: Address,
        /// Receiver of the assets.
        recipient: Address,
        /// Pool shares burned.
        liquidity: String,
        /// Asset A returned.
        amount_a: String,
        /// Asset B returned.
        amount_b: String,
        /// Execution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A swap completed.
    Swapped {
        /// Correlation identifier of the swap.
        swap_id: String,
        /// Caller that sold the input asset.
        trader: Address,
        /// Receiver of the output asset.
        recipient: Address,
        /// Route taken.
        path: Vec<Address>,
        /// Input amount.
        amount_in: String,
        /// Output amount.
        amount_out: String,
        /// Execution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An allowance was set through the surface.
    Approval {
        /// Asset concerned.
        asset: Address,
        /// Holder granting the allowance.
        owner: Address,
        /// Account allowed to spend.
        spender: Address,
        /// New allowance.
        amount: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Wrapper ownership changed hands.
    OwnershipTransferred {
        /// Previous owner.
        previous_owner: Address,
        /// New owner.
        new_owner: Address,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner recovered assets held in the wrapper's custody.
    Swept {
        /// Asset recovered.
        asset: Address,
        /// Receiver of the assets.
        to: Address,
        /// Amount recovered.
        amount: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl DexEvent {
    /// Returns the subscription topic of this event.
    #[must_use]
    pub const fn topic(&self) -> EventTopic {
        match self {
            Self::PairResolved { .. } => EventTopic::Pair,
            Self::LiquidityAdded { .. } | Self::LiquidityRemoved { .. } => EventTopic::Liquidity,
            Self::Swapped { .. } => EventTopic::Swap,
            Self::Approval { .. } => EventTopic::Asset,
            Self::OwnershipTransferred { .. } | Self::Swept { .. } => EventTopic::Admin,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PairResolved { .. } => "pair_resolved",
            Self::LiquidityAdded { .. } => "liquidity_added",
            Self::LiquidityRemoved { .. } => "liquidity_removed",
            Self::Swapped { .. } => "swapped",
            Self::Approval { .. } => "approval",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::Swept { .. } => "swept",
        }
    }
}

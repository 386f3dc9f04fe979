//! Pair storage for the in-process gateway.
//!
//! [`PairBook`] maps each [`PairId`] to a [`PairEntry`]: the reserves
//! held in the pair's custody, the outstanding shares and some
//! operational metadata. The whole book is `Clone` so the gateway
//! can stage a multi-hop swap on a copy and commit it in one step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hydra_amm::domain::{FeeTier, Token, TokenPair};

use super::AmmGatewayError;
use crate::domain::{Address, PairId};

/// A pair known to the factory.
///
/// `token0`/`token1` are the pair's assets in canonical (sorted) order,
/// matching `token_pair.first()`/`second()`. The pool is seeded once
/// shares are outstanding.
#[derive(Debug, Clone)]
pub struct PairEntry {
    /// Pair identifier, also the custody and share-token address.
    pub pair_id: PairId,

    /// Engine token pair.
    pub token_pair: TokenPair,

    /// Lower-ordered asset.
    pub token0: Address,

    /// Higher-ordered asset.
    pub token1: Address,

    /// Swap fee charged on the input of every hop.
    pub fee: FeeTier,

    /// Pool shares outstanding.
    pub total_shares: u128,

    /// Units of `token0` held by the pair.
    pub reserve0: u128,

    /// Units of `token1` held by the pair.
    pub reserve1: u128,

    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last state change.
    pub last_modified_at: DateTime<Utc>,

    /// Number of swap hops routed through this pair.
    pub swap_count: u64,

    /// Cumulative input volume of those hops.
    pub total_volume: u128,
}

impl PairEntry {
    /// Creates an empty entry for `token_pair`.
    #[must_use]
    pub fn new(
        pair_id: PairId,
        token_pair: TokenPair,
        token0: Address,
        token1: Address,
        fee: FeeTier,
    ) -> Self {
        let now = Utc::now();
        Self {
            pair_id,
            token_pair,
            token0,
            token1,
            fee,
            total_shares: 0,
            reserve0: 0,
            reserve1: 0,
            created_at: now,
            last_modified_at: now,
            swap_count: 0,
            total_volume: 0,
        }
    }

    /// Returns `true` once a deposit has minted shares.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.total_shares > 0
    }

    /// Returns `true` if `asset` is one side of this pair.
    #[must_use]
    pub fn contains(&self, asset: Address) -> bool {
        asset == self.token0 || asset == self.token1
    }

    /// Engine token for `asset`, if it belongs to this pair.
    #[must_use]
    pub fn token(&self, asset: Address) -> Option<Token> {
        if asset == self.token0 {
            Some(self.token_pair.first())
        } else if asset == self.token1 {
            Some(self.token_pair.second())
        } else {
            None
        }
    }

    /// Reserves ordered as `(reserve of asset, reserve of the other side)`.
    #[must_use]
    pub fn reserves_for(&self, asset: Address) -> (u128, u128) {
        if asset == self.token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    /// Adds `amount_in` of `asset` to its reserve and removes `amount_out`
    /// from the other side.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError::InsufficientLiquidity`] if the other side holds
    /// less than `amount_out`, [`AmmGatewayError::Overflow`] if the
    /// reserve would overflow.
    pub fn apply_trade(
        &mut self,
        asset: Address,
        amount_in: u128,
        amount_out: u128,
    ) -> Result<(), AmmGatewayError> {
        let (reserve_in, reserve_out) = if asset == self.token0 {
            (&mut self.reserve0, &mut self.reserve1)
        } else {
            (&mut self.reserve1, &mut self.reserve0)
        };
        let new_in = reserve_in
            .checked_add(amount_in)
            .ok_or(AmmGatewayError::Overflow)?;
        let new_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(AmmGatewayError::InsufficientLiquidity)?;
        *reserve_in = new_in;
        *reserve_out = new_out;
        self.last_modified_at = Utc::now();
        Ok(())
    }
}

/// Read-only view of a pair for the external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSnapshot {
    /// Pair identifier.
    pub pair_id: PairId,
    /// Lower-ordered asset.
    pub token0: Address,
    /// Higher-ordered asset.
    pub token1: Address,
    /// Reserve of `token0`.
    pub reserve0: u128,
    /// Reserve of `token1`.
    pub reserve1: u128,
    /// Whether the pool has been seeded.
    pub seeded: bool,
    /// Pool shares outstanding.
    pub total_shares: u128,
    /// Swap hops routed through the pair.
    pub swap_count: u64,
    /// Cumulative input volume.
    pub total_volume: u128,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&PairEntry> for PairSnapshot {
    fn from(entry: &PairEntry) -> Self {
        Self {
            pair_id: entry.pair_id,
            token0: entry.token0,
            token1: entry.token1,
            reserve0: entry.reserve0,
            reserve1: entry.reserve1,
            seeded: entry.is_seeded(),
            total_shares: entry.total_shares,
            swap_count: entry.swap_count,
            total_volume: entry.total_volume,
            created_at: entry.created_at,
        }
    }
}

/// Every pair created by one factory.
#[derive(Debug, Clone, Default)]
pub struct PairBook {
    pairs: HashMap<PairId, PairEntry>,
}

impl PairBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError::PairExists`] if the identifier is taken.
    pub fn insert(&mut self, entry: PairEntry) -> Result<PairId, AmmGatewayError> {
        let pair_id = entry.pair_id;
        if self.pairs.contains_key(&pair_id) {
            return Err(AmmGatewayError::PairExists(pair_id));
        }
        self.pairs.insert(pair_id, entry);
        Ok(pair_id)
    }

    /// Returns `true` if the book holds `pair_id`.
    #[must_use]
    pub fn contains(&self, pair_id: PairId) -> bool {
        self.pairs.contains_key(&pair_id)
    }

    /// Shared access to an entry.
    #[must_use]
    pub fn get(&self, pair_id: PairId) -> Option<&PairEntry> {
        self.pairs.get(&pair_id)
    }

    /// Exclusive access to an entry.
    pub fn get_mut(&mut self, pair_id: PairId) -> Option<&mut PairEntry> {
        self.pairs.get_mut(&pair_id)
    }

    /// Replaces the entry stored under the entry's identifier.
    pub fn put(&mut self, entry: PairEntry) {
        self.pairs.insert(entry.pair_id, entry);
    }

    /// Snapshots of every pair, ordered by identifier.
    #[must_use]
    pub fn snapshots(&self) -> Vec<PairSnapshot> {
        let mut list: Vec<PairSnapshot> = self.pairs.values().map(PairSnapshot::from).collect();
        list.sort_by_key(|s| s.pair_id);
        list
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no pair exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

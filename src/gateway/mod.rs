//! AMM gateway capability.
//!
//! The wrapper never prices or stores pools itself. It reaches the
//! external protocol only through the [`AmmRouter`] and [`AmmFactory`]
//! traits defined here. [`HydraGateway`] is the in-process protocol this
//! service ships with: constant-product pairs priced in [`curve`] with
//! `hydra-amm` fee tiers and token pairs.

pub mod curve;
pub mod hydra;
pub mod pair_book;

pub use hydra::HydraGateway;
pub use pair_book::{PairBook, PairEntry, PairSnapshot};

use chrono::{DateTime, Utc};

use crate::domain::{Address, PairId};
use crate::ledger::{AssetLedger, LedgerError};

/// Failure reported by the external protocol.
#[derive(Debug, thiserror::Error)]
pub enum AmmGatewayError {
    /// The call's deadline is not after the execution time.
    #[error("transaction expired")]
    Expired,

    /// Both sides of a pair are the same asset.
    #[error("identical assets")]
    IdenticalAssets,

    /// One side of a pair is the zero address.
    #[error("zero address")]
    ZeroAddress,

    /// The factory already holds a pool for the pair.
    #[error("pair {0} already exists")]
    PairExists(PairId),

    /// No pool exists for the two assets.
    #[error("no pair for {0} and {1}")]
    PairNotFound(Address, Address),

    /// The swap path is too short or repeats an asset in a hop.
    #[error("invalid path")]
    InvalidPath,

    /// Less of the first asset would be used or returned than the minimum.
    #[error("insufficient A amount: {actual} < {minimum}")]
    InsufficientAAmount {
        /// Amount the pool would use or return.
        actual: u128,
        /// Caller's minimum.
        minimum: u128,
    },

    /// Less of the second asset would be used or returned than the minimum.
    #[error("insufficient B amount: {actual} < {minimum}")]
    InsufficientBAmount {
        /// Amount the pool would use or return.
        actual: u128,
        /// Caller's minimum.
        minimum: u128,
    },

    /// A swap would return less than the minimum output.
    #[error("insufficient output amount: {actual} < {minimum}")]
    InsufficientOutputAmount {
        /// Output the path would produce.
        actual: u128,
        /// Caller's minimum.
        minimum: u128,
    },

    /// The pool cannot serve the request with its reserves or shares.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Pool arithmetic exceeded `u128`.
    #[error("arithmetic overflow")]
    Overflow,

    /// An asset movement failed.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// An engine type rejected its input.
    #[error("engine: {0}")]
    Engine(#[from] hydra_amm::error::AmmError),
}

impl AmmGatewayError {
    /// Returns `true` for failures caused by a caller-supplied minimum
    /// not being met.
    #[must_use]
    pub const fn is_minimum_not_met(&self) -> bool {
        matches!(
            self,
            Self::InsufficientAAmount { .. }
                | Self::InsufficientBAmount { .. }
                | Self::InsufficientOutputAmount { .. }
        )
    }
}

/// Arguments of [`AmmRouter::add_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddLiquidityArgs {
    /// First asset, in caller order.
    pub token_a: Address,
    /// Second asset, in caller order.
    pub token_b: Address,
    /// Most of `token_a` to deposit.
    pub amount_a_desired: u128,
    /// Most of `token_b` to deposit.
    pub amount_b_desired: u128,
    /// Least of `token_a` to deposit.
    pub amount_a_min: u128,
    /// Least of `token_b` to deposit.
    pub amount_b_min: u128,
    /// Receiver of the pool shares.
    pub to: Address,
    /// Absolute expiry.
    pub deadline: DateTime<Utc>,
}

/// Arguments of [`AmmRouter::remove_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveLiquidityArgs {
    /// First asset, in caller order.
    pub token_a: Address,
    /// Second asset, in caller order.
    pub token_b: Address,
    /// Pool shares to burn.
    pub liquidity: u128,
    /// Least of `token_a` to receive.
    pub amount_a_min: u128,
    /// Least of `token_b` to receive.
    pub amount_b_min: u128,
    /// Receiver of the withdrawn assets.
    pub to: Address,
    /// Absolute expiry.
    pub deadline: DateTime<Utc>,
}

/// Arguments of [`AmmRouter::swap_exact_tokens_for_tokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapArgs {
    /// Exact amount of `path[0]` to sell.
    pub amount_in: u128,
    /// Least amount of the last asset to receive.
    pub amount_out_min: u128,
    /// Assets to route through.
    pub path: Vec<Address>,
    /// Receiver of the output.
    pub to: Address,
    /// Absolute expiry.
    pub deadline: DateTime<Utc>,
}

/// Pool factory side of the protocol.
pub trait AmmFactory {
    /// Address identifying this factory.
    fn factory_address(&self) -> Address;

    /// Looks up the pool for `a` and `b` in either order.
    fn get_pair(&self, a: Address, b: Address) -> Option<PairId>;

    /// Creates an empty pool for `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError::IdenticalAssets`] or
    /// [`AmmGatewayError::PairExists`].
    fn create_pair(&mut self, a: Address, b: Address) -> Result<PairId, AmmGatewayError>;
}

/// Router side of the protocol.
///
/// Every call moves assets on behalf of `sender` through `ledger`, using
/// allowances `sender` granted to [`AmmRouter::router_address`].
pub trait AmmRouter {
    /// Address the router spends allowances as.
    fn router_address(&self) -> Address;

    /// Deposits both assets, returning `(amount_a, amount_b, liquidity)`.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError`] on expiry, unmet minimums, ledger failure or
    /// engine failure. Nothing changes on error.
    fn add_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: AddLiquidityArgs,
    ) -> Result<(u128, u128, u128), AmmGatewayError>;

    /// Burns shares for both assets, returning `(amount_a, amount_b)`.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError`] on expiry, unknown pair, unmet minimums,
    /// ledger failure or engine failure. Nothing changes on error.
    fn remove_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: RemoveLiquidityArgs,
    ) -> Result<(u128, u128), AmmGatewayError>;

    /// Sells exactly `amount_in` along `path`, returning the amount at
    /// every step with the input first.
    ///
    /// # Errors
    ///
    /// [`AmmGatewayError`] on expiry, bad path, unmet minimum, ledger
    /// failure or engine failure. Nothing changes on error.
    fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: SwapArgs,
    ) -> Result<Vec<u128>, AmmGatewayError>;
}

/// Full protocol: router and factory.
pub trait AmmGateway: AmmRouter + AmmFactory {}

impl<T: AmmRouter + AmmFactory> AmmGateway for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_not_met_kinds() {
        assert!(
            AmmGatewayError::InsufficientAAmount {
                actual: 80,
                minimum: 90
            }
            .is_minimum_not_met()
        );
        assert!(
            AmmGatewayError::InsufficientOutputAmount {
                actual: 9,
                minimum: 10
            }
            .is_minimum_not_met()
        );
        assert!(!AmmGatewayError::Expired.is_minimum_not_met());
        assert!(!AmmGatewayError::InsufficientLiquidity.is_minimum_not_met());
    }
}

//! Requests accepted by the wrapper and the receipts it returns.
//!
//! All amounts are raw units of the respective asset.

use serde::Serialize;

use super::{Address, Deadline, PairId};

/// Deposit of both configured assets into their pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityRequest {
    /// Most of asset A the caller is willing to deposit.
    pub amount_a_desired: u128,
    /// Most of asset B the caller is willing to deposit.
    pub amount_b_desired: u128,
    /// Least of asset A that must be deposited.
    pub amount_a_min: u128,
    /// Least of asset B that must be deposited.
    pub amount_b_min: u128,
    /// Receiver of the minted pool shares.
    pub recipient: Address,
    /// Expiry of the request.
    pub deadline: Deadline,
}

/// Withdrawal of both configured assets by burning pool shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityRequest {
    /// Pool shares to burn.
    pub liquidity: u128,
    /// Least of asset A that must be returned.
    pub amount_a_min: u128,
    /// Least of asset B that must be returned.
    pub amount_b_min: u128,
    /// Receiver of the withdrawn assets.
    pub recipient: Address,
    /// Expiry of the request.
    pub deadline: Deadline,
}

/// Exact-input exchange along an explicit asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Exact amount of `path[0]` to sell.
    pub amount_in: u128,
    /// Least amount of the last path asset to receive.
    pub amount_out_min: u128,
    /// Assets to route through, input first and output last.
    pub path: Vec<Address>,
    /// Receiver of the output asset.
    pub recipient: Address,
    /// Expiry of the request.
    pub deadline: Deadline,
}

/// Outcome of a successful deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityReceipt {
    /// Pool the deposit went into.
    pub pair_id: PairId,
    /// Asset A actually deposited.
    pub amount_a: u128,
    /// Asset B actually deposited.
    pub amount_b: u128,
    /// Pool shares minted to the recipient.
    pub liquidity: u128,
}

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalReceipt {
    /// Pool the withdrawal came from.
    pub pair_id: PairId,
    /// Asset A delivered to the recipient.
    pub amount_a: u128,
    /// Asset B delivered to the recipient.
    pub amount_b: u128,
}

/// Outcome of a successful swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    /// Input amount taken from the caller.
    pub amount_in: u128,
    /// Output amount delivered to the recipient.
    pub amount_out: u128,
    /// Amount at every step of the path, input first.
    pub amounts: Vec<u128>,
}

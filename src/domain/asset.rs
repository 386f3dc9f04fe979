//! Handles to the fungible assets the wrapper trades and pools.

use std::fmt;

use hydra_amm::domain::{Decimals, Token};

use super::Address;

/// Reference to a fungible, transferable asset.
///
/// Immutable once configured. Balances and allowances are not held
/// here; they live behind the [`crate::ledger::AssetLedger`] capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    address: Address,
    decimals: Decimals,
}

impl AssetHandle {
    /// Creates a handle for the asset at `address`.
    #[must_use]
    pub const fn new(address: Address, decimals: Decimals) -> Self {
        Self { address, decimals }
    }

    /// Address of the asset.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Decimal places of the asset's smallest unit.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Converts to the AMM engine's token identity.
    #[must_use]
    pub fn to_token(&self) -> Token {
        Token::new(self.address.to_token_address(), self.decimals)
    }

    /// Converts a whole-token amount to raw units, e.g. `100` tokens at
    /// 18 decimals becomes `100 * 10^18`.
    #[must_use]
    pub fn units(&self, whole: u64) -> u128 {
        self.decimals.scale_up(whole)
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

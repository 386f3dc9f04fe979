//! Asset transfer interface.
//!
//! [`AssetLedger`] is the capability through which the wrapper and the
//! AMM gateway move fungible assets: owner-scoped balances and
//! spender-scoped allowances, with standard transfer semantics. The
//! trait is object-safe so gateways can receive it as `&mut dyn`.

pub mod journal;
pub mod memory;

pub use journal::Journal;
pub use memory::InMemoryLedger;

use crate::domain::Address;

/// Failure of a ledger primitive. A failed call changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The holder's balance does not cover the amount.
    #[error("insufficient balance of {asset} for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        /// Asset concerned.
        asset: Address,
        /// Holder whose balance is short.
        owner: Address,
        /// Amount requested.
        needed: u128,
        /// Balance available.
        available: u128,
    },

    /// The spender's allowance does not cover the amount.
    #[error("insufficient allowance of {asset} from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        /// Asset concerned.
        asset: Address,
        /// Holder who granted the allowance.
        owner: Address,
        /// Account trying to spend.
        spender: Address,
        /// Amount requested.
        needed: u128,
        /// Allowance available.
        available: u128,
    },

    /// A balance or supply would exceed `u128::MAX`.
    #[error("arithmetic overflow on {0}")]
    Overflow(Address),
}

/// Fungible asset balances and allowances.
///
/// Conserves total supply across transfers and never truncates silently.
pub trait AssetLedger {
    /// Balance of `owner` in `asset`.
    fn balance_of(&self, asset: Address, owner: Address) -> u128;

    /// Amount of `owner`'s `asset` that `spender` may move.
    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> u128;

    /// Total outstanding supply of `asset`.
    fn total_supply(&self, asset: Address) -> u128;

    /// Sets `spender`'s allowance over `owner`'s `asset` to `amount`.
    ///
    /// # Errors
    ///
    /// Implementations may reject the grant; the in-memory ledger never does.
    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if `from` holds too little.
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` of `from`'s `asset` to `to` on behalf of `spender`,
    /// consuming allowance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientAllowance`] or
    /// [`LedgerError::InsufficientBalance`].
    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Issues `amount` of `asset` to `to`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] if supply or balance would overflow.
    fn mint(&mut self, asset: Address, to: Address, amount: u128) -> Result<(), LedgerError>;

    /// Destroys `amount` of `from`'s `asset`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if `from` holds too little.
    fn burn(&mut self, asset: Address, from: Address, amount: u128) -> Result<(), LedgerError>;
}

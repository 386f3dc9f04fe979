//! Owner-gated administration.

use super::{CallEnv, WrapperState};
use crate::domain::Address;
use crate::error::DexError;

impl WrapperState {
    /// Fails unless `caller` is the owner.
    ///
    /// # Errors
    ///
    /// [`DexError::Unauthorized`] for any other identity.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), DexError> {
        if caller != self.owner {
            tracing::debug!(%caller, owner = %self.owner, "owner check failed");
            return Err(DexError::Unauthorized(caller));
        }
        Ok(())
    }

    /// Hands ownership to `new_owner`, returning the previous owner.
    ///
    /// # Errors
    ///
    /// [`DexError::Unauthorized`] if `caller` is not the owner,
    /// [`DexError::InvalidRequest`] if `new_owner` is zero.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, DexError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(DexError::InvalidRequest("new owner must not be zero".to_string()));
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        tracing::info!(%previous, %new_owner, "ownership transferred");
        Ok(previous)
    }

    /// Moves assets stranded in the wrapper's custody to `to`.
    ///
    /// `amount` of `None` sweeps the whole balance. Returns the amount
    /// moved.
    ///
    /// # Errors
    ///
    /// [`DexError::Unauthorized`] if the caller is not the owner,
    /// [`DexError::InvalidRequest`] for a zero recipient,
    /// [`DexError::InsufficientBalance`] if the wrapper holds less than
    /// `amount`.
    pub fn sweep(
        &self,
        env: &mut CallEnv<'_>,
        asset: Address,
        to: Address,
        amount: Option<u128>,
    ) -> Result<u128, DexError> {
        self.ensure_owner(env.caller)?;
        if to.is_zero() {
            return Err(DexError::InvalidRequest("recipient must not be zero".to_string()));
        }
        let held = env.ledger.balance_of(asset, self.address);
        let amount = amount.unwrap_or(held);
        if amount > 0 {
            env.ledger.transfer(asset, self.address, to, amount)?;
        }
        tracing::info!(%asset, %to, amount, "custody swept");
        Ok(amount)
    }
}

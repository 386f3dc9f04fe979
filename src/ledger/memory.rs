//! `HashMap`-backed ledger.

use std::collections::HashMap;

use super::{AssetLedger, LedgerError};
use crate::domain::Address;

/// In-process ledger holding every asset in one place.
///
/// Unknown assets simply have zero supply and zero balances. Cloning
/// produces an independent snapshot, which is how the service layer
/// gets all-or-nothing execution.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(Address, Address), u128>,
    allowances: HashMap<(Address, Address, Address), u128>,
    supplies: HashMap<Address, u128>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn debit(&mut self, asset: Address, owner: Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, owner);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                asset,
                owner,
                needed: amount,
                available,
            })?;
        self.set_balance(asset, owner, remaining);
        Ok(())
    }

    fn credit(&mut self, asset: Address, owner: Address, amount: u128) -> Result<(), LedgerError> {
        let updated = self
            .balance_of(asset, owner)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(asset))?;
        self.set_balance(asset, owner, updated);
        Ok(())
    }

    fn set_balance(&mut self, asset: Address, owner: Address, amount: u128) {
        if amount == 0 {
            self.balances.remove(&(asset, owner));
        } else {
            self.balances.insert((asset, owner), amount);
        }
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: Address, owner: Address) -> u128 {
        self.balances.get(&(asset, owner)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self, asset: Address) -> u128 {
        self.supplies.get(&asset).copied().unwrap_or(0)
    }

    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            self.allowances.remove(&(asset, owner, spender));
        } else {
            self.allowances.insert((asset, owner, spender), amount);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if from == to {
            let available = self.balance_of(asset, from);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    asset,
                    owner: from,
                    needed: amount,
                    available,
                });
            }
            return Ok(());
        }
        // Check the credit side first so a failure leaves both balances alone.
        self.balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(asset))?;
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(asset, from, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                needed: amount,
                available,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.approve(asset, from, spender, available - amount)
    }

    fn mint(&mut self, asset: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(asset))?;
        self.credit(asset, to, amount)?;
        self.supplies.insert(asset, supply);
        Ok(())
    }

    fn burn(&mut self, asset: Address, from: Address, amount: u128) -> Result<(), LedgerError> {
        self.debit(asset, from, amount)?;
        let supply = self.total_supply(asset).saturating_sub(amount);
        self.supplies.insert(asset, supply);
        Ok(())
    }
}

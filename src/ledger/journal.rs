//! Undo log over another ledger.
//!
//! [`Journal`] forwards every call to the ledger it wraps and records how
//! to reverse each successful mutation. [`Journal::rollback`] replays the
//! reversals newest first, which restores every balance, allowance and
//! supply the journaled calls touched. [`Journal::commit`] keeps them.

use std::fmt;

use super::{AssetLedger, LedgerError};
use crate::domain::Address;

#[derive(Debug, Clone, Copy)]
enum Undo {
    Move {
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    Allowance {
        asset: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    },
    Mint {
        asset: Address,
        to: Address,
        amount: u128,
    },
    Burn {
        asset: Address,
        from: Address,
        amount: u128,
    },
}

/// A ledger view whose mutations can be reverted as a unit.
pub struct Journal<'a> {
    inner: &'a mut dyn AssetLedger,
    undo: Vec<Undo>,
}

impl<'a> Journal<'a> {
    /// Starts an empty journal over `inner`.
    pub fn new(inner: &'a mut dyn AssetLedger) -> Self {
        Self {
            inner,
            undo: Vec::new(),
        }
    }

    /// Number of recorded mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Keeps every journaled mutation.
    pub fn commit(self) {
        tracing::trace!(mutations = self.undo.len(), "journal committed");
    }

    /// Reverts every journaled mutation, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the first reversal the inner ledger rejects. That only
    /// happens if the inner ledger was changed behind the journal.
    pub fn rollback(self) -> Result<(), LedgerError> {
        let Self { inner, undo } = self;
        tracing::debug!(mutations = undo.len(), "rolling back journal");
        for step in undo.into_iter().rev() {
            match step {
                Undo::Move {
                    asset,
                    from,
                    to,
                    amount,
                } => inner.transfer(asset, from, to, amount)?,
                Undo::Allowance {
                    asset,
                    owner,
                    spender,
                    amount,
                } => inner.approve(asset, owner, spender, amount)?,
                Undo::Mint { asset, to, amount } => inner.mint(asset, to, amount)?,
                Undo::Burn { asset, from, amount } => inner.burn(asset, from, amount)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Journal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("undo", &self.undo)
            .finish_non_exhaustive()
    }
}

impl AssetLedger for Journal<'_> {
    fn balance_of(&self, asset: Address, owner: Address) -> u128 {
        self.inner.balance_of(asset, owner)
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> u128 {
        self.inner.allowance(asset, owner, spender)
    }

    fn total_supply(&self, asset: Address) -> u128 {
        self.inner.total_supply(asset)
    }

    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let previous = self.inner.allowance(asset, owner, spender);
        self.inner.approve(asset, owner, spender, amount)?;
        self.undo.push(Undo::Allowance {
            asset,
            owner,
            spender,
            amount: previous,
        });
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.inner.transfer(asset, from, to, amount)?;
        self.undo.push(Undo::Move {
            asset,
            from: to,
            to: from,
            amount,
        });
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let previous = self.inner.allowance(asset, from, spender);
        self.inner.transfer_from(asset, spender, from, to, amount)?;
        self.undo.push(Undo::Allowance {
            asset,
            owner: from,
            spender,
            amount: previous,
        });
        self.undo.push(Undo::Move {
            asset,
            from: to,
            to: from,
            amount,
        });
        Ok(())
    }

    fn mint(&mut self, asset: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.mint(asset, to, amount)?;
        self.undo.push(Undo::Burn {
            asset,
            from: to,
            amount,
        });
        Ok(())
    }

    fn burn(&mut self, asset: Address, from: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.burn(asset, from, amount)?;
        self.undo.push(Undo::Mint {
            asset,
            to: from,
            amount,
        });
        Ok(())
    }
}

//! In-process AMM protocol over constant-product pairs.
//!
//! Router semantics follow the classic two-asset router: the first
//! deposit fixes the price, later deposits are trimmed to the pool ratio,
//! withdrawals pay out pro rata to share supply, and swaps route the
//! output of each hop straight into the next pool. Every call is checked
//! against the ledger before the first asset moves and works on a copy
//! of the touched pairs that is committed only on success.

use chrono::{DateTime, Utc};
use hydra_amm::domain::{BasisPoints, Decimals, FeeTier, Token, TokenPair};

use super::curve::{amount_out, mul_div, shares_for_deposit};
use super::pair_book::{PairBook, PairEntry, PairSnapshot};
use super::{
    AddLiquidityArgs, AmmFactory, AmmGatewayError, AmmRouter, RemoveLiquidityArgs, SwapArgs,
};
use crate::domain::{Address, PairId};
use crate::ledger::{AssetLedger, LedgerError};

/// Router and factory over constant-product pairs.
///
/// Each pair's custody account and share token live at
/// [`PairId::address`].
#[derive(Debug, Clone)]
pub struct HydraGateway {
    router: Address,
    factory: Address,
    fee: FeeTier,
    pairs: PairBook,
}

impl HydraGateway {
    /// Creates a gateway with no pairs.
    #[must_use]
    pub fn new(router: Address, factory: Address, fee_bps: u32) -> Self {
        Self {
            router,
            factory,
            fee: FeeTier::new(BasisPoints::new(fee_bps)),
            pairs: PairBook::new(),
        }
    }

    /// Swap fee charged by every pool, in basis points.
    #[must_use]
    pub const fn fee_bps(&self) -> u32 {
        self.fee.basis_points().get()
    }

    /// Snapshot of one pair.
    #[must_use]
    pub fn pair(&self, pair_id: PairId) -> Option<PairSnapshot> {
        self.pairs.get(pair_id).map(PairSnapshot::from)
    }

    /// Snapshots of every pair.
    #[must_use]
    pub fn pairs(&self) -> Vec<PairSnapshot> {
        self.pairs.snapshots()
    }

    fn pair_id_for(&self, a: Address, b: Address) -> PairId {
        PairId::derive(self.factory, a, b)
    }

    fn new_entry(&self, a: Address, b: Address) -> Result<PairEntry, AmmGatewayError> {
        if a == b {
            return Err(AmmGatewayError::IdenticalAssets);
        }
        if a.is_zero() || b.is_zero() {
            return Err(AmmGatewayError::ZeroAddress);
        }
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };
        let token_pair = TokenPair::new(
            Token::new(token0.to_token_address(), Decimals::default()),
            Token::new(token1.to_token_address(), Decimals::default()),
        )?;
        Ok(PairEntry::new(
            self.pair_id_for(a, b),
            token_pair,
            token0,
            token1,
            self.fee,
        ))
    }
}

fn ensure_live(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AmmGatewayError> {
    if deadline <= now {
        return Err(AmmGatewayError::Expired);
    }
    Ok(())
}

/// Checks that `spender` can move `amount` of `owner`'s `asset`.
fn ensure_can_pull(
    ledger: &dyn AssetLedger,
    asset: Address,
    owner: Address,
    spender: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    let allowance = ledger.allowance(asset, owner, spender);
    if allowance < amount {
        return Err(LedgerError::InsufficientAllowance {
            asset,
            owner,
            spender,
            needed: amount,
            available: allowance,
        });
    }
    let balance = ledger.balance_of(asset, owner);
    if balance < amount {
        return Err(LedgerError::InsufficientBalance {
            asset,
            owner,
            needed: amount,
            available: balance,
        });
    }
    Ok(())
}

/// Amounts of each asset a deposit actually uses, given the current
/// reserves oriented as `(reserve_a, reserve_b)`.
fn optimal_amounts(
    args: &AddLiquidityArgs,
    reserve_a: u128,
    reserve_b: u128,
) -> Result<(u128, u128), AmmGatewayError> {
    if reserve_a == 0 && reserve_b == 0 {
        return Ok((args.amount_a_desired, args.amount_b_desired));
    }
    let amount_b_optimal = mul_div(args.amount_a_desired, reserve_b, reserve_a)?;
    if amount_b_optimal <= args.amount_b_desired {
        if amount_b_optimal < args.amount_b_min {
            return Err(AmmGatewayError::InsufficientBAmount {
                actual: amount_b_optimal,
                minimum: args.amount_b_min,
            });
        }
        return Ok((args.amount_a_desired, amount_b_optimal));
    }
    let amount_a_optimal = mul_div(args.amount_b_desired, reserve_a, reserve_b)?;
    if amount_a_optimal < args.amount_a_min {
        return Err(AmmGatewayError::InsufficientAAmount {
            actual: amount_a_optimal,
            minimum: args.amount_a_min,
        });
    }
    Ok((amount_a_optimal.min(args.amount_a_desired), args.amount_b_desired))
}

impl AmmFactory for HydraGateway {
    fn factory_address(&self) -> Address {
        self.factory
    }

    fn get_pair(&self, a: Address, b: Address) -> Option<PairId> {
        if a == b {
            return None;
        }
        let pair_id = self.pair_id_for(a, b);
        self.pairs.contains(pair_id).then_some(pair_id)
    }

    fn create_pair(&mut self, a: Address, b: Address) -> Result<PairId, AmmGatewayError> {
        let entry = self.new_entry(a, b)?;
        let pair_id = self.pairs.insert(entry)?;
        tracing::info!(%pair_id, token_a = %a, token_b = %b, "pair created");
        Ok(pair_id)
    }
}

impl AmmRouter for HydraGateway {
    fn router_address(&self) -> Address {
        self.router
    }

    fn add_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: AddLiquidityArgs,
    ) -> Result<(u128, u128, u128), AmmGatewayError> {
        ensure_live(args.deadline, now)?;
        let mut entry = match self.get_pair(args.token_a, args.token_b) {
            Some(pair_id) => self
                .pairs
                .get(pair_id)
                .cloned()
                .ok_or(AmmGatewayError::PairNotFound(args.token_a, args.token_b))?,
            None => self.new_entry(args.token_a, args.token_b)?,
        };

        let (reserve_a, reserve_b) = entry.reserves_for(args.token_a);
        let (amount_a, amount_b) = optimal_amounts(&args, reserve_a, reserve_b)?;
        ensure_can_pull(&*ledger, args.token_a, sender, self.router, amount_a)?;
        ensure_can_pull(&*ledger, args.token_b, sender, self.router, amount_b)?;

        let (amount0, amount1) = if args.token_a == entry.token0 {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let minted = shares_for_deposit(
            amount0,
            amount1,
            entry.reserve0,
            entry.reserve1,
            entry.total_shares,
        )?;
        entry.total_shares = entry
            .total_shares
            .checked_add(minted)
            .ok_or(AmmGatewayError::Overflow)?;
        entry.reserve0 = entry
            .reserve0
            .checked_add(amount0)
            .ok_or(AmmGatewayError::Overflow)?;
        entry.reserve1 = entry
            .reserve1
            .checked_add(amount1)
            .ok_or(AmmGatewayError::Overflow)?;
        entry.last_modified_at = now;

        let pair_address = entry.pair_id.address();
        ledger.transfer_from(args.token_a, self.router, sender, pair_address, amount_a)?;
        ledger.transfer_from(args.token_b, self.router, sender, pair_address, amount_b)?;
        ledger.mint(pair_address, args.to, minted)?;

        tracing::debug!(pair_id = %entry.pair_id, amount_a, amount_b, minted, "liquidity deposited");
        self.pairs.put(entry);
        Ok((amount_a, amount_b, minted))
    }

    fn remove_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: RemoveLiquidityArgs,
    ) -> Result<(u128, u128), AmmGatewayError> {
        ensure_live(args.deadline, now)?;
        if args.token_a == args.token_b {
            return Err(AmmGatewayError::IdenticalAssets);
        }
        let not_found = AmmGatewayError::PairNotFound(args.token_a, args.token_b);
        let pair_id = self.get_pair(args.token_a, args.token_b).ok_or(not_found)?;
        let mut entry = self
            .pairs
            .get(pair_id)
            .cloned()
            .ok_or(AmmGatewayError::PairNotFound(args.token_a, args.token_b))?;
        let pair_address = pair_id.address();

        ensure_can_pull(&*ledger, pair_address, sender, self.router, args.liquidity)?;
        if args.liquidity > entry.total_shares {
            return Err(AmmGatewayError::InsufficientLiquidity);
        }
        let amount0 = mul_div(args.liquidity, entry.reserve0, entry.total_shares)?;
        let amount1 = mul_div(args.liquidity, entry.reserve1, entry.total_shares)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(AmmGatewayError::InsufficientLiquidity);
        }
        let (amount_a, amount_b) = if args.token_a == entry.token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < args.amount_a_min {
            return Err(AmmGatewayError::InsufficientAAmount {
                actual: amount_a,
                minimum: args.amount_a_min,
            });
        }
        if amount_b < args.amount_b_min {
            return Err(AmmGatewayError::InsufficientBAmount {
                actual: amount_b,
                minimum: args.amount_b_min,
            });
        }

        entry.total_shares = entry
            .total_shares
            .checked_sub(args.liquidity)
            .ok_or(AmmGatewayError::InsufficientLiquidity)?;
        entry.reserve0 = entry
            .reserve0
            .checked_sub(amount0)
            .ok_or(AmmGatewayError::InsufficientLiquidity)?;
        entry.reserve1 = entry
            .reserve1
            .checked_sub(amount1)
            .ok_or(AmmGatewayError::InsufficientLiquidity)?;
        entry.last_modified_at = now;

        ledger.transfer_from(pair_address, self.router, sender, pair_address, args.liquidity)?;
        ledger.burn(pair_address, pair_address, args.liquidity)?;
        ledger.transfer(entry.token0, pair_address, args.to, amount0)?;
        ledger.transfer(entry.token1, pair_address, args.to, amount1)?;

        tracing::debug!(%pair_id, amount_a, amount_b, burned = args.liquidity, "liquidity withdrawn");
        self.pairs.put(entry);
        Ok((amount_a, amount_b))
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        args: SwapArgs,
    ) -> Result<Vec<u128>, AmmGatewayError> {
        ensure_live(args.deadline, now)?;
        let token_in = match args.path.first() {
            Some(token) if args.path.len() >= 2 => *token,
            _ => return Err(AmmGatewayError::InvalidPath),
        };

        let mut staged = self.pairs.clone();
        let mut amounts = Vec::with_capacity(args.path.len());
        amounts.push(args.amount_in);
        // (pair custody, asset paid out, amount paid out) per hop
        let mut legs: Vec<(Address, Address, u128)> = Vec::with_capacity(args.path.len());
        let mut current = args.amount_in;

        for hop in args.path.windows(2) {
            let &[hop_in, hop_out] = hop else {
                return Err(AmmGatewayError::InvalidPath);
            };
            if hop_in == hop_out {
                return Err(AmmGatewayError::InvalidPath);
            }
            let pair_id = self.pair_id_for(hop_in, hop_out);
            let entry = staged
                .get_mut(pair_id)
                .ok_or(AmmGatewayError::PairNotFound(hop_in, hop_out))?;
            entry.token(hop_in).ok_or(AmmGatewayError::InvalidPath)?;
            let (reserve_in, reserve_out) = entry.reserves_for(hop_in);
            let out = amount_out(current, reserve_in, reserve_out, entry.fee)?;
            entry.apply_trade(hop_in, current, out)?;
            entry.swap_count = entry.swap_count.saturating_add(1);
            entry.total_volume = entry.total_volume.saturating_add(current);
            entry.last_modified_at = now;

            legs.push((pair_id.address(), hop_out, out));
            amounts.push(out);
            current = out;
        }

        if current < args.amount_out_min {
            return Err(AmmGatewayError::InsufficientOutputAmount {
                actual: current,
                minimum: args.amount_out_min,
            });
        }

        let first_pair = legs
            .first()
            .map(|(pair_address, _, _)| *pair_address)
            .ok_or(AmmGatewayError::InvalidPath)?;
        ensure_can_pull(&*ledger, token_in, sender, self.router, args.amount_in)?;
        ledger.transfer_from(token_in, self.router, sender, first_pair, args.amount_in)?;
        for (i, (pair_address, asset, out)) in legs.iter().enumerate() {
            let receiver = legs
                .get(i.saturating_add(1))
                .map_or(args.to, |(next_pair, _, _)| *next_pair);
            ledger.transfer(*asset, *pair_address, receiver, *out)?;
        }

        tracing::debug!(hops = legs.len(), amount_in = args.amount_in, amount_out = current, "swap routed");
        self.pairs = staged;
        Ok(amounts)
    }
}

//! Exact-input swaps along an explicit path.
//!
//! The input is pulled into the wrapper and sold through the router,
//! which pays the recipient directly. A router failure or an output
//! under the caller's floor reverts the whole call.

use chrono::{DateTime, Utc};

use super::{CallEnv, WrapperState};
use crate::domain::{Address, SwapReceipt, SwapRequest};
use crate::error::DexError;
use crate::gateway::{AmmGateway, AmmGatewayError, SwapArgs};
use crate::ledger::AssetLedger;

impl WrapperState {
    /// Sells exactly `amount_in` of `path[0]` for the last path asset,
    /// delivered straight to the recipient.
    ///
    /// Every hop must have a pool; the wrapper checks that with the
    /// factory but leaves pricing to the router.
    ///
    /// # Errors
    ///
    /// - [`DexError::DeadlineExpired`] before any transfer.
    /// - [`DexError::InvalidRequest`] for a zero input or zero recipient.
    /// - [`DexError::InvalidPath`] for a path shorter than two, a hop that
    ///   repeats an asset, or a hop without a pool.
    /// - [`DexError::InsufficientAllowance`] / [`DexError::InsufficientBalance`]
    ///   if the caller cannot cover `amount_in`.
    /// - [`DexError::SlippageExceeded`] if the output is below the minimum.
    /// - [`DexError::ExternalProtocol`] for any other gateway failure.
    pub fn swap(&mut self, env: &mut CallEnv<'_>, req: &SwapRequest) -> Result<SwapReceipt, DexError> {
        self.ensure_callable(env, req.deadline)?;
        if req.amount_in == 0 {
            return Err(DexError::InvalidRequest("amount_in must be positive".to_string()));
        }
        if req.recipient.is_zero() {
            return Err(DexError::InvalidRequest("recipient must not be zero".to_string()));
        }
        let Some(&token_in) = req.path.first() else {
            return Err(DexError::InvalidPath("path is empty".to_string()));
        };
        if req.path.len() < 2 {
            return Err(DexError::InvalidPath(
                "path needs at least two assets".to_string(),
            ));
        }
        for hop in req.path.windows(2) {
            let &[from, to] = hop else {
                continue;
            };
            if from == to {
                return Err(DexError::InvalidPath(format!("hop {from} -> {to} repeats an asset")));
            }
            if env.gateway.get_pair(from, to).is_none() {
                return Err(DexError::InvalidPath(format!("no pool for hop {from} -> {to}")));
            }
        }

        let caller = env.caller;
        let now = env.now;
        self.ensure_pullable(&*env.ledger, token_in, caller, req.amount_in)?;

        let gateway = &mut *env.gateway;
        let amounts = Self::journaled(&mut *env.ledger, caller, "swap", |ledger| {
            self.route(ledger, gateway, caller, now, token_in, req)
        })?;
        let amount_out = amounts.last().copied().unwrap_or_default();

        tracing::info!(%caller, recipient = %req.recipient, hops = amounts.len().saturating_sub(1), amount_in = req.amount_in, amount_out, "swap executed");
        Ok(SwapReceipt {
            amount_in: req.amount_in,
            amount_out,
            amounts,
        })
    }

    /// Pull, delegate and floor-check steps of a swap.
    fn route(
        &self,
        ledger: &mut dyn AssetLedger,
        gateway: &mut dyn AmmGateway,
        caller: Address,
        now: DateTime<Utc>,
        token_in: Address,
        req: &SwapRequest,
    ) -> Result<Vec<u128>, DexError> {
        ledger.transfer_from(token_in, self.address, caller, self.address, req.amount_in)?;
        ledger.approve(token_in, self.address, self.router, req.amount_in)?;

        let args = SwapArgs {
            amount_in: req.amount_in,
            amount_out_min: req.amount_out_min,
            path: req.path.clone(),
            to: req.recipient,
            deadline: req.deadline.resolve(now),
        };
        let amounts = gateway
            .swap_exact_tokens_for_tokens(&mut *ledger, self.address, now, args)
            .map_err(|err| match err {
                AmmGatewayError::InvalidPath | AmmGatewayError::PairNotFound(..) => {
                    DexError::InvalidPath(err.to_string())
                }
                other => other.into(),
            })?;
        self.settle(&mut *ledger, caller, token_in, req.amount_in, req.amount_in)?;

        let amount_out = amounts
            .last()
            .copied()
            .ok_or_else(|| DexError::ExternalProtocol("router returned no amounts".to_string()))?;
        if amount_out < req.amount_out_min {
            return Err(DexError::SlippageExceeded(format!(
                "router returned {amount_out}, below minimum {}",
                req.amount_out_min
            )));
        }
        Ok(amounts)
    }
}

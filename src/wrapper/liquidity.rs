//! Liquidity deposits and withdrawals for the configured pair.
//!
//! Deposits pull the desired amounts into the wrapper, let the router
//! take what the pool ratio allows and hand the rest back. The router
//! creates the pool on the first deposit. Withdrawals pull pool shares,
//! have the router pay the wrapper, and forward both assets to the
//! recipient. Everything after the pull runs journaled: a gateway
//! failure, or a gateway result outside the caller's bounds, reverts
//! every asset movement of the call before the error is reported.

use chrono::{DateTime, Utc};

use super::{CallEnv, WrapperState};
use crate::domain::{
    Address, LiquidityReceipt, LiquidityRequest, PairId, RemoveLiquidityRequest, WithdrawalReceipt,
};
use crate::error::DexError;
use crate::gateway::{AddLiquidityArgs, AmmGateway, RemoveLiquidityArgs};
use crate::ledger::AssetLedger;

impl WrapperState {
    /// Deposits both configured assets into their pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::DeadlineExpired`] before any transfer.
    /// - [`DexError::InvalidRequest`] for zero desired amounts, minimums
    ///   above the desired amounts, or a zero recipient.
    /// - [`DexError::InsufficientAllowance`] / [`DexError::InsufficientBalance`]
    ///   if the caller cannot cover the desired amounts.
    /// - [`DexError::SlippageExceeded`] if the pool cannot honour the minimums.
    /// - [`DexError::ExternalProtocol`] for any other gateway failure.
    pub fn add_liquidity(
        &mut self,
        env: &mut CallEnv<'_>,
        req: &LiquidityRequest,
    ) -> Result<LiquidityReceipt, DexError> {
        self.ensure_callable(env, req.deadline)?;
        if req.amount_a_desired == 0 || req.amount_b_desired == 0 {
            return Err(DexError::InvalidRequest(
                "desired amounts must be positive".to_string(),
            ));
        }
        if req.amount_a_min > req.amount_a_desired || req.amount_b_min > req.amount_b_desired {
            return Err(DexError::InvalidRequest(
                "minimum amounts must not exceed desired amounts".to_string(),
            ));
        }
        if req.recipient.is_zero() {
            return Err(DexError::InvalidRequest("recipient must not be zero".to_string()));
        }

        let caller = env.caller;
        let now = env.now;
        self.ensure_pullable(&*env.ledger, self.asset_a.address(), caller, req.amount_a_desired)?;
        self.ensure_pullable(&*env.ledger, self.asset_b.address(), caller, req.amount_b_desired)?;

        let gateway = &mut *env.gateway;
        let receipt = Self::journaled(&mut *env.ledger, caller, "add liquidity", |ledger| {
            self.deposit(ledger, gateway, caller, now, req)
        })?;
        self.pair_id = Some(receipt.pair_id);

        tracing::info!(
            pair_id = %receipt.pair_id,
            %caller,
            amount_a = receipt.amount_a,
            amount_b = receipt.amount_b,
            liquidity = receipt.liquidity,
            "liquidity added"
        );
        Ok(receipt)
    }

    /// Pull, delegate, check and refund steps of a deposit.
    fn deposit(
        &self,
        ledger: &mut dyn AssetLedger,
        gateway: &mut dyn AmmGateway,
        caller: Address,
        now: DateTime<Utc>,
        req: &LiquidityRequest,
    ) -> Result<LiquidityReceipt, DexError> {
        let (asset_a, asset_b) = (self.asset_a.address(), self.asset_b.address());
        ledger.transfer_from(asset_a, self.address, caller, self.address, req.amount_a_desired)?;
        ledger.transfer_from(asset_b, self.address, caller, self.address, req.amount_b_desired)?;
        ledger.approve(asset_a, self.address, self.router, req.amount_a_desired)?;
        ledger.approve(asset_b, self.address, self.router, req.amount_b_desired)?;

        let args = AddLiquidityArgs {
            token_a: asset_a,
            token_b: asset_b,
            amount_a_desired: req.amount_a_desired,
            amount_b_desired: req.amount_b_desired,
            amount_a_min: req.amount_a_min,
            amount_b_min: req.amount_b_min,
            to: req.recipient,
            deadline: req.deadline.resolve(now),
        };
        let (amount_a, amount_b, liquidity) =
            gateway.add_liquidity(&mut *ledger, self.address, now, args)?;
        if amount_a > req.amount_a_desired || amount_b > req.amount_b_desired {
            return Err(DexError::ExternalProtocol(format!(
                "router used {amount_a}/{amount_b}, more than desired"
            )));
        }
        if amount_a < req.amount_a_min || amount_b < req.amount_b_min {
            return Err(DexError::SlippageExceeded(format!(
                "router used {amount_a}/{amount_b}, below minimums {}/{}",
                req.amount_a_min, req.amount_b_min
            )));
        }
        let pair_id = self.get_pair(&*gateway).ok_or_else(|| {
            DexError::ExternalProtocol("router took a deposit for a pair the factory does not know".to_string())
        })?;

        self.settle(&mut *ledger, caller, asset_a, req.amount_a_desired, amount_a)?;
        self.settle(&mut *ledger, caller, asset_b, req.amount_b_desired, amount_b)?;
        Ok(LiquidityReceipt {
            pair_id,
            amount_a,
            amount_b,
            liquidity,
        })
    }

    /// Burns pool shares for both configured assets.
    ///
    /// # Errors
    ///
    /// - [`DexError::DeadlineExpired`] before any transfer.
    /// - [`DexError::InvalidRequest`] for zero shares, a zero recipient, or
    ///   when no pool exists for the configured assets.
    /// - [`DexError::InsufficientAllowance`] / [`DexError::InsufficientBalance`]
    ///   if the caller cannot cover the shares.
    /// - [`DexError::SlippageExceeded`] if the returned amounts are below
    ///   the minimums.
    /// - [`DexError::ExternalProtocol`] for any other gateway failure.
    pub fn remove_liquidity(
        &mut self,
        env: &mut CallEnv<'_>,
        req: &RemoveLiquidityRequest,
    ) -> Result<WithdrawalReceipt, DexError> {
        self.ensure_callable(env, req.deadline)?;
        if req.liquidity == 0 {
            return Err(DexError::InvalidRequest(
                "liquidity must be positive".to_string(),
            ));
        }
        if req.recipient.is_zero() {
            return Err(DexError::InvalidRequest("recipient must not be zero".to_string()));
        }
        let pair_id = self.get_pair(&*env.gateway).ok_or_else(|| {
            DexError::InvalidRequest("no pool exists for the configured assets".to_string())
        })?;
        self.pair_id = Some(pair_id);

        let caller = env.caller;
        let now = env.now;
        self.ensure_pullable(&*env.ledger, pair_id.address(), caller, req.liquidity)?;

        let gateway = &mut *env.gateway;
        let (amount_a, amount_b) =
            Self::journaled(&mut *env.ledger, caller, "remove liquidity", |ledger| {
                self.withdraw(ledger, gateway, caller, now, pair_id, req)
            })?;

        tracing::info!(%pair_id, %caller, liquidity = req.liquidity, amount_a, amount_b, "liquidity removed");
        Ok(WithdrawalReceipt {
            pair_id,
            amount_a,
            amount_b,
        })
    }

    /// Pull, delegate, check and forward steps of a withdrawal.
    fn withdraw(
        &self,
        ledger: &mut dyn AssetLedger,
        gateway: &mut dyn AmmGateway,
        caller: Address,
        now: DateTime<Utc>,
        pair_id: PairId,
        req: &RemoveLiquidityRequest,
    ) -> Result<(u128, u128), DexError> {
        let shares = pair_id.address();
        ledger.transfer_from(shares, self.address, caller, self.address, req.liquidity)?;
        ledger.approve(shares, self.address, self.router, req.liquidity)?;

        let (asset_a, asset_b) = (self.asset_a.address(), self.asset_b.address());
        let args = RemoveLiquidityArgs {
            token_a: asset_a,
            token_b: asset_b,
            liquidity: req.liquidity,
            amount_a_min: req.amount_a_min,
            amount_b_min: req.amount_b_min,
            to: self.address,
            deadline: req.deadline.resolve(now),
        };
        let (amount_a, amount_b) = gateway.remove_liquidity(&mut *ledger, self.address, now, args)?;
        if amount_a < req.amount_a_min || amount_b < req.amount_b_min {
            return Err(DexError::SlippageExceeded(format!(
                "router returned {amount_a}/{amount_b}, below minimums {}/{}",
                req.amount_a_min, req.amount_b_min
            )));
        }
        self.settle(&mut *ledger, caller, shares, req.liquidity, req.liquidity)?;

        ledger.transfer(asset_a, self.address, req.recipient, amount_a)?;
        ledger.transfer(asset_b, self.address, req.recipient, amount_b)?;
        Ok((amount_a, amount_b))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{Address, Deadline};
    use crate::ledger::AssetLedger;
    use crate::wrapper::tests::{BOB, Fixture, OWNER, fixture};

    fn request(desired: u128, min: u128) -> LiquidityRequest {
        LiquidityRequest {
            amount_a_desired: desired,
            amount_b_desired: desired,
            amount_a_min: min,
            amount_b_min: min,
            recipient: OWNER,
            deadline: Deadline::Within(3600),
        }
    }

    fn add(fx: &mut Fixture, caller: Address, req: &LiquidityRequest) -> Result<LiquidityReceipt, DexError> {
        let mut env = CallEnv::new(&mut fx.ledger, &mut fx.gateway, caller, Utc::now());
        fx.wrapper.add_liquidity(&mut env, req)
    }

    #[test]
    fn first_deposit_uses_desired_amounts() {
        let mut fx = fixture();
        let Ok(receipt) = add(&mut fx, OWNER, &request(1_000_000, 900_000)) else {
            panic!("deposit failed");
        };
        assert_eq!((receipt.amount_a, receipt.amount_b), (1_000_000, 1_000_000));
        assert!(receipt.liquidity > 0);
        assert_eq!(fx.ledger.balance_of(fx.asset_a(), OWNER), 9_000_000);
        assert_eq!(
            fx.ledger.balance_of(receipt.pair_id.address(), OWNER),
            receipt.liquidity
        );
        assert_eq!(fx.ledger.balance_of(fx.asset_a(), fx.wrapper.address()), 0);
        assert_eq!(
            fx.ledger
                .allowance(fx.asset_a(), fx.wrapper.address(), fx.wrapper.router()),
            0
        );
    }

    #[test]
    fn unused_amount_is_refunded() {
        let mut fx = fixture();
        let Ok(_) = add(&mut fx, OWNER, &request(1_000_000, 0)) else {
            panic!("seed failed");
        };
        let mut req = request(1_000, 0);
        req.amount_b_desired = 3_000;
        let before_b = fx.ledger.balance_of(fx.asset_b(), BOB);
        let Ok(receipt) = add(&mut fx, BOB, &req) else {
            panic!("deposit failed");
        };
        assert_eq!(receipt.amount_b, 1_000);
        assert_eq!(fx.ledger.balance_of(fx.asset_b(), BOB), before_b - 1_000);
        assert_eq!(fx.ledger.balance_of(fx.asset_b(), fx.wrapper.address()), 0);
    }

    #[test]
    fn zero_desired_is_invalid() {
        let mut fx = fixture();
        assert!(matches!(
            add(&mut fx, OWNER, &request(0, 0)),
            Err(DexError::InvalidRequest(_))
        ));
    }

    #[test]
    fn min_above_desired_is_invalid() {
        let mut fx = fixture();
        assert!(matches!(
            add(&mut fx, OWNER, &request(100, 101)),
            Err(DexError::InvalidRequest(_))
        ));
    }

    #[test]
    fn expired_deposit_moves_nothing() {
        let mut fx = fixture();
        let mut req = request(1_000, 0);
        req.deadline = Deadline::At(Utc::now() - Duration::seconds(1));
        assert!(matches!(
            add(&mut fx, OWNER, &req),
            Err(DexError::DeadlineExpired)
        ));
        assert_eq!(fx.ledger.balance_of(fx.asset_a(), OWNER), 10_000_000);
        assert!(fx.wrapper.pair_id().is_none());
    }

    #[test]
    fn missing_allowance_is_reported() {
        let mut fx = fixture();
        let Ok(()) = fx
            .ledger
            .approve(fx.asset_b(), BOB, fx.wrapper.address(), 10)
        else {
            panic!("approve failed");
        };
        assert!(matches!(
            add(&mut fx, BOB, &request(1_000, 0)),
            Err(DexError::InsufficientAllowance(_))
        ));
        assert_eq!(fx.ledger.balance_of(fx.asset_a(), BOB), 10_000_000);
    }

    #[test]
    fn gateway_slippage_refunds_everything() {
        let mut fx = fixture();
        let mut seed = request(1_000_000, 0);
        seed.amount_b_desired = 800_000;
        let Ok(_) = add(&mut fx, OWNER, &seed) else {
            panic!("seed failed");
        };
        let before = (
            fx.ledger.balance_of(fx.asset_a(), BOB),
            fx.ledger.balance_of(fx.asset_b(), BOB),
        );
        assert!(matches!(
            add(&mut fx, BOB, &request(100, 90)),
            Err(DexError::SlippageExceeded(_))
        ));
        let after = (
            fx.ledger.balance_of(fx.asset_a(), BOB),
            fx.ledger.balance_of(fx.asset_b(), BOB),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn remove_forwards_assets_to_recipient() {
        let mut fx = fixture();
        let Ok(receipt) = add(&mut fx, OWNER, &request(1_000_000, 0)) else {
            panic!("seed failed");
        };
        let shares = receipt.pair_id.address();
        let Ok(()) = fx
            .ledger
            .approve(shares, OWNER, fx.wrapper.address(), receipt.liquidity)
        else {
            panic!("approve failed");
        };
        let req = RemoveLiquidityRequest {
            liquidity: receipt.liquidity / 4,
            amount_a_min: 1,
            amount_b_min: 1,
            recipient: BOB,
            deadline: Deadline::Within(60),
        };
        let mut env = CallEnv::new(&mut fx.ledger, &mut fx.gateway, OWNER, Utc::now());
        let Ok(withdrawal) = fx.wrapper.remove_liquidity(&mut env, &req) else {
            panic!("withdrawal failed");
        };
        assert!(withdrawal.amount_a > 0);
        assert_eq!(
            fx.ledger.balance_of(fx.asset_a(), BOB),
            10_000_000 + withdrawal.amount_a
        );
        assert_eq!(fx.ledger.balance_of(fx.asset_a(), fx.wrapper.address()), 0);
        assert_eq!(fx.ledger.balance_of(shares, fx.wrapper.address()), 0);
    }

    #[test]
    fn remove_below_minimum_keeps_shares() {
        let mut fx = fixture();
        let Ok(receipt) = add(&mut fx, OWNER, &request(1_000_000, 0)) else {
            panic!("seed failed");
        };
        let shares = receipt.pair_id.address();
        let Ok(()) = fx
            .ledger
            .approve(shares, OWNER, fx.wrapper.address(), receipt.liquidity)
        else {
            panic!("approve failed");
        };
        let req = RemoveLiquidityRequest {
            liquidity: receipt.liquidity / 4,
            amount_a_min: 1_000_000,
            amount_b_min: 0,
            recipient: OWNER,
            deadline: Deadline::Within(60),
        };
        let mut env = CallEnv::new(&mut fx.ledger, &mut fx.gateway, OWNER, Utc::now());
        assert!(matches!(
            fx.wrapper.remove_liquidity(&mut env, &req),
            Err(DexError::SlippageExceeded(_))
        ));
        assert_eq!(fx.ledger.balance_of(shares, OWNER), receipt.liquidity);
    }

    #[test]
    fn remove_without_pool_is_invalid() {
        let mut fx = fixture();
        let req = RemoveLiquidityRequest {
            liquidity: 1,
            amount_a_min: 0,
            amount_b_min: 0,
            recipient: OWNER,
            deadline: Deadline::Within(60),
        };
        let mut env = CallEnv::new(&mut fx.ledger, &mut fx.gateway, OWNER, Utc::now());
        assert!(matches!(
            fx.wrapper.remove_liquidity(&mut env, &req),
            Err(DexError::InvalidRequest(_))
        ));
    }
}

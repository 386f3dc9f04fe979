//! Dex service: serializes wrapper operations and emits events.

use chrono::Utc;
use tokio::sync::Mutex;

use super::deployment::{Deployment, DeploymentInfo};
use crate::domain::{
    Address, Deadline, DexEvent, EventBus, LiquidityReceipt, LiquidityRequest,
    RemoveLiquidityRequest, SwapReceipt, SwapRequest, WithdrawalReceipt,
};
use crate::error::DexError;
use crate::gateway::{AmmRouter, PairSnapshot, SwapArgs};
use crate::ledger::AssetLedger;
use crate::wrapper::{CallEnv, PairResolution, WrapperState};

/// Identity used to fund dry-run quotes on a scratch copy of the state.
const QUOTER: Address = Address::from_bytes([0xff; 20]);

/// Orchestration layer for every wrapper operation.
///
/// Owns the [`Deployment`] behind a single async mutex, so operations
/// never interleave. A mutation runs the wrapper on a clone of the
/// deployment and commits the clone only on success, then emits events.
/// A failed operation leaves the committed state untouched.
#[derive(Debug)]
pub struct DexService {
    deployment: Mutex<Deployment>,
    event_bus: EventBus,
    default_deadline_secs: u64,
}

impl DexService {
    /// Creates a new `DexService`.
    #[must_use]
    pub fn new(deployment: Deployment, event_bus: EventBus, default_deadline_secs: u64) -> Self {
        Self {
            deployment: Mutex::new(deployment),
            event_bus,
            default_deadline_secs,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Deadline applied when a request carries none.
    #[must_use]
    pub const fn default_deadline(&self) -> Deadline {
        Deadline::Within(self.default_deadline_secs)
    }

    /// Runs `op` for `caller` against a copy of the deployment and commits
    /// the copy only on success.
    async fn transact<T>(
        &self,
        caller: Address,
        op: impl FnOnce(&mut WrapperState, &mut CallEnv<'_>) -> Result<T, DexError>,
    ) -> Result<T, DexError> {
        let mut committed = self.deployment.lock().await;
        let mut staged = committed.clone();
        let outcome = {
            let (wrapper, mut env) = staged.call(caller, Utc::now());
            op(wrapper, &mut env)
        };
        match outcome {
            Ok(value) => {
                *committed = staged;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(%caller, error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    /// Deposits both configured assets.
    ///
    /// # Errors
    ///
    /// Any [`DexError`] from the liquidity manager.
    pub async fn add_liquidity(
        &self,
        caller: Address,
        req: LiquidityRequest,
    ) -> Result<LiquidityReceipt, DexError> {
        let (receipt, created) = self
            .transact(caller, |wrapper, env| {
                let existed = wrapper.get_pair(&*env.gateway).is_some();
                let receipt = wrapper.add_liquidity(env, &req)?;
                Ok((receipt, !existed))
            })
            .await?;

        let now = Utc::now();
        let resolved = created.then_some(DexEvent::PairResolved {
            pair_id: receipt.pair_id,
            created: true,
            timestamp: now,
        });
        self.event_bus.publish_all(resolved.into_iter().chain([DexEvent::LiquidityAdded {
            pair_id: receipt.pair_id,
            provider: caller,
            recipient: req.recipient,
            amount_a: receipt.amount_a.to_string(),
            amount_b: receipt.amount_b.to_string(),
            liquidity: receipt.liquidity.to_string(),
            timestamp: now,
        }]));
        Ok(receipt)
    }

    /// Burns pool shares for both configured assets.
    ///
    /// # Errors
    ///
    /// Any [`DexError`] from the liquidity manager.
    pub async fn remove_liquidity(
        &self,
        caller: Address,
        req: RemoveLiquidityRequest,
    ) -> Result<WithdrawalReceipt, DexError> {
        let receipt = self
            .transact(caller, |wrapper, env| wrapper.remove_liquidity(env, &req))
            .await?;

        let _ = self.event_bus.publish(DexEvent::LiquidityRemoved {
            pair_id: receipt.pair_id,
            provider: caller,
            recipient: req.recipient,
            liquidity: req.liquidity.to_string(),
            amount_a: receipt.amount_a.to_string(),
            amount_b: receipt.amount_b.to_string(),
            timestamp: Utc::now(),
        });
        Ok(receipt)
    }

    /// Executes a swap and returns its correlation id with the receipt.
    ///
    /// # Errors
    ///
    /// Any [`DexError`] from the swap router.
    pub async fn swap(
        &self,
        caller: Address,
        req: SwapRequest,
    ) -> Result<(uuid::Uuid, SwapReceipt), DexError> {
        let receipt = self
            .transact(caller, |wrapper, env| wrapper.swap(env, &req))
            .await?;

        let swap_id = uuid::Uuid::new_v4();
        let _ = self.event_bus.publish(DexEvent::Swapped {
            swap_id: swap_id.to_string(),
            trader: caller,
            recipient: req.recipient,
            path: req.path,
            amount_in: receipt.amount_in.to_string(),
            amount_out: receipt.amount_out.to_string(),
            timestamp: Utc::now(),
        });
        Ok((swap_id, receipt))
    }

    /// Dry run: amounts a swap of `amount_in` along `path` would produce
    /// right now. Runs on a scratch copy, so nothing is committed.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidPath`] for an unroutable path, or any gateway
    /// failure the swap itself would hit.
    pub async fn quote_swap(&self, amount_in: u128, path: Vec<Address>) -> Result<Vec<u128>, DexError> {
        let mut scratch = self.deployment.lock().await.clone();
        let token_in = path
            .first()
            .copied()
            .ok_or_else(|| DexError::InvalidPath("path is empty".to_string()))?;
        let router = scratch.gateway.router_address();
        scratch.ledger.mint(token_in, QUOTER, amount_in)?;
        scratch.ledger.approve(token_in, QUOTER, router, amount_in)?;
        let now = Utc::now();
        let args = SwapArgs {
            amount_in,
            amount_out_min: 0,
            path,
            to: QUOTER,
            deadline: self.default_deadline().resolve(now),
        };
        let Deployment {
            ledger, gateway, ..
        } = &mut scratch;
        gateway
            .swap_exact_tokens_for_tokens(ledger, QUOTER, now, args)
            .map_err(|err| match err {
                crate::gateway::AmmGatewayError::InvalidPath
                | crate::gateway::AmmGatewayError::PairNotFound(..) => {
                    DexError::InvalidPath(err.to_string())
                }
                other => other.into(),
            })
    }

    /// Public `createPair`: finds or creates the pair.
    ///
    /// # Errors
    ///
    /// [`DexError::ExternalProtocol`] if the factory fails.
    pub async fn create_pair(&self, caller: Address) -> Result<PairResolution, DexError> {
        let resolution = self
            .transact(caller, |wrapper, env| wrapper.create_pair(env))
            .await?;
        let _ = self.event_bus.publish(DexEvent::PairResolved {
            pair_id: resolution.pair_id,
            created: resolution.created,
            timestamp: Utc::now(),
        });
        Ok(resolution)
    }

    /// Read-only `getPair`: the pair of the configured assets, if any.
    pub async fn get_pair(&self) -> Option<PairSnapshot> {
        let deployment = self.deployment.lock().await;
        deployment
            .wrapper
            .get_pair(&deployment.gateway)
            .and_then(|pair_id| deployment.gateway.pair(pair_id))
    }

    /// Sets `spender`'s allowance over the caller's `asset`.
    ///
    /// # Errors
    ///
    /// Only if the ledger rejects the grant.
    pub async fn approve(
        &self,
        caller: Address,
        asset: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), DexError> {
        self.transact(caller, |_, env| {
            env.ledger.approve(asset, caller, spender, amount)?;
            Ok(())
        })
        .await?;
        tracing::info!(%asset, owner = %caller, %spender, amount, "allowance set");
        let _ = self.event_bus.publish(DexEvent::Approval {
            asset,
            owner: caller,
            spender,
            amount: amount.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Balance of `owner` in `asset`.
    pub async fn balance_of(&self, asset: Address, owner: Address) -> u128 {
        self.deployment.lock().await.ledger.balance_of(asset, owner)
    }

    /// Allowance of `spender` over `owner`'s `asset`.
    pub async fn allowance(&self, asset: Address, owner: Address, spender: Address) -> u128 {
        self.deployment
            .lock()
            .await
            .ledger
            .allowance(asset, owner, spender)
    }

    /// Owner-gated: hands ownership to `new_owner`.
    ///
    /// # Errors
    ///
    /// [`DexError::Unauthorized`] for a non-owner caller.
    pub async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, DexError> {
        let previous = self
            .transact(caller, |wrapper, env| {
                wrapper.transfer_ownership(env.caller, new_owner)
            })
            .await?;
        let _ = self.event_bus.publish(DexEvent::OwnershipTransferred {
            previous_owner: previous,
            new_owner,
            timestamp: Utc::now(),
        });
        Ok(previous)
    }

    /// Owner-gated: recovers assets held in the wrapper's custody.
    ///
    /// # Errors
    ///
    /// [`DexError::Unauthorized`] for a non-owner caller,
    /// [`DexError::InsufficientBalance`] if custody holds less than asked.
    pub async fn sweep(
        &self,
        caller: Address,
        asset: Address,
        to: Address,
        amount: Option<u128>,
    ) -> Result<u128, DexError> {
        let swept = self
            .transact(caller, |wrapper, env| wrapper.sweep(env, asset, to, amount))
            .await?;
        let _ = self.event_bus.publish(DexEvent::Swept {
            asset,
            to,
            amount: swept.to_string(),
            timestamp: Utc::now(),
        });
        Ok(swept)
    }

    /// Public description of the deployment.
    pub async fn deployment_info(&self) -> DeploymentInfo {
        self.deployment.lock().await.info()
    }
}

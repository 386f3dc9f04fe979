//! The wrapper core.
//!
//! [`WrapperState`] is created once per deployment from a
//! [`WrapperConfig`] and afterwards changes only through pair caching and
//! owner-gated calls. Every operation runs inside a [`CallEnv`], which
//! supplies the ledger, the AMM gateway, the calling identity and the
//! execution time for that one call.
//!
//! The operations themselves live in submodules:
//!
//! - [`pair_resolver`]: `resolve_pair` / `create_pair` / `get_pair`
//! - [`liquidity`]: `add_liquidity` / `remove_liquidity`
//! - [`swap`]: `swap`
//! - [`access`]: `transfer_ownership` / `sweep`

pub mod access;
pub mod liquidity;
pub mod pair_resolver;
pub mod swap;

pub use pair_resolver::PairResolution;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{Address, AssetHandle, Deadline, PairId};
use crate::error::DexError;
use crate::gateway::AmmGateway;
use crate::ledger::{AssetLedger, Journal, LedgerError};

/// Construction-time settings of a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperConfig {
    /// First configured asset.
    pub asset_a: AssetHandle,
    /// Second configured asset.
    pub asset_b: AssetHandle,
    /// Router the wrapper delegates to.
    pub router: Address,
    /// Factory the wrapper resolves pairs with.
    pub factory: Address,
    /// Identity allowed to call administrative operations.
    pub owner: Address,
    /// The wrapper's own custody account.
    pub address: Address,
}

/// Per-deployment wrapper state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperState {
    asset_a: AssetHandle,
    asset_b: AssetHandle,
    router: Address,
    factory: Address,
    owner: Address,
    address: Address,
    pair_id: Option<PairId>,
}

impl WrapperState {
    /// Creates the wrapper.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] if the two assets are the same or any
    /// configured address is zero.
    pub fn new(config: WrapperConfig) -> Result<Self, DexError> {
        if config.asset_a.address() == config.asset_b.address() {
            return Err(DexError::InvalidRequest(
                "configured assets must differ".to_string(),
            ));
        }
        let named = [
            ("asset_a", config.asset_a.address()),
            ("asset_b", config.asset_b.address()),
            ("router", config.router),
            ("factory", config.factory),
            ("owner", config.owner),
            ("address", config.address),
        ];
        if let Some((name, _)) = named.iter().find(|(_, addr)| addr.is_zero()) {
            return Err(DexError::InvalidRequest(format!("{name} must not be zero")));
        }
        Ok(Self {
            asset_a: config.asset_a,
            asset_b: config.asset_b,
            router: config.router,
            factory: config.factory,
            owner: config.owner,
            address: config.address,
            pair_id: None,
        })
    }

    /// First configured asset.
    #[must_use]
    pub const fn asset_a(&self) -> AssetHandle {
        self.asset_a
    }

    /// Second configured asset.
    #[must_use]
    pub const fn asset_b(&self) -> AssetHandle {
        self.asset_b
    }

    /// Configured router.
    #[must_use]
    pub const fn router(&self) -> Address {
        self.router
    }

    /// Configured factory.
    #[must_use]
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// The wrapper's custody account.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Cached pair, if resolved.
    #[must_use]
    pub const fn pair_id(&self) -> Option<PairId> {
        self.pair_id
    }

    /// Fails unless `gateway` is the configured router and factory.
    fn ensure_gateway(&self, gateway: &dyn AmmGateway) -> Result<(), DexError> {
        if gateway.router_address() != self.router || gateway.factory_address() != self.factory {
            return Err(DexError::ExternalProtocol(format!(
                "gateway {}/{} is not the configured {}/{}",
                gateway.router_address(),
                gateway.factory_address(),
                self.router,
                self.factory
            )));
        }
        Ok(())
    }

    /// Common entry checks: gateway identity and request expiry.
    fn ensure_callable(&self, env: &CallEnv<'_>, deadline: Deadline) -> Result<(), DexError> {
        self.ensure_gateway(&*env.gateway)?;
        if deadline.is_expired(env.now) {
            tracing::debug!(caller = %env.caller, ?deadline, "request expired");
            return Err(DexError::DeadlineExpired);
        }
        Ok(())
    }

    /// Checks that the wrapper can pull `amount` of `asset` from `owner`.
    fn ensure_pullable(
        &self,
        ledger: &dyn AssetLedger,
        asset: Address,
        owner: Address,
        amount: u128,
    ) -> Result<(), DexError> {
        let allowance = ledger.allowance(asset, owner, self.address);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner,
                spender: self.address,
                needed: amount,
                available: allowance,
            }
            .into());
        }
        let balance = ledger.balance_of(asset, owner);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                owner,
                needed: amount,
                available: balance,
            }
            .into());
        }
        Ok(())
    }

    /// Runs `body` against a journal over `ledger`. If `body` fails, every
    /// asset movement it made is reverted before the error is returned.
    ///
    /// The gateway's own bookkeeping is not journaled; the service layer
    /// discards its working copy of the deployment on any error.
    fn journaled<T>(
        ledger: &mut dyn AssetLedger,
        caller: Address,
        op: &'static str,
        body: impl FnOnce(&mut dyn AssetLedger) -> Result<T, DexError>,
    ) -> Result<T, DexError> {
        let mut journal = Journal::new(ledger);
        match body(&mut journal) {
            Ok(value) => {
                journal.commit();
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(%caller, op, error = %err, "call failed after pulling funds, reverting");
                journal
                    .rollback()
                    .map_err(|e| DexError::Internal(format!("reverting {op} failed: {e}")))?;
                Err(err)
            }
        }
    }

    /// Revokes the router's allowance over `asset` and returns whatever
    /// of `pulled` was not `used` to `caller`.
    fn settle(
        &self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        asset: Address,
        pulled: u128,
        used: u128,
    ) -> Result<(), DexError> {
        ledger.approve(asset, self.address, self.router, 0)?;
        let refund = pulled.saturating_sub(used);
        if refund > 0 {
            ledger.transfer(asset, self.address, caller, refund)?;
        }
        Ok(())
    }
}

/// Execution environment of a single wrapper call.
///
/// Holds exclusive access to the ledger and the gateway for the duration
/// of the call, so no other operation can interleave with its steps.
pub struct CallEnv<'a> {
    /// Asset balances and allowances.
    pub ledger: &'a mut dyn AssetLedger,
    /// The AMM protocol.
    pub gateway: &'a mut dyn AmmGateway,
    /// Identity invoking the operation.
    pub caller: Address,
    /// Execution time.
    pub now: DateTime<Utc>,
}

impl<'a> CallEnv<'a> {
    /// Bundles the environment for one call.
    pub fn new(
        ledger: &'a mut dyn AssetLedger,
        gateway: &'a mut dyn AmmGateway,
        caller: Address,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ledger,
            gateway,
            caller,
            now,
        }
    }
}

impl fmt::Debug for CallEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallEnv")
            .field("caller", &self.caller)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::gateway::HydraGateway;
    use crate::ledger::InMemoryLedger;
    use hydra_amm::domain::Decimals;

    pub(crate) const OWNER: Address = Address::from_bytes([0x01; 20]);
    pub(crate) const BOB: Address = Address::from_bytes([0x02; 20]);

    /// Wrapper wired to a fresh ledger and gateway; `OWNER` and `BOB` hold
    /// 10M of each asset and have approved the wrapper without limit.
    pub(crate) struct Fixture {
        pub(crate) wrapper: WrapperState,
        pub(crate) ledger: InMemoryLedger,
        pub(crate) gateway: HydraGateway,
    }

    impl Fixture {
        pub(crate) fn asset_a(&self) -> Address {
            self.wrapper.asset_a().address()
        }

        pub(crate) fn asset_b(&self) -> Address {
            self.wrapper.asset_b().address()
        }
    }

    pub(crate) fn fixture() -> Fixture {
        let cfg = config();
        let Ok(wrapper) = WrapperState::new(cfg) else {
            panic!("valid config");
        };
        let mut ledger = InMemoryLedger::new();
        for holder in [OWNER, BOB] {
            for asset in [cfg.asset_a.address(), cfg.asset_b.address()] {
                let Ok(()) = ledger.mint(asset, holder, 10_000_000) else {
                    panic!("mint failed");
                };
                let Ok(()) = ledger.approve(asset, holder, cfg.address, u128::MAX) else {
                    panic!("approve failed");
                };
            }
        }
        let gateway = HydraGateway::new(cfg.router, cfg.factory, 30);
        Fixture {
            wrapper,
            ledger,
            gateway,
        }
    }

    pub(crate) fn config() -> WrapperConfig {
        let Ok(d18) = Decimals::new(18) else {
            panic!("valid decimals");
        };
        WrapperConfig {
            asset_a: AssetHandle::new(Address::from_bytes([0x0a; 20]), d18),
            asset_b: AssetHandle::new(Address::from_bytes([0x0b; 20]), d18),
            router: Address::from_bytes([0xee; 20]),
            factory: Address::from_bytes([0xfa; 20]),
            owner: Address::from_bytes([0x01; 20]),
            address: Address::from_bytes([0xd0; 20]),
        }
    }

    #[test]
    fn new_wrapper_has_no_pair() {
        let Ok(wrapper) = WrapperState::new(config()) else {
            panic!("valid config");
        };
        assert!(wrapper.pair_id().is_none());
        assert_eq!(wrapper.owner(), Address::from_bytes([0x01; 20]));
    }

    #[test]
    fn identical_assets_are_rejected() {
        let mut cfg = config();
        cfg.asset_b = cfg.asset_a;
        assert!(matches!(
            WrapperState::new(cfg),
            Err(DexError::InvalidRequest(_))
        ));
    }

    #[test]
    fn zero_router_is_rejected() {
        let mut cfg = config();
        cfg.router = Address::ZERO;
        let Err(DexError::InvalidRequest(msg)) = WrapperState::new(cfg) else {
            panic!("expected invalid request");
        };
        assert!(msg.contains("router"));
    }
}

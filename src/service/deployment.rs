//! One deployed wrapper together with the ledger and gateway it runs on.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::DexConfig;
use crate::domain::{Address, PairId};
use crate::error::DexError;
use crate::gateway::HydraGateway;
use crate::ledger::{AssetLedger, InMemoryLedger};
use crate::wrapper::{CallEnv, WrapperConfig, WrapperState};

/// The serialized execution environment of a wrapper.
///
/// `Clone` is a full snapshot: the service runs each operation on a copy
/// and swaps it in only if the operation succeeds.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// The wrapper core.
    pub wrapper: WrapperState,
    /// Balances and allowances of every asset, pool shares included.
    pub ledger: InMemoryLedger,
    /// The AMM protocol.
    pub gateway: HydraGateway,
}

impl Deployment {
    /// Deploys the wrapper and mints the initial supplies to the owner.
    ///
    /// # Errors
    ///
    /// [`DexError::InvalidRequest`] for an invalid wrapper configuration.
    pub fn new(config: &DexConfig) -> Result<Self, DexError> {
        let wrapper = WrapperState::new(WrapperConfig {
            asset_a: config.asset_a,
            asset_b: config.asset_b,
            router: config.router,
            factory: config.factory,
            owner: config.initial_owner,
            address: config.dex_address,
        })?;

        let mut ledger = InMemoryLedger::new();
        ledger.mint(
            config.asset_a.address(),
            config.initial_owner,
            config.initial_supply_a,
        )?;
        ledger.mint(
            config.asset_b.address(),
            config.initial_owner,
            config.initial_supply_b,
        )?;

        let gateway = HydraGateway::new(config.router, config.factory, config.amm_fee_bps);
        tracing::info!(
            dex = %config.dex_address,
            asset_a = %config.asset_a,
            asset_b = %config.asset_b,
            owner = %config.initial_owner,
            "wrapper deployed"
        );
        Ok(Self {
            wrapper,
            ledger,
            gateway,
        })
    }

    /// Splits the deployment into the wrapper and a call environment for
    /// `caller` at `now`.
    pub fn call(&mut self, caller: Address, now: DateTime<Utc>) -> (&mut WrapperState, CallEnv<'_>) {
        (
            &mut self.wrapper,
            CallEnv::new(&mut self.ledger, &mut self.gateway, caller, now),
        )
    }

    /// Public description of the deployment.
    #[must_use]
    pub fn info(&self) -> DeploymentInfo {
        DeploymentInfo {
            dex_address: self.wrapper.address(),
            asset_a: self.wrapper.asset_a().address(),
            asset_b: self.wrapper.asset_b().address(),
            router: self.wrapper.router(),
            factory: self.wrapper.factory(),
            owner: self.wrapper.owner(),
            pair_id: self.wrapper.get_pair(&self.gateway),
            fee_bps: self.gateway.fee_bps(),
        }
    }
}

/// Addresses and settings of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentInfo {
    /// The wrapper's custody address.
    pub dex_address: Address,
    /// First configured asset.
    pub asset_a: Address,
    /// Second configured asset.
    pub asset_b: Address,
    /// Configured router.
    pub router: Address,
    /// Configured factory.
    pub factory: Address,
    /// Current owner.
    pub owner: Address,
    /// Pair of the configured assets, if it exists.
    pub pair_id: Option<PairId>,
    /// Pool swap fee in basis points.
    pub fee_bps: u32,
}

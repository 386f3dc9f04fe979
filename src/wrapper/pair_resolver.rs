//! Pair resolution for the wrapper's two configured assets.

use super::{CallEnv, WrapperState};
use crate::domain::PairId;
use crate::error::DexError;
use crate::gateway::{AmmGateway, AmmGatewayError};

/// Outcome of resolving the wrapper's pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairResolution {
    /// The resolved pair.
    pub pair_id: PairId,
    /// `true` only when this call created the pool.
    pub created: bool,
}

impl WrapperState {
    /// Read-only lookup. Returns the cached pair, or asks the factory
    /// without creating anything.
    #[must_use]
    pub fn get_pair(&self, gateway: &dyn AmmGateway) -> Option<PairId> {
        self.pair_id.or_else(|| {
            gateway.get_pair(self.asset_a.address(), self.asset_b.address())
        })
    }

    /// Public `createPair`: resolves the pair, creating it if needed.
    ///
    /// Idempotent; a pool that already exists is returned, not an error.
    ///
    /// # Errors
    ///
    /// [`DexError::ExternalProtocol`] if the gateway is not the configured
    /// one or the factory fails for another reason.
    pub fn create_pair(&mut self, env: &mut CallEnv<'_>) -> Result<PairResolution, DexError> {
        self.ensure_gateway(&*env.gateway)?;
        self.resolve_pair(&mut *env.gateway)
    }

    /// Returns the cached pair, or finds or creates it and caches it.
    ///
    /// A factory that reports the pair as already existing (another
    /// caller created it first) is re-queried instead of failing.
    ///
    /// # Errors
    ///
    /// [`DexError::ExternalProtocol`] if the factory rejects creation for
    /// any other reason.
    pub fn resolve_pair(
        &mut self,
        gateway: &mut dyn AmmGateway,
    ) -> Result<PairResolution, DexError> {
        if let Some(pair_id) = self.pair_id {
            tracing::debug!(%pair_id, "pair cache hit");
            return Ok(PairResolution {
                pair_id,
                created: false,
            });
        }

        let (a, b) = (self.asset_a.address(), self.asset_b.address());
        let resolution = if let Some(pair_id) = gateway.get_pair(a, b) {
            PairResolution {
                pair_id,
                created: false,
            }
        } else {
            match gateway.create_pair(a, b) {
                Ok(pair_id) => PairResolution {
                    pair_id,
                    created: true,
                },
                Err(AmmGatewayError::PairExists(_)) => {
                    let pair_id = gateway.get_pair(a, b).ok_or_else(|| {
                        DexError::ExternalProtocol(
                            "factory reported an existing pair it cannot find".to_string(),
                        )
                    })?;
                    tracing::debug!(%pair_id, "pair created concurrently, using existing");
                    PairResolution {
                        pair_id,
                        created: false,
                    }
                }
                Err(err) => return Err(err.into()),
            }
        };

        self.pair_id = Some(resolution.pair_id);
        tracing::info!(pair_id = %resolution.pair_id, created = resolution.created, "pair resolved");
        Ok(resolution)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::gateway::AmmFactory;
    use crate::wrapper::tests::{OWNER, fixture};

    #[test]
    fn resolution_is_cached() {
        let mut fx = fixture();
        let Ok(first) = fx.wrapper.resolve_pair(&mut fx.gateway) else {
            panic!("first resolution failed");
        };
        assert!(first.created);
        let Ok(second) = fx.wrapper.resolve_pair(&mut fx.gateway) else {
            panic!("second resolution failed");
        };
        assert_eq!(second.pair_id, first.pair_id);
        assert!(!second.created);
        assert_eq!(fx.gateway.pairs().len(), 1);
    }

    #[test]
    fn existing_pair_is_adopted() {
        let mut fx = fixture();
        let Ok(existing) = fx.gateway.create_pair(fx.asset_b(), fx.asset_a()) else {
            panic!("create failed");
        };
        let Ok(resolution) = fx.wrapper.resolve_pair(&mut fx.gateway) else {
            panic!("resolution failed");
        };
        assert_eq!(resolution.pair_id, existing);
        assert!(!resolution.created);
    }

    #[test]
    fn get_pair_never_creates() {
        let fx = fixture();
        assert!(fx.wrapper.get_pair(&fx.gateway).is_none());
        assert!(fx.gateway.pairs().is_empty());
    }

    #[test]
    fn create_then_get_agree() {
        let mut fx = fixture();
        let mut env = CallEnv::new(&mut fx.ledger, &mut fx.gateway, OWNER, Utc::now());
        let Ok(created) = fx.wrapper.create_pair(&mut env) else {
            panic!("create failed");
        };
        assert_eq!(fx.wrapper.get_pair(&fx.gateway), Some(created.pair_id));
    }

    #[test]
    fn foreign_gateway_is_rejected() {
        let mut fx = fixture();
        let mut other = crate::gateway::HydraGateway::new(
            crate::domain::Address::from_bytes([0x99; 20]),
            fx.wrapper.factory(),
            30,
        );
        let mut env = CallEnv::new(&mut fx.ledger, &mut other, OWNER, Utc::now());
        assert!(matches!(
            fx.wrapper.create_pair(&mut env),
            Err(DexError::ExternalProtocol(_))
        ));
        assert!(fx.wrapper.pair_id().is_none());
    }
}

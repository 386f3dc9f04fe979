//! # dex-wrapper
//!
//! Liquidity-management and swap-routing wrapper in front of an AMM
//! router and pair factory.
//!
//! The wrapper is bound at deployment to two assets, a router and a
//! factory. It resolves (and lazily creates) the pool for its asset pair,
//! deposits and withdraws liquidity on behalf of callers with slippage
//! and deadline protection, and routes exact-input swaps along an
//! explicit asset path. AMM mathematics are delegated to `hydra-amm`
//! behind the [`gateway::AmmGateway`] capability.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── DexService + Deployment (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── WrapperState (wrapper/)
//!     │     ├── AssetLedger (ledger/)
//!     │     └── AmmGateway (gateway/)
//!     │
//!     └── HydraGateway curve (gateway/curve) + hydra-amm fee tiers
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod service;
pub mod wrapper;
pub mod ws;

//! Service layer: serialized orchestration of wrapper operations.
//!
//! [`DexService`] owns the [`Deployment`] (wrapper, ledger and gateway),
//! runs every operation atomically and emits events through the
//! [`super::domain::EventBus`].

pub mod deployment;
pub mod dex_service;

pub use deployment::{Deployment, DeploymentInfo};
pub use dex_service::DexService;

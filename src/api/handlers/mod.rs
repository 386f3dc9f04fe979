//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod asset;
pub mod liquidity;
pub mod pair;
pub mod swap;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pair::routes())
        .merge(liquidity::routes())
        .merge(swap::routes())
        .merge(asset::routes())
        .merge(admin::routes())
}

//! Data Transfer Objects for REST request/response serialization.
//!
//! All numeric amounts are serialized as JSON strings to prevent
//! precision loss on u128 values.

pub mod admin_dto;
pub mod asset_dto;
pub mod common_dto;
pub mod liquidity_dto;
pub mod pair_dto;
pub mod swap_dto;

pub use admin_dto::*;
pub use asset_dto::*;
pub use common_dto::*;
pub use liquidity_dto::*;
pub use pair_dto::*;
pub use swap_dto::*;

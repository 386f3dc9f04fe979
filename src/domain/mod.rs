//! Domain layer: addresses, asset handles, pair identity, requests,
//! and the event system.

pub mod address;
pub mod asset;
pub mod deadline;
pub mod dex_event;
pub mod event_bus;
pub mod pair_id;
pub mod request;

pub use address::{Address, AddressParseError};
pub use asset::AssetHandle;
pub use deadline::Deadline;
pub use dex_event::{DexEvent, EventTopic};
pub use event_bus::EventBus;
pub use pair_id::PairId;
pub use request::{
    LiquidityReceipt, LiquidityRequest, RemoveLiquidityRequest, SwapReceipt, SwapRequest,
    WithdrawalReceipt,
};

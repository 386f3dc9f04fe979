//! Deployment configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Address defaults are the addresses
//! used by the reference local deployment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use hydra_amm::domain::Decimals;

use crate::domain::{Address, AssetHandle};

const DEFAULT_ROUTER: &str = "0x8a7fD7429aD9131ea9866d6af901d3F81598E081";
const DEFAULT_FACTORY: &str = "0x48e8f8342dC58e28DBd81d1F4d2442CF369D51f1";
const DEFAULT_TOKEN_A: &str = "0xf361803983295fEF4763182C7e9Bb8014FE7d8e2";
const DEFAULT_TOKEN_B: &str = "0x078c197A9a2791c0692a78aa7E939829923a1aac";
const DEFAULT_OWNER: &str = "0x87170c5c3b018dd29701fcb4debca1f152d1053d";
const DEFAULT_DEX: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// Whole tokens minted to the owner of each configured asset.
const DEFAULT_INITIAL_SUPPLY_TOKENS: u64 = 1_000_000;

/// Top-level deployment configuration.
///
/// Loaded once at startup via [`DexConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DexConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// AMM router address.
    pub router: Address,

    /// AMM factory address.
    pub factory: Address,

    /// First configured asset.
    pub asset_a: AssetHandle,

    /// Second configured asset.
    pub asset_b: AssetHandle,

    /// The wrapper's own custody address.
    pub dex_address: Address,

    /// Owner at deployment time; receives the initial supplies.
    pub initial_owner: Address,

    /// Raw units of asset A minted at deployment.
    pub initial_supply_a: u128,

    /// Raw units of asset B minted at deployment.
    pub initial_supply_b: u128,

    /// Pool swap fee in basis points.
    pub amm_fee_bps: u32,

    /// Deadline window applied when a request omits one, in seconds.
    pub default_deadline_secs: u64,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Time an HTTP request may take before it is answered with `408`.
    pub request_timeout_secs: u64,
}

impl DexConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` or any address variable is set
    /// but malformed, or if a decimals value is above 18.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("LISTEN_ADDR")?;

        let asset_a = asset_env("TOKEN_A_ADDRESS", DEFAULT_TOKEN_A, "TOKEN_A_DECIMALS")?;
        let asset_b = asset_env("TOKEN_B_ADDRESS", DEFAULT_TOKEN_B, "TOKEN_B_DECIMALS")?;

        let initial_supply_a =
            parse_env("INITIAL_SUPPLY_A", asset_a.units(DEFAULT_INITIAL_SUPPLY_TOKENS));
        let initial_supply_b =
            parse_env("INITIAL_SUPPLY_B", asset_b.units(DEFAULT_INITIAL_SUPPLY_TOKENS));

        Ok(Self {
            listen_addr,
            router: address_env("ROUTER_ADDRESS", DEFAULT_ROUTER)?,
            factory: address_env("FACTORY_ADDRESS", DEFAULT_FACTORY)?,
            asset_a,
            asset_b,
            dex_address: address_env("DEX_ADDRESS", DEFAULT_DEX)?,
            initial_owner: address_env("INITIAL_OWNER", DEFAULT_OWNER)?,
            initial_supply_a,
            initial_supply_b,
            amm_fee_bps: parse_env("AMM_FEE_BPS", 30),
            default_deadline_secs: parse_env("DEFAULT_DEADLINE_SECS", 3600),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", 10_000),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
        })
    }

    /// Per-request timeout applied by the HTTP stack.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configuration with every default, bound to `listen_addr`.
    ///
    /// # Errors
    ///
    /// Only if a built-in default is malformed.
    pub fn local(listen_addr: SocketAddr) -> anyhow::Result<Self> {
        let d18 = Decimals::new(18).context("decimals")?;
        let asset_a = AssetHandle::new(DEFAULT_TOKEN_A.parse()?, d18);
        let asset_b = AssetHandle::new(DEFAULT_TOKEN_B.parse()?, d18);
        Ok(Self {
            listen_addr,
            router: DEFAULT_ROUTER.parse()?,
            factory: DEFAULT_FACTORY.parse()?,
            asset_a,
            asset_b,
            dex_address: DEFAULT_DEX.parse()?,
            initial_owner: DEFAULT_OWNER.parse()?,
            initial_supply_a: asset_a.units(DEFAULT_INITIAL_SUPPLY_TOKENS),
            initial_supply_b: asset_b.units(DEFAULT_INITIAL_SUPPLY_TOKENS),
            amm_fee_bps: 30,
            default_deadline_secs: 3600,
            event_bus_capacity: 10_000,
            request_timeout_secs: 30,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reads an address variable. Unlike numbers, a malformed address is an
/// error rather than a silent fallback.
fn address_env(key: &str, default: &str) -> anyhow::Result<Address> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<Address>().with_context(|| format!("{key}={raw}"))
}

fn asset_env(address_key: &str, default: &str, decimals_key: &str) -> anyhow::Result<AssetHandle> {
    let address = address_env(address_key, default)?;
    let decimals = Decimals::new(parse_env(decimals_key, 18u8))
        .with_context(|| format!("{decimals_key} must be at most 18"))?;
    Ok(AssetHandle::new(address, decimals))
}

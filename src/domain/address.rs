//! Account and asset addresses.
//!
//! [`Address`] is a 20-byte identifier used for every party the wrapper
//! deals with: callers, the wrapper's own custody account, the router,
//! the factory, asset contracts and pool-share tokens.

use std::fmt;
use std::str::FromStr;

use hydra_amm::domain::TokenAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Error returned when a string is not a valid hex address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The string is not valid hexadecimal.
    #[error("invalid hex in address {0:?}")]
    InvalidHex(String),
    /// The decoded bytes have the wrong length.
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte account or asset address.
///
/// Parsed from and rendered as `0x`-prefixed lowercase hex. Ordering is
/// byte-lexicographic, which is the canonical order used for pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns `true` for the all-zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Converts to the 32-byte address space of the AMM engine.
    ///
    /// The 20 address bytes are right-aligned, so the ordering of
    /// addresses is preserved across the conversion.
    #[must_use]
    pub fn to_token_address(&self) -> TokenAddress {
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().skip(32 - ADDRESS_LEN).zip(self.0.iter()) {
            *dst = *src;
        }
        TokenAddress::from_bytes(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes =
            hex::decode(digits).map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;
        let len = bytes.len();
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(len))?;
        Ok(Self(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Type-safe pair identifier.
//!
//! [`PairId`] names the pool of two assets as known to a factory. It is
//! derived deterministically from the factory address and the sorted
//! asset addresses, so the same pair always gets the same identifier
//! regardless of argument order. The identifier doubles as the address
//! of the pool's share token and custody account.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Address;
use super::address::ADDRESS_LEN;

/// Domain separator mixed into the pair derivation hash.
const PAIR_SALT: &[u8] = b"dex-wrapper/pair/v1";

/// Opaque identifier of the pool for two assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(Address);

impl PairId {
    /// Derives the identifier of the `(a, b)` pool created by `factory`.
    ///
    /// Symmetric in `a` and `b`.
    #[must_use]
    pub fn derive(factory: Address, a: Address, b: Address) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut hasher = Sha256::new();
        hasher.update(PAIR_SALT);
        hasher.update(factory.as_bytes());
        hasher.update(first.as_bytes());
        hasher.update(second.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        for (dst, src) in bytes.iter_mut().zip(digest.iter().skip(32 - ADDRESS_LEN)) {
            *dst = *src;
        }
        Self(Address::from_bytes(bytes))
    }

    /// Wraps an existing address as a pair identifier.
    #[must_use]
    pub const fn from_address(address: Address) -> Self {
        Self(address)
    }

    /// Address of the pool's share token and custody account.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PairId> for Address {
    fn from(id: PairId) -> Self {
        id.0
    }
}

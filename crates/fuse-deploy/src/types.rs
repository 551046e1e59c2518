//! Core types for fuse-deploy.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Numeric identifier assigned to a pool by the pool directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(u64);

impl PoolId {
    /// Create a new pool ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PoolId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Parse a user-supplied address.
///
/// Surrounding whitespace is ignored. The text must be 40 hex digits,
/// optionally prefixed with `0x`. Single-case digits are accepted as-is;
/// mixed-case digits must form a valid EIP-55 checksum.
#[must_use]
pub fn parse_address(raw: &str) -> Option<Address> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let address: Address = digits.parse().ok()?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *digits {
        return None;
    }

    Some(address)
}

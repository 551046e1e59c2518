//! Pool configuration as entered by the user.
//!
//! A [`PoolDraft`] is the input to a deployment attempt. Range constraints on
//! the risk parameters are enforced when the values are constructed, so the
//! draft-level [`validate`] only covers the rules that depend on several
//! fields at once.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::parse_address;

/// Maximum fraction of a borrow repayable in one liquidation, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CloseFactor(u8);

impl CloseFactor {
    /// Smallest accepted percent.
    pub const MIN: u8 = 5;
    /// Largest accepted percent.
    pub const MAX: u8 = 90;

    /// Create a close factor from a whole percent.
    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(ValidationError::CloseFactorOutOfRange(percent))
        }
    }

    /// The value in percent.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.0
    }
}

impl Default for CloseFactor {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<u8> for CloseFactor {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<CloseFactor> for u8 {
    fn from(value: CloseFactor) -> Self {
        value.0
    }
}

impl fmt::Display for CloseFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Extra collateral awarded to liquidators, in percent above par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LiquidationIncentive(u8);

impl LiquidationIncentive {
    /// Smallest accepted percent.
    pub const MIN: u8 = 0;
    /// Largest accepted percent.
    pub const MAX: u8 = 50;

    /// Create a liquidation incentive from a whole percent.
    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        if percent <= Self::MAX {
            Ok(Self(percent))
        } else {
            Err(ValidationError::LiquidationIncentiveOutOfRange(percent))
        }
    }

    /// The value in percent.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.0
    }
}

impl Default for LiquidationIncentive {
    fn default() -> Self {
        Self(8)
    }
}

impl TryFrom<u8> for LiquidationIncentive {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<LiquidationIncentive> for u8 {
    fn from(value: LiquidationIncentive) -> Self {
        value.0
    }
}

impl fmt::Display for LiquidationIncentive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Addresses allowed to supply to a whitelisted pool.
///
/// Insertion order is preserved and duplicates are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct Whitelist(Vec<Address>);

impl Whitelist {
    /// Create an empty whitelist.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse and append an address typed by the user.
    pub fn add(&mut self, raw: &str) -> Result<Address, ValidationError> {
        let address = parse_address(raw)
            .ok_or_else(|| ValidationError::InvalidWhitelistAddress(raw.to_owned()))?;

        if self.insert(address) {
            Ok(address)
        } else {
            Err(ValidationError::DuplicateWhitelistAddress(raw.to_owned()))
        }
    }

    /// Append an address. Returns `false` if it was already present.
    pub fn insert(&mut self, address: Address) -> bool {
        if self.contains(&address) {
            return false;
        }
        self.0.push(address);
        true
    }

    /// Remove an address. Returns `false` if it was not present.
    pub fn remove(&mut self, address: &Address) -> bool {
        let before = self.0.len();
        self.0.retain(|a| a != address);
        self.0.len() != before
    }

    /// Check whether an address is whitelisted.
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    /// Number of whitelisted addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no address is whitelisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the addresses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    /// Copy the addresses out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Address> {
        self.0.clone()
    }
}

impl TryFrom<Vec<Address>> for Whitelist {
    type Error = ValidationError;

    fn try_from(addresses: Vec<Address>) -> Result<Self, Self::Error> {
        let mut whitelist = Self::new();
        for address in addresses {
            if !whitelist.insert(address) {
                return Err(ValidationError::DuplicateWhitelistAddress(
                    address.to_string(),
                ));
            }
        }
        Ok(whitelist)
    }
}

impl From<Whitelist> for Vec<Address> {
    fn from(value: Whitelist) -> Self {
        value.0
    }
}

/// Which price oracle the pool will read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleChoice {
    /// Deploy a fresh master price oracle that falls back to the public one.
    #[default]
    UseDefault,
    /// Use an existing oracle contract. Holds the address as typed.
    Custom(String),
}

/// A pool configuration ready to be validated and deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDraft {
    /// Display name of the pool.
    pub name: String,
    /// Whether supplying is restricted to the whitelist.
    #[serde(default)]
    pub is_whitelisted: bool,
    /// Addresses allowed to supply when whitelisted.
    #[serde(default)]
    pub whitelist: Whitelist,
    /// Close factor.
    #[serde(default)]
    pub close_factor: CloseFactor,
    /// Liquidation incentive.
    #[serde(default)]
    pub liquidation_incentive: LiquidationIncentive,
    /// Price oracle selection.
    #[serde(default)]
    pub oracle: OracleChoice,
}

impl PoolDraft {
    /// Create a draft with the given name and default parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Toggle the whitelist.
    ///
    /// Enabling it while empty seeds the list with the deployer so the
    /// creator can always supply to their own pool.
    pub fn set_whitelisted(&mut self, enabled: bool, deployer: Address) {
        self.is_whitelisted = enabled;
        if enabled && self.whitelist.is_empty() {
            self.whitelist.insert(deployer);
        }
    }

    /// Check the draft. See [`validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }

    /// The whitelist to submit on-chain, or `None` for an open pool.
    #[must_use]
    pub fn whitelist_for_deployment(&self) -> Option<Vec<Address>> {
        self.is_whitelisted.then(|| self.whitelist.to_vec())
    }
}

/// Check that a draft can be deployed.
///
/// Rules are checked in order and the first failure is returned: the name
/// must be non-empty, an enabled whitelist must hold the deployer plus at
/// least one more address, and a custom oracle must be a well-formed address.
pub fn validate(draft: &PoolDraft) -> Result<(), ValidationError> {
    if draft.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if draft.is_whitelisted && draft.whitelist.len() < 2 {
        return Err(ValidationError::WhitelistTooSmall);
    }

    if let OracleChoice::Custom(raw) = &draft.oracle {
        if parse_address(raw).is_none() {
            return Err(ValidationError::InvalidOracleAddress);
        }
    }

    Ok(())
}

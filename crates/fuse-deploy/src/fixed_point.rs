//! Conversion of risk parameters to the 18-decimal mantissas the pool
//! contracts expect.

use alloy_primitives::U256;

use crate::draft::{CloseFactor, LiquidationIncentive};

/// One whole unit in 18-decimal fixed point.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// One percent in 18-decimal fixed point.
const PERCENT: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Close factor as a fraction of one (50% becomes `0.5e18`).
#[must_use]
pub fn close_factor_mantissa(close_factor: CloseFactor) -> U256 {
    U256::from(close_factor.percent()) * PERCENT
}

/// Liquidation incentive as a multiplier of at least one (8% becomes `1.08e18`).
#[must_use]
pub fn liquidation_incentive_mantissa(incentive: LiquidationIncentive) -> U256 {
    WAD + U256::from(incentive.percent()) * PERCENT
}

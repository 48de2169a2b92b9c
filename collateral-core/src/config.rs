use anchor_lang::prelude::*;

use crate::error::CoreError::{InvalidDefaultThreshold, PositionDecimalsRange};
use crate::fixed::FixedValue;
use crate::oracle::OracleConfig;

/// Most decimal places a `u128` position figure can carry.
pub const MAX_POSITION_DECIMALS: u8 = 38;

/// Immutable configuration of one collateral instrument.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize,
)]
pub struct CollateralConfig {
  pub oracle: OracleConfig,
  /// Fraction of the peg the oracle price may deviate by, `0.05` is 5%.
  pub default_threshold: FixedValue,
  /// Decimal places of the pool value and total supply readings.
  pub position_decimals: u8,
}

impl CollateralConfig {
  pub fn new(
    oracle: OracleConfig,
    default_threshold: FixedValue,
    position_decimals: u8,
  ) -> Result<CollateralConfig> {
    let config = CollateralConfig {
      oracle,
      default_threshold,
      position_decimals,
    };
    config.validate()?;
    Ok(config)
  }

  /// Ensures:
  ///   - Oracle timeout is nonzero
  ///   - Default threshold is strictly positive
  ///   - Position decimals fit a `u128`
  pub fn validate(&self) -> Result<()> {
    self.oracle.validate()?;
    if !self.default_threshold.is_positive() {
      Err(InvalidDefaultThreshold.into())
    } else if self.position_decimals > MAX_POSITION_DECIMALS {
      Err(PositionDecimalsRange.into())
    } else {
      Ok(())
    }
  }
}

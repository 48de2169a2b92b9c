use anchor_lang::prelude::*;

use crate::fixed::{FixedValue, Rounding};

/// Token contract of the wrapped position.
/// Both figures share the token's decimal precision.
pub trait PositionSource {
  /// Reference units backing the whole supply.
  fn pool_value(&self) -> Result<u128>;

  /// Outstanding wrapped tokens.
  fn total_supply(&self) -> Result<u128>;
}

/// Reference units per wrapped token, with the inputs it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRateSnapshot {
  pub ref_per_tok: FixedValue,
  pub pool_value: FixedValue,
  pub total_supply: FixedValue,
}

/// Computes `ref_per_tok = pool_value / total_supply`, rounding down.
///
/// An empty pool has no rate: zero supply surfaces as `DivisionByZero`.
pub fn current_ref_per_tok<P: PositionSource>(
  position: &P,
  decimals: u8,
) -> Result<ExchangeRateSnapshot> {
  let pool_value =
    FixedValue::from_decimals(position.pool_value()?, decimals)?;
  let total_supply =
    FixedValue::from_decimals(position.total_supply()?, decimals)?;
  let ref_per_tok = pool_value.divide(&total_supply, Rounding::Floor)?;
  Ok(ExchangeRateSnapshot {
    ref_per_tok,
    pool_value,
    total_supply,
  })
}

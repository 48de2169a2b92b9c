//! Signed 18 decimal fixed-point numbers.
//!
//! Products and quotients are computed in a 256-bit intermediate, so ratio
//! composition such as `(a * b) / SCALE` only fails when the final result does
//! not fit back into an `i128`. Rounding is always explicit and applies to the
//! magnitude of the result: [`Rounding::Floor`] truncates toward zero.

use std::fmt::{self, Debug, Display};

use anchor_lang::prelude::*;

use crate::error::CoreError::{ArithmeticOverflow, DivisionByZero};

mod wide {
  #![allow(clippy::all, clippy::pedantic)]

  uint::construct_uint! {
    /// 256-bit unsigned integer for intermediate products.
    pub struct U256(4);
  }
}

use wide::U256;

/// Decimal places carried by every [`FixedValue`].
pub const FIX_DECIMALS: i32 = 18;

/// Raw bits of `1.0`.
pub const FIX_SCALE: i128 = 1_000_000_000_000_000_000;

/// Largest power of ten representable in a `U256`.
const MAX_EXP10: u32 = 77;

/// Rounding policy for the dropped digits of a product or quotient.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rounding {
  /// Truncate toward zero.
  Floor,
  /// Half away from zero.
  Round,
  /// Away from zero whenever digits are dropped.
  Ceil,
}

/// Fixed-point number with 18 decimal places, stored as scaled `bits`.
#[derive(
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub struct FixedValue {
  pub bits: i128,
}

impl FixedValue {
  #[must_use]
  pub const fn new(bits: i128) -> FixedValue {
    FixedValue { bits }
  }

  #[must_use]
  pub const fn zero() -> FixedValue {
    FixedValue::new(0)
  }

  #[must_use]
  pub const fn one() -> FixedValue {
    FixedValue::new(FIX_SCALE)
  }

  /// Whole number to fixed point. Every `i64` fits.
  #[must_use]
  pub fn from_int(value: i64) -> FixedValue {
    FixedValue::new(i128::from(value) * FIX_SCALE)
  }

  #[must_use]
  pub fn is_positive(&self) -> bool {
    self.bits > 0
  }

  #[must_use]
  pub fn checked_add(&self, other: &FixedValue) -> Option<FixedValue> {
    self.bits.checked_add(other.bits).map(FixedValue::new)
  }

  #[must_use]
  pub fn checked_sub(&self, other: &FixedValue) -> Option<FixedValue> {
    self.bits.checked_sub(other.bits).map(FixedValue::new)
  }

  /// `self * other`, `None` on overflow.
  #[must_use]
  pub fn checked_mul(
    &self,
    other: &FixedValue,
    rounding: Rounding,
  ) -> Option<FixedValue> {
    mul_div(self.bits, other.bits, FIX_SCALE, rounding).map(FixedValue::new)
  }

  /// `self / other`, `None` on overflow or a zero divisor.
  #[must_use]
  pub fn checked_div(
    &self,
    other: &FixedValue,
    rounding: Rounding,
  ) -> Option<FixedValue> {
    mul_div(self.bits, FIX_SCALE, other.bits, rounding).map(FixedValue::new)
  }

  /// Fixed-point product.
  pub fn multiply(
    &self,
    other: &FixedValue,
    rounding: Rounding,
  ) -> Result<FixedValue> {
    self
      .checked_mul(other, rounding)
      .ok_or(ArithmeticOverflow.into())
  }

  /// Fixed-point quotient. A zero divisor is reported separately from
  /// overflow.
  pub fn divide(
    &self,
    other: &FixedValue,
    rounding: Rounding,
  ) -> Result<FixedValue> {
    if other.bits == 0 {
      Err(DivisionByZero.into())
    } else {
      self
        .checked_div(other, rounding)
        .ok_or(ArithmeticOverflow.into())
    }
  }

  /// Scales a raw integer by `10^(18 + decimal_shift)`.
  ///
  /// A token amount with `d` decimals becomes a [`FixedValue`] with
  /// `decimal_shift = -d`, see [`FixedValue::from_decimals`].
  pub fn shift_scale(
    raw: u128,
    decimal_shift: i32,
    rounding: Rounding,
  ) -> Result<FixedValue> {
    let exp = decimal_shift
      .checked_add(FIX_DECIMALS)
      .ok_or(ArithmeticOverflow)?;
    let raw = U256::from(raw);
    let scaled = if exp >= 0 {
      exp10(exp.unsigned_abs()).and_then(|factor| raw.checked_mul(factor))
    } else {
      // u128 inputs are below 10^39, any larger divisor rounds identically
      exp10(exp.unsigned_abs().min(MAX_EXP10))
        .map(|divisor| div_rounded(raw, divisor, rounding))
    };
    scaled
      .and_then(|bits| narrow(bits, false))
      .map(FixedValue::new)
      .ok_or(ArithmeticOverflow.into())
  }

  /// Raw token amount with `decimals` places to fixed point.
  pub fn from_decimals(raw: u128, decimals: u8) -> Result<FixedValue> {
    FixedValue::shift_scale(raw, -i32::from(decimals), Rounding::Floor)
  }
}

impl Debug for FixedValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x10^-{FIX_DECIMALS}", self.bits)
  }
}

impl Display for FixedValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.bits < 0 { "-" } else { "" };
    let magnitude = self.bits.unsigned_abs();
    let scale = FIX_SCALE.unsigned_abs();
    write!(f, "{sign}{}.{:018}", magnitude / scale, magnitude % scale)
  }
}

fn exp10(n: u32) -> Option<U256> {
  (n <= MAX_EXP10).then(|| U256::exp10(n as usize))
}

/// Divides with the given rounding. `divisor` must be nonzero.
fn div_rounded(numerator: U256, divisor: U256, rounding: Rounding) -> U256 {
  let (quotient, remainder) = numerator.div_mod(divisor);
  let bump = match rounding {
    Rounding::Floor => false,
    Rounding::Round => remainder >= divisor - remainder,
    Rounding::Ceil => !remainder.is_zero(),
  };
  if bump {
    quotient + U256::one()
  } else {
    quotient
  }
}

/// Narrows a magnitude back to `i128`, applying the sign.
fn narrow(magnitude: U256, negative: bool) -> Option<i128> {
  if magnitude > U256::from(u128::MAX) {
    return None;
  }
  let magnitude = i128::try_from(magnitude.low_u128()).ok()?;
  Some(if negative { -magnitude } else { magnitude })
}

/// `a * b / c` over the 256-bit intermediate.
fn mul_div(a: i128, b: i128, c: i128, rounding: Rounding) -> Option<i128> {
  if c == 0 {
    return None;
  }
  let negative = (a < 0) ^ (b < 0) ^ (c < 0);
  let numerator = U256::from(a.unsigned_abs())
    .checked_mul(U256::from(b.unsigned_abs()))?;
  let quotient =
    div_rounded(numerator, U256::from(c.unsigned_abs()), rounding);
  narrow(quotient, negative)
}

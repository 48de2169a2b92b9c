use anchor_lang::prelude::*;

use crate::error::CoreError::ArithmeticOverflow;
use crate::fixed::{FixedValue, Rounding};
use crate::status::CollateralStatus;

/// Admissible oracle prices around the peg: `[peg - delta, peg + delta]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PegBand {
  pub peg: FixedValue,
  pub delta: FixedValue,
  pub low: FixedValue,
  pub high: FixedValue,
}

impl PegBand {
  /// Builds the band from the base's peg factors and the default threshold.
  ///   `peg = price_per_target * target_per_ref`
  ///   `delta = peg * default_threshold`
  pub fn new(
    price_per_target: FixedValue,
    target_per_ref: FixedValue,
    default_threshold: FixedValue,
  ) -> Result<PegBand> {
    let peg = price_per_target.multiply(&target_per_ref, Rounding::Floor)?;
    let delta = peg.multiply(&default_threshold, Rounding::Floor)?;
    let (low, high) = peg
      .checked_sub(&delta)
      .zip(peg.checked_add(&delta))
      .ok_or(ArithmeticOverflow)?;
    Ok(PegBand {
      peg,
      delta,
      low,
      high,
    })
  }

  /// Bounds are inside the band.
  #[must_use]
  pub fn contains(&self, price: FixedValue) -> bool {
    self.low <= price && price <= self.high
  }

  /// Soft default check: a price strictly outside the band is `Iffy`.
  #[must_use]
  pub fn classify(&self, price: FixedValue) -> CollateralStatus {
    if price < self.low || price > self.high {
      CollateralStatus::Iffy
    } else {
      CollateralStatus::Sound
    }
  }

  /// `high - low`, `None` on overflow.
  #[must_use]
  pub fn width(&self) -> Option<FixedValue> {
    self.high.checked_sub(&self.low)
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::status::CollateralStatus::{Iffy, Sound};
  use crate::util::proptest::{fix, peg_factor, price, threshold};

  fn fiat_band(threshold: &str) -> Result<PegBand> {
    PegBand::new(FixedValue::one(), FixedValue::one(), fix(threshold))
  }

  #[test]
  fn at_peg_is_sound() -> Result<()> {
    let band = fiat_band("0.05")?;
    assert_eq!(Sound, band.classify(fix("1.00")));
    Ok(())
  }

  #[test]
  fn beyond_threshold_is_iffy() -> Result<()> {
    let band = fiat_band("0.05")?;
    assert_eq!(Iffy, band.classify(fix("1.10")));
    assert_eq!(Iffy, band.classify(fix("0.90")));
    Ok(())
  }

  #[test]
  fn bounds_are_sound() -> Result<()> {
    let band = fiat_band("0.05")?;
    assert_eq!(fix("0.95"), band.low);
    assert_eq!(fix("1.05"), band.high);
    assert_eq!(Sound, band.classify(fix("0.95")));
    assert_eq!(Sound, band.classify(fix("1.05")));
    assert_eq!(Iffy, band.classify(FixedValue::new(band.high.bits + 1)));
    assert_eq!(Iffy, band.classify(FixedValue::new(band.low.bits - 1)));
    Ok(())
  }

  #[test]
  fn composite_peg() -> Result<()> {
    let band = PegBand::new(fix("2"), fix("1.5"), fix("0.1"))?;
    assert_eq!(fix("3"), band.peg);
    assert_eq!(fix("0.3"), band.delta);
    Ok(())
  }

  #[test]
  fn width_overflow_is_none() {
    let band = PegBand {
      peg: FixedValue::zero(),
      delta: FixedValue::new(i128::MAX),
      low: FixedValue::new(-i128::MAX),
      high: FixedValue::new(i128::MAX),
    };
    assert_eq!(None, band.width());
    assert_eq!(Iffy, band.classify(FixedValue::new(i128::MIN)));
  }

  #[test]
  fn width_spans_band() -> Result<()> {
    let band = fiat_band("0.05")?;
    assert_eq!(Some(fix("0.1")), band.width());
    Ok(())
  }

  proptest! {
    #[test]
    fn band_symmetric(
      price_per_target in peg_factor(),
      target_per_ref in peg_factor(),
      threshold in threshold(),
      offset in price(),
    ) {
      let band = PegBand::new(price_per_target, target_per_ref, threshold)?;
      let above = band.peg.checked_add(&offset).unwrap();
      let below = band.peg.checked_sub(&offset).unwrap();
      prop_assert_eq!(band.classify(above), band.classify(below));
      prop_assert_eq!(offset <= band.delta, band.contains(above));
    }

    #[test]
    fn doubling_threshold_doubles_width(
      price_per_target in peg_factor(),
      threshold in threshold(),
    ) {
      let one = FixedValue::one();
      let double = FixedValue::new(threshold.bits * 2);
      let narrow = PegBand::new(price_per_target, one, threshold)?;
      let wide = PegBand::new(price_per_target, one, double)?;
      let expected = narrow.width().unwrap().bits * 2;
      prop_assert!((wide.width().unwrap().bits - expected).abs() <= 2);
    }
  }
}

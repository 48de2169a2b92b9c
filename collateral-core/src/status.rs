use anchor_lang::prelude::*;

use std::fmt::Display;

use crate::clock::UnixClock;
use crate::error::CoreError::{DelayUntilDefaultTooLong, InvalidPegReference};
use crate::fixed::FixedValue;
use crate::status::CollateralStatus::{Disabled, Iffy, Sound};

/// Longest soft default tolerated before the collateral is disabled, 2 weeks.
pub const MAX_DELAY_UNTIL_DEFAULT_SECS: u64 = 1_209_600;

/// Default timestamp of collateral with no default scheduled.
pub const NEVER: i64 = i64::MAX;

/// Health of a collateral instrument, ordered by severity.
#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub enum CollateralStatus {
  Sound,
  Iffy,
  Disabled,
}

impl Display for CollateralStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Sound => f.write_str("Sound"),
      Iffy => f.write_str("Iffy"),
      Disabled => f.write_str("Disabled"),
    }
  }
}

/// What the default classifier needs from the component hosting it: status
/// bookkeeping, the delay-before-disable timer, and the peg reference.
pub trait CollateralBase {
  /// Status as of the given clock.
  fn status<C: UnixClock>(&self, clock: &C) -> CollateralStatus;

  /// Requests a transition. Implementations never leave `Disabled`.
  fn mark_status<C: UnixClock>(
    &mut self,
    status: CollateralStatus,
    clock: &C,
  );

  /// Timestamp at which the collateral counts as disabled, [`NEVER`] when
  /// sound.
  fn when_default(&self) -> i64;

  /// Unit of account per target unit.
  fn price_per_target(&self) -> FixedValue;

  /// Target units per reference unit.
  fn target_per_ref(&self) -> FixedValue;
}

/// Base component that disables collateral once it has been `Iffy` for
/// `delay_until_default_secs`.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize,
)]
pub struct DelayedDefault {
  pub delay_until_default_secs: u64,
  pub when_default: i64,
  pub price_per_target: FixedValue,
  pub target_per_ref: FixedValue,
}

impl DelayedDefault {
  /// Starts `Sound` with the given peg factors.
  pub fn new(
    delay_until_default_secs: u64,
    price_per_target: FixedValue,
    target_per_ref: FixedValue,
  ) -> Result<DelayedDefault> {
    let base = DelayedDefault {
      delay_until_default_secs,
      when_default: NEVER,
      price_per_target,
      target_per_ref,
    };
    base.validate()?;
    Ok(base)
  }

  /// Fiat pegged collateral: one unit of account per target, one target per
  /// reference unit.
  pub fn fiat(delay_until_default_secs: u64) -> Result<DelayedDefault> {
    DelayedDefault::new(
      delay_until_default_secs,
      FixedValue::one(),
      FixedValue::one(),
    )
  }

  /// Ensures:
  ///   - Delay is at most [`MAX_DELAY_UNTIL_DEFAULT_SECS`]
  ///   - Both peg factors are positive
  pub fn validate(&self) -> Result<()> {
    if self.delay_until_default_secs > MAX_DELAY_UNTIL_DEFAULT_SECS {
      Err(DelayUntilDefaultTooLong.into())
    } else if self.price_per_target.is_positive()
      && self.target_per_ref.is_positive()
    {
      Ok(())
    } else {
      Err(InvalidPegReference.into())
    }
  }

  fn delay_secs(&self) -> i64 {
    i64::try_from(self.delay_until_default_secs).unwrap_or(NEVER)
  }
}

impl CollateralBase for DelayedDefault {
  fn status<C: UnixClock>(&self, clock: &C) -> CollateralStatus {
    if self.when_default == NEVER {
      Sound
    } else if self.when_default > clock.unix_timestamp() {
      Iffy
    } else {
      Disabled
    }
  }

  fn mark_status<C: UnixClock>(
    &mut self,
    status: CollateralStatus,
    clock: &C,
  ) {
    let now = clock.unix_timestamp();
    match status {
      // Past the default timestamp nothing but `Disabled` applies
      Sound if self.when_default > now => self.when_default = NEVER,
      Iffy if self.when_default > now => {
        let deadline = now.saturating_add(self.delay_secs());
        self.when_default = self.when_default.min(deadline);
      }
      Disabled => self.when_default = self.when_default.min(now),
      Sound | Iffy => {}
    }
  }

  fn when_default(&self) -> i64 {
    self.when_default
  }

  fn price_per_target(&self) -> FixedValue {
    self.price_per_target
  }

  fn target_per_ref(&self) -> FixedValue {
    self.target_per_ref
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::error::CoreError;

  const DELAY: u64 = 86_400;
  const NOW: i64 = 1_700_000_000;

  #[test]
  fn status_ord() {
    assert!(Sound < Iffy);
    assert!(Iffy < Disabled);
  }

  #[test]
  fn starts_sound() -> Result<()> {
    let base = DelayedDefault::fiat(DELAY)?;
    assert_eq!(Sound, base.status(&NOW));
    assert_eq!(NEVER, base.when_default());
    Ok(())
  }

  #[test]
  fn iffy_disables_after_delay() -> Result<()> {
    let mut base = DelayedDefault::fiat(DELAY)?;
    base.mark_status(Iffy, &NOW);
    let deadline = NOW + 86_400;
    assert_eq!(deadline, base.when_default());
    assert_eq!(Iffy, base.status(&(deadline - 1)));
    assert_eq!(Disabled, base.status(&deadline));
    Ok(())
  }

  #[test]
  fn repeated_iffy_keeps_deadline() -> Result<()> {
    let mut base = DelayedDefault::fiat(DELAY)?;
    base.mark_status(Iffy, &NOW);
    base.mark_status(Iffy, &(NOW + 600));
    assert_eq!(NOW + 86_400, base.when_default());
    Ok(())
  }

  #[test]
  fn sound_clears_iffy() -> Result<()> {
    let mut base = DelayedDefault::fiat(DELAY)?;
    base.mark_status(Iffy, &NOW);
    base.mark_status(Sound, &(NOW + 600));
    assert_eq!(Sound, base.status(&(NOW + 600)));
    assert_eq!(NEVER, base.when_default());
    Ok(())
  }

  #[test]
  fn disabled_is_absorbing() -> Result<()> {
    let mut base = DelayedDefault::fiat(DELAY)?;
    base.mark_status(Disabled, &NOW);
    base.mark_status(Sound, &(NOW + 1));
    base.mark_status(Iffy, &(NOW + 2));
    assert_eq!(Disabled, base.status(&(NOW + 2)));
    assert_eq!(NOW, base.when_default());
    Ok(())
  }

  #[test]
  fn expired_iffy_cannot_recover() -> Result<()> {
    let mut base = DelayedDefault::fiat(DELAY)?;
    base.mark_status(Iffy, &NOW);
    let later = NOW + 90_000;
    base.mark_status(Sound, &later);
    assert_eq!(Disabled, base.status(&later));
    Ok(())
  }

  #[test]
  fn delay_too_long() {
    let out = DelayedDefault::fiat(MAX_DELAY_UNTIL_DEFAULT_SECS + 1);
    assert_eq!(out, Err(CoreError::DelayUntilDefaultTooLong.into()));
  }

  #[test]
  fn zero_peg_factor() {
    let out = DelayedDefault::new(DELAY, FixedValue::zero(), FixedValue::one());
    assert_eq!(out, Err(CoreError::InvalidPegReference.into()));
  }

  fn status_strategy() -> impl Strategy<Value = CollateralStatus> {
    prop_oneof![Just(Sound), Just(Iffy), Just(Disabled)]
  }

  proptest! {
    #[test]
    fn never_leaves_disabled(
      marks in prop::collection::vec(
        (status_strategy(), 0i64..100_000),
        1..32,
      ),
    ) {
      let mut base = DelayedDefault::fiat(DELAY)?;
      let mut now = NOW;
      let mut disabled = false;
      for (status, step) in marks {
        now += step;
        base.mark_status(status, &now);
        let current = base.status(&now);
        if disabled {
          prop_assert_eq!(Disabled, current);
        }
        disabled = current == Disabled;
      }
    }
  }
}

//! Default detection for one yield-bearing wrapped collateral instrument.
//!
//! [`WrappedCollateral::refresh`] runs one classification cycle:
//!
//! 1. Collateral that is already `Disabled` stays that way; nothing is read.
//! 2. If reference units per token fell since the previous cycle the backing
//!    was lost. That is a hard default and the collateral is disabled without
//!    consulting the oracle.
//! 3. Otherwise the oracle price is checked against the peg band. A price
//!    outside the band, or one the feed reports as unusable, makes the
//!    collateral `Iffy`. A price inside the band makes it `Sound`. A feed
//!    failure with no diagnostic aborts the refresh.
//!
//! The rate history is written once per completed cycle, after every fallible
//! read has succeeded. A failed refresh leaves no trace.

use anchor_lang::prelude::*;

use crate::clock::UnixClock;
use crate::config::CollateralConfig;
use crate::error::CoreError::OracleUnavailable;
use crate::events::{CollateralEvent, CollateralStatusChanged, EventSink};
use crate::exchange_rate::{
  current_ref_per_tok, ExchangeRateSnapshot, PositionSource,
};
use crate::fixed::{FixedValue, Rounding};
use crate::oracle::{
  price_or_fail, price_tolerant, OracleConfig, OracleFault, PriceFeed,
};
use crate::peg::PegBand;
use crate::rewards::{RewardClaimPath, RewardRegistry};
use crate::status::CollateralStatus::{Disabled, Iffy};
use crate::status::{CollateralBase, CollateralStatus};

/// Collateral plugin for a wrapped position whose reference-per-token rate
/// must never decrease.
pub struct WrappedCollateral<P, F, B, S> {
  config: CollateralConfig,
  position: P,
  feed: F,
  base: B,
  sink: S,
  rewards: RewardClaimPath,
  prev_ref_per_tok: FixedValue,
}

impl<P, F, B, S> WrappedCollateral<P, F, B, S>
where
  P: PositionSource,
  F: PriceFeed,
  B: CollateralBase,
  S: EventSink,
{
  /// Validates configuration and records the opening exchange rate as the
  /// first entry of the rate history.
  pub fn new(
    config: CollateralConfig,
    position: P,
    feed: F,
    base: B,
    sink: S,
  ) -> Result<WrappedCollateral<P, F, B, S>> {
    config.validate()?;
    let opening = current_ref_per_tok(&position, config.position_decimals)?;
    Ok(WrappedCollateral {
      config,
      position,
      feed,
      base,
      sink,
      rewards: RewardClaimPath::default(),
      prev_ref_per_tok: opening.ref_per_tok,
    })
  }

  /// Runs one classification cycle, see the module docs.
  ///
  /// # Errors
  /// * Exchange rate arithmetic (`ArithmeticOverflow`, `DivisionByZero`)
  /// * Position source read failures
  /// * `OracleUnavailable` when the feed fails without a diagnostic
  /// * Peg band arithmetic
  pub fn refresh<C: UnixClock>(&mut self, clock: &C) -> Result<()> {
    let old_status = self.base.status(clock);
    if old_status == Disabled {
      return Ok(());
    }
    let snapshot = self.exchange_rate()?;
    let next_status = self.classify(&snapshot, clock)?;

    self.base.mark_status(next_status, clock);
    self.prev_ref_per_tok = snapshot.ref_per_tok;

    let new_status = self.base.status(clock);
    if new_status != old_status {
      msg!("Collateral status {} -> {}", old_status, new_status);
      self
        .sink
        .publish(CollateralEvent::StatusChanged(CollateralStatusChanged {
          old_status,
          new_status,
        }));
    }
    Ok(())
  }

  /// Status the readings of this cycle call for. Never mutates.
  fn classify<C: UnixClock>(
    &self,
    snapshot: &ExchangeRateSnapshot,
    clock: &C,
  ) -> Result<CollateralStatus> {
    if snapshot.ref_per_tok < self.prev_ref_per_tok {
      msg!(
        "Hard default: ref per tok fell from {} to {} (pool {}, supply {})",
        self.prev_ref_per_tok,
        snapshot.ref_per_tok,
        snapshot.pool_value,
        snapshot.total_supply
      );
      return Ok(Disabled);
    }
    match price_tolerant(&self.feed, clock, self.config.oracle) {
      Ok(price) => {
        let band = self.peg_band()?;
        let status = band.classify(price);
        if status == Iffy {
          msg!(
            "Soft default: price {} outside [{}, {}]",
            price,
            band.low,
            band.high
          );
        }
        Ok(status)
      }
      Err(OracleFault::Recognized(reason)) => {
        msg!("Oracle price unusable: {}", reason);
        Ok(Iffy)
      }
      Err(OracleFault::Unrecognized) => {
        msg!("Oracle call failed without diagnostics");
        Err(OracleUnavailable.into())
      }
    }
  }

  /// Peg and soft default band from the base's reference factors.
  pub fn peg_band(&self) -> Result<PegBand> {
    PegBand::new(
      self.base.price_per_target(),
      self.base.target_per_ref(),
      self.config.default_threshold,
    )
  }

  /// Fresh exchange rate snapshot from the position source.
  pub fn exchange_rate(&self) -> Result<ExchangeRateSnapshot> {
    current_ref_per_tok(&self.position, self.config.position_decimals)
  }

  /// Reference units per wrapped token right now.
  pub fn current_ref_per_tok(&self) -> Result<FixedValue> {
    self.exchange_rate().map(|snapshot| snapshot.ref_per_tok)
  }

  /// Unit of account per wrapped token: `oracle price * ref_per_tok`.
  /// Fails on any oracle fault.
  pub fn strict_price<C: UnixClock>(&self, clock: &C) -> Result<FixedValue> {
    let price = price_or_fail(&self.feed, clock, self.config.oracle)?;
    price.multiply(&self.current_ref_per_tok()?, Rounding::Floor)
  }

  /// Claims accrued rewards. Yields zero until the staked position wrapper
  /// exists.
  pub fn claim_rewards<R: RewardRegistry>(&mut self, registry: &R) -> u64 {
    self.rewards.claim(registry, &mut self.sink)
  }

  #[must_use]
  pub fn status<C: UnixClock>(&self, clock: &C) -> CollateralStatus {
    self.base.status(clock)
  }
}

impl<P, F, B, S> WrappedCollateral<P, F, B, S> {
  #[must_use]
  pub fn config(&self) -> &CollateralConfig {
    &self.config
  }

  #[must_use]
  pub fn default_threshold(&self) -> FixedValue {
    self.config.default_threshold
  }

  #[must_use]
  pub fn oracle_config(&self) -> OracleConfig {
    self.config.oracle
  }

  /// Rate recorded by the last completed refresh.
  #[must_use]
  pub fn prev_ref_per_tok(&self) -> FixedValue {
    self.prev_ref_per_tok
  }

  #[must_use]
  pub fn base(&self) -> &B {
    &self.base
  }

  #[must_use]
  pub fn sink(&self) -> &S {
    &self.sink
  }
}

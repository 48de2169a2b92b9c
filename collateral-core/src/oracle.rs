//! Price feed adapter with fault containment.
//!
//! A [`PriceFeed`] reports raw round data. The adapter validates freshness and
//! the answer, then scales it to a [`FixedValue`]. Two accessors are offered:
//!
//! - [`price_or_fail`] propagates every fault as an error.
//! - [`price_tolerant`] never raises. Faults come back as an [`OracleFault`]
//!   that keeps "the feed answered but the value is unusable" apart from "the
//!   feed call failed with nothing to say", so a caller can degrade instead of
//!   aborting.

use anchor_lang::prelude::*;

use crate::clock::UnixClock;
use crate::error::CoreError::{
  OracleInvalidAnswer, OracleStale, OracleTimeoutZero, OracleUnavailable,
};
use crate::fixed::{FixedValue, Rounding};

/// Feed identity and staleness window.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize,
)]
pub struct OracleConfig {
  pub feed: Pubkey,
  pub timeout_secs: u64,
}

impl OracleConfig {
  pub fn new(feed: Pubkey, timeout_secs: u64) -> Result<OracleConfig> {
    let config = OracleConfig { feed, timeout_secs };
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.timeout_secs > 0 {
      Ok(())
    } else {
      Err(OracleTimeoutZero.into())
    }
  }
}

/// Latest round as published by a feed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeedRound {
  pub round_id: u64,
  pub answer: i128,
  pub updated_at: i64,
  pub answered_in_round: u64,
}

/// Why a price could not be read.
#[derive(Debug, PartialEq)]
pub enum OracleFault {
  /// The feed answered, or failed with a diagnostic, and the value is
  /// unusable.
  Recognized(Error),
  /// The feed call failed without any diagnostic payload.
  Unrecognized,
}

impl From<OracleFault> for Error {
  fn from(fault: OracleFault) -> Error {
    match fault {
      OracleFault::Recognized(reason) => reason,
      OracleFault::Unrecognized => OracleUnavailable.into(),
    }
  }
}

/// External price source for one reference asset, quoted in the unit of
/// account.
pub trait PriceFeed {
  /// Decimal places of [`FeedRound::answer`].
  fn decimals(&self) -> u8;

  /// Reads the most recent round.
  fn latest_round(&self) -> std::result::Result<FeedRound, OracleFault>;
}

/// Rejects incomplete rounds and rounds older than the timeout.
/// An update exactly `timeout_secs` old is still fresh.
fn validate_round_time(
  round: &FeedRound,
  timeout_secs: u64,
  clock_time: i64,
) -> Result<()> {
  if round.updated_at == 0 || round.answered_in_round < round.round_id {
    return Err(OracleStale.into());
  }
  let age = clock_time.saturating_sub(round.updated_at);
  if age <= 0 || age.unsigned_abs() <= timeout_secs {
    Ok(())
  } else {
    Err(OracleStale.into())
  }
}

/// Scales the answer to 18 decimals.
/// Both the raw answer and the scaled price must be positive.
fn validate_answer(answer: i128, decimals: u8) -> Result<FixedValue> {
  if answer <= 0 {
    return Err(OracleInvalidAnswer.into());
  }
  let price = FixedValue::shift_scale(
    answer.unsigned_abs(),
    -i32::from(decimals),
    Rounding::Floor,
  )?;
  if price.is_positive() {
    Ok(price)
  } else {
    Err(OracleInvalidAnswer.into())
  }
}

/// Reads and validates a price, keeping every fault typed.
pub fn price_tolerant<F: PriceFeed, C: UnixClock>(
  feed: &F,
  clock: &C,
  OracleConfig { timeout_secs, .. }: OracleConfig,
) -> std::result::Result<FixedValue, OracleFault> {
  let round = feed.latest_round()?;
  validate_round_time(&round, timeout_secs, clock.unix_timestamp())
    .and_then(|()| validate_answer(round.answer, feed.decimals()))
    .map_err(OracleFault::Recognized)
}

/// Reads and validates a price, failing on any fault.
pub fn price_or_fail<F: PriceFeed, C: UnixClock>(
  feed: &F,
  clock: &C,
  config: OracleConfig,
) -> Result<FixedValue> {
  price_tolerant(feed, clock, config).map_err(Into::into)
}

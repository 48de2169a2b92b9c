use anchor_lang::prelude::Clock;

/// Abstracts the wall clock of the host runtime.
pub trait UnixClock {
  fn unix_timestamp(&self) -> i64;
}

impl UnixClock for Clock {
  fn unix_timestamp(&self) -> i64 {
    self.unix_timestamp
  }
}

impl UnixClock for i64 {
  fn unix_timestamp(&self) -> i64 {
    *self
  }
}

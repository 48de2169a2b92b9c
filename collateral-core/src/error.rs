use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `fixed`
  #[msg("Fixed-point operation overflowed.")]
  ArithmeticOverflow = 7000,
  #[msg("Fixed-point division by zero.")]
  DivisionByZero,
  // `oracle`
  #[msg("Oracle did not yield a price within the configured timeout.")]
  OracleStale,
  #[msg("Oracle answer is zero or negative.")]
  OracleInvalidAnswer,
  #[msg("Oracle call failed without a diagnostic payload.")]
  OracleUnavailable,
  // `config`
  #[msg("Default threshold must be greater than zero.")]
  InvalidDefaultThreshold,
  #[msg("Oracle timeout must be greater than zero.")]
  OracleTimeoutZero,
  #[msg("Position decimals exceed the supported precision.")]
  PositionDecimalsRange,
  // `status`
  #[msg("Delay until default exceeds the maximum window.")]
  DelayUntilDefaultTooLong,
  #[msg("Peg reference factors must be greater than zero.")]
  InvalidPegReference,
}

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod clock;
pub mod collateral;
pub mod config;
pub mod error;
pub mod events;
pub mod exchange_rate;
pub mod fixed;
pub mod oracle;
pub mod peg;
pub mod rewards;
pub mod status;

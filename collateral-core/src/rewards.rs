use anchor_lang::prelude::*;

use crate::events::{CollateralEvent, EventSink, RewardsClaimed};

/// Supplies the token rewards accrue in.
pub trait RewardRegistry {
  fn reward_token(&self) -> Pubkey;
}

impl RewardRegistry for Pubkey {
  fn reward_token(&self) -> Pubkey {
    *self
  }
}

/// Route a reward claim takes.
#[derive(
  Copy,
  Clone,
  Debug,
  Default,
  PartialEq,
  Eq,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub enum RewardClaimPath {
  /// Claiming goes through a wrapper for the staked position, which does not
  /// exist yet. Until it does, claims succeed and yield nothing.
  #[default]
  AwaitingStakedWrapper,
}

impl RewardClaimPath {
  /// Claims accrued rewards and reports the amount claimed.
  pub fn claim<R: RewardRegistry, S: EventSink>(
    &self,
    registry: &R,
    sink: &mut S,
  ) -> u64 {
    match self {
      RewardClaimPath::AwaitingStakedWrapper => {
        let reward_token = registry.reward_token();
        msg!(
          "Rewards claimed: 0 of {} (staked wrapper pending)",
          reward_token
        );
        sink.publish(CollateralEvent::RewardsClaimed(RewardsClaimed {
          reward_token,
          amount: 0,
        }));
        0
      }
    }
  }
}

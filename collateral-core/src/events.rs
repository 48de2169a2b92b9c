use anchor_lang::prelude::*;

use crate::status::CollateralStatus;

/// Collateral health moved between states during a refresh.
#[event]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralStatusChanged {
  pub old_status: CollateralStatus,
  pub new_status: CollateralStatus,
}

/// Reward claim attempt and the amount it yielded.
#[event]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardsClaimed {
  pub reward_token: Pubkey,
  pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateralEvent {
  StatusChanged(CollateralStatusChanged),
  RewardsClaimed(RewardsClaimed),
}

/// Receives the notifications a collateral instance publishes.
pub trait EventSink {
  fn publish(&mut self, event: CollateralEvent);
}

/// Emits events into the program log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgramLogSink;

impl EventSink for ProgramLogSink {
  fn publish(&mut self, event: CollateralEvent) {
    match event {
      CollateralEvent::StatusChanged(changed) => emit!(changed),
      CollateralEvent::RewardsClaimed(claimed) => emit!(claimed),
    }
  }
}

/// Collects events in memory, for hosts that forward them later.
impl EventSink for Vec<CollateralEvent> {
  fn publish(&mut self, event: CollateralEvent) {
    self.push(event);
  }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
  fn publish(&mut self, event: CollateralEvent) {
    (**self).publish(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::status::CollateralStatus::{Iffy, Sound};

  fn changed() -> CollateralEvent {
    CollateralEvent::StatusChanged(CollateralStatusChanged {
      old_status: Sound,
      new_status: Iffy,
    })
  }

  #[test]
  fn vec_sink_records_in_order() {
    let mut events: Vec<CollateralEvent> = Vec::new();
    let claimed = CollateralEvent::RewardsClaimed(RewardsClaimed {
      reward_token: Pubkey::new_unique(),
      amount: 0,
    });
    events.publish(changed());
    events.publish(claimed);
    assert_eq!(vec![changed(), claimed], events);
  }

  #[test]
  fn borrowed_sink_forwards() {
    fn forward<S: EventSink>(mut sink: S) {
      sink.publish(changed());
    }
    let mut events: Vec<CollateralEvent> = Vec::new();
    forward(&mut events);
    assert_eq!(1, events.len());
  }

  #[test]
  fn program_log_sink_emits() {
    ProgramLogSink.publish(changed());
  }
}

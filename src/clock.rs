//! Time source for submission timestamps.
//!
//! The service uses `SystemClock`. Tests use `ManualClock`, which only moves when told to,
//! so first-solved times and leaderboard tie-breaks are reproducible.

#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

pub trait Clock: Send + Sync {
  fn now(&self) -> Timestamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Timestamp {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_millis() as u64)
      .unwrap_or(0)
  }
}

/// Deterministic clock. Time only advances when you tell it to.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
  current: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
  pub fn new(initial: Timestamp) -> Self {
    Self { current: AtomicU64::new(initial) }
  }

  pub fn advance(&self, millis: u64) {
    self.current.fetch_add(millis, Ordering::SeqCst);
  }

  pub fn set(&self, at: Timestamp) {
    self.current.store(at, Ordering::SeqCst);
  }
}

#[cfg(test)]
impl Clock for ManualClock {
  fn now(&self) -> Timestamp {
    self.current.load(Ordering::SeqCst)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn manual_clock_moves_only_when_told() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now(), 1_000);
    assert_eq!(clock.now(), 1_000);
    clock.advance(250);
    assert_eq!(clock.now(), 1_250);
    clock.set(10);
    assert_eq!(clock.now(), 10);
  }

  #[test]
  fn system_clock_is_after_2020() {
    assert!(SystemClock.now() > 1_577_836_800_000);
  }
}

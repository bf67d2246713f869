//! Millisecond time sources for the dispatch loop.
//!
//! The loop never reads process-wide time directly. It is handed a `Clock`,
//! which the executor also advances while a task "runs". `VirtualClock` makes
//! that advance a plain state change so the loop can be stepped
//! deterministically; `WallClock` sleeps.

use std::thread;
use std::time::{Duration, Instant};

/// Milliseconds, either an absolute instant on a `Clock` or a duration.
///
/// Signed because laxity goes negative once a task is over-committed.
pub type Millis = i64;

/// Monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds since this clock's origin.
    fn now(&self) -> Millis;

    /// Hold the processor for `ms` milliseconds.
    fn advance(&mut self, ms: Millis);
}

/// Simulated clock that moves only when advanced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: Millis,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now` instead of 0.
    pub fn starting_at(now: Millis) -> Self {
        Self { now }
    }

    /// Jump to `now`. Never moves backwards.
    pub fn set(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Millis {
        self.now
    }

    fn advance(&mut self, ms: Millis) {
        if ms > 0 {
            self.now += ms;
        }
    }
}

/// Real elapsed time since construction. `advance` blocks the thread.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Millis {
        Millis::try_from(self.origin.elapsed().as_millis()).unwrap_or(Millis::MAX)
    }

    fn advance(&mut self, ms: Millis) {
        if let Ok(ms) = u64::try_from(ms) {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advances_only_forward() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.now(), 0);

        clock.advance(200);
        assert_eq!(clock.now(), 200);

        clock.advance(-50);
        assert_eq!(clock.now(), 200);

        clock.set(100);
        assert_eq!(clock.now(), 200);
        clock.set(750);
        assert_eq!(clock.now(), 750);
    }

    #[test]
    fn test_virtual_clock_custom_origin() {
        let mut clock = VirtualClock::starting_at(1850);
        clock.advance(150);
        assert_eq!(clock.now(), 2000);
    }

    #[test]
    fn test_wall_clock_advance_blocks_for_duration() {
        let mut clock = WallClock::new();
        let before = clock.now();
        clock.advance(5);
        assert!(clock.now() >= before + 5);
    }
}

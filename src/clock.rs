use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "now" in milliseconds for pacing battles.
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Lets roughly `ms` pass and returns the new "now". Saturates at
    /// `u64::MAX`.
    fn wait_ms(&self, ms: u64) -> u64;
}

/// Wall-clock milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn wait_ms(&self, ms: u64) -> u64 {
        std::thread::sleep(Duration::from_millis(ms));
        self.now_ms()
    }
}

/// Hand-driven clock for headless runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) -> u64 {
        let next = self.now.get().saturating_add(ms);
        self.now.set(next);
        next
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn wait_ms(&self, ms: u64) -> u64 {
        self.advance(ms)
    }
}

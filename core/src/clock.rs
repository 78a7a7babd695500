use alloc::rc::Rc;
use core::cell::Cell;

use web_time::{SystemTime, UNIX_EPOCH};

/// Nominal cadence of [`GameSession::tick`](crate::GameSession::tick).
pub const TICK_INTERVAL_MS: u64 = 97;

/// A gap between two ticks longer than this means execution was suspended.
pub const STALL_THRESHOLD_MS: u64 = 100_000;

/// Wall-clock source, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

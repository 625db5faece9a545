//! Board timer
//!
//! Busy-waits on the embassy time driver. The rig runs its stages back to
//! back on a single task, so blocking the executor costs nothing.

use embassy_time::{Delay, Instant};

use trotter_core::traits::{Clock, Pacer};
use trotter_drivers::DelayPacer;

/// Pacer and monotonic clock backed by the RP2040 timer
pub struct BoardTimer {
    pacer: DelayPacer<Delay>,
}

impl BoardTimer {
    pub fn new() -> Self {
        Self {
            pacer: DelayPacer::new(Delay),
        }
    }
}

impl Default for BoardTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for BoardTimer {
    fn pause_ms(&mut self, ms: u32) {
        self.pacer.pause_ms(ms);
    }
}

impl Clock for BoardTimer {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

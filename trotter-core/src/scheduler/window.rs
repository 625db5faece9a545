//! Gait window timing

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One gait pass: when it started, how long it runs, how often it ticks
///
/// Transient; the scheduler opens one per pass and drops it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionWindow {
    /// Clock reading when the window opened (ms)
    pub start_ms: u64,
    /// Window length (ms)
    pub duration_ms: u32,
    /// Pause after each group sub-tick (ms)
    pub tick_interval_ms: u32,
}

impl MotionWindow {
    /// Open a window at `now_ms`
    pub fn open(now_ms: u64, duration_ms: u32, tick_interval_ms: u32) -> Self {
        Self {
            start_ms: now_ms,
            duration_ms,
            tick_interval_ms,
        }
    }

    /// Time since the window opened (ms)
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    /// Time since the window opened (s), the gait's `t`
    pub fn elapsed_s(&self, now_ms: u64) -> f32 {
        self.elapsed_ms(now_ms) as f32 / 1000.0
    }

    /// Check if the window has run its full length
    pub fn is_elapsed(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.duration_ms as u64
    }
}

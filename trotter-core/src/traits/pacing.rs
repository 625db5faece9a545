//! Timing primitives
//!
//! The rig paces itself with fixed delays rather than waiting on motion
//! acknowledgements. All waiting goes through [`Pacer`], so a board can back
//! it with a busy-wait delay, an async timer or a hardware tick without the
//! gait math changing.

/// Fixed-duration pause
pub trait Pacer {
    /// Block for `ms` milliseconds
    fn pause_ms(&mut self, ms: u32);
}

/// Monotonic time source
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause_ms(&mut self, ms: u32) {
        (**self).pause_ms(ms)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

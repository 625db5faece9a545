//! Fixed-delay pacing

use embedded_hal::delay::DelayNs;
use trotter_core::traits::Pacer;

/// [`Pacer`] over a blocking `embedded-hal` delay
#[derive(Debug)]
pub struct DelayPacer<D> {
    delay: D,
}

impl<D: DelayNs> DelayPacer<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    pub fn into_inner(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> Pacer for DelayPacer<D> {
    fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

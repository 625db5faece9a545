//! Boot and motion timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actuator::PowerLimits;
use crate::traits::ErrorTriggers;

/// Boot test and health check parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootConfig {
    /// Supply voltage window applied to every servo
    pub power: PowerLimits,
    /// Over-temperature limit (°C)
    pub temp_limit_c: u8,
    /// Pause after each servo's boot test (ms)
    pub pace_ms: u32,
    /// LED error triggers written during the boot test
    pub led_error_triggers: ErrorTriggers,
    /// Number of "ready" LED flashes in the health check
    pub led_flashes: u8,
    /// LED on (and off) time per flash (ms)
    pub led_flash_ms: u32,
}

impl BootConfig {
    /// Boot parameters for the LX-16A leg rig
    pub const fn rig_default() -> Self {
        Self {
            power: PowerLimits::new(5000, 11500),
            temp_limit_c: 85,
            pace_ms: 300,
            led_error_triggers: ErrorTriggers::NONE,
            led_flashes: 3,
            led_flash_ms: 100,
        }
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::rig_default()
    }
}

/// Move and settle durations for one homing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HomingProfile {
    /// Interpolation time sent with each move (ms)
    pub move_ms: u16,
    /// Blocking wait after all moves were issued (ms)
    pub settle_ms: u32,
    /// Read physical angles back after settling
    pub readback: bool,
}

/// Motion timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Initial homing from power-on pose
    pub homing: HomingProfile,
    /// Return-to-rest after the gait window
    pub rest: HomingProfile,
    /// Pause between angle readbacks (ms)
    pub readback_pace_ms: u32,
    /// Gait window length (ms)
    pub gait_window_ms: u32,
    /// Pause after each group sub-tick (ms)
    pub tick_interval_ms: u32,
    /// Interpolation time sent with each gait setpoint (ms)
    pub gait_transit_ms: u16,
}

impl TimingConfig {
    /// Timings for the LX-16A leg rig
    pub const fn rig_default() -> Self {
        Self {
            homing: HomingProfile {
                move_ms: 1000,
                settle_ms: 1000,
                readback: true,
            },
            rest: HomingProfile {
                move_ms: 100,
                settle_ms: 100,
                readback: false,
            },
            readback_pace_ms: 300,
            gait_window_ms: 5000,
            tick_interval_ms: 100,
            gait_transit_ms: 100,
        }
    }

    /// Number of full tick pairs a fault-free window runs
    pub fn expected_ticks(&self) -> u32 {
        if self.tick_interval_ms == 0 {
            return 0;
        }
        let per_tick = self.tick_interval_ms.saturating_mul(2);
        self.gait_window_ms.div_ceil(per_tick)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::rig_default()
    }
}

//! Actuator safety limits

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fault::Violation;

/// Lowest commandable angle (degrees)
pub const MIN_ANGLE_DEG: f32 = 0.0;

/// Highest commandable angle (degrees)
pub const MAX_ANGLE_DEG: f32 = 240.0;

/// Servo supply voltage range (mV)
pub const MIN_SUPPLY_MV: u16 = 4500;
pub const MAX_SUPPLY_MV: u16 = 12000;

/// Servo temperature limit range (°C)
pub const MIN_TEMP_LIMIT_C: u8 = 50;
pub const MAX_TEMP_LIMIT_C: u8 = 100;

/// Angle limits in degrees
///
/// Invariant: `0 <= min < max <= 240`. The only way to build one is
/// [`AngleLimits::new`], which enforces it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleLimits {
    min: f32,
    max: f32,
}

impl AngleLimits {
    /// Full mechanical range of the servo
    pub const FULL: Self = Self {
        min: MIN_ANGLE_DEG,
        max: MAX_ANGLE_DEG,
    };

    /// Validate a limit pair
    pub fn new(min: f32, max: f32) -> Result<Self, Violation> {
        // Written so that NaN bounds fail as well
        let in_range = |v: f32| (MIN_ANGLE_DEG..=MAX_ANGLE_DEG).contains(&v);
        if !(in_range(min) && in_range(max) && min < max) {
            return Err(Violation::InvalidAngleLimits { min, max });
        }
        Ok(Self { min, max })
    }

    /// Build limits in a const context
    ///
    /// Callers must uphold the invariant; used for compiled-in tables that
    /// are checked by [`crate::config::RigConfig::validate`].
    pub const fn new_unchecked(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Lower bound
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Check that `angle` lies within the closed range
    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.min && angle <= self.max
    }

    /// Check that a target is commandable, returning the violation otherwise
    pub fn check_target(&self, target: f32) -> Result<(), Violation> {
        if self.contains(target) {
            Ok(())
        } else {
            Err(Violation::TargetOutOfLimits {
                target,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Re-check the invariant (for limits built with `new_unchecked`)
    pub fn validate(&self) -> Result<(), Violation> {
        Self::new(self.min, self.max).map(|_| ())
    }
}

impl Default for AngleLimits {
    fn default() -> Self {
        Self::FULL
    }
}

/// Supply voltage window in millivolts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerLimits {
    /// Under-voltage threshold (mV)
    pub min_mv: u16,
    /// Over-voltage threshold (mV)
    pub max_mv: u16,
}

impl PowerLimits {
    /// Create a voltage window
    pub const fn new(min_mv: u16, max_mv: u16) -> Self {
        Self { min_mv, max_mv }
    }

    /// Check the window lies within the servo's supply range
    pub fn validate(&self) -> Result<(), Violation> {
        let in_range = |v: u16| (MIN_SUPPLY_MV..=MAX_SUPPLY_MV).contains(&v);
        if in_range(self.min_mv) && in_range(self.max_mv) && self.min_mv < self.max_mv {
            Ok(())
        } else {
            Err(Violation::InvalidVoltageRange {
                min_mv: self.min_mv,
                max_mv: self.max_mv,
            })
        }
    }
}

impl Default for PowerLimits {
    fn default() -> Self {
        Self::new(MIN_SUPPLY_MV, MAX_SUPPLY_MV)
    }
}

/// Check a temperature limit lies within the servo's range
pub fn validate_temp_limit(limit_c: u8) -> Result<(), Violation> {
    if (MIN_TEMP_LIMIT_C..=MAX_TEMP_LIMIT_C).contains(&limit_c) {
        Ok(())
    } else {
        Err(Violation::InvalidTemperatureLimit { limit_c })
    }
}

//! Rig layout configuration
//!
//! One row per joint: bus ID, where the joint sits, its mechanical angle
//! limits, its home angle and its gait swing. The home pose, the limit
//! table and the gait table are all views over these rows.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timing::{BootConfig, TimingConfig};
use crate::actuator::{ActuatorId, AngleLimits, MAX_ACTUATOR_ID};
use crate::fault::Violation;
use crate::motion::gait::{GaitPhaseSpec, LegGroup, Sign};
use crate::motion::homing::HomePose;

/// Number of joints on the rig
pub const JOINT_COUNT: usize = 8;

/// Leg a joint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Leg {
    Front,
    Left,
    Back,
    Right,
}

impl Leg {
    /// Sub-tick group this leg is driven in
    pub fn group(self) -> LegGroup {
        match self {
            Leg::Front | Leg::Back => LegGroup::FrontBack,
            Leg::Left | Leg::Right => LegGroup::LeftRight,
        }
    }
}

/// Joint on a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointKind {
    Ankle,
    Knee,
}

/// Physical position of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointPosition {
    pub leg: Leg,
    pub kind: JointKind,
}

impl JointPosition {
    pub const fn new(leg: Leg, kind: JointKind) -> Self {
        Self { leg, kind }
    }

    /// Sub-tick group this joint is driven in
    pub fn group(&self) -> LegGroup {
        self.leg.group()
    }
}

/// Configuration for one joint actuator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointConfig {
    /// Bus ID
    pub id: ActuatorId,
    /// Where the joint sits
    pub position: JointPosition,
    /// Mechanical angle limits (degrees)
    pub angle_limits: AngleLimits,
    /// Rest/standing angle (degrees)
    pub home_angle: f32,
    /// Gait swing around the home angle
    pub gait: GaitPhaseSpec,
}

impl JointConfig {
    /// Joint whose gait swings around its home angle
    pub const fn new(
        id: u8,
        position: JointPosition,
        limits: (f32, f32),
        home_angle: f32,
        amplitude: f32,
        sign: Sign,
    ) -> Self {
        Self {
            id: ActuatorId::new_unchecked(id),
            position,
            angle_limits: AngleLimits::new_unchecked(limits.0, limits.1),
            home_angle,
            gait: GaitPhaseSpec::new(home_angle, amplitude, sign),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Joint ID outside the bus range
    InvalidId(u8),
    /// Two joints share an ID
    DuplicateId(u8),
    /// Joint angle limits break the 0 <= min < max <= 240 invariant
    InvalidLimits { id: u8, violation: Violation },
    /// Home angle outside the joint's limits
    HomeOutsideLimits { id: u8, home: f32 },
    /// Gait swing leaves the joint's limits
    GaitOutsideLimits { id: u8, low: f32, high: f32 },
    /// Gait amplitude negative or not finite
    InvalidAmplitude { id: u8 },
    /// Boot voltage or temperature limits invalid
    InvalidBoot(Violation),
    /// A duration that must be positive is zero
    ZeroDuration(TimingField),
}

/// Timing fields that must be non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingField {
    GaitWindow,
    TickInterval,
    GaitTransit,
    LedFlash,
}

impl fmt::Display for TimingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingField::GaitWindow => "gait window",
            TimingField::TickInterval => "tick interval",
            TimingField::GaitTransit => "gait transit time",
            TimingField::LedFlash => "LED flash time",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::InvalidId(id) => write!(f, "joint {}: ID outside the bus range 0-253", id),
            ConfigError::DuplicateId(id) => write!(f, "joint {}: ID used by more than one joint", id),
            ConfigError::InvalidLimits { id, violation } => write!(f, "joint {}: {}", id, violation),
            ConfigError::HomeOutsideLimits { id, home } => {
                write!(f, "joint {}: home angle {} outside its limits", id, home)
            }
            ConfigError::GaitOutsideLimits { id, low, high } => write!(
                f,
                "joint {}: gait swing {}..{} leaves its limits",
                id, low, high
            ),
            ConfigError::InvalidAmplitude { id } => {
                write!(f, "joint {}: gait amplitude must be finite and non-negative", id)
            }
            ConfigError::InvalidBoot(violation) => write!(f, "boot: {}", violation),
            ConfigError::ZeroDuration(field) => write!(f, "{} must be non-zero", field),
        }
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigConfig {
    /// Joint rows in bus ID order
    pub joints: [JointConfig; JOINT_COUNT],
    /// Boot test parameters
    pub boot: BootConfig,
    /// Motion timing
    pub timing: TimingConfig,
}

impl RigConfig {
    /// The eight-servo leg rig
    ///
    /// Limits are tuned to each joint's mechanical range; the front and back
    /// knees are the only joints that cannot use the full servo travel.
    pub const fn quadruped() -> Self {
        use JointKind::*;
        use Leg::*;

        Self {
            joints: [
                JointConfig::new(1, JointPosition::new(Front, Ankle), (0.0, 240.0), 145.68, 20.0, Sign::Positive),
                JointConfig::new(2, JointPosition::new(Front, Knee), (81.0, 240.0), 115.92, 15.0, Sign::Positive),
                JointConfig::new(3, JointPosition::new(Left, Ankle), (0.0, 240.0), 141.84, 20.0, Sign::Positive),
                JointConfig::new(4, JointPosition::new(Left, Knee), (0.0, 240.0), 155.52, 15.0, Sign::Positive),
                JointConfig::new(5, JointPosition::new(Back, Ankle), (0.0, 240.0), 114.52, 20.0, Sign::Positive),
                JointConfig::new(6, JointPosition::new(Back, Knee), (138.0, 240.0), 172.08, 15.0, Sign::Negative),
                JointConfig::new(7, JointPosition::new(Right, Ankle), (0.0, 240.0), 130.56, 20.0, Sign::Negative),
                JointConfig::new(8, JointPosition::new(Right, Knee), (0.0, 240.0), 122.16, 15.0, Sign::Negative),
            ],
            boot: BootConfig::rig_default(),
            timing: TimingConfig::rig_default(),
        }
    }

    /// Joint row for an actuator
    pub fn joint(&self, id: ActuatorId) -> Option<&JointConfig> {
        self.joints.iter().find(|j| j.id == id)
    }

    /// Raw bus IDs in table order
    pub fn ids(&self) -> [u8; JOINT_COUNT] {
        let mut ids = [0u8; JOINT_COUNT];
        for (slot, joint) in ids.iter_mut().zip(self.joints.iter()) {
            *slot = joint.id.get();
        }
        ids
    }

    /// Home angle for every joint
    pub fn home_pose(&self) -> HomePose {
        HomePose::from_joints(&self.joints)
    }

    /// Check every invariant the rig relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, joint) in self.joints.iter().enumerate() {
            let id = joint.id.get();
            if id > MAX_ACTUATOR_ID {
                return Err(ConfigError::InvalidId(id));
            }
            if self.joints[..i].iter().any(|other| other.id == joint.id) {
                return Err(ConfigError::DuplicateId(id));
            }

            joint
                .angle_limits
                .validate()
                .map_err(|violation| ConfigError::InvalidLimits { id, violation })?;

            if !joint.angle_limits.contains(joint.home_angle) {
                return Err(ConfigError::HomeOutsideLimits {
                    id,
                    home: joint.home_angle,
                });
            }

            let amplitude = joint.gait.amplitude;
            if !amplitude.is_finite() || amplitude < 0.0 {
                return Err(ConfigError::InvalidAmplitude { id });
            }
            let (low, high) = (joint.gait.min_angle(), joint.gait.max_angle());
            if !(joint.angle_limits.contains(low) && joint.angle_limits.contains(high)) {
                return Err(ConfigError::GaitOutsideLimits { id, low, high });
            }
        }

        self.boot.power.validate().map_err(ConfigError::InvalidBoot)?;
        crate::actuator::limits::validate_temp_limit(self.boot.temp_limit_c)
            .map_err(ConfigError::InvalidBoot)?;

        let timing = &self.timing;
        if timing.gait_window_ms == 0 {
            return Err(ConfigError::ZeroDuration(TimingField::GaitWindow));
        }
        if timing.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration(TimingField::TickInterval));
        }
        if timing.gait_transit_ms == 0 {
            return Err(ConfigError::ZeroDuration(TimingField::GaitTransit));
        }
        if self.boot.led_flash_ms == 0 {
            return Err(ConfigError::ZeroDuration(TimingField::LedFlash));
        }

        Ok(())
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        Self::quadruped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadruped_is_valid() {
        let config = RigConfig::quadruped();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.ids(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_limit_table() {
        let config = RigConfig::quadruped();
        let limits = |raw| config.joint(ActuatorId::new(raw).unwrap()).unwrap().angle_limits;

        assert_eq!(limits(2), AngleLimits::new(81.0, 240.0).unwrap());
        assert_eq!(limits(6), AngleLimits::new(138.0, 240.0).unwrap());
        assert_eq!(limits(1), AngleLimits::FULL);
    }

    #[test]
    fn test_groups() {
        let config = RigConfig::quadruped();
        let groups: [LegGroup; JOINT_COUNT] = core::array::from_fn(|i| config.joints[i].position.group());
        use LegGroup::*;
        assert_eq!(
            groups,
            [FrontBack, FrontBack, LeftRight, LeftRight, FrontBack, FrontBack, LeftRight, LeftRight]
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut config = RigConfig::quadruped();
        config.joints[7].id = ActuatorId::new(3).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::DuplicateId(3)));
    }

    #[test]
    fn test_home_outside_limits_rejected() {
        let mut config = RigConfig::quadruped();
        config.joints[5].home_angle = 120.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::HomeOutsideLimits { id: 6, home: 120.0 })
        );
    }

    #[test]
    fn test_gait_envelope_checked() {
        let mut config = RigConfig::quadruped();
        config.joints[1].gait.amplitude = 40.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GaitOutsideLimits { id: 2, .. })
        ));
    }

    #[test]
    fn test_bad_limits_rejected() {
        let mut config = RigConfig::quadruped();
        config.joints[0].angle_limits = AngleLimits::new_unchecked(200.0, 100.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimits { id: 1, .. })
        ));
    }

    #[test]
    fn test_zero_timing_rejected() {
        let mut config = RigConfig::quadruped();
        config.timing.tick_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration(TimingField::TickInterval))
        );
    }

    #[test]
    fn test_error_display_names_joint() {
        use std::string::ToString;

        assert_eq!(
            ConfigError::DuplicateId(3).to_string(),
            "joint 3: ID used by more than one joint"
        );
        assert_eq!(
            ConfigError::ZeroDuration(TimingField::GaitWindow).to_string(),
            "gait window must be non-zero"
        );
    }
}

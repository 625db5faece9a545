//! Gait trajectory generator
//!
//! Each joint follows a sinusoid around its home angle:
//!
//! ```text
//! angle(t) = base + sign * amplitude * sin(omega * t + phase)
//! ```
//!
//! The generator is a pure function of elapsed time. It keeps no state
//! between calls and does no velocity planning; each setpoint is sent as a
//! short move and the servo's own interpolation smooths between them.

use core::f32::consts::{PI, TAU};

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actuator::ActuatorId;
use crate::config::{JointConfig, JOINT_COUNT};

/// Default angular frequency: one full cycle per second
pub const DEFAULT_ANGULAR_FREQUENCY: f32 = TAU;

/// Group of joints emitted together in one sub-tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LegGroup {
    /// Front and back legs (first sub-tick)
    FrontBack,
    /// Left and right legs (second sub-tick)
    LeftRight,
}

impl LegGroup {
    /// Emission order within one tick
    pub const ORDER: [LegGroup; 2] = [LegGroup::FrontBack, LegGroup::LeftRight];
}

/// Direction of a joint's swing relative to the shared oscillator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Multiplier applied to the amplitude
    pub fn factor(self) -> f32 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Sinusoid parameters for one joint
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaitPhaseSpec {
    /// Centre of the swing (degrees)
    pub base_angle: f32,
    /// Peak deviation from the centre (degrees, non-negative)
    pub amplitude: f32,
    /// Radians per second
    pub angular_frequency: f32,
    /// Phase at t = 0 (radians)
    pub phase_offset: f32,
    /// Swing direction
    pub sign: Sign,
}

impl GaitPhaseSpec {
    /// Swing at one cycle per second with zero phase offset
    pub const fn new(base_angle: f32, amplitude: f32, sign: Sign) -> Self {
        Self {
            base_angle,
            amplitude,
            angular_frequency: DEFAULT_ANGULAR_FREQUENCY,
            phase_offset: 0.0,
            sign,
        }
    }

    /// Same swing with a different phase offset
    pub const fn with_phase(mut self, phase_offset: f32) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Lowest angle the swing reaches
    pub fn min_angle(&self) -> f32 {
        self.base_angle - self.amplitude
    }

    /// Highest angle the swing reaches
    pub fn max_angle(&self) -> f32 {
        self.base_angle + self.amplitude
    }

    /// Target angle `t` seconds into the gait
    pub fn angle_at(&self, t: f32) -> f32 {
        angle(t, self)
    }
}

/// Target angle `t` seconds into the gait
pub fn angle(t: f32, spec: &GaitPhaseSpec) -> f32 {
    spec.base_angle
        + spec.sign.factor()
            * spec.amplitude
            * libm::sinf(spec.angular_frequency * t + spec.phase_offset)
}

/// How two joints swing relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseRelation {
    /// Deviations always share a sign
    InPhase,
    /// Deviations always have opposite signs
    AntiPhase,
    /// Neither
    Offset,
}

/// Classify the phase relationship between two joint swings
pub fn phase_relation(a: &GaitPhaseSpec, b: &GaitPhaseSpec) -> PhaseRelation {
    const EPS: f32 = 1e-4;

    if (a.angular_frequency - b.angular_frequency).abs() > EPS {
        return PhaseRelation::Offset;
    }

    // Fold the sign into the phase: a negative swing is a half-cycle shift
    let effective = |s: &GaitPhaseSpec| match s.sign {
        Sign::Positive => s.phase_offset,
        Sign::Negative => s.phase_offset + PI,
    };
    let delta = libm::fmodf(effective(a) - effective(b), TAU);
    let delta = if delta < 0.0 { delta + TAU } else { delta };

    if delta < EPS || (TAU - delta) < EPS {
        PhaseRelation::InPhase
    } else if (delta - PI).abs() < EPS {
        PhaseRelation::AntiPhase
    } else {
        PhaseRelation::Offset
    }
}

/// One target issued to one actuator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Setpoint {
    pub id: ActuatorId,
    pub angle: f32,
}

/// Per-joint swing entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaitEntry {
    pub id: ActuatorId,
    pub group: LegGroup,
    pub spec: GaitPhaseSpec,
}

/// Gait table for the whole rig
///
/// Entries keep configuration order, which is also their emission order
/// within a group.
#[derive(Debug, Clone)]
pub struct GaitGenerator {
    entries: Vec<GaitEntry, JOINT_COUNT>,
}

impl GaitGenerator {
    /// Build from joint configuration rows
    pub fn from_joints(joints: &[JointConfig]) -> Self {
        let mut entries = Vec::new();
        for joint in joints.iter().take(JOINT_COUNT) {
            let _ = entries.push(GaitEntry {
                id: joint.id,
                group: joint.position.group(),
                spec: joint.gait,
            });
        }
        Self { entries }
    }

    /// All entries
    pub fn entries(&self) -> &[GaitEntry] {
        &self.entries
    }

    /// Swing parameters for one actuator
    pub fn spec(&self, id: ActuatorId) -> Option<&GaitPhaseSpec> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.spec)
    }

    /// Setpoints for one group at time `t` (seconds)
    pub fn setpoints(&self, t: f32, group: LegGroup) -> impl Iterator<Item = Setpoint> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.group == group)
            .map(move |e| Setpoint {
                id: e.id,
                angle: angle(t, &e.spec),
            })
    }
}

//! Homing coordinator
//!
//! Sends every actuator to its home angle, waits a fixed settle time, and
//! optionally reads the sensed angles back. Faults are recorded and handed
//! to the stage policy, which lets the remaining actuators continue.

use heapless::Vec;

use crate::actuator::ActuatorId;
use crate::config::{HomingProfile, JointConfig, JOINT_COUNT};
use crate::fault::Fault;
use crate::rig::Rig;
use crate::safety::{disposition, Disposition, Stage};
use crate::traits::{Pacer, ServoBus};

/// Check if `stage` carries on past `fault`
fn tolerated(stage: Stage, fault: &Fault) -> bool {
    matches!(disposition(stage, fault.kind()), Disposition::SkipActuator)
}

/// Home angle per actuator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomePose {
    entries: Vec<(ActuatorId, f32), JOINT_COUNT>,
}

impl HomePose {
    /// Collect the home angle of each joint row
    pub fn from_joints(joints: &[JointConfig]) -> Self {
        let mut entries = Vec::new();
        for joint in joints.iter().take(JOINT_COUNT) {
            let _ = entries.push((joint.id, joint.home_angle));
        }
        Self { entries }
    }

    /// Home angle for one actuator
    pub fn angle(&self, id: ActuatorId) -> Option<f32> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|&(_, angle)| angle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActuatorId, f32)> + '_ {
        self.entries.iter().copied()
    }
}

/// Sensed angle after homing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleReading {
    pub id: ActuatorId,
    /// Angle the actuator was sent to, if the move went out
    pub commanded: Option<f32>,
    /// Angle the actuator reported
    pub sensed: Result<f32, Fault>,
}

/// Outcome of one homing pass
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingReport {
    /// Actuators whose home move was sent
    pub reached: Vec<ActuatorId, JOINT_COUNT>,
    /// Per-actuator move faults
    pub warnings: Vec<Fault, JOINT_COUNT>,
    /// Readback results, empty when the profile skips readback
    pub readings: Vec<AngleReading, JOINT_COUNT>,
}

impl HomingReport {
    /// Every actuator was sent home
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Applies a [`HomePose`] to a rig
#[derive(Debug, Clone)]
pub struct HomingCoordinator {
    pose: HomePose,
    readback_pace_ms: u32,
}

impl HomingCoordinator {
    pub fn new(pose: HomePose, readback_pace_ms: u32) -> Self {
        Self {
            pose,
            readback_pace_ms,
        }
    }

    pub fn pose(&self) -> &HomePose {
        &self.pose
    }

    /// Run one homing pass with `profile`
    ///
    /// Blocks for the settle time once all moves are out, then for the
    /// readback pace after each read. Actuators without a home angle are
    /// left alone. A fault the stage policy does not skip past stops that
    /// pass early; it is still recorded in the report.
    pub fn home<B, P>(&self, rig: &mut Rig<B>, pacer: &mut P, profile: HomingProfile) -> HomingReport
    where
        B: ServoBus,
        P: Pacer,
    {
        let mut report = HomingReport::default();

        for index in 0..rig.len() {
            let Some(mut joint) = rig.joint_at(index) else {
                break;
            };
            let Some(target) = self.pose.angle(joint.id()) else {
                continue;
            };
            match joint.move_to(target, profile.move_ms) {
                Ok(()) => {
                    let _ = report.reached.push(joint.id());
                }
                Err(fault) => {
                    let _ = report.warnings.push(fault);
                    if !tolerated(Stage::Homing, &fault) {
                        break;
                    }
                }
            }
        }

        pacer.pause_ms(profile.settle_ms);

        if profile.readback {
            for index in 0..rig.len() {
                let Some(mut joint) = rig.joint_at(index) else {
                    break;
                };
                let reading = AngleReading {
                    id: joint.id(),
                    commanded: joint.actuator().commanded_angle(),
                    sensed: joint.physical_angle(),
                };
                let _ = report.readings.push(reading);
                pacer.pause_ms(self.readback_pace_ms);

                if let Err(fault) = reading.sensed {
                    if !tolerated(Stage::Readback, &fault) {
                        break;
                    }
                }
            }
        }

        report
    }
}

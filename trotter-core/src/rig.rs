//! The assembled rig
//!
//! A [`Rig`] owns the servo bus and every actuator handle on it. Stages take
//! `&mut Rig`, so bus access is serialized by ownership and there is no
//! global actuator list.

use heapless::Vec;

use crate::actuator::{Actuator, ActuatorId, PowerLimits};
use crate::config::JOINT_COUNT;
use crate::fault::{Fault, Violation};
use crate::traits::{ErrorTriggers, ServoBus, ServoMode};

/// Bus plus the actuator handles addressed over it
#[derive(Debug)]
pub struct Rig<B> {
    bus: B,
    actuators: Vec<Actuator, JOINT_COUNT>,
}

impl<B: ServoBus> Rig<B> {
    /// Construct a handle for each ID, in order
    ///
    /// Fails with an argument fault on an out-of-range or repeated ID, or
    /// when more IDs are given than the rig has joints. Nothing is sent on
    /// the bus.
    pub fn assemble(bus: B, ids: &[u8]) -> Result<Self, Fault> {
        let mut actuators: Vec<Actuator, JOINT_COUNT> = Vec::new();
        for &raw in ids {
            let id = ActuatorId::new(raw)?;
            if actuators.iter().any(|a| a.id() == id) {
                return Err(Fault::new(raw, Violation::DuplicateId));
            }
            actuators
                .push(Actuator::new(id))
                .map_err(|_| Fault::new(raw, Violation::TooManyActuators))?;
        }
        Ok(Self { bus, actuators })
    }

    /// Number of actuators
    pub fn len(&self) -> usize {
        self.actuators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
    }

    /// IDs in construction order
    pub fn ids(&self) -> impl Iterator<Item = ActuatorId> + '_ {
        self.actuators.iter().map(Actuator::id)
    }

    /// Read-only view of every handle
    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    /// Read-only handle lookup
    pub fn actuator(&self, id: ActuatorId) -> Option<&Actuator> {
        self.actuators.iter().find(|a| a.id() == id)
    }

    /// Bus-bound handle for one actuator
    pub fn joint(&mut self, id: ActuatorId) -> Option<Joint<'_, B>> {
        let actuator = self.actuators.iter_mut().find(|a| a.id() == id)?;
        Some(Joint {
            actuator,
            bus: &mut self.bus,
        })
    }

    /// Bus-bound handle by construction index
    pub fn joint_at(&mut self, index: usize) -> Option<Joint<'_, B>> {
        let actuator = self.actuators.get_mut(index)?;
        Some(Joint {
            actuator,
            bus: &mut self.bus,
        })
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn into_bus(self) -> B {
        self.bus
    }
}

/// One actuator together with the bus it talks over
///
/// Forwards to the [`Actuator`] methods so stages do not have to juggle two
/// borrows.
pub struct Joint<'a, B> {
    actuator: &'a mut Actuator,
    bus: &'a mut B,
}

impl<B: ServoBus> Joint<'_, B> {
    pub fn id(&self) -> ActuatorId {
        self.actuator.id()
    }

    /// Local mirror of the actuator's state
    pub fn actuator(&self) -> &Actuator {
        &*self.actuator
    }

    pub fn configure(&mut self, power: PowerLimits, temp_limit_c: u8) -> Result<(), Fault> {
        self.actuator.configure(self.bus, power, temp_limit_c)
    }

    pub fn set_mode(&mut self, mode: ServoMode) -> Result<(), Fault> {
        self.actuator.set_mode(self.bus, mode)
    }

    pub fn set_torque(&mut self, enabled: bool) -> Result<(), Fault> {
        self.actuator.set_torque(self.bus, enabled)
    }

    pub fn set_led_power(&mut self, on: bool) -> Result<(), Fault> {
        self.actuator.set_led_power(self.bus, on)
    }

    pub fn set_led_error_triggers(&mut self, triggers: ErrorTriggers) -> Result<(), Fault> {
        self.actuator.set_led_error_triggers(self.bus, triggers)
    }

    pub fn set_angle_limits(&mut self, min: f32, max: f32) -> Result<(), Fault> {
        self.actuator.set_angle_limits(self.bus, min, max)
    }

    pub fn move_to(&mut self, target: f32, duration_ms: u16) -> Result<(), Fault> {
        self.actuator.move_to(self.bus, target, duration_ms)
    }

    pub fn physical_angle(&mut self) -> Result<f32, Fault> {
        self.actuator.physical_angle(self.bus)
    }

    pub fn error_trigger_state(&mut self) -> Result<ErrorTriggers, Fault> {
        self.actuator.error_trigger_state(self.bus)
    }

    pub fn verify_identity(&mut self) -> Result<(), Fault> {
        self.actuator.verify_identity(self.bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::testing::{Command, MockBus};

    #[test]
    fn test_assemble_in_order() {
        let rig = Rig::assemble(MockBus::new(), &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(rig.len(), 8);
        let ids: std::vec::Vec<u8> = rig.ids().map(ActuatorId::get).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8]);
        // Construction is local only
        assert!(rig.bus().log().is_empty());
    }

    #[test]
    fn test_assemble_rejects_bad_ids() {
        let err = Rig::assemble(MockBus::new(), &[1, 254]).unwrap_err();
        assert_eq!(err, Fault::new(254, Violation::IdOutOfRange));
        assert_eq!(err.kind(), FaultKind::Argument);

        let err = Rig::assemble(MockBus::new(), &[1, 2, 1]).unwrap_err();
        assert_eq!(err, Fault::new(1, Violation::DuplicateId));
    }

    #[test]
    fn test_assemble_rejects_too_many() {
        let ids: std::vec::Vec<u8> = (1..=9).collect();
        let err = Rig::assemble(MockBus::new(), &ids).unwrap_err();
        assert_eq!(err, Fault::new(9, Violation::TooManyActuators));
        assert_eq!(err.kind(), FaultKind::Argument);
    }

    #[test]
    fn test_joint_forwards_to_bus() {
        let mut rig = Rig::assemble(MockBus::new(), &[4, 7]).unwrap();
        let id = ActuatorId::new(7).unwrap();

        let mut joint = rig.joint(id).unwrap();
        joint.set_torque(true).unwrap();
        joint.move_to(90.0, 100).unwrap();

        assert_eq!(rig.actuator(id).unwrap().commanded_angle(), Some(90.0));
        assert_eq!(
            rig.bus().log(),
            &[
                Command::Torque { id: 7, enabled: true },
                Command::Move { id: 7, angle: 90.0, duration_ms: 100 },
            ]
        );
        assert!(rig.joint(ActuatorId::new(5).unwrap()).is_none());
        assert!(rig.joint_at(2).is_none());
    }
}

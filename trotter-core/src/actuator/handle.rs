//! Actuator handle
//!
//! Local mirror of one servo's configuration. Commands are checked against
//! this mirror first; only valid commands reach the bus, and the mirror is
//! only updated once the bus accepted the write.

use super::id::ActuatorId;
use super::limits::{validate_temp_limit, AngleLimits, PowerLimits};
use crate::fault::{Fault, Violation};
use crate::traits::{ErrorTriggers, ServoBus, ServoMode};

/// Default servo over-temperature limit (°C)
pub const DEFAULT_TEMP_LIMIT_C: u8 = 85;

/// One physical joint actuator
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Actuator {
    id: ActuatorId,
    angle_limits: AngleLimits,
    mode: ServoMode,
    torque_enabled: bool,
    power_limits: PowerLimits,
    temp_limit_c: u8,
    led_triggers: ErrorTriggers,
    commanded_angle: Option<f32>,
}

impl Actuator {
    /// Create a handle in the servo's power-on state
    ///
    /// Torque starts disabled, so the actuator refuses moves until the boot
    /// test has loaded the motor.
    pub fn new(id: ActuatorId) -> Self {
        Self {
            id,
            angle_limits: AngleLimits::FULL,
            mode: ServoMode::Servo,
            torque_enabled: false,
            power_limits: PowerLimits::default(),
            temp_limit_c: DEFAULT_TEMP_LIMIT_C,
            led_triggers: ErrorTriggers::ALL,
            commanded_angle: None,
        }
    }

    /// Bus identity
    pub fn id(&self) -> ActuatorId {
        self.id
    }

    /// Currently configured angle limits
    pub fn angle_limits(&self) -> AngleLimits {
        self.angle_limits
    }

    /// Current operating mode
    pub fn mode(&self) -> ServoMode {
        self.mode
    }

    /// Check if the motor is loaded
    pub fn torque_enabled(&self) -> bool {
        self.torque_enabled
    }

    /// Configured supply voltage window
    pub fn power_limits(&self) -> PowerLimits {
        self.power_limits
    }

    /// Configured temperature limit (°C)
    pub fn temp_limit_c(&self) -> u8 {
        self.temp_limit_c
    }

    /// Configured LED error triggers
    pub fn led_triggers(&self) -> ErrorTriggers {
        self.led_triggers
    }

    /// Last target sent with [`Actuator::move_to`]
    pub fn commanded_angle(&self) -> Option<f32> {
        self.commanded_angle
    }

    fn fault(&self, violation: Violation) -> Fault {
        Fault::new(self.id.get(), violation)
    }

    /// Set the electrical and thermal safety limits
    pub fn configure<B: ServoBus>(
        &mut self,
        bus: &mut B,
        power: PowerLimits,
        temp_limit_c: u8,
    ) -> Result<(), Fault> {
        power.validate().map_err(|v| self.fault(v))?;
        validate_temp_limit(temp_limit_c).map_err(|v| self.fault(v))?;

        let id = self.id.get();
        bus.set_vin_limits(id, power.min_mv, power.max_mv)
            .map_err(|e| Fault::from_bus(id, e))?;
        self.power_limits = power;

        bus.set_temp_limit(id, temp_limit_c)
            .map_err(|e| Fault::from_bus(id, e))?;
        self.temp_limit_c = temp_limit_c;
        Ok(())
    }

    /// Select servo or motor mode
    pub fn set_mode<B: ServoBus>(&mut self, bus: &mut B, mode: ServoMode) -> Result<(), Fault> {
        let id = self.id.get();
        bus.set_mode(id, mode).map_err(|e| Fault::from_bus(id, e))?;
        self.mode = mode;
        Ok(())
    }

    /// Load or unload the motor
    pub fn set_torque<B: ServoBus>(&mut self, bus: &mut B, enabled: bool) -> Result<(), Fault> {
        let id = self.id.get();
        bus.set_torque(id, enabled)
            .map_err(|e| Fault::from_bus(id, e))?;
        self.torque_enabled = enabled;
        Ok(())
    }

    /// Switch the LED on or off
    pub fn set_led_power<B: ServoBus>(&mut self, bus: &mut B, on: bool) -> Result<(), Fault> {
        let id = self.id.get();
        bus.set_led_power(id, on).map_err(|e| Fault::from_bus(id, e))
    }

    /// Configure which faults make the LED flash
    pub fn set_led_error_triggers<B: ServoBus>(
        &mut self,
        bus: &mut B,
        triggers: ErrorTriggers,
    ) -> Result<(), Fault> {
        let id = self.id.get();
        bus.set_led_error_triggers(id, triggers)
            .map_err(|e| Fault::from_bus(id, e))?;
        self.led_triggers = triggers;
        Ok(())
    }

    /// Set the angle limits
    ///
    /// A violating pair fails with an argument fault and leaves the stored
    /// limits untouched.
    pub fn set_angle_limits<B: ServoBus>(
        &mut self,
        bus: &mut B,
        min: f32,
        max: f32,
    ) -> Result<(), Fault> {
        let limits = AngleLimits::new(min, max).map_err(|v| self.fault(v))?;
        let id = self.id.get();
        bus.set_angle_limits(id, limits.min(), limits.max())
            .map_err(|e| Fault::from_bus(id, e))?;
        self.angle_limits = limits;
        Ok(())
    }

    /// Request an interpolated move to `target` over `duration_ms`
    ///
    /// Returns once the command is on the bus, not once motion completes.
    /// Targets outside the angle limits are never transmitted.
    pub fn move_to<B: ServoBus>(
        &mut self,
        bus: &mut B,
        target: f32,
        duration_ms: u16,
    ) -> Result<(), Fault> {
        self.angle_limits
            .check_target(target)
            .map_err(|v| self.fault(v))?;
        if !self.torque_enabled {
            return Err(self.fault(Violation::TorqueDisabled));
        }
        if self.mode == ServoMode::Motor {
            return Err(self.fault(Violation::MotorMode));
        }

        let id = self.id.get();
        bus.move_to(id, target, duration_ms)
            .map_err(|e| Fault::from_bus(id, e))?;
        self.commanded_angle = Some(target);
        Ok(())
    }

    /// Read the sensed position
    ///
    /// May differ from the commanded angle under load.
    pub fn physical_angle<B: ServoBus>(&self, bus: &mut B) -> Result<f32, Fault> {
        let id = self.id.get();
        bus.read_physical_angle(id)
            .map_err(|e| Fault::from_bus(id, e))
    }

    /// Read the three LED error flags
    pub fn error_trigger_state<B: ServoBus>(&self, bus: &mut B) -> Result<ErrorTriggers, Fault> {
        let id = self.id.get();
        bus.read_led_error_triggers(id)
            .map_err(|e| Fault::from_bus(id, e))
    }

    /// Ask the servo for its ID and check it matches this handle
    pub fn verify_identity<B: ServoBus>(&self, bus: &mut B) -> Result<(), Fault> {
        let id = self.id.get();
        let reported = bus.read_id(id).map_err(|e| Fault::from_bus(id, e))?;
        if reported != id {
            return Err(self.fault(Violation::IdMismatch { reported }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::testing::{Command, MockBus};
    use proptest::prelude::*;

    fn ready_actuator(bus: &mut MockBus, raw: u8) -> Actuator {
        let mut actuator = Actuator::new(ActuatorId::new(raw).unwrap());
        actuator.set_mode(bus, ServoMode::Servo).unwrap();
        actuator.set_torque(bus, true).unwrap();
        bus.clear_log();
        actuator
    }

    #[test]
    fn test_new_handle_state() {
        let actuator = Actuator::new(ActuatorId::new(2).unwrap());
        assert_eq!(actuator.id().get(), 2);
        assert_eq!(actuator.angle_limits(), AngleLimits::FULL);
        assert_eq!(actuator.mode(), ServoMode::Servo);
        assert!(!actuator.torque_enabled());
        assert_eq!(actuator.commanded_angle(), None);
    }

    #[test]
    fn test_move_transmits_valid_target() {
        let mut bus = MockBus::new();
        let mut actuator = ready_actuator(&mut bus, 1);

        actuator.move_to(&mut bus, 145.68, 1000).unwrap();
        assert_eq!(
            bus.log(),
            &[Command::Move {
                id: 1,
                angle: 145.68,
                duration_ms: 1000
            }]
        );
        assert_eq!(actuator.commanded_angle(), Some(145.68));
    }

    #[test]
    fn test_move_outside_limits_never_transmits() {
        let mut bus = MockBus::new();
        let mut actuator = ready_actuator(&mut bus, 6);
        actuator.set_angle_limits(&mut bus, 138.0, 240.0).unwrap();
        bus.clear_log();

        let fault = actuator.move_to(&mut bus, 120.0, 100).unwrap_err();
        assert_eq!(fault.actuator, 6);
        assert_eq!(fault.kind(), FaultKind::Argument);
        assert!(bus.log().is_empty());
        assert_eq!(actuator.commanded_angle(), None);
    }

    #[test]
    fn test_move_requires_torque() {
        let mut bus = MockBus::new();
        let mut actuator = Actuator::new(ActuatorId::new(4).unwrap());

        let fault = actuator.move_to(&mut bus, 120.0, 100).unwrap_err();
        assert_eq!(fault.violation, Violation::TorqueDisabled);
        assert_eq!(fault.kind(), FaultKind::Logical);
        assert!(bus.log().is_empty());
    }

    #[test]
    fn test_move_rejected_in_motor_mode() {
        let mut bus = MockBus::new();
        let mut actuator = ready_actuator(&mut bus, 4);
        actuator.set_mode(&mut bus, ServoMode::Motor).unwrap();
        bus.clear_log();

        let fault = actuator.move_to(&mut bus, 120.0, 100).unwrap_err();
        assert_eq!(fault.violation, Violation::MotorMode);
        assert!(bus.log().is_empty());
    }

    #[test]
    fn test_invalid_limits_leave_handle_untouched() {
        let mut bus = MockBus::new();
        let mut actuator = ready_actuator(&mut bus, 2);
        actuator.set_angle_limits(&mut bus, 81.0, 240.0).unwrap();
        bus.clear_log();

        let fault = actuator.set_angle_limits(&mut bus, 200.0, 100.0).unwrap_err();
        assert_eq!(fault.kind(), FaultKind::Argument);
        assert_eq!(actuator.angle_limits(), AngleLimits::new(81.0, 240.0).unwrap());
        assert!(bus.log().is_empty());

        assert!(actuator.set_angle_limits(&mut bus, 0.0, 241.0).is_err());
        assert_eq!(actuator.angle_limits().max(), 240.0);
    }

    #[test]
    fn test_configure_validates_before_writing() {
        let mut bus = MockBus::new();
        let mut actuator = Actuator::new(ActuatorId::new(1).unwrap());

        let fault = actuator
            .configure(&mut bus, PowerLimits::new(11500, 5000), 85)
            .unwrap_err();
        assert_eq!(fault.kind(), FaultKind::Argument);

        let fault = actuator
            .configure(&mut bus, PowerLimits::new(5000, 11500), 120)
            .unwrap_err();
        assert_eq!(
            fault.violation,
            Violation::InvalidTemperatureLimit { limit_c: 120 }
        );
        assert!(bus.log().is_empty());

        actuator
            .configure(&mut bus, PowerLimits::new(5000, 11500), 85)
            .unwrap();
        assert_eq!(actuator.power_limits(), PowerLimits::new(5000, 11500));
        assert_eq!(bus.log().len(), 2);
    }

    #[test]
    fn test_transport_faults_are_classified() {
        let mut bus = MockBus::new();
        bus.set_unresponsive(3);
        let actuator = Actuator::new(ActuatorId::new(3).unwrap());

        let fault = actuator.physical_angle(&mut bus).unwrap_err();
        assert_eq!(fault, Fault::new(3, Violation::NoResponse));

        bus.set_corrupt(7);
        let actuator = Actuator::new(ActuatorId::new(7).unwrap());
        let fault = actuator.error_trigger_state(&mut bus).unwrap_err();
        assert_eq!(fault.kind(), FaultKind::Checksum);
    }

    #[test]
    fn test_identity_check_detects_wrong_id() {
        let mut bus = MockBus::new();
        bus.set_reported_id(2, 9);
        let actuator = Actuator::new(ActuatorId::new(2).unwrap());

        let fault = actuator.verify_identity(&mut bus).unwrap_err();
        assert_eq!(fault.violation, Violation::IdMismatch { reported: 9 });

        let actuator = Actuator::new(ActuatorId::new(1).unwrap());
        assert!(actuator.verify_identity(&mut bus).is_ok());
    }

    proptest! {
        #[test]
        fn prop_move_outside_limits_rejected(target in -100.0f32..400.0) {
            let mut bus = MockBus::new();
            let mut actuator = ready_actuator(&mut bus, 2);
            actuator.set_angle_limits(&mut bus, 81.0, 240.0).unwrap();
            bus.clear_log();

            let result = actuator.move_to(&mut bus, target, 100);
            if (81.0..=240.0).contains(&target) {
                prop_assert!(result.is_ok());
                prop_assert_eq!(bus.log().len(), 1);
            } else {
                prop_assert_eq!(result.unwrap_err().kind(), FaultKind::Argument);
                prop_assert!(bus.log().is_empty());
            }
        }
    }
}

//! Servo bus transport trait
//!
//! The bus is a shared half-duplex channel addressing every actuator by
//! numeric ID. Implementations issue exactly one request at a time; the
//! caller serializes access simply by holding `&mut` to the bus.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Servo operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServoMode {
    /// Position control; accepts move commands
    #[default]
    Servo,
    /// Continuous rotation; move commands are rejected
    Motor,
}

/// LED error trigger flags
///
/// When a flag is configured the servo's LED flashes on that condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorTriggers {
    /// Over-temperature
    pub over_temperature: bool,
    /// Over-voltage
    pub over_voltage: bool,
    /// Rotor locked (stalled)
    pub rotor_locked: bool,
}

impl ErrorTriggers {
    /// All triggers disabled
    pub const NONE: Self = Self {
        over_temperature: false,
        over_voltage: false,
        rotor_locked: false,
    };

    /// All triggers enabled
    pub const ALL: Self = Self {
        over_temperature: true,
        over_voltage: true,
        rotor_locked: true,
    };

    /// Check if any flag is set
    pub fn any(&self) -> bool {
        self.over_temperature || self.over_voltage || self.rotor_locked
    }

    /// Pack into the servo's bit layout (bit0 temp, bit1 voltage, bit2 rotor)
    pub fn to_bits(self) -> u8 {
        (self.over_temperature as u8) | ((self.over_voltage as u8) << 1) | ((self.rotor_locked as u8) << 2)
    }

    /// Unpack from the servo's bit layout
    pub fn from_bits(bits: u8) -> Self {
        Self {
            over_temperature: bits & 0x01 != 0,
            over_voltage: bits & 0x02 != 0,
            rotor_locked: bits & 0x04 != 0,
        }
    }
}

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// No reply within the response window
    NoResponse,
    /// Reply with wrong header, length, ID or command
    Garbled,
    /// Reply with a checksum mismatch
    Checksum,
    /// Request could not be written
    Write,
}

/// Servo bus transport
///
/// Write commands are fire-and-forget at the protocol level: they return
/// once the request has been sent. Read commands return the decoded reply.
/// Angles are in degrees over the servo's 0-240 range.
pub trait ServoBus {
    /// Set the input voltage window (mV)
    fn set_vin_limits(&mut self, id: u8, min_mv: u16, max_mv: u16) -> Result<(), BusError>;

    /// Set the maximum internal temperature (°C)
    fn set_temp_limit(&mut self, id: u8, max_c: u8) -> Result<(), BusError>;

    /// Select servo or motor mode
    fn set_mode(&mut self, id: u8, mode: ServoMode) -> Result<(), BusError>;

    /// Load (true) or unload (false) the motor
    fn set_torque(&mut self, id: u8, enabled: bool) -> Result<(), BusError>;

    /// Switch the LED on or off
    fn set_led_power(&mut self, id: u8, on: bool) -> Result<(), BusError>;

    /// Configure which faults make the LED flash
    fn set_led_error_triggers(&mut self, id: u8, triggers: ErrorTriggers) -> Result<(), BusError>;

    /// Set the angle limits enforced by the servo itself
    fn set_angle_limits(&mut self, id: u8, min_deg: f32, max_deg: f32) -> Result<(), BusError>;

    /// Start an interpolated move to `angle_deg` over `duration_ms`
    fn move_to(&mut self, id: u8, angle_deg: f32, duration_ms: u16) -> Result<(), BusError>;

    /// Read the sensed shaft position
    fn read_physical_angle(&mut self, id: u8) -> Result<f32, BusError>;

    /// Read the LED error trigger flags
    fn read_led_error_triggers(&mut self, id: u8) -> Result<ErrorTriggers, BusError>;

    /// Read back the servo's own ID (used as a presence check)
    fn read_id(&mut self, id: u8) -> Result<u8, BusError>;
}

impl<B: ServoBus + ?Sized> ServoBus for &mut B {
    fn set_vin_limits(&mut self, id: u8, min_mv: u16, max_mv: u16) -> Result<(), BusError> {
        (**self).set_vin_limits(id, min_mv, max_mv)
    }

    fn set_temp_limit(&mut self, id: u8, max_c: u8) -> Result<(), BusError> {
        (**self).set_temp_limit(id, max_c)
    }

    fn set_mode(&mut self, id: u8, mode: ServoMode) -> Result<(), BusError> {
        (**self).set_mode(id, mode)
    }

    fn set_torque(&mut self, id: u8, enabled: bool) -> Result<(), BusError> {
        (**self).set_torque(id, enabled)
    }

    fn set_led_power(&mut self, id: u8, on: bool) -> Result<(), BusError> {
        (**self).set_led_power(id, on)
    }

    fn set_led_error_triggers(&mut self, id: u8, triggers: ErrorTriggers) -> Result<(), BusError> {
        (**self).set_led_error_triggers(id, triggers)
    }

    fn set_angle_limits(&mut self, id: u8, min_deg: f32, max_deg: f32) -> Result<(), BusError> {
        (**self).set_angle_limits(id, min_deg, max_deg)
    }

    fn move_to(&mut self, id: u8, angle_deg: f32, duration_ms: u16) -> Result<(), BusError> {
        (**self).move_to(id, angle_deg, duration_ms)
    }

    fn read_physical_angle(&mut self, id: u8) -> Result<f32, BusError> {
        (**self).read_physical_angle(id)
    }

    fn read_led_error_triggers(&mut self, id: u8) -> Result<ErrorTriggers, BusError> {
        (**self).read_led_error_triggers(id)
    }

    fn read_id(&mut self, id: u8) -> Result<u8, BusError> {
        (**self).read_id(id)
    }
}

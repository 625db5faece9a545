//! Actuator fault taxonomy
//!
//! Every operation on an actuator returns `Result<_, Fault>`. A fault names
//! the actuator and the constraint it violated; its [`FaultKind`] is derived
//! from the violation and is what the per-stage policy branches on
//! (see [`crate::safety::policy`]).

use core::fmt;

use crate::traits::BusError;

/// Coarse fault classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Caller supplied an out-of-range angle, limit or ID
    Argument,
    /// Command is invalid for the actuator's current mode or torque state
    Logical,
    /// No response, or a garbled one, within the protocol window
    Communication,
    /// Response arrived with a bad checksum
    Checksum,
}

impl FaultKind {
    /// Transport-level fault (communication or checksum)
    pub fn is_transport(&self) -> bool {
        matches!(self, FaultKind::Communication | FaultKind::Checksum)
    }

    /// Fault raised by the caller's request rather than the bus
    pub fn is_command(&self) -> bool {
        matches!(self, FaultKind::Argument | FaultKind::Logical)
    }
}

/// The specific constraint that was violated
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// Actuator ID outside the addressable bus range
    IdOutOfRange,
    /// Same ID assigned to two actuators
    DuplicateId,
    /// More actuators than the rig has joints
    TooManyActuators,
    /// Lower angle limit not below upper, or a bound outside [0, 240]
    InvalidAngleLimits { min: f32, max: f32 },
    /// Move target outside the configured angle limits
    TargetOutOfLimits { target: f32, min: f32, max: f32 },
    /// Supply voltage window invalid or outside the servo's range (mV)
    InvalidVoltageRange { min_mv: u16, max_mv: u16 },
    /// Temperature limit outside the servo's range (°C)
    InvalidTemperatureLimit { limit_c: u8 },
    /// Move issued while torque is disabled
    TorqueDisabled,
    /// Move issued while in continuous-rotation (motor) mode
    MotorMode,
    /// Actuator did not answer within the response window
    NoResponse,
    /// Reply framing was wrong (header, length, ID or command)
    GarbledResponse,
    /// Reply answered with a different ID than the one addressed
    IdMismatch { reported: u8 },
    /// Reply checksum did not match
    BadChecksum,
    /// Request could not be written to the bus
    WriteFailed,
}

impl Violation {
    /// Classify this violation
    pub fn kind(&self) -> FaultKind {
        match self {
            Violation::IdOutOfRange
            | Violation::DuplicateId
            | Violation::TooManyActuators
            | Violation::InvalidAngleLimits { .. }
            | Violation::TargetOutOfLimits { .. }
            | Violation::InvalidVoltageRange { .. }
            | Violation::InvalidTemperatureLimit { .. } => FaultKind::Argument,
            Violation::TorqueDisabled | Violation::MotorMode => FaultKind::Logical,
            Violation::NoResponse
            | Violation::GarbledResponse
            | Violation::IdMismatch { .. }
            | Violation::WriteFailed => FaultKind::Communication,
            Violation::BadChecksum => FaultKind::Checksum,
        }
    }
}

impl From<BusError> for Violation {
    fn from(err: BusError) -> Self {
        match err {
            BusError::NoResponse => Violation::NoResponse,
            BusError::Garbled => Violation::GarbledResponse,
            BusError::Checksum => Violation::BadChecksum,
            BusError::Write => Violation::WriteFailed,
        }
    }
}

/// A fault raised by one actuator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    /// Raw bus ID of the offending actuator
    pub actuator: u8,
    /// The constraint that was violated
    pub violation: Violation,
}

impl Fault {
    /// Create a new fault
    pub const fn new(actuator: u8, violation: Violation) -> Self {
        Self {
            actuator,
            violation,
        }
    }

    /// Classify a transport error raised while talking to `actuator`
    pub fn from_bus(actuator: u8, err: BusError) -> Self {
        Self::new(actuator, err.into())
    }

    /// Fault classification
    pub fn kind(&self) -> FaultKind {
        self.violation.kind()
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultKind::Argument => "argument fault",
            FaultKind::Logical => "logical fault",
            FaultKind::Communication => "communication fault",
            FaultKind::Checksum => "checksum fault",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Violation::IdOutOfRange => f.write_str("ID outside the bus range 0-253"),
            Violation::DuplicateId => f.write_str("ID already assigned to another actuator"),
            Violation::TooManyActuators => f.write_str("more actuators than the rig has joints"),
            Violation::InvalidAngleLimits { min, max } => write!(
                f,
                "angle limits [{min:.2}, {max:.2}] must satisfy 0 <= min < max <= 240"
            ),
            Violation::TargetOutOfLimits { target, min, max } => write!(
                f,
                "target {target:.2} deg outside angle limits [{min:.2}, {max:.2}]"
            ),
            Violation::InvalidVoltageRange { min_mv, max_mv } => write!(
                f,
                "voltage range {min_mv}-{max_mv} mV must satisfy 4500 <= min < max <= 12000"
            ),
            Violation::InvalidTemperatureLimit { limit_c } => {
                write!(f, "temperature limit {limit_c} C outside 50-100 C")
            }
            Violation::TorqueDisabled => f.write_str("move issued while torque is disabled"),
            Violation::MotorMode => f.write_str("move issued while in motor mode"),
            Violation::NoResponse => f.write_str("not responding"),
            Violation::GarbledResponse => f.write_str("garbled response"),
            Violation::IdMismatch { reported } => {
                write!(f, "answered as actuator {reported}")
            }
            Violation::BadChecksum => f.write_str("response failed checksum"),
            Violation::WriteFailed => f.write_str("request could not be written to the bus"),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actuator {}: {} ({})",
            self.actuator,
            self.violation,
            self.kind()
        )
    }
}

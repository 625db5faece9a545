//! Actuator identity

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fault::{Fault, Violation};

/// Highest addressable servo ID (254 is the bus broadcast address)
pub const MAX_ACTUATOR_ID: u8 = 253;

/// Bus identity of one actuator
///
/// Assigned once when the handle is built and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct ActuatorId(u8);

impl ActuatorId {
    /// Validate a raw bus ID
    pub fn new(raw: u8) -> Result<Self, Fault> {
        if raw > MAX_ACTUATOR_ID {
            return Err(Fault::new(raw, Violation::IdOutOfRange));
        }
        Ok(Self(raw))
    }

    /// Wrap a raw ID in a const context
    ///
    /// Used for compiled-in tables, which [`crate::config::RigConfig::validate`]
    /// re-checks at startup.
    pub const fn new_unchecked(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw bus ID
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ActuatorId {
    type Error = Fault;

    fn try_from(raw: u8) -> Result<Self, Fault> {
        Self::new(raw)
    }
}

impl From<ActuatorId> for u8 {
    fn from(id: ActuatorId) -> u8 {
        id.0
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;

    #[test]
    fn test_valid_ids() {
        assert_eq!(ActuatorId::new(0).unwrap().get(), 0);
        assert_eq!(ActuatorId::new(8).unwrap().get(), 8);
        assert_eq!(ActuatorId::new(253).unwrap().get(), 253);
    }

    #[test]
    fn test_broadcast_and_above_rejected() {
        for raw in [254u8, 255] {
            let fault = ActuatorId::new(raw).unwrap_err();
            assert_eq!(fault.actuator, raw);
            assert_eq!(fault.kind(), FaultKind::Argument);
        }
    }
}

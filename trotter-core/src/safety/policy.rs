//! Per-stage fault policy
//!
//! | Stage                 | Argument / Logical | Communication / Checksum |
//! |-----------------------|--------------------|--------------------------|
//! | identity, boot, limits, health | halt      | halt                     |
//! | homing, readback      | skip actuator      | skip actuator            |
//! | gait                  | end stage          | skip actuator            |

use core::fmt;

use crate::fault::{Fault, FaultKind};

/// Lifecycle stage a fault was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Constructing handles for the fixed IDs
    IdentityAssignment,
    /// Per-actuator identity check and electrical setup
    BootTest,
    /// Writing the per-joint angle limit table
    LimitConfiguration,
    /// Reading error flags and flashing LEDs
    HealthCheck,
    /// Initial homing or return-to-rest
    Homing,
    /// Gait window
    Gait,
    /// Reading back sensed angles after homing
    Readback,
}

impl Stage {
    /// Faults in this stage end the run
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Stage::IdentityAssignment
                | Stage::BootTest
                | Stage::LimitConfiguration
                | Stage::HealthCheck
        )
    }
}

/// What a stage does with a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Stop the whole run
    Halt,
    /// Warn, leave this actuator and carry on with the others
    SkipActuator,
    /// Stop this stage and fall through to the next one
    EndStage,
}

/// Decide how `stage` handles a fault of `kind`
///
/// Faults are never retried.
pub fn disposition(stage: Stage, kind: FaultKind) -> Disposition {
    if stage.is_critical() {
        return Disposition::Halt;
    }
    match stage {
        Stage::Gait if kind.is_command() => Disposition::EndStage,
        _ => Disposition::SkipActuator,
    }
}

/// Fatal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Halt {
    /// Stage that could not continue
    pub stage: Stage,
    /// The fault that stopped it
    pub fault: Fault,
}

impl Halt {
    pub fn new(stage: Stage, fault: Fault) -> Self {
        Self { stage, fault }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::IdentityAssignment => "identity assignment",
            Stage::BootTest => "boot test",
            Stage::LimitConfiguration => "limit configuration",
            Stage::HealthCheck => "health check",
            Stage::Homing => "homing",
            Stage::Gait => "gait",
            Stage::Readback => "readback",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halted in {}: {}", self.stage, self.fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Violation;
    use std::string::ToString;

    const ALL_KINDS: [FaultKind; 4] = [
        FaultKind::Argument,
        FaultKind::Logical,
        FaultKind::Communication,
        FaultKind::Checksum,
    ];

    #[test]
    fn test_critical_stages_halt_on_everything() {
        let stages = [
            Stage::IdentityAssignment,
            Stage::BootTest,
            Stage::LimitConfiguration,
            Stage::HealthCheck,
        ];
        for stage in stages {
            for kind in ALL_KINDS {
                assert_eq!(disposition(stage, kind), Disposition::Halt);
            }
        }
    }

    #[test]
    fn test_homing_skips_actuator() {
        for kind in ALL_KINDS {
            assert_eq!(disposition(Stage::Homing, kind), Disposition::SkipActuator);
            assert_eq!(disposition(Stage::Readback, kind), Disposition::SkipActuator);
        }
    }

    #[test]
    fn test_gait_policy() {
        assert_eq!(disposition(Stage::Gait, FaultKind::Argument), Disposition::EndStage);
        assert_eq!(disposition(Stage::Gait, FaultKind::Logical), Disposition::EndStage);
        assert_eq!(
            disposition(Stage::Gait, FaultKind::Communication),
            Disposition::SkipActuator
        );
        // Checksum faults are handled exactly like communication faults
        assert_eq!(
            disposition(Stage::Gait, FaultKind::Checksum),
            disposition(Stage::Gait, FaultKind::Communication)
        );
    }

    #[test]
    fn test_halt_display() {
        let halt = Halt::new(Stage::BootTest, Fault::new(3, Violation::NoResponse));
        let text = halt.to_string();
        assert!(text.starts_with("halted in boot test: actuator 3"));
    }
}

//! Lifecycle state definition
//!
//! Power-on through diagnostics, homing, walking and back to rest. Only the
//! diagnostic stages can halt; motion stages degrade instead.

use super::events::Event;
use crate::fault::FaultKind;
use crate::safety::Stage;

/// Rig lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RigState {
    /// Powered, nothing sent on the bus yet
    #[default]
    PowerOn,
    /// Constructing actuator handles
    AssigningIds,
    /// Probing and configuring each actuator
    BootTest,
    /// Writing joint angle limits
    ConfiguringLimits,
    /// Reading error flags, flashing LEDs
    HealthCheck,
    /// Initial move to the home pose
    Homing,
    /// Gait window running
    Walking,
    /// Return-to-rest move
    ReturningHome,
    /// Run complete, actuators at rest
    AtRest,
    /// Unrecoverable fault in a diagnostic stage
    Halted(FaultKind),
}

impl RigState {
    /// Check if this is the halted state
    pub fn is_halted(&self) -> bool {
        matches!(self, RigState::Halted(_))
    }

    /// Check if the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, RigState::AtRest | RigState::Halted(_))
    }

    /// Fault-policy stage this state runs, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RigState::AssigningIds => Some(Stage::IdentityAssignment),
            RigState::BootTest => Some(Stage::BootTest),
            RigState::ConfiguringLimits => Some(Stage::LimitConfiguration),
            RigState::HealthCheck => Some(Stage::HealthCheck),
            RigState::Homing | RigState::ReturningHome => Some(Stage::Homing),
            RigState::Walking => Some(Stage::Gait),
            RigState::PowerOn | RigState::AtRest | RigState::Halted(_) => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RigState::*;

        match (self, event) {
            (PowerOn, Start) => AssigningIds,

            // Diagnostics run strictly in order; any fault halts
            (AssigningIds, IdsAssigned) => BootTest,
            (BootTest, BootTestPassed) => ConfiguringLimits,
            (ConfiguringLimits, LimitsConfigured) => HealthCheck,
            (HealthCheck, HealthChecked) => Homing,
            (AssigningIds | BootTest | ConfiguringLimits | HealthCheck, FaultDetected(kind)) => {
                Halted(kind)
            }

            // Motion
            (Homing, HomingComplete) => Walking,
            (Walking, GaitWindowElapsed) => ReturningHome,
            (Walking, GaitAborted) => ReturningHome,
            (ReturningHome, RestReached) => AtRest,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_run() {
        let events = [
            Event::Start,
            Event::IdsAssigned,
            Event::BootTestPassed,
            Event::LimitsConfigured,
            Event::HealthChecked,
            Event::HomingComplete,
            Event::GaitWindowElapsed,
            Event::RestReached,
        ];
        let expected = [
            RigState::AssigningIds,
            RigState::BootTest,
            RigState::ConfiguringLimits,
            RigState::HealthCheck,
            RigState::Homing,
            RigState::Walking,
            RigState::ReturningHome,
            RigState::AtRest,
        ];

        let mut state = RigState::default();
        for (event, want) in events.into_iter().zip(expected) {
            state = state.transition(event);
            assert_eq!(state, want);
        }
        assert!(state.is_terminal());
        assert!(!state.is_halted());
    }

    #[test]
    fn test_diagnostic_faults_halt() {
        let states = [
            RigState::AssigningIds,
            RigState::BootTest,
            RigState::ConfiguringLimits,
            RigState::HealthCheck,
        ];
        for state in states {
            let next = state.transition(Event::FaultDetected(FaultKind::Communication));
            assert_eq!(next, RigState::Halted(FaultKind::Communication));
            assert!(next.is_terminal());
        }
    }

    #[test]
    fn test_motion_faults_do_not_halt() {
        for state in [RigState::Homing, RigState::Walking, RigState::ReturningHome] {
            let next = state.transition(Event::FaultDetected(FaultKind::Argument));
            assert_eq!(next, state);
        }
    }

    #[test]
    fn test_gait_abort_returns_home() {
        let next = RigState::Walking.transition(Event::GaitAborted);
        assert_eq!(next, RigState::ReturningHome);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(RigState::PowerOn.transition(Event::HomingComplete), RigState::PowerOn);
        assert_eq!(RigState::BootTest.transition(Event::HealthChecked), RigState::BootTest);
        let halted = RigState::Halted(FaultKind::Checksum);
        assert_eq!(halted.transition(Event::Start), halted);
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(RigState::BootTest.stage(), Some(Stage::BootTest));
        assert_eq!(RigState::ReturningHome.stage(), Some(Stage::Homing));
        assert_eq!(RigState::Walking.stage(), Some(Stage::Gait));
        assert_eq!(RigState::AtRest.stage(), None);
    }
}

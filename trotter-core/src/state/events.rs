//! Events that trigger lifecycle transitions

use crate::fault::FaultKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Run requested after power-on
    Start,

    // Diagnostic events
    /// Handles constructed for every configured ID
    IdsAssigned,
    /// Every actuator passed the boot test
    BootTestPassed,
    /// Joint angle limit table written
    LimitsConfigured,
    /// Error flags read and LEDs flashed
    HealthChecked,

    // Motion events
    /// Initial homing pass finished (with or without warnings)
    HomingComplete,
    /// Gait window ran to its end
    GaitWindowElapsed,
    /// Gait loop stopped early on a command fault
    GaitAborted,
    /// Return-to-rest pass finished
    RestReached,

    // Safety events
    /// Fault that the current stage's policy does not tolerate
    FaultDetected(FaultKind),
}

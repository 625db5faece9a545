//! Boot diagnostics
//!
//! Identity assignment, boot test, angle-limit configuration and the
//! health check, run strictly in that order.

pub mod sequencer;

pub use sequencer::{
    assign_identities, boot_test, configure_angle_limits, health_check, DiagnosticReport,
    DiagnosticSequencer, HealthReport, HealthStatus,
};

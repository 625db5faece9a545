//! Run reporting
//!
//! The core hands back reports and observer callbacks; this is where they
//! turn into log lines.

use defmt::*;

use trotter_core::diagnostics::{DiagnosticReport, HealthStatus};
use trotter_core::fault::Fault;
use trotter_core::motion::{HomingReport, Setpoint};
use trotter_core::scheduler::MotionObserver;
use trotter_core::sequence::{RunObserver, RunSummary};
use trotter_core::state::RigState;

/// Logs every stage of a run over defmt
pub struct RunLog;

impl MotionObserver for RunLog {
    fn setpoint_issued(&mut self, tick: u32, setpoint: &Setpoint) {
        trace!(
            "tick {}: actuator {} -> {}",
            tick,
            setpoint.id.get(),
            setpoint.angle
        );
    }

    fn fault_skipped(&mut self, tick: u32, fault: &Fault) {
        warn!("tick {}: skipped {}", tick, Display2Format(fault));
    }

    fn tick_completed(&mut self, tick: u32, t: f32) {
        debug!("tick {} done at t={}s", tick, t);
    }
}

impl RunObserver for RunLog {
    fn state_changed(&mut self, state: RigState) {
        match state {
            RigState::Halted(kind) => error!("Rig halted on {}", Display2Format(&kind)),
            state => info!("Rig state: {}", state),
        }
    }

    fn diagnostics_passed(&mut self, report: &DiagnosticReport) {
        info!(
            "Diagnostics passed: {} booted, {} limit rows written",
            report.booted, report.limits_configured
        );
        for &(id, status) in report.health.statuses.iter() {
            match status {
                HealthStatus::Ready => debug!("actuator {}: ready", id.get()),
                HealthStatus::Flagged(flags) => warn!(
                    "actuator {}: error flags set (temp={}, voltage={}, rotor={})",
                    id.get(),
                    flags.over_temperature,
                    flags.over_voltage,
                    flags.rotor_locked
                ),
            }
        }
    }

    fn homed(&mut self, report: &HomingReport, initial: bool) {
        let pass = if initial { "Homing" } else { "Return to rest" };
        info!(
            "{} sent {} of {} actuators",
            pass,
            report.reached.len(),
            report.reached.len() + report.warnings.len()
        );
        for fault in report.warnings.iter() {
            warn!("{}: {}", pass, Display2Format(fault));
        }
        for reading in report.readings.iter() {
            match reading.sensed {
                Ok(angle) => debug!(
                    "actuator {}: commanded {}, sensed {}",
                    reading.id.get(),
                    reading.commanded,
                    angle
                ),
                Err(fault) => warn!("readback failed, {}", Display2Format(&fault)),
            }
        }
    }
}

/// Log the closing summary of a completed run
pub fn log_summary(summary: &RunSummary) {
    let gait = &summary.gait;
    info!(
        "Gait window: {} ticks, {} setpoints, {} skipped",
        gait.ticks, gait.setpoints, gait.skipped
    );
    if let Some(fault) = gait.aborted {
        warn!("Gait window ended early, {}", Display2Format(&fault));
    }
    if !summary.diagnostics.health.all_ready() {
        warn!("Health check raised warnings, see above");
    }
    info!("Run finished in state {}", summary.state);
}

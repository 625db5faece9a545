//! Diagnostic sequencer
//!
//! Brings every actuator from power-on to a configured, checked state.
//! Each stage walks the actuators in ID order and consults the fault policy
//! for every fault it sees; all four stages halt on the first one.

use heapless::Vec;

use crate::actuator::ActuatorId;
use crate::config::{BootConfig, JointConfig, RigConfig, JOINT_COUNT};
use crate::fault::Fault;
use crate::rig::{Joint, Rig};
use crate::safety::{disposition, Disposition, Halt, Stage};
use crate::state::{Event, RigState};
use crate::traits::{ErrorTriggers, Pacer, ServoBus, ServoMode};

/// Result of the health check for one actuator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthStatus {
    /// No error flag set; LED flashed
    Ready,
    /// Error flags set; LED left dark
    Flagged(ErrorTriggers),
}

/// Health check outcome per actuator
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthReport {
    pub statuses: Vec<(ActuatorId, HealthStatus), JOINT_COUNT>,
}

impl HealthReport {
    /// Actuators that reported error flags
    pub fn flagged(&self) -> impl Iterator<Item = (ActuatorId, ErrorTriggers)> + '_ {
        self.statuses.iter().filter_map(|&(id, status)| match status {
            HealthStatus::Flagged(flags) => Some((id, flags)),
            _ => None,
        })
    }

    /// Check if every actuator came back ready
    pub fn all_ready(&self) -> bool {
        self.statuses
            .iter()
            .all(|(_, status)| *status == HealthStatus::Ready)
    }
}

/// Outcome of a successful diagnostic run
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticReport {
    /// Actuators that passed the boot test
    pub booted: u8,
    /// Joint limit rows written
    pub limits_configured: u8,
    pub health: HealthReport,
}

/// Apply the stage policy to a fault
fn escalate(stage: Stage, fault: Fault) -> Result<(), Halt> {
    match disposition(stage, fault.kind()) {
        Disposition::Halt => Err(Halt::new(stage, fault)),
        Disposition::SkipActuator | Disposition::EndStage => Ok(()),
    }
}

/// Construct a handle for each ID
///
/// Any ID fault halts; nothing is sent on the bus.
pub fn assign_identities<B: ServoBus>(bus: B, ids: &[u8]) -> Result<Rig<B>, Halt> {
    Rig::assemble(bus, ids).map_err(|fault| Halt::new(Stage::IdentityAssignment, fault))
}

fn boot_one<B: ServoBus>(joint: &mut Joint<'_, B>, boot: &BootConfig) -> Result<(), Fault> {
    joint.verify_identity()?;
    joint.configure(boot.power, boot.temp_limit_c)?;
    joint.set_mode(ServoMode::Servo)?;
    joint.set_torque(true)?;
    joint.set_led_power(true)?;
    joint.set_led_power(false)?;
    joint.set_led_error_triggers(boot.led_error_triggers)
}

/// Check and configure each actuator in ID order
///
/// Per actuator: identity check, voltage and temperature limits, servo
/// mode, torque on, LED on then off, LED error triggers, then a pause.
/// Returns the number of actuators that passed.
pub fn boot_test<B, P>(rig: &mut Rig<B>, pacer: &mut P, boot: &BootConfig) -> Result<u8, Halt>
where
    B: ServoBus,
    P: Pacer,
{
    let mut passed = 0;
    for index in 0..rig.len() {
        let Some(mut joint) = rig.joint_at(index) else {
            break;
        };
        match boot_one(&mut joint, boot) {
            Ok(()) => passed += 1,
            Err(fault) => escalate(Stage::BootTest, fault)?,
        }
        pacer.pause_ms(boot.pace_ms);
    }
    Ok(passed)
}

/// Write each joint's angle limits
///
/// Rows for IDs the rig does not have are ignored. Returns the number of
/// rows written.
pub fn configure_angle_limits<B: ServoBus>(
    rig: &mut Rig<B>,
    joints: &[JointConfig],
) -> Result<u8, Halt> {
    let mut written = 0;
    for row in joints {
        let Some(mut joint) = rig.joint(row.id) else {
            continue;
        };
        match joint.set_angle_limits(row.angle_limits.min(), row.angle_limits.max()) {
            Ok(()) => written += 1,
            Err(fault) => escalate(Stage::LimitConfiguration, fault)?,
        }
    }
    Ok(written)
}

fn flash<B: ServoBus, P: Pacer>(
    joint: &mut Joint<'_, B>,
    pacer: &mut P,
    boot: &BootConfig,
) -> Result<(), Fault> {
    for _ in 0..boot.led_flashes {
        joint.set_led_power(true)?;
        pacer.pause_ms(boot.led_flash_ms);
        joint.set_led_power(false)?;
        pacer.pause_ms(boot.led_flash_ms);
    }
    Ok(())
}

/// Read each actuator's error flags and flash the healthy ones
///
/// Flagged actuators are a warning in the report, not a fault. Actuators
/// the stage policy skips past are left out of the report.
pub fn health_check<B, P>(
    rig: &mut Rig<B>,
    pacer: &mut P,
    boot: &BootConfig,
) -> Result<HealthReport, Halt>
where
    B: ServoBus,
    P: Pacer,
{
    let mut report = HealthReport::default();
    for index in 0..rig.len() {
        let Some(mut joint) = rig.joint_at(index) else {
            break;
        };
        let id = joint.id();

        let status = match joint.error_trigger_state() {
            Ok(flags) if flags.any() => HealthStatus::Flagged(flags),
            Ok(_) => match flash(&mut joint, pacer, boot) {
                Ok(()) => HealthStatus::Ready,
                Err(fault) => {
                    escalate(Stage::HealthCheck, fault)?;
                    continue;
                }
            },
            Err(fault) => {
                escalate(Stage::HealthCheck, fault)?;
                continue;
            }
        };
        let _ = report.statuses.push((id, status));
    }
    Ok(report)
}

/// Runs the four diagnostic stages against a rig configuration
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticSequencer<'a> {
    config: &'a RigConfig,
}

impl<'a> DiagnosticSequencer<'a> {
    pub fn new(config: &'a RigConfig) -> Self {
        Self { config }
    }

    /// Run every stage, advancing `state` as each one completes
    ///
    /// `state` should be [`RigState::AssigningIds`]; on success it ends at
    /// [`RigState::Homing`], on failure at [`RigState::Halted`].
    /// `on_state` sees every state entered along the way.
    pub fn run<B, P, F>(
        &self,
        bus: B,
        pacer: &mut P,
        state: &mut RigState,
        mut on_state: F,
    ) -> Result<(Rig<B>, DiagnosticReport), Halt>
    where
        B: ServoBus,
        P: Pacer,
        F: FnMut(RigState),
    {
        let config = self.config;
        let ids = config.ids();

        let mut rig = advance(
            state,
            &mut on_state,
            assign_identities(bus, &ids),
            Event::IdsAssigned,
        )?;
        let booted = advance(
            state,
            &mut on_state,
            boot_test(&mut rig, pacer, &config.boot),
            Event::BootTestPassed,
        )?;
        let limits_configured = advance(
            state,
            &mut on_state,
            configure_angle_limits(&mut rig, &config.joints),
            Event::LimitsConfigured,
        )?;
        let health = advance(
            state,
            &mut on_state,
            health_check(&mut rig, pacer, &config.boot),
            Event::HealthChecked,
        )?;

        Ok((
            rig,
            DiagnosticReport {
                booted,
                limits_configured,
                health,
            },
        ))
    }
}

/// Feed a stage outcome into the state machine
fn advance<T, F: FnMut(RigState)>(
    state: &mut RigState,
    on_state: &mut F,
    outcome: Result<T, Halt>,
    done: Event,
) -> Result<T, Halt> {
    let event = match &outcome {
        Ok(_) => done,
        Err(halt) => Event::FaultDetected(halt.fault.kind()),
    };
    *state = state.transition(event);
    on_state(*state);
    outcome
}

//! Full lifecycle run
//!
//! Diagnostics, initial homing, one gait window and the return to rest,
//! driven through the [`RigState`] machine. Only the diagnostic stages can
//! halt the run; homing and gait faults degrade to the next stage.

use crate::config::RigConfig;
use crate::diagnostics::{DiagnosticReport, DiagnosticSequencer};
use crate::motion::gait::GaitGenerator;
use crate::motion::homing::{HomingCoordinator, HomingReport};
use crate::rig::Rig;
use crate::safety::Halt;
use crate::scheduler::{GaitReport, MotionObserver, MotionScheduler};
use crate::state::{Event, RigState};
use crate::traits::{Clock, Pacer, ServoBus};

/// Receives stage results as the run progresses
///
/// All methods default to no-ops.
pub trait RunObserver: MotionObserver {
    /// The lifecycle moved to `state`
    fn state_changed(&mut self, _state: RigState) {}

    /// Diagnostics passed
    fn diagnostics_passed(&mut self, _report: &DiagnosticReport) {}

    /// A homing pass finished; `initial` is false for the return to rest
    fn homed(&mut self, _report: &HomingReport, _initial: bool) {}
}

impl RunObserver for () {}

/// Everything a completed run reports
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    pub diagnostics: DiagnosticReport,
    pub homing: HomingReport,
    pub gait: GaitReport,
    pub rest: HomingReport,
    pub state: RigState,
}

fn step<O: RunObserver>(state: &mut RigState, event: Event, observer: &mut O) {
    *state = state.transition(event);
    observer.state_changed(*state);
}

/// Run the rig from power-on to rest
///
/// `config` is expected to have passed [`RigConfig::validate`]. Returns the
/// rig along with the summary so the caller can keep using the bus.
pub fn run<B, T, O>(
    bus: B,
    config: &RigConfig,
    timer: &mut T,
    observer: &mut O,
) -> Result<(Rig<B>, RunSummary), Halt>
where
    B: ServoBus,
    T: Clock + Pacer,
    O: RunObserver,
{
    let mut state = RigState::PowerOn;
    step(&mut state, Event::Start, observer);

    let (mut rig, diagnostics) = DiagnosticSequencer::new(config).run(
        bus,
        timer,
        &mut state,
        |entered| observer.state_changed(entered),
    )?;
    observer.diagnostics_passed(&diagnostics);

    let timing = &config.timing;
    let coordinator = HomingCoordinator::new(config.home_pose(), timing.readback_pace_ms);

    let homing = coordinator.home(&mut rig, timer, timing.homing);
    observer.homed(&homing, true);
    step(&mut state, Event::HomingComplete, observer);

    let scheduler = MotionScheduler::new(
        GaitGenerator::from_joints(&config.joints),
        timing.gait_transit_ms,
    );
    let gait = scheduler.run(
        &mut rig,
        timer,
        timing.gait_window_ms,
        timing.tick_interval_ms,
        observer,
    );
    let gait_done = if gait.completed() {
        Event::GaitWindowElapsed
    } else {
        Event::GaitAborted
    };
    step(&mut state, gait_done, observer);

    let rest = coordinator.home(&mut rig, timer, timing.rest);
    observer.homed(&rest, false);
    step(&mut state, Event::RestReached, observer);

    Ok((
        rig,
        RunSummary {
            diagnostics,
            homing,
            gait,
            rest,
            state,
        },
    ))
}

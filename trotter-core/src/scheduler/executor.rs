//! Gait loop
//!
//! Each tick samples the gait at the window's elapsed time, sends the
//! front/back group, pauses, sends the left/right group and pauses again.
//! The loop only checks the window at the top of a tick, so a tick that has
//! started always completes both groups unless it aborts.

use super::window::MotionWindow;
use crate::fault::Fault;
use crate::motion::gait::{GaitGenerator, LegGroup, Setpoint};
use crate::rig::Rig;
use crate::safety::{disposition, Disposition, Stage};
use crate::traits::{Clock, Pacer, ServoBus};

/// Receives progress from the gait loop
///
/// All methods default to no-ops.
pub trait MotionObserver {
    /// A setpoint went out on the bus
    fn setpoint_issued(&mut self, _tick: u32, _setpoint: &Setpoint) {}

    /// An actuator was skipped for this setpoint
    fn fault_skipped(&mut self, _tick: u32, _fault: &Fault) {}

    /// Both groups of a tick were emitted
    fn tick_completed(&mut self, _tick: u32, _t: f32) {}
}

impl MotionObserver for () {}

impl<O: MotionObserver + ?Sized> MotionObserver for &mut O {
    fn setpoint_issued(&mut self, tick: u32, setpoint: &Setpoint) {
        (**self).setpoint_issued(tick, setpoint)
    }

    fn fault_skipped(&mut self, tick: u32, fault: &Fault) {
        (**self).fault_skipped(tick, fault)
    }

    fn tick_completed(&mut self, tick: u32, t: f32) {
        (**self).tick_completed(tick, t)
    }
}

/// Outcome of one gait window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaitReport {
    /// Ticks whose both groups were emitted
    pub ticks: u32,
    /// Setpoints that went out
    pub setpoints: u32,
    /// Setpoints skipped on transport faults
    pub skipped: u32,
    /// Command fault that ended the window early
    pub aborted: Option<Fault>,
}

impl GaitReport {
    /// Check if the window ran to its end
    pub fn completed(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Drives a [`GaitGenerator`] over a rig
#[derive(Debug, Clone)]
pub struct MotionScheduler {
    gait: GaitGenerator,
    transit_ms: u16,
}

impl MotionScheduler {
    /// `transit_ms` is the interpolation time sent with each setpoint
    pub fn new(gait: GaitGenerator, transit_ms: u16) -> Self {
        Self { gait, transit_ms }
    }

    pub fn gait(&self) -> &GaitGenerator {
        &self.gait
    }

    /// Run one gait window
    ///
    /// Transport faults skip the actuator for that setpoint. Argument and
    /// logical faults end the window at once; the caller moves on to the
    /// return-to-rest either way.
    pub fn run<B, T, O>(
        &self,
        rig: &mut Rig<B>,
        timer: &mut T,
        duration_ms: u32,
        tick_interval_ms: u32,
        observer: &mut O,
    ) -> GaitReport
    where
        B: ServoBus,
        T: Clock + Pacer,
        O: MotionObserver,
    {
        let window = MotionWindow::open(timer.now_ms(), duration_ms, tick_interval_ms);
        let mut report = GaitReport::default();

        while !window.is_elapsed(timer.now_ms()) {
            let tick = report.ticks;
            let t = window.elapsed_s(timer.now_ms());

            for group in LegGroup::ORDER {
                if let Err(fault) = self.emit(rig, group, t, tick, &mut report, observer) {
                    report.aborted = Some(fault);
                    return report;
                }
                timer.pause_ms(window.tick_interval_ms);
            }

            report.ticks += 1;
            observer.tick_completed(tick, t);
        }

        report
    }

    /// Send one group's setpoints; `Err` ends the window
    fn emit<B, O>(
        &self,
        rig: &mut Rig<B>,
        group: LegGroup,
        t: f32,
        tick: u32,
        report: &mut GaitReport,
        observer: &mut O,
    ) -> Result<(), Fault>
    where
        B: ServoBus,
        O: MotionObserver,
    {
        for setpoint in self.gait.setpoints(t, group) {
            let Some(mut joint) = rig.joint(setpoint.id) else {
                continue;
            };
            match joint.move_to(setpoint.angle, self.transit_ms) {
                Ok(()) => {
                    report.setpoints += 1;
                    observer.setpoint_issued(tick, &setpoint);
                }
                Err(fault) => match disposition(Stage::Gait, fault.kind()) {
                    Disposition::SkipActuator => {
                        report.skipped += 1;
                        observer.fault_skipped(tick, &fault);
                    }
                    Disposition::EndStage | Disposition::Halt => return Err(fault),
                },
            }
        }
        Ok(())
    }
}

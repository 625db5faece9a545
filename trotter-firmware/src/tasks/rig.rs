//! Rig lifecycle task
//!
//! Runs diagnostics, homing, one gait window and the return to rest on the
//! servo bus. A diagnostic halt stops the firmware.

use defmt::*;

use trotter_core::config::RigConfig;
use trotter_core::sequence;
use trotter_drivers::Lx16aBus;

use crate::bus::ServoUart;
use crate::report::{self, RunLog};
use crate::timing::BoardTimer;

/// Rig task - owns the servo bus for the whole run
#[embassy_executor::task]
pub async fn rig_task(bus: Lx16aBus<ServoUart>, config: &'static RigConfig) {
    info!("Rig task started");

    let mut timer = BoardTimer::new();
    let mut log = RunLog;

    match sequence::run(bus, config, &mut timer, &mut log) {
        Ok((rig, summary)) => {
            report::log_summary(&summary);
            info!("{} actuators holding the rest pose", rig.len());
        }
        Err(halt) => {
            defmt::panic!("{}", Display2Format(&halt));
        }
    }
}

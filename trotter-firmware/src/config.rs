//! Rig configuration
//!
//! The tables are generated from `rig.toml` by the build script, which also
//! rejects any file that breaks the rig invariants.

use trotter_core::actuator::PowerLimits;
use trotter_core::config::{
    BootConfig, HomingProfile, JointConfig, JointKind, JointPosition, Leg, RigConfig,
    TimingConfig,
};
use trotter_core::motion::Sign;
use trotter_core::traits::ErrorTriggers;
use trotter_hal::{DataBits, Parity, StopBits, UartConfig};

/// Servo bus settings from the `[bus]` section
#[derive(Debug, Clone, Copy)]
pub struct BusSettings {
    /// Frame format and response window
    pub uart: UartConfig,
    /// Drop our own transmissions from the RX side
    pub echo: bool,
}

include!(concat!(env!("OUT_DIR"), "/rig_config.rs"));

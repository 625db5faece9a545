//! Hardware abstraction traits
//!
//! These traits define the interface between the rig logic and the
//! hardware-specific implementations (servo protocol driver, board timers).

pub mod bus;
pub mod pacing;

pub use bus::{BusError, ErrorTriggers, ServoBus, ServoMode};
pub use pacing::{Clock, Pacer};

//! Motion generation
//!
//! Homing to a fixed pose and the sinusoidal gait table.

pub mod gait;
pub mod homing;

pub use gait::{angle, GaitGenerator, GaitPhaseSpec, LegGroup, Setpoint, Sign};
pub use homing::{HomePose, HomingCoordinator, HomingReport};

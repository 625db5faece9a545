//! Fault policy
//!
//! Decides what a fault means for the stage it was raised in: halt the
//! whole run, skip the offending actuator, or end the stage early.

pub mod policy;

pub use policy::{disposition, Disposition, Halt, Stage};

//! Board-agnostic core logic for the quadruped leg rig
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Transport and pacing traits (servo bus, clock, pacer)
//! - Actuator handles with limit enforcement
//! - Fault taxonomy and per-stage fault policy
//! - Rig configuration tables (limits, home pose, gait phases)
//! - Lifecycle state machine
//! - Boot diagnostics, homing, gait generation and motion scheduling
//! - Voice cue lookup

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod actuator;
pub mod config;
pub mod diagnostics;
pub mod fault;
pub mod motion;
pub mod rig;
pub mod safety;
pub mod scheduler;
pub mod sequence;
pub mod state;
pub mod traits;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

//! Rig lifecycle state machine
//!
//! Every stage of a run is a state; stages report their outcome as events.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::RigState;

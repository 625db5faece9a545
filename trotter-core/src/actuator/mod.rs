//! Actuator handles
//!
//! Typed wrappers around one physical joint servo: identity, safety limits,
//! mode and torque state. Every command is validated locally before anything
//! is put on the bus.

pub mod handle;
pub mod id;
pub mod limits;

pub use handle::Actuator;
pub use id::{ActuatorId, MAX_ACTUATOR_ID};
pub use limits::{AngleLimits, PowerLimits, MAX_ANGLE_DEG, MIN_ANGLE_DEG};

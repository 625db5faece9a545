//! Motion scheduler
//!
//! Paces gait setpoints onto the bus at a fixed tick interval for a fixed
//! window, then hands control back for the return-to-rest.

pub mod executor;
pub mod window;

pub use executor::{GaitReport, MotionObserver, MotionScheduler};
pub use window::MotionWindow;

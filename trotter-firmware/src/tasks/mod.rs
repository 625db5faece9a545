//! Embassy async tasks

pub mod rig;

pub use rig::rig_task;

//! Configuration types
//!
//! Board-agnostic configuration tables, built once at startup and read-only
//! afterwards. The compiled-in tables describe the eight-servo leg rig; the
//! firmware generates its own from `rig.toml` at build time.

pub mod rig;
pub mod timing;

pub use rig::*;
pub use timing::*;

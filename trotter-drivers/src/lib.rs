//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in trotter-core:
//!
//! - LX-16A serial servo bus protocol over a `trotter-hal` UART link
//! - Blocking pacer over any `embedded-hal` delay

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod pacing;
pub mod servo;

pub use pacing::DelayPacer;
pub use servo::lx16a::{Lx16aBus, Lx16aConfig};

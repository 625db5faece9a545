//! Trotter Hardware Abstraction Layer
//!
//! This crate defines the serial link traits the servo bus driver is written
//! against. Board support code (the RP2040 firmware, a host test harness)
//! implements them, so the protocol driver never touches a peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  trotter-core (lifecycle, gait, faults) │
//! └─────────────────────────────────────────┘
//!                     │ ServoBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trotter-drivers (LX-16A protocol)      │
//! └─────────────────────────────────────────┘
//!                     │ UartTx + UartRx
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trotter-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             board UART (half-duplex)
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`uart::ServoLink`] - Combined half-duplex link
//!
//! [`uart::UartConfig`] carries the frame format and response window a
//! board applies to its UART.

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, Parity, ServoLink, StopBits, UartConfig, UartRx, UartTx};

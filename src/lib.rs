//! LPC8xx I2C Master Driver Library
//!
//! Interrupt-driven I2C master transfers for the four I2C blocks of the
//! NXP LPC82x. A transaction is an optional write phase followed by an
//! optional read phase of up to 32 bytes each; the interrupt handler
//! advances it byte by byte while the caller polls or awaits completion.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DRIVER LAYER                            │
//! │   BlockingI2c (embedded-hal)  │  AsyncI2c (embedded-hal-async)│
//! ├─────────────────────────────────────────────────────────────┤
//! │                     SHARED ENGINE                            │
//! │   critical-section mutex  │  per-port completion signals     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    TRANSFER ENGINE                           │
//! │   per-port state  │  status decoding  │  event handling      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   BUS CONTROLLER TRAIT                       │
//! │   LPC82x MMIO (firmware)  │  SimBus / ScriptedBus (host)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven design**: `Port` and `TargetAddress` are valid by construction
//! - **No unsafe outside the HAL**: register access is isolated in `hal::lpc82x`
//! - **Host-testable core**: the engine only sees the `BusController` trait
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to later modules
mod fmt;

/// System configuration and constants
pub mod config;

/// Shared types used across modules
pub mod types;

/// I2C Transfer Engine
///
/// Per-port state machine, register model and `embedded-hal` drivers.
pub mod i2c;

/// Hardware Abstraction Layer
///
/// Register-level access to the LPC82x I2C blocks.
#[cfg(feature = "embedded")]
pub mod hal;

/// Host simulation
///
/// Bus controllers that stand in for the hardware in tests.
#[cfg(feature = "sim")]
pub mod sim;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::i2c::{
        AbortReason, AsyncI2c, BlockingI2c, BusController, Error, I2cEngine, SharedEngine,
        TransferOutcome,
    };
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::i2c::I2c;
    pub use embedded_hal_async::i2c::I2c as AsyncI2cTrait;
}

//! I2C Master Transfer Engine
//!
//! Interrupt-driven master transfers for the LPC82x I2C blocks. The
//! engine runs one transaction per port at a time: an optional write
//! phase, then an optional read phase joined by a repeated START.
//!
//! ```text
//!  foreground                         I2Cn interrupt
//!  ──────────                         ──────────────
//!  start_transaction ──► START ──►    process_hardware_event
//!  check_status (poll)                  ├─ arbitration lost / start-stop error → idle
//!       │                               ├─ master pending → next byte / STOP / restart
//!       ▼                               └─ unrecognized ×3 → idle
//!  read_buffer
//! ```
//!
//! [`engine`] holds the state machine, [`shared`] makes it reachable from
//! interrupt context, and [`blocking`] / [`asynch`] expose it through the
//! `embedded-hal` traits.

pub mod asynch;
pub mod blocking;
pub mod controller;
pub mod engine;
pub mod error;
mod ops;
pub mod registers;
pub mod shared;

pub use asynch::AsyncI2c;
pub use blocking::BlockingI2c;
pub use controller::BusController;
pub use engine::{I2cEngine, PortInstance};
pub use error::{AbortReason, Error, TransferOutcome};
pub use shared::SharedEngine;

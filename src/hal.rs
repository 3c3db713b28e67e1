//! Hardware Abstraction Layer
//!
//! Register-level access to the LPC82x. This is the only module allowed
//! to use `unsafe`; everything above it works through the
//! [`BusController`](crate::i2c::BusController) trait.

pub mod lpc82x;

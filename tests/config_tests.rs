//! Configuration Tests
//!
//! Tests for driver constants and the bus timing record.
//! Run with: cargo test --test config_tests

use lpc8xx_i2c::config::{
    BusTiming, BUFFER_CAPACITY, DEFAULT_CLOCK_DIVIDER, DEFAULT_SCL_HIGH, DEFAULT_SCL_LOW,
    MAX_UNEXPECTED_EVENTS, PORT_COUNT,
};
use lpc8xx_i2c::types::Port;

// =============================================================================
// Constant Tests
// =============================================================================

#[test]
fn test_engine_limits() {
    assert_eq!(PORT_COUNT, 4);
    assert_eq!(BUFFER_CAPACITY, 32);
    assert_eq!(MAX_UNEXPECTED_EVENTS, 3);
}

// =============================================================================
// BusTiming Tests
// =============================================================================

#[test]
fn test_default_timing() {
    let timing = BusTiming::default();
    assert_eq!(timing.clock_divider, DEFAULT_CLOCK_DIVIDER);
    assert_eq!(timing.scl_low, DEFAULT_SCL_LOW);
    assert_eq!(timing.scl_high, DEFAULT_SCL_HIGH);
    assert_eq!(timing, BusTiming::DEFAULT);
}

#[test]
fn test_master_time_encoding() {
    // High time in bits 6..4, low time in bits 2..0
    assert_eq!(BusTiming::new(0, 2, 6).master_time(), 0x62);
    assert_eq!(BusTiming::DEFAULT.master_time(), 0x55);
}

#[test]
fn test_new_masks_scl_fields() {
    let timing = BusTiming::new(0x10, 0xF, 0x9);
    assert_eq!(timing.scl_low, 0x7);
    assert_eq!(timing.scl_high, 0x1);
    assert_eq!(timing.clock_divider, 0x10);
}

#[test]
fn test_every_port_has_timing() {
    for port in Port::ALL {
        assert_eq!(BusTiming::for_port(port), BusTiming::DEFAULT);
    }
}

//! Simulated Bus Tests
//!
//! Runs whole transactions against the reactive bus model, servicing
//! interrupts inline instead of from another thread.
//! Run with: cargo test --features sim --test sim_tests

use embassy_futures::block_on;
use lpc8xx_i2c::config::{BusTiming, BUFFER_CAPACITY};
use lpc8xx_i2c::i2c::registers::{MasterState, MstCtl};
use lpc8xx_i2c::i2c::{AbortReason, I2cEngine, SharedEngine, TransferOutcome};
use lpc8xx_i2c::sim::{BusAction, SimBus, SimDevice};
use lpc8xx_i2c::types::{Port, PortStatus, TargetAddress};

const PORT: Port = Port::I2C1;
const DEVICE: u8 = 0x69;

fn sensor() -> SimDevice {
    SimDevice::new(DEVICE).with_response(&[0xC0, 0xFF, 0xEE])
}

fn addr(seven_bit: u8) -> TargetAddress {
    TargetAddress::new(seven_bit).unwrap()
}

// =============================================================================
// Engine on SimBus
// =============================================================================

#[test]
fn test_write_read_runs_to_completion() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();
    engine.init(PORT, &mut bus, &BusTiming::DEFAULT);

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[0x8F], 2)
        .unwrap();
    let handled = sim.run_until_idle(&mut engine, PORT, 20);

    // TX(reg), TX(restart), RX, RX, idle
    assert_eq!(handled, 5);
    assert_eq!(engine.check_status(PORT), PortStatus::WaitingForData);
    assert_eq!(engine.read_buffer(PORT), &[0xC0, 0xFF]);
    assert_eq!(sim.received(DEVICE), vec![0x8F]);
    assert_eq!(sim.master_state(), MasterState::Idle);
    assert!(!sim.events_enabled());
}

#[test]
fn test_write_only_delivers_all_bytes() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[0x10, 0x20, 0x30], 0)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(sim.received(DEVICE), vec![0x10, 0x20, 0x30]);
    assert_eq!(engine.last_outcome(PORT), Some(TransferOutcome::Completed));
    let starts = sim
        .actions()
        .iter()
        .filter(|action| **action == BusAction::Control(MstCtl::MST_START))
        .count();
    assert_eq!(starts, 1);
}

#[test]
fn test_missing_device_reports_address_nack() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    engine
        .start_transaction(PORT, &mut bus, addr(0x11), &[], 4)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(engine.check_status(PORT), PortStatus::WaitingForData);
    assert_eq!(
        engine.last_outcome(PORT),
        Some(TransferOutcome::Aborted(AbortReason::AddressNack))
    );
    assert!(engine.read_buffer(PORT).is_empty());
}

#[test]
fn test_data_nack_ends_write_early() {
    let sim = SimBus::new().with_device(SimDevice::new(DEVICE).nack_data_at(1));
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[1, 2, 3], 0)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(sim.received(DEVICE), vec![1, 2]);
    assert_eq!(engine.port(PORT).bytes_sent(), 2);
    assert_eq!(
        engine.last_outcome(PORT),
        Some(TransferOutcome::Aborted(AbortReason::DataNack))
    );
}

#[test]
fn test_arbitration_loss_on_start() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();
    sim.arm_arbitration_loss();

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[0x8F], 1)
        .unwrap();
    let handled = sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(handled, 1);
    assert_eq!(engine.check_status(PORT), PortStatus::WaitingForData);
    assert_eq!(
        engine.last_outcome(PORT),
        Some(TransferOutcome::Aborted(AbortReason::ArbitrationLost))
    );
    assert!(sim.received(DEVICE).is_empty());
}

#[test]
fn test_start_stop_error_mid_transfer() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[1, 2, 3], 0)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 1);
    sim.inject_start_stop_error();
    sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(engine.check_status(PORT), PortStatus::WaitingForData);
    assert_eq!(
        engine.last_outcome(PORT),
        Some(TransferOutcome::Aborted(AbortReason::ProtocolError))
    );
}

#[test]
fn test_stuck_controller_is_abandoned() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[1], 0)
        .unwrap();
    sim.inject_spurious();
    let handled = sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(handled, 3);
    assert_eq!(
        engine.last_outcome(PORT),
        Some(TransferOutcome::Aborted(AbortReason::UnexpectedState))
    );
    assert!(!sim.interrupt_pending());
}

#[test]
fn test_port_recovers_after_abort() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let mut engine = I2cEngine::new();

    sim.arm_arbitration_loss();
    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[0x8F], 1)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 20);

    engine
        .start_transaction(PORT, &mut bus, addr(DEVICE), &[0x8F], 1)
        .unwrap();
    sim.run_until_idle(&mut engine, PORT, 20);

    assert_eq!(engine.last_outcome(PORT), Some(TransferOutcome::Completed));
    assert_eq!(engine.read_buffer(PORT), &[0xC0]);
}

#[test]
fn test_every_length_pair_completes() {
    let response: Vec<u8> = (0..BUFFER_CAPACITY).map(|i| 0xA0 ^ i as u8).collect();
    let mut pairs = 0;

    for send_len in 0..=BUFFER_CAPACITY {
        for read_len in 0..=BUFFER_CAPACITY - send_len {
            let sim = SimBus::new().with_device(SimDevice::new(DEVICE).with_response(&response));
            let mut bus = sim.clone();
            let mut engine = I2cEngine::new();
            engine.init(PORT, &mut bus, &BusTiming::DEFAULT);
            let send: Vec<u8> = (1..=send_len).map(|i| i as u8).collect();

            engine
                .start_transaction(PORT, &mut bus, addr(DEVICE), &send, read_len)
                .unwrap();
            sim.run_until_idle(&mut engine, PORT, 4 * BUFFER_CAPACITY);

            let case = format!("send={send_len} read={read_len}");
            assert_eq!(engine.check_status(PORT), PortStatus::WaitingForData, "{case}");
            assert_eq!(engine.last_outcome(PORT), Some(TransferOutcome::Completed), "{case}");
            assert_eq!(engine.read_buffer(PORT), &response[..read_len], "{case}");
            assert_eq!(sim.received(DEVICE), send, "{case}");
            pairs += 1;
        }
    }

    assert_eq!(pairs, 561);
}

// =============================================================================
// Shared Engine
// =============================================================================

#[test]
fn test_shared_engine_signals_completion() {
    let sim = SimBus::new().with_device(sensor());
    let mut bus = sim.clone();
    let engine = SharedEngine::new();
    engine.init(PORT, &mut bus, &BusTiming::DEFAULT);

    engine.start(PORT, &mut bus, addr(DEVICE), &[], 3).unwrap();
    assert!(engine.check_status(PORT).is_busy());
    sim.run_shared(&engine, PORT, 20);

    assert_eq!(block_on(engine.wait(PORT)), TransferOutcome::Completed);
    let mut data = [0u8; 4];
    assert_eq!(engine.copy_read_buffer(PORT, &mut data), 3);
    assert_eq!(data, [0xC0, 0xFF, 0xEE, 0x00]);
}

#[test]
fn test_shared_engine_signals_abort() {
    let sim = SimBus::new();
    let mut bus = sim.clone();
    let engine = SharedEngine::new();

    engine.start(PORT, &mut bus, addr(DEVICE), &[7], 0).unwrap();
    sim.run_shared(&engine, PORT, 20);

    assert_eq!(
        block_on(engine.wait(PORT)),
        TransferOutcome::Aborted(AbortReason::AddressNack)
    );
    assert_eq!(engine.last_outcome(PORT), Some(TransferOutcome::Aborted(AbortReason::AddressNack)));
}

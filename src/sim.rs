//! Host-Side Bus Controllers
//!
//! Two [`BusController`] implementations for running the engine without
//! hardware:
//!
//! - [`ScriptedBus`] reports whatever STAT value the test sets and records
//!   every register access, for stepping the state machine one event at a
//!   time.
//! - [`SimBus`] models the LPC82x master reacting to MSTCTL writes, with
//!   simulated target devices attached, so whole transactions can run to
//!   completion through the blocking and async drivers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::i2c::registers::{IntEn, MasterState, MstCtl, Stat};
use crate::i2c::{BusController, I2cEngine, SharedEngine};
use crate::types::Port;

/// One register access made by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusAction {
    /// STAT flags cleared
    ClearStatus(Stat),
    /// Byte written to MSTDAT
    WriteData(u8),
    /// Byte read from MSTDAT
    ReadData(u8),
    /// MSTCTL written
    Control(MstCtl),
    /// Port interrupt unmasked
    EnableEvents,
    /// Port interrupt masked
    DisableEvents,
    /// CLKDIV written
    ClockDivider(u16),
    /// MSTTIME written
    MasterTiming(u8),
    /// CFG.MSTEN set
    EnableMaster,
    /// INTENSET written
    InterruptSources(IntEn),
}

// ============================================================================
// Scripted controller
// ============================================================================

/// Controller that replays test-chosen status values
#[derive(Clone, Debug, Default)]
pub struct ScriptedBus {
    status: Stat,
    rx: VecDeque<u8>,
    events_enabled: bool,
    actions: Vec<BusAction>,
}

impl ScriptedBus {
    /// Create with an empty status and no queued data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw STAT value returned by the next reads
    pub fn set_status(&mut self, status: Stat) {
        self.status = status;
    }

    /// Report master-pending in `state`
    pub fn set_pending(&mut self, state: MasterState) {
        self.status = Stat::pending(state);
    }

    /// Queue a byte to be returned from MSTDAT
    pub fn queue_rx(&mut self, byte: u8) {
        self.rx.push_back(byte);
    }

    /// Whether the port interrupt is currently unmasked
    #[must_use]
    pub const fn events_enabled(&self) -> bool {
        self.events_enabled
    }

    /// Every access recorded so far
    #[must_use]
    pub fn actions(&self) -> &[BusAction] {
        &self.actions
    }

    /// Drain the recorded accesses
    pub fn take_actions(&mut self) -> Vec<BusAction> {
        core::mem::take(&mut self.actions)
    }

    /// MSTCTL writes recorded so far
    #[must_use]
    pub fn controls(&self) -> Vec<MstCtl> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                BusAction::Control(ctl) => Some(*ctl),
                _ => None,
            })
            .collect()
    }
}

impl BusController for ScriptedBus {
    fn read_status(&self) -> Stat {
        self.status
    }

    fn clear_status(&mut self, flags: Stat) {
        self.status.remove(flags & (Stat::MST_ARB_LOSS | Stat::MST_ST_STP_ERR));
        self.actions.push(BusAction::ClearStatus(flags));
    }

    fn write_data(&mut self, byte: u8) {
        self.actions.push(BusAction::WriteData(byte));
    }

    fn read_data(&mut self) -> u8 {
        let byte = self.rx.pop_front().unwrap_or(0xFF);
        self.actions.push(BusAction::ReadData(byte));
        byte
    }

    fn master_control(&mut self, ctl: MstCtl) {
        self.actions.push(BusAction::Control(ctl));
    }

    fn enable_events(&mut self) {
        self.events_enabled = true;
        self.actions.push(BusAction::EnableEvents);
    }

    fn disable_events(&mut self) {
        self.events_enabled = false;
        self.actions.push(BusAction::DisableEvents);
    }

    fn set_clock_divider(&mut self, divider: u16) {
        self.actions.push(BusAction::ClockDivider(divider));
    }

    fn set_master_timing(&mut self, master_time: u8) {
        self.actions.push(BusAction::MasterTiming(master_time));
    }

    fn enable_master(&mut self) {
        self.actions.push(BusAction::EnableMaster);
    }

    fn enable_interrupt_sources(&mut self, sources: IntEn) {
        self.actions.push(BusAction::InterruptSources(sources));
    }
}

// ============================================================================
// Simulated bus
// ============================================================================

/// Target device attached to a [`SimBus`]
#[derive(Clone, Debug)]
pub struct SimDevice {
    address: u8,
    response: Vec<u8>,
    nack_address: bool,
    nack_data_at: Option<usize>,
    received: Vec<u8>,
}

impl SimDevice {
    /// Device answering at the 7-bit `address`
    #[must_use]
    pub fn new(address: u8) -> Self {
        Self {
            address: address & 0x7F,
            response: Vec::new(),
            nack_address: false,
            nack_data_at: None,
            received: Vec::new(),
        }
    }

    /// Bytes returned by every read phase, in order; 0xFF once exhausted
    #[must_use]
    pub fn with_response(mut self, bytes: &[u8]) -> Self {
        self.response = bytes.to_vec();
        self
    }

    /// Refuse to acknowledge the address byte
    #[must_use]
    pub fn nack_address(mut self) -> Self {
        self.nack_address = true;
        self
    }

    /// Refuse to acknowledge the data byte at `index` (0-based)
    #[must_use]
    pub fn nack_data_at(mut self, index: usize) -> Self {
        self.nack_data_at = Some(index);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Write,
    Read,
}

#[derive(Debug)]
struct SimState {
    status: Stat,
    mstdat: u8,
    events_enabled: bool,
    spurious: bool,
    arm_arbitration_loss: bool,
    devices: Vec<SimDevice>,
    target: Option<(usize, Direction)>,
    read_pos: usize,
    actions: Vec<BusAction>,
}

impl SimState {
    fn set_state(&mut self, state: MasterState) {
        let flags = self.status & (Stat::MST_ARB_LOSS | Stat::MST_ST_STP_ERR);
        self.status = Stat::pending(state) | flags;
    }

    fn next_response_byte(&mut self) -> u8 {
        let byte = self
            .target
            .and_then(|(index, _)| self.devices[index].response.get(self.read_pos).copied())
            .unwrap_or(0xFF);
        self.read_pos += 1;
        byte
    }

    fn on_start(&mut self) {
        if self.arm_arbitration_loss {
            self.arm_arbitration_loss = false;
            self.target = None;
            self.status = Stat::MST_ARB_LOSS;
            return;
        }

        self.spurious = false;
        let address = self.mstdat >> 1;
        let direction = if self.mstdat & 1 == 1 {
            Direction::Read
        } else {
            Direction::Write
        };
        self.read_pos = 0;
        self.target = self
            .devices
            .iter()
            .position(|device| device.address == address && !device.nack_address)
            .map(|index| (index, direction));

        match (self.target, direction) {
            (None, _) => self.set_state(MasterState::NackOnAddress),
            (Some(_), Direction::Write) => self.set_state(MasterState::TransmitReady),
            (Some(_), Direction::Read) => {
                self.mstdat = self.next_response_byte();
                self.set_state(MasterState::ReceiveReady);
            }
        }
    }

    fn on_continue(&mut self) {
        match (self.status.master_state(), self.target) {
            (MasterState::TransmitReady, Some((index, Direction::Write))) => {
                let device = &mut self.devices[index];
                let position = device.received.len();
                device.received.push(self.mstdat);
                if device.nack_data_at == Some(position) {
                    self.set_state(MasterState::NackOnData);
                } else {
                    self.set_state(MasterState::TransmitReady);
                }
            }
            (MasterState::ReceiveReady, Some((_, Direction::Read))) => {
                self.mstdat = self.next_response_byte();
                self.set_state(MasterState::ReceiveReady);
            }
            // Nobody listening; the NACK persists
            (state @ (MasterState::NackOnAddress | MasterState::NackOnData), _) => self.set_state(state),
            _ => self.status |= Stat::MST_ST_STP_ERR,
        }
    }

    fn on_stop(&mut self) {
        self.target = None;
        self.set_state(MasterState::Idle);
    }
}

/// Reactive model of one LPC82x I2C block acting as master
///
/// Clones share the same state, so a test can keep one handle for
/// inspection while a driver owns another.
#[derive(Clone, Debug)]
pub struct SimBus {
    state: Arc<Mutex<SimState>>,
}

impl SimBus {
    /// Create an idle bus with no devices attached
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                status: Stat::empty(),
                mstdat: 0,
                events_enabled: false,
                spurious: false,
                arm_arbitration_loss: false,
                devices: Vec::new(),
                target: None,
                read_pos: 0,
                actions: Vec::new(),
            })),
        }
    }

    /// Attach a device
    #[must_use]
    pub fn with_device(self, device: SimDevice) -> Self {
        self.state().devices.push(device);
        self
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lose arbitration on the next START
    pub fn arm_arbitration_loss(&self) {
        self.state().arm_arbitration_loss = true;
    }

    /// Raise a start/stop error immediately
    pub fn inject_start_stop_error(&self) {
        self.state().status |= Stat::MST_ST_STP_ERR;
    }

    /// Keep interrupting with no serviced flag set
    pub fn inject_spurious(&self) {
        let mut state = self.state();
        state.status = Stat::empty();
        state.spurious = true;
    }

    /// Whether the block would be interrupting the CPU right now
    #[must_use]
    pub fn interrupt_pending(&self) -> bool {
        let state = self.state();
        state.events_enabled && (state.spurious || !state.status.is_empty())
    }

    /// Whether the port interrupt is currently unmasked
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.state().events_enabled
    }

    /// Current MSTSTATE
    #[must_use]
    pub fn master_state(&self) -> MasterState {
        self.state().status.master_state()
    }

    /// Bytes written to the device at the 7-bit `address`
    #[must_use]
    pub fn received(&self, address: u8) -> Vec<u8> {
        self.state()
            .devices
            .iter()
            .find(|device| device.address == address)
            .map(|device| device.received.clone())
            .unwrap_or_default()
    }

    /// Every register access recorded so far
    #[must_use]
    pub fn actions(&self) -> Vec<BusAction> {
        self.state().actions.clone()
    }

    /// Service interrupts on an unshared engine until the block goes quiet,
    /// returning how many were handled
    pub fn run_until_idle(&self, engine: &mut I2cEngine, port: Port, max_events: usize) -> usize {
        let mut bus = self.clone();
        let mut handled = 0;
        while handled < max_events && self.interrupt_pending() {
            engine.process_hardware_event(port, &mut bus);
            handled += 1;
        }
        handled
    }

    /// [`SimBus::run_until_idle`] for a [`SharedEngine`]
    pub fn run_shared(&self, engine: &SharedEngine, port: Port, max_events: usize) -> usize {
        let mut bus = self.clone();
        let mut handled = 0;
        while handled < max_events && self.interrupt_pending() {
            engine.on_interrupt(port, &mut bus);
            handled += 1;
        }
        handled
    }

    /// Act as the interrupt controller from another thread until `done`
    pub fn pump_until(&self, engine: &SharedEngine, port: Port, done: &AtomicBool) {
        let mut bus = self.clone();
        while !done.load(Ordering::Acquire) {
            if self.interrupt_pending() {
                engine.on_interrupt(port, &mut bus);
            } else {
                std::thread::yield_now();
            }
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusController for SimBus {
    fn read_status(&self) -> Stat {
        self.state().status
    }

    fn clear_status(&mut self, flags: Stat) {
        let mut state = self.state();
        state.status.remove(flags & (Stat::MST_ARB_LOSS | Stat::MST_ST_STP_ERR));
        state.actions.push(BusAction::ClearStatus(flags));
    }

    fn write_data(&mut self, byte: u8) {
        let mut state = self.state();
        state.mstdat = byte;
        state.actions.push(BusAction::WriteData(byte));
    }

    fn read_data(&mut self) -> u8 {
        let mut state = self.state();
        let byte = state.mstdat;
        state.actions.push(BusAction::ReadData(byte));
        byte
    }

    fn master_control(&mut self, ctl: MstCtl) {
        let mut state = self.state();
        state.actions.push(BusAction::Control(ctl));
        if ctl.contains(MstCtl::MST_STOP) {
            state.on_stop();
        } else if ctl.contains(MstCtl::MST_START) {
            state.on_start();
        } else if ctl.contains(MstCtl::MST_CONTINUE) {
            state.on_continue();
        }
    }

    fn enable_events(&mut self) {
        let mut state = self.state();
        state.events_enabled = true;
        state.actions.push(BusAction::EnableEvents);
    }

    fn disable_events(&mut self) {
        let mut state = self.state();
        state.events_enabled = false;
        state.actions.push(BusAction::DisableEvents);
    }

    fn set_clock_divider(&mut self, divider: u16) {
        self.state().actions.push(BusAction::ClockDivider(divider));
    }

    fn set_master_timing(&mut self, master_time: u8) {
        self.state().actions.push(BusAction::MasterTiming(master_time));
    }

    fn enable_master(&mut self) {
        self.state().actions.push(BusAction::EnableMaster);
    }

    fn enable_interrupt_sources(&mut self, sources: IntEn) {
        self.state().actions.push(BusAction::InterruptSources(sources));
    }
}

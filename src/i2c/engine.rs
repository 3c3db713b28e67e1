//! I2C Transfer Engine
//!
//! Per-port transaction state and the interrupt-driven state machine that
//! moves a transaction from START to its final STOP.
//!
//! The foreground side calls [`I2cEngine::start_transaction`] and polls
//! [`I2cEngine::check_status`]; the interrupt side calls
//! [`I2cEngine::process_hardware_event`] once per controller interrupt.
//! While a port reports a busy status its buffers belong to the handler.

use heapless::Vec;

use super::controller::BusController;
use super::error::{AbortReason, Error, TransferOutcome};
use super::registers::{IntEn, MasterState, Stat, StatusEvent};
use crate::config::{BusTiming, BUFFER_CAPACITY, MAX_UNEXPECTED_EVENTS, PORT_COUNT};
use crate::types::{OperationKind, Port, PortStatus, TargetAddress};

/// Transaction state of one I2C port
#[derive(Clone, Debug)]
pub struct PortInstance {
    send_buffer: Vec<u8, BUFFER_CAPACITY>,
    read_buffer: Vec<u8, BUFFER_CAPACITY>,
    bytes_sent: usize,
    bytes_to_read: usize,
    address: TargetAddress,
    status: PortStatus,
    operation: OperationKind,
    unexpected_events: u8,
    /// First fault seen in the current transaction
    fault: Option<AbortReason>,
    outcome: Option<TransferOutcome>,
}

impl PortInstance {
    /// Create an idle port
    #[must_use]
    pub const fn new() -> Self {
        Self {
            send_buffer: Vec::new(),
            read_buffer: Vec::new(),
            bytes_sent: 0,
            bytes_to_read: 0,
            address: TargetAddress::from_wire(0),
            status: PortStatus::WaitingForData,
            operation: OperationKind::Idle,
            unexpected_events: 0,
            fault: None,
            outcome: None,
        }
    }

    /// Current transfer status
    #[must_use]
    pub const fn status(&self) -> PortStatus {
        self.status
    }

    /// Active transaction phase
    #[must_use]
    pub const fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Target of the current or last transaction
    #[must_use]
    pub const fn address(&self) -> TargetAddress {
        self.address
    }

    /// Number of bytes requested for the write phase
    #[must_use]
    pub fn bytes_to_send(&self) -> usize {
        self.send_buffer.len()
    }

    /// Number of bytes placed on the bus so far
    #[must_use]
    pub const fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Number of bytes requested for the read phase
    #[must_use]
    pub const fn bytes_to_read(&self) -> usize {
        self.bytes_to_read
    }

    /// Number of bytes captured so far
    #[must_use]
    pub fn bytes_read(&self) -> usize {
        self.read_buffer.len()
    }

    /// Bytes captured by the read phase
    #[must_use]
    pub fn read_buffer(&self) -> &[u8] {
        &self.read_buffer
    }

    /// Consecutive unrecognized events seen since the last recognized one
    #[must_use]
    pub const fn unexpected_events(&self) -> u8 {
        self.unexpected_events
    }

    /// Outcome of the last finished transaction, None while one is in flight
    #[must_use]
    pub const fn outcome(&self) -> Option<TransferOutcome> {
        self.outcome
    }

    fn finish(&mut self, outcome: TransferOutcome) {
        self.status = PortStatus::WaitingForData;
        self.outcome = Some(outcome);
    }

    fn note_fault(&mut self, reason: AbortReason) {
        if self.fault.is_none() {
            self.fault = Some(reason);
        }
    }

    fn abort<B: BusController>(&mut self, bus: &mut B, reason: AbortReason) {
        bus.disable_events();
        self.note_fault(reason);
        self.finish(TransferOutcome::Aborted(reason));
    }

    fn on_master_pending<B: BusController>(&mut self, bus: &mut B, state: MasterState) {
        match state {
            MasterState::Idle => {
                bus.disable_events();
                let outcome = self
                    .fault
                    .map_or(TransferOutcome::Completed, TransferOutcome::Aborted);
                self.finish(outcome);
            }
            MasterState::ReceiveReady => self.on_receive_ready(bus),
            MasterState::TransmitReady | MasterState::NackOnAddress => {
                if state == MasterState::NackOnAddress {
                    self.note_fault(AbortReason::AddressNack);
                }
                match self.operation {
                    OperationKind::Write => self.on_transmit_ready(bus),
                    OperationKind::Read => {
                        // The target refused the read address
                        self.note_fault(AbortReason::AddressNack);
                        bus.stop();
                    }
                    OperationKind::Idle => bus.stop(),
                }
            }
            MasterState::NackOnData => {
                self.note_fault(AbortReason::DataNack);
                bus.stop();
            }
            MasterState::Reserved(_) => {
                self.note_fault(AbortReason::UnexpectedState);
                bus.stop();
            }
        }
    }

    fn on_receive_ready<B: BusController>(&mut self, bus: &mut B) {
        let byte = bus.read_data();
        let remaining = self.bytes_to_read.saturating_sub(self.read_buffer.len());
        if remaining == 0 || self.read_buffer.push(byte).is_err() {
            // Data nobody asked for; end the transfer instead of overrunning
            self.note_fault(AbortReason::UnexpectedState);
            bus.stop();
        } else if remaining == 1 {
            bus.stop();
        } else {
            bus.proceed();
        }
    }

    fn on_transmit_ready<B: BusController>(&mut self, bus: &mut B) {
        self.status = PortStatus::Sending;
        if let Some(&byte) = self.send_buffer.get(self.bytes_sent) {
            bus.write_data(byte);
            bus.proceed();
            self.bytes_sent += 1;
        } else if self.bytes_to_read > 0 {
            self.operation = OperationKind::Read;
            bus.write_data(self.address.read_byte());
            bus.start();
        } else {
            bus.stop();
        }
    }

    /// Returns true when the port has been declared stuck
    fn on_unrecognized<B: BusController>(&mut self, bus: &mut B) -> bool {
        self.unexpected_events = self.unexpected_events.saturating_add(1);
        if self.unexpected_events >= MAX_UNEXPECTED_EVENTS {
            self.abort(bus, AbortReason::UnexpectedState);
            true
        } else {
            false
        }
    }
}

impl Default for PortInstance {
    fn default() -> Self {
        Self::new()
    }
}

/// Transfer engine owning the state of every I2C port
#[derive(Clone, Debug)]
pub struct I2cEngine {
    ports: [PortInstance; PORT_COUNT],
}

impl I2cEngine {
    /// Create an engine with every port idle
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ports: [const { PortInstance::new() }; PORT_COUNT],
        }
    }

    /// One-time port setup: timing, master mode and interrupt sources
    pub fn init<B: BusController>(&mut self, port: Port, bus: &mut B, timing: &BusTiming) {
        bus.set_clock_divider(timing.clock_divider);
        bus.set_master_timing(timing.master_time());
        bus.enable_master();
        bus.enable_interrupt_sources(IntEn::MST_PENDING | IntEn::MST_ARB_LOSS | IntEn::MST_ST_STP_ERR);
        self.ports[port.index()] = PortInstance::new();
        debug!("{} init {}", port, timing);
    }

    /// Begin a transaction: write `send` then read `read_len` bytes
    ///
    /// Either part may be empty. With both empty the target is only
    /// addressed, which probes whether it acknowledges. Any transaction
    /// still in flight on the port is overwritten; callers must wait for
    /// [`PortStatus::WaitingForData`] first.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` if either length exceeds the
    /// port buffers. Nothing is changed in that case.
    pub fn start_transaction<B: BusController>(
        &mut self,
        port: Port,
        bus: &mut B,
        address: TargetAddress,
        send: &[u8],
        read_len: usize,
    ) -> Result<(), Error> {
        if send.len() > BUFFER_CAPACITY || read_len > BUFFER_CAPACITY {
            return Err(Error::CapacityExceeded);
        }

        let instance = &mut self.ports[port.index()];
        instance.send_buffer.clear();
        instance
            .send_buffer
            .extend_from_slice(send)
            .map_err(|()| Error::CapacityExceeded)?;
        instance.read_buffer.clear();
        instance.bytes_to_read = read_len;
        instance.bytes_sent = 0;
        instance.unexpected_events = 0;
        instance.address = address;
        instance.fault = None;
        instance.outcome = None;

        instance.operation = match (send.is_empty(), read_len > 0) {
            (false, _) => OperationKind::Write,
            (true, true) => OperationKind::Read,
            (true, false) => OperationKind::Idle,
        };
        let address_byte = match instance.operation {
            OperationKind::Read => address.read_byte(),
            OperationKind::Write | OperationKind::Idle => address.write_byte(),
        };
        bus.write_data(address_byte);
        instance.status = PortStatus::WaitingForSend;

        bus.clear_status(Stat::MST_ARB_LOSS | Stat::MST_ST_STP_ERR);
        bus.start();
        bus.enable_events();
        trace!("{} start {} tx={} rx={}", port, address, send.len(), read_len);
        Ok(())
    }

    /// Current status of a port
    #[must_use]
    pub fn check_status(&self, port: Port) -> PortStatus {
        self.ports[port.index()].status
    }

    /// Bytes captured by the last read phase on a port
    #[must_use]
    pub fn read_buffer(&self, port: Port) -> &[u8] {
        self.ports[port.index()].read_buffer()
    }

    /// How the last transaction on a port ended, None while one is in flight
    #[must_use]
    pub fn last_outcome(&self, port: Port) -> Option<TransferOutcome> {
        self.ports[port.index()].outcome
    }

    /// Full state of a port
    #[must_use]
    pub fn port(&self, port: Port) -> &PortInstance {
        &self.ports[port.index()]
    }

    /// Abandon the transaction in flight on a port
    ///
    /// Event delivery is disabled and a STOP is issued so the controller
    /// releases the bus. The port returns to idle with the outcome
    /// `Aborted(Cancelled)`. Returns false if the port was already idle,
    /// in which case nothing is touched.
    pub fn cancel<B: BusController>(&mut self, port: Port, bus: &mut B) -> bool {
        let instance = &mut self.ports[port.index()];
        if !instance.status.is_busy() {
            return false;
        }
        instance.abort(bus, AbortReason::Cancelled);
        bus.stop();
        warn!("{} transaction cancelled", port);
        true
    }

    /// Advance a port's state machine for one controller interrupt
    pub fn process_hardware_event<B: BusController>(&mut self, port: Port, bus: &mut B) {
        let instance = &mut self.ports[port.index()];
        let event = bus.read_status().event();

        match event {
            StatusEvent::ArbitrationLost => {
                bus.clear_status(Stat::MST_ARB_LOSS);
                instance.abort(bus, AbortReason::ArbitrationLost);
                warn!("{} arbitration lost", port);
            }
            StatusEvent::StartStopError => {
                bus.clear_status(Stat::MST_ST_STP_ERR);
                instance.abort(bus, AbortReason::ProtocolError);
                warn!("{} start/stop error", port);
            }
            StatusEvent::MasterPending(state) => {
                instance.unexpected_events = 0;
                instance.on_master_pending(bus, state);
            }
            StatusEvent::Unrecognized => {
                if instance.on_unrecognized(bus) {
                    warn!("{} stuck, giving up", port);
                }
            }
        }
    }
}

impl Default for I2cEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_port_is_idle() {
        let port = PortInstance::new();
        assert_eq!(port.status(), PortStatus::WaitingForData);
        assert_eq!(port.operation(), OperationKind::Idle);
        assert!(port.outcome().is_none());
        assert!(port.read_buffer().is_empty());
    }

    #[test]
    fn first_fault_wins() {
        let mut port = PortInstance::new();
        port.note_fault(AbortReason::AddressNack);
        port.note_fault(AbortReason::DataNack);
        assert_eq!(port.fault, Some(AbortReason::AddressNack));
    }
}

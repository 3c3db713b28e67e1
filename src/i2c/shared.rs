//! Engine Shared With the Interrupt Handler
//!
//! Wraps [`I2cEngine`] in a critical-section mutex so the foreground code
//! and the I2C interrupt handlers can both reach it, and adds one
//! completion signal per port that the handler fires when a transaction
//! ends.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use super::controller::BusController;
use super::engine::I2cEngine;
use super::error::{Error, TransferOutcome};
use crate::config::{BusTiming, PORT_COUNT};
use crate::types::{Port, PortStatus, TargetAddress};

type Completion = Signal<CriticalSectionRawMutex, TransferOutcome>;

/// Transfer engine reachable from both thread and interrupt context
pub struct SharedEngine {
    engine: Mutex<RefCell<I2cEngine>>,
    completions: [Completion; PORT_COUNT],
}

impl SharedEngine {
    /// Create with every port idle; usable in a `static`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            engine: Mutex::new(RefCell::new(I2cEngine::new())),
            completions: [const { Signal::new() }; PORT_COUNT],
        }
    }

    /// Run `f` with exclusive access to the engine
    pub fn lock<R>(&self, f: impl FnOnce(&mut I2cEngine) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.engine.borrow_ref_mut(cs)))
    }

    /// See [`I2cEngine::init`]
    pub fn init<B: BusController>(&self, port: Port, bus: &mut B, timing: &BusTiming) {
        self.completions[port.index()].reset();
        self.lock(|engine| engine.init(port, bus, timing));
    }

    /// Start a transaction and arm the port's completion signal
    ///
    /// # Errors
    ///
    /// See [`I2cEngine::start_transaction`].
    pub fn start<B: BusController>(
        &self,
        port: Port,
        bus: &mut B,
        address: TargetAddress,
        send: &[u8],
        read_len: usize,
    ) -> Result<(), Error> {
        self.completions[port.index()].reset();
        self.lock(|engine| engine.start_transaction(port, bus, address, send, read_len))
    }

    /// Interrupt entry point for one port
    ///
    /// Call from the port's interrupt handler. Fires the completion
    /// signal when the event ends the transaction.
    pub fn on_interrupt<B: BusController>(&self, port: Port, bus: &mut B) {
        let finished = self.lock(|engine| {
            let was_busy = engine.check_status(port).is_busy();
            engine.process_hardware_event(port, bus);
            if was_busy && !engine.check_status(port).is_busy() {
                engine.last_outcome(port)
            } else {
                None
            }
        });

        if let Some(outcome) = finished {
            self.completions[port.index()].signal(outcome);
        }
    }

    /// Abandon the transaction in flight on `port`
    ///
    /// Wakes any task waiting on the port with the cancelled outcome.
    /// Returns false if the port was already idle.
    pub fn cancel<B: BusController>(&self, port: Port, bus: &mut B) -> bool {
        let cancelled = self.lock(|engine| {
            if engine.cancel(port, bus) {
                engine.last_outcome(port)
            } else {
                None
            }
        });

        if let Some(outcome) = cancelled {
            self.completions[port.index()].signal(outcome);
            true
        } else {
            false
        }
    }

    /// See [`I2cEngine::check_status`]
    #[must_use]
    pub fn check_status(&self, port: Port) -> PortStatus {
        self.lock(|engine| engine.check_status(port))
    }

    /// See [`I2cEngine::last_outcome`]
    #[must_use]
    pub fn last_outcome(&self, port: Port) -> Option<TransferOutcome> {
        self.lock(|engine| engine.last_outcome(port))
    }

    /// Copy the captured bytes of the last read phase into `buffer`,
    /// returning how many were copied
    pub fn copy_read_buffer(&self, port: Port, buffer: &mut [u8]) -> usize {
        self.lock(|engine| {
            let data = engine.read_buffer(port);
            let len = data.len().min(buffer.len());
            buffer[..len].copy_from_slice(&data[..len]);
            len
        })
    }

    /// Wait until the transaction started on `port` ends
    pub async fn wait(&self, port: Port) -> TransferOutcome {
        self.completions[port.index()].wait().await
    }
}

impl Default for SharedEngine {
    fn default() -> Self {
        Self::new()
    }
}

//! Blocking `embedded-hal` Driver
//!
//! Starts a transaction on the shared engine and busy-polls the port
//! status until the interrupt handler returns it to idle.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use heapless::Vec;

use super::controller::BusController;
use super::error::{AbortReason, Error, TransferOutcome};
use super::ops;
use super::shared::SharedEngine;
use crate::config::DEFAULT_POLL_BUDGET;
use crate::types::{Port, TargetAddress};

/// Blocking I2C master on one port
pub struct BlockingI2c<'a, B: BusController> {
    engine: &'a SharedEngine,
    port: Port,
    bus: B,
    poll_budget: u32,
}

impl<'a, B: BusController> BlockingI2c<'a, B> {
    /// Create a driver for `port`; the port must already be initialized
    pub fn new(engine: &'a SharedEngine, port: Port, bus: B) -> Self {
        Self {
            engine,
            port,
            bus,
            poll_budget: DEFAULT_POLL_BUDGET,
        }
    }

    /// Set how many status polls a transfer may take before timing out
    #[must_use]
    pub fn with_poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = polls;
        self
    }

    /// Port driven by this instance
    #[must_use]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Release the bus controller
    pub fn release(self) -> B {
        self.bus
    }

    /// Run one transaction and wait for the handler to finish it
    fn execute(
        &mut self,
        address: SevenBitAddress,
        send: &[u8],
        read_len: usize,
    ) -> Result<TransferOutcome, Error> {
        let address = TargetAddress::new(address).ok_or(Error::InvalidAddress)?;
        self.engine.start(self.port, &mut self.bus, address, send, read_len)?;

        let mut polls = 0u32;
        while self.engine.check_status(self.port).is_busy() {
            if polls >= self.poll_budget {
                // The handler may have finished since the last poll
                if self.engine.cancel(self.port, &mut self.bus) {
                    return Err(Error::Timeout);
                }
                break;
            }
            polls += 1;
            core::hint::spin_loop();
        }

        Ok(self
            .engine
            .last_outcome(self.port)
            .unwrap_or(TransferOutcome::Completed))
    }

    /// Check whether a device acknowledges `address`
    ///
    /// # Errors
    ///
    /// Returns any failure other than an address NACK.
    pub fn probe(&mut self, address: SevenBitAddress) -> Result<bool, Error> {
        match self.execute(address, &[], 0)? {
            TransferOutcome::Completed => Ok(true),
            TransferOutcome::Aborted(AbortReason::AddressNack) => Ok(false),
            TransferOutcome::Aborted(reason) => Err(Error::Aborted(reason)),
        }
    }

    /// Probe every non-reserved 7-bit address, returning those that answer
    ///
    /// # Errors
    ///
    /// Returns `Error::ScanOverflow` if more than `N` devices answer, and
    /// stops at the first failure other than an address NACK so a faulty
    /// bus is not reported as an empty one.
    pub fn scan<const N: usize>(&mut self) -> Result<Vec<TargetAddress, N>, Error> {
        let mut devices = Vec::new();

        for addr in TargetAddress::SCAN_RANGE {
            if self.probe(addr)? {
                let found = TargetAddress::new(addr).ok_or(Error::InvalidAddress)?;
                devices.push(found).map_err(|_| Error::ScanOverflow)?;
            }
        }

        Ok(devices)
    }
}

impl<B: BusController> ErrorType for BlockingI2c<'_, B> {
    type Error = Error;
}

impl<B: BusController> I2c for BlockingI2c<'_, B> {
    fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        let outcome = self.execute(address, &[], read.len())?;
        self.engine.copy_read_buffer(self.port, read);
        outcome.into_result()
    }

    fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.execute(address, write, 0)?.into_result()
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        let outcome = self.execute(address, write, read.len())?;
        self.engine.copy_read_buffer(self.port, read);
        outcome.into_result()
    }

    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let plan = ops::plan(operations)?;
        let outcome = self.execute(address, &plan.send, plan.read_len)?;
        let port = self.port;
        self.engine
            .lock(|engine| ops::scatter(engine.read_buffer(port), operations));
        outcome.into_result()
    }
}

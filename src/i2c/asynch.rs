//! Async `embedded-hal-async` Driver
//!
//! Starts a transaction on the shared engine and awaits the completion
//! signal that the interrupt handler fires, instead of polling.

use embedded_hal::i2c::{ErrorType, Operation, SevenBitAddress};
use embedded_hal_async::i2c::I2c;

use super::controller::BusController;
use super::error::{Error, TransferOutcome};
use super::ops;
use super::shared::SharedEngine;
use crate::types::{Port, TargetAddress};

/// Interrupt-completed I2C master on one port
pub struct AsyncI2c<'a, B: BusController> {
    engine: &'a SharedEngine,
    port: Port,
    bus: B,
}

impl<'a, B: BusController> AsyncI2c<'a, B> {
    /// Create a driver for `port`; the port must already be initialized
    pub fn new(engine: &'a SharedEngine, port: Port, bus: B) -> Self {
        Self { engine, port, bus }
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

    async fn execute(
        &mut self,
        address: SevenBitAddress,
        send: &[u8],
        read_len: usize,
    ) -> Result<TransferOutcome, Error> {
        let address = TargetAddress::new(address).ok_or(Error::InvalidAddress)?;
        self.engine.start(self.port, &mut self.bus, address, send, read_len)?;
        Ok(self.engine.wait(self.port).await)
    }
}

impl<B: BusController> ErrorType for AsyncI2c<'_, B> {
    type Error = Error;
}

impl<B: BusController> I2c for AsyncI2c<'_, B> {
    async fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        let outcome = self.execute(address, &[], read.len()).await?;
        self.engine.copy_read_buffer(self.port, read);
        outcome.into_result()
    }

    async fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.execute(address, write, 0).await?.into_result()
    }

    async fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        let outcome = self.execute(address, write, read.len()).await?;
        self.engine.copy_read_buffer(self.port, read);
        outcome.into_result()
    }

    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let plan = ops::plan(operations)?;
        let outcome = self.execute(address, &plan.send, plan.read_len).await?;
        let port = self.port;
        self.engine
            .lock(|engine| ops::scatter(engine.read_buffer(port), operations));
        outcome.into_result()
    }
}

//! LPC82x I2C Demo Application
//!
//! Brings up I2C0 and repeatedly reads two bytes from register 0x8F of
//! the device at wire address 0xD2, logging the result over RTT.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use lpc82x_pac::interrupt;
use {defmt_rtt as _, panic_probe as _};

use lpc8xx_i2c::hal::lpc82x::Lpc82xI2c;
use lpc8xx_i2c::prelude::*;

/// Core clock cycles between reads (about one second at 12 MHz)
const READ_INTERVAL_CYCLES: u32 = 12_000_000;

static ENGINE: SharedEngine = SharedEngine::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("LPC8xx I2C demo v{}", env!("CARGO_PKG_VERSION"));

    let port = Port::I2C0;
    let mut bus = Lpc82xI2c::new(port);
    bus.power_up();
    ENGINE.init(port, &mut bus, &BusTiming::for_port(port));

    info!("{} initialized", port);

    let target = TargetAddress::from_wire(DEMO_DEVICE_ADDR);
    let mut i2c = AsyncI2c::new(&ENGINE, port, bus);

    loop {
        let mut data = [0u8; 2];
        match i2c
            .write_read(target.seven_bit(), &[DEMO_DEVICE_REG], &mut data)
            .await
        {
            Ok(()) => info!(
                "{} reg 0x{:02X} = {:02X} {:02X}",
                target, DEMO_DEVICE_REG, data[0], data[1]
            ),
            Err(e) => warn!("{} read failed: {}", target, e),
        }
        cortex_m::asm::delay(READ_INTERVAL_CYCLES);
    }
}

fn service(port: Port) {
    ENGINE.on_interrupt(port, &mut Lpc82xI2c::new(port));
}

#[interrupt]
fn I2C0() {
    service(Port::I2C0);
}

#[interrupt]
fn I2C1() {
    service(Port::I2C1);
}

#[interrupt]
fn I2C2() {
    service(Port::I2C2);
}

#[interrupt]
fn I2C3() {
    service(Port::I2C3);
}

//! LPC82x I2C Block Access
//!
//! [`BusController`] for the four I2C blocks over the `lpc82x-pac`
//! register API, plus the one-time SYSCON and switch-matrix setup that
//! makes a block usable. The device vector table comes from the PAC's
//! `rt` feature; the application binds `I2C0`..`I2C3` with
//! `#[interrupt]`.
//!
//! Only I2C0 has fixed pins (PIO0_10 SCL, PIO0_11 SDA) enabled here; the
//! other blocks must be routed through PINASSIGN by the board code.

#![allow(unsafe_code)]

use cortex_m::peripheral::NVIC;
use lpc82x_pac as pac;
use pac::i2c0::RegisterBlock;
use pac::Interrupt;

use crate::i2c::registers::{Cfg, IntEn, MstCtl, Stat};
use crate::i2c::BusController;
use crate::types::Port;

/// Reset-release bit of each block in PRESETCTRL
const RESET_BIT: [u32; 4] = [6, 14, 15, 16];
/// Clock-enable bit of each block in SYSAHBCLKCTRL
const CLOCK_BIT: [u32; 4] = [5, 21, 22, 23];
/// I2C0_SDA and I2C0_SCL fixed-pin enables (active low)
const SWM_I2C0_PINS: u32 = (1 << 11) | (1 << 12);

/// One LPC82x I2C block driven as bus master
///
/// The type holds no state beyond the port, so the interrupt handler can
/// create its own instance for the port it serves.
#[derive(Clone, Copy, Debug)]
pub struct Lpc82xI2c {
    port: Port,
}

impl Lpc82xI2c {
    /// Register access for `port`
    #[must_use]
    pub const fn new(port: Port) -> Self {
        Self { port }
    }

    /// Port this instance drives
    #[must_use]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Interrupt line of this block
    #[must_use]
    pub const fn interrupt(&self) -> Interrupt {
        match self.port.index() {
            0 => Interrupt::I2C0,
            1 => Interrupt::I2C1,
            2 => Interrupt::I2C2,
            _ => Interrupt::I2C3,
        }
    }

    fn regs(&self) -> &'static RegisterBlock {
        // SAFETY: PAC pointers are valid for the whole program and the
        // engine serializes every access to a port
        unsafe {
            match self.port.index() {
                0 => &*pac::I2C0::ptr(),
                1 => &*pac::I2C1::ptr(),
                2 => &*pac::I2C2::ptr(),
                _ => &*pac::I2C3::ptr(),
            }
        }
    }

    /// Clock the block, release it from reset and connect its pins
    ///
    /// Call once before `init`.
    pub fn power_up(&mut self) {
        let index = self.port.index();
        // SAFETY: only this block's clock, reset and pin bits are changed
        let syscon = unsafe { &*pac::SYSCON::ptr() };
        syscon
            .sysahbclkctrl
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << CLOCK_BIT[index])) });
        syscon
            .presetctrl
            .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << RESET_BIT[index])) });
        syscon
            .presetctrl
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << RESET_BIT[index])) });

        if self.port == Port::I2C0 {
            let swm = unsafe { &*pac::SWM0::ptr() };
            swm.pinenable0
                .modify(|r, w| unsafe { w.bits(r.bits() & !SWM_I2C0_PINS) });
        }
    }
}

impl BusController for Lpc82xI2c {
    fn read_status(&self) -> Stat {
        Stat::from_bits_retain(self.regs().stat.read().bits())
    }

    fn clear_status(&mut self, flags: Stat) {
        self.regs().stat.write(|w| unsafe { w.bits(flags.bits()) });
    }

    fn write_data(&mut self, byte: u8) {
        self.regs().mstdat.write(|w| unsafe { w.bits(u32::from(byte)) });
    }

    fn read_data(&mut self) -> u8 {
        (self.regs().mstdat.read().bits() & 0xFF) as u8
    }

    fn master_control(&mut self, ctl: MstCtl) {
        self.regs().mstctl.write(|w| unsafe { w.bits(ctl.bits()) });
    }

    fn enable_events(&mut self) {
        // SAFETY: the handler only touches the engine through a critical section
        unsafe { NVIC::unmask(self.interrupt()) };
    }

    fn disable_events(&mut self) {
        NVIC::mask(self.interrupt());
    }

    fn set_clock_divider(&mut self, divider: u16) {
        self.regs().clkdiv.write(|w| unsafe { w.bits(u32::from(divider)) });
    }

    fn set_master_timing(&mut self, master_time: u8) {
        self.regs()
            .msttime
            .write(|w| unsafe { w.bits(u32::from(master_time)) });
    }

    fn enable_master(&mut self) {
        self.regs().cfg.modify(|r, w| {
            let cfg = Cfg::from_bits_retain(r.bits()) | Cfg::MST_EN;
            unsafe { w.bits(cfg.bits()) }
        });
    }

    fn enable_interrupt_sources(&mut self, sources: IntEn) {
        self.regs().intenset.write(|w| unsafe { w.bits(sources.bits()) });
    }
}

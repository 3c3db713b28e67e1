//! Bus Controller Capability
//!
//! The register-level primitives the transfer engine needs from one I2C
//! block. Firmware implements this over MMIO (`hal::lpc82x`); host tests
//! implement it with recording or simulated controllers.

use super::registers::{IntEn, MstCtl, Stat};

/// Register access for a single I2C block acting as bus master
pub trait BusController {
    /// Read the STAT register
    fn read_status(&self) -> Stat;

    /// Write-1-to-clear the given STAT flags
    fn clear_status(&mut self, flags: Stat);

    /// Write MSTDAT (address or data byte to transmit)
    fn write_data(&mut self, byte: u8);

    /// Read MSTDAT (last received byte)
    fn read_data(&mut self) -> u8;

    /// Write MSTCTL
    fn master_control(&mut self, ctl: MstCtl);

    /// Deliver this block's interrupts to the handler
    fn enable_events(&mut self);

    /// Stop delivering this block's interrupts
    fn disable_events(&mut self);

    /// Write CLKDIV
    fn set_clock_divider(&mut self, divider: u16);

    /// Write MSTTIME
    fn set_master_timing(&mut self, master_time: u8);

    /// Set CFG.MSTEN
    fn enable_master(&mut self);

    /// Write INTENSET
    fn enable_interrupt_sources(&mut self, sources: IntEn);

    /// Issue a START with the address already in MSTDAT
    fn start(&mut self) {
        self.master_control(MstCtl::MST_START);
    }

    /// Issue a STOP
    fn stop(&mut self) {
        self.master_control(MstCtl::MST_STOP);
    }

    /// Acknowledge and continue
    fn proceed(&mut self) {
        self.master_control(MstCtl::MST_CONTINUE);
    }
}

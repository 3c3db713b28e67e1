//! Shared types used across the driver
//!
//! Domain types that enforce invariants at construction time: a port
//! index that is always in range and a target address that always has
//! its R/W bit cleared.

use core::fmt;

use crate::config::PORT_COUNT;

/// Index of a physical I2C block
///
/// Construction validates the index, so every `Port` can be used to
/// index per-port tables without bounds failures.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u8);

impl Port {
    /// I2C0 (fixed-pin block on PIO0_10/PIO0_11)
    pub const I2C0: Self = Self(0);
    /// I2C1
    pub const I2C1: Self = Self(1);
    /// I2C2
    pub const I2C2: Self = Self(2);
    /// I2C3
    pub const I2C3: Self = Self(3);

    /// All ports in index order
    pub const ALL: [Self; PORT_COUNT] = [Self::I2C0, Self::I2C1, Self::I2C2, Self::I2C3];

    /// Create from a port number, returns None if out of range
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < PORT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Port number as a table index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2C{}", self.0)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2C{}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Port {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "I2C{}", self.0);
    }
}

/// Target device address as it appears on the wire
///
/// Stored pre-shifted: the 7-bit address occupies bits 7..1 and bit 0 is
/// always zero. The read and write address bytes are derived from it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetAddress(u8);

impl TargetAddress {
    /// Non-reserved 7-bit addresses, as probed by a bus scan
    pub const SCAN_RANGE: core::ops::Range<u8> = 0x08..0x78;

    /// Create from a 7-bit address, returns None above 0x7F
    #[must_use]
    pub const fn new(addr: u8) -> Option<Self> {
        if addr <= 0x7F {
            Some(Self(addr << 1))
        } else {
            None
        }
    }

    /// Create from a pre-shifted address byte; the R/W bit is dropped
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        Self(byte & 0xFE)
    }

    /// The 7-bit address
    #[must_use]
    pub const fn seven_bit(self) -> u8 {
        self.0 >> 1
    }

    /// Address byte for a write phase (R/W = 0)
    #[must_use]
    pub const fn write_byte(self) -> u8 {
        self.0
    }

    /// Address byte for a read phase (R/W = 1)
    #[must_use]
    pub const fn read_byte(self) -> u8 {
        self.0 | 1
    }
}

impl fmt::Debug for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TargetAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{:02X}", self.0);
    }
}

/// Transfer status of a port as seen by the foreground caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortStatus {
    /// Idle; results of the previous transaction are readable
    #[default]
    WaitingForData,
    /// Transaction started, address not yet acknowledged
    WaitingForSend,
    /// Write phase in progress
    Sending,
}

impl PortStatus {
    /// True while the interrupt handler owns the port
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::WaitingForData)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PortStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::WaitingForData => defmt::write!(f, "IDLE"),
            Self::WaitingForSend => defmt::write!(f, "START"),
            Self::Sending => defmt::write!(f, "SEND"),
        }
    }
}

/// Active phase of a combined write-then-read transaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationKind {
    /// Read phase (or read-only transaction)
    Read,
    /// Write phase
    Write,
    /// No data phase requested
    #[default]
    Idle,
}

#[cfg(feature = "embedded")]
impl defmt::Format for OperationKind {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Read => defmt::write!(f, "RD"),
            Self::Write => defmt::write!(f, "WR"),
            Self::Idle => defmt::write!(f, "--"),
        }
    }
}

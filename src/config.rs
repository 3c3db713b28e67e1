//! Driver configuration and hardware constants
//!
//! Compile-time limits of the transfer engine and the bus timing
//! applied to each port at initialization.

/// Number of I2C blocks on the LPC82x (I2C0..I2C3)
pub const PORT_COUNT: usize = 4;

/// Capacity of each port's send and receive buffer in bytes
pub const BUFFER_CAPACITY: usize = 32;

/// Consecutive unrecognized events after which a port is declared stuck
pub const MAX_UNEXPECTED_EVENTS: u8 = 3;

/// Default I2C function clock divider (CLKDIV register)
pub const DEFAULT_CLOCK_DIVIDER: u16 = 0x2080;

/// Default SCL low time field of MSTTIME
pub const DEFAULT_SCL_LOW: u8 = 0x5;

/// Default SCL high time field of MSTTIME
pub const DEFAULT_SCL_HIGH: u8 = 0x5;

/// Number of `check_status` polls a blocking transfer may spend
/// before giving up
pub const DEFAULT_POLL_BUDGET: u32 = 1_000_000;

/// Address of the demo target device (pre-shifted wire byte)
pub const DEMO_DEVICE_ADDR: u8 = 0xD2;

/// Register read by the demo firmware
pub const DEMO_DEVICE_REG: u8 = 0x8F;

/// Bus timing applied by `init`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusTiming {
    /// Value written to CLKDIV
    pub clock_divider: u16,
    /// SCL low time, 3-bit MSTTIME field
    pub scl_low: u8,
    /// SCL high time, 3-bit MSTTIME field
    pub scl_high: u8,
}

impl BusTiming {
    /// Timing built from the crate defaults
    pub const DEFAULT: Self = Self {
        clock_divider: DEFAULT_CLOCK_DIVIDER,
        scl_low: DEFAULT_SCL_LOW,
        scl_high: DEFAULT_SCL_HIGH,
    };

    /// Create a timing record, masking the SCL fields to 3 bits
    #[must_use]
    pub const fn new(clock_divider: u16, scl_low: u8, scl_high: u8) -> Self {
        Self {
            clock_divider,
            scl_low: scl_low & 0x7,
            scl_high: scl_high & 0x7,
        }
    }

    /// Timing for a given port.
    ///
    /// Every port currently shares the default prescalers; boards that
    /// run ports at different speeds should build their own `BusTiming`.
    #[must_use]
    pub const fn for_port(_port: crate::types::Port) -> Self {
        Self::DEFAULT
    }

    /// Encoded MSTTIME register value
    #[must_use]
    pub const fn master_time(self) -> u8 {
        ((self.scl_high & 0x7) << 4) | (self.scl_low & 0x7)
    }
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BusTiming {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "CLKDIV=0x{:04X} MSTTIME=0x{:02X}",
            self.clock_divider,
            self.master_time()
        );
    }
}

//! Transfer outcomes and driver errors

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Why the handler ended a transaction early
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum AbortReason {
    /// Another master won arbitration
    ArbitrationLost,
    /// The controller flagged a misplaced START or STOP
    ProtocolError,
    /// The target did not acknowledge its address
    AddressNack,
    /// The target did not acknowledge a data byte
    DataNack,
    /// The controller kept raising events with no serviceable flag
    UnexpectedState,
    /// The caller abandoned the transaction before it finished
    Cancelled,
}

/// Result of the most recent transaction on a port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum TransferOutcome {
    /// The controller returned to idle without any fault
    Completed,
    /// The transaction was abandoned
    Aborted(AbortReason),
}

impl TransferOutcome {
    /// True if the transaction completed without a fault
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Convert to a `Result`
    ///
    /// # Errors
    ///
    /// Returns `Error::Aborted` with the recorded reason.
    pub const fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Completed => Ok(()),
            Self::Aborted(reason) => Err(Error::Aborted(reason)),
        }
    }
}

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Error {
    /// The transaction was aborted by the handler
    Aborted(AbortReason),
    /// A send or read length exceeds the port buffer capacity
    CapacityExceeded,
    /// The port did not return to idle within the poll budget
    Timeout,
    /// The address does not fit in 7 bits
    InvalidAddress,
    /// The operation list has a write after a read
    UnsupportedOperation,
    /// A bus scan found more devices than the result can hold
    ScanOverflow,
}

impl From<AbortReason> for Error {
    fn from(reason: AbortReason) -> Self {
        Self::Aborted(reason)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Aborted(AbortReason::ArbitrationLost) => ErrorKind::ArbitrationLoss,
            Self::Aborted(AbortReason::ProtocolError) => ErrorKind::Bus,
            Self::Aborted(AbortReason::AddressNack) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Self::Aborted(AbortReason::DataNack) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
            Self::CapacityExceeded | Self::ScanOverflow => ErrorKind::Overrun,
            Self::Aborted(AbortReason::UnexpectedState | AbortReason::Cancelled)
            | Self::Timeout
            | Self::InvalidAddress
            | Self::UnsupportedOperation => ErrorKind::Other,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Aborted(AbortReason::ArbitrationLost) => f.write_str("arbitration lost"),
            Self::Aborted(AbortReason::ProtocolError) => f.write_str("start/stop protocol error"),
            Self::Aborted(AbortReason::AddressNack) => f.write_str("address not acknowledged"),
            Self::Aborted(AbortReason::DataNack) => f.write_str("data not acknowledged"),
            Self::Aborted(AbortReason::UnexpectedState) => f.write_str("controller stuck in unrecognized state"),
            Self::Aborted(AbortReason::Cancelled) => f.write_str("transaction cancelled"),
            Self::CapacityExceeded => f.write_str("transfer exceeds port buffer capacity"),
            Self::Timeout => f.write_str("transfer did not finish within the poll budget"),
            Self::InvalidAddress => f.write_str("address is not a 7-bit address"),
            Self::UnsupportedOperation => f.write_str("write after read needs a second transaction"),
            Self::ScanOverflow => f.write_str("more devices answered than the scan can hold"),
        }
    }
}

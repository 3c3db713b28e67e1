//! LPC8xx I2C Register Model
//!
//! Bit definitions for the master-side registers of the LPC82x I2C block
//! and the decoding of the status register into a single event.

use bitflags::bitflags;

bitflags! {
    /// STAT register (master-side bits; MSTSTATE is read via
    /// [`Stat::master_state`])
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Stat: u32 {
        /// Master needs software service
        const MST_PENDING = 1 << 0;
        /// Master arbitration lost (write 1 to clear)
        const MST_ARB_LOSS = 1 << 4;
        /// Master start/stop error (write 1 to clear)
        const MST_ST_STP_ERR = 1 << 6;
    }
}

bitflags! {
    /// MSTCTL register
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MstCtl: u32 {
        /// Acknowledge and continue the current transfer
        const MST_CONTINUE = 1 << 0;
        /// Emit a (repeated) start using the address in MSTDAT
        const MST_START = 1 << 1;
        /// Emit a stop condition
        const MST_STOP = 1 << 2;
    }
}

bitflags! {
    /// INTENSET register (master-side sources)
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct IntEn: u32 {
        /// Master pending
        const MST_PENDING = 1 << 0;
        /// Master arbitration loss
        const MST_ARB_LOSS = 1 << 4;
        /// Master start/stop error
        const MST_ST_STP_ERR = 1 << 6;
    }
}

bitflags! {
    /// CFG register
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Cfg: u32 {
        /// Master function enable
        const MST_EN = 1 << 0;
    }
}

/// Position of the MSTSTATE field in STAT
const MSTSTATE_SHIFT: u32 = 1;
/// Width mask of the MSTSTATE field
const MSTSTATE_MASK: u32 = 0x7;

impl Stat {
    /// Raw 3-bit MSTSTATE field
    #[must_use]
    pub const fn master_state_bits(self) -> u8 {
        ((self.bits() >> MSTSTATE_SHIFT) & MSTSTATE_MASK) as u8
    }

    /// Decoded MSTSTATE field
    #[must_use]
    pub const fn master_state(self) -> MasterState {
        MasterState::from_bits(self.master_state_bits())
    }

    /// Compose a status value reporting master-pending in `state`
    #[must_use]
    pub const fn pending(state: MasterState) -> Self {
        Self::from_bits_retain(Self::MST_PENDING.bits() | ((state.bits() as u32) << MSTSTATE_SHIFT))
    }

    /// Decode into the event the handler must act on, highest priority first
    #[must_use]
    pub const fn event(self) -> StatusEvent {
        if self.contains(Self::MST_ARB_LOSS) {
            StatusEvent::ArbitrationLost
        } else if self.contains(Self::MST_ST_STP_ERR) {
            StatusEvent::StartStopError
        } else if self.contains(Self::MST_PENDING) {
            StatusEvent::MasterPending(self.master_state())
        } else {
            StatusEvent::Unrecognized
        }
    }
}

/// Master state machine position reported in MSTSTATE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasterState {
    /// Bus idle, the master may start a transfer
    Idle,
    /// A byte has been received and awaits reading
    ReceiveReady,
    /// The master may transmit the next byte
    TransmitReady,
    /// The address byte was not acknowledged
    NackOnAddress,
    /// A data byte was not acknowledged
    NackOnData,
    /// Encodings 5..7, not defined for the master function
    Reserved(u8),
}

impl MasterState {
    /// Decode a 3-bit MSTSTATE value
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0 => Self::Idle,
            1 => Self::ReceiveReady,
            2 => Self::TransmitReady,
            3 => Self::NackOnAddress,
            4 => Self::NackOnData,
            other => Self::Reserved(other),
        }
    }

    /// Encode back to the 3-bit field
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::ReceiveReady => 1,
            Self::TransmitReady => 2,
            Self::NackOnAddress => 3,
            Self::NackOnData => 4,
            Self::Reserved(bits) => bits & 0x7,
        }
    }
}

/// Condition selected from one STAT snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusEvent {
    /// MSTARBLOSS set
    ArbitrationLost,
    /// MSTSTSTPERR set
    StartStopError,
    /// MSTPENDING set with the given master state
    MasterPending(MasterState),
    /// None of the serviced flags set
    Unrecognized,
}

#[cfg(feature = "embedded")]
impl defmt::Format for MasterState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::ReceiveReady => defmt::write!(f, "RxReady"),
            Self::TransmitReady => defmt::write!(f, "TxReady"),
            Self::NackOnAddress => defmt::write!(f, "NackAddr"),
            Self::NackOnData => defmt::write!(f, "NackData"),
            Self::Reserved(bits) => defmt::write!(f, "Reserved({})", bits),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for StatusEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ArbitrationLost => defmt::write!(f, "ArbLoss"),
            Self::StartStopError => defmt::write!(f, "StStpErr"),
            Self::MasterPending(state) => defmt::write!(f, "Pending({})", state),
            Self::Unrecognized => defmt::write!(f, "Unrecognized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_state_round_trips_every_encoding() {
        for bits in 0..8u8 {
            assert_eq!(MasterState::from_bits(bits).bits(), bits);
        }
    }

    #[test]
    fn master_state_field_position() {
        // MSTSTATE = 2 (transmit ready) with MSTPENDING
        let stat = Stat::from_bits_retain(0b0000_0101);
        assert_eq!(stat.master_state_bits(), 2);
        assert_eq!(stat.event(), StatusEvent::MasterPending(MasterState::TransmitReady));
    }

    #[test]
    fn arbitration_loss_outranks_everything() {
        let stat = Stat::pending(MasterState::ReceiveReady) | Stat::MST_ARB_LOSS | Stat::MST_ST_STP_ERR;
        assert_eq!(stat.event(), StatusEvent::ArbitrationLost);
    }

    #[test]
    fn start_stop_error_outranks_pending() {
        let stat = Stat::pending(MasterState::Idle) | Stat::MST_ST_STP_ERR;
        assert_eq!(stat.event(), StatusEvent::StartStopError);
    }

    #[test]
    fn state_bits_without_pending_are_unrecognized() {
        let stat = Stat::from_bits_retain(0b0000_0100);
        assert_eq!(stat.event(), StatusEvent::Unrecognized);
    }
}

//! Status decoding
//!
//! The single authoritative mapping from raw bytes to named chip states:
//! - [`StatusByte`]: the byte the chip clocks out after every header byte,
//!   returned by every strobe
//! - [`MarcState`]: the 5-bit main radio control state from the MARCSTATE register
//!
//! Both the controller and the transmit pipeline base their decisions on these
//! types, and they are what gets logged and reported to observers.

use core::convert::Infallible;

use regiface::FromByteArray;

/// Coarse chip state carried in bits 6:4 of the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipState {
    /// IDLE state
    Idle = 0,
    /// Receive mode
    Rx = 1,
    /// Transmit mode
    Tx = 2,
    /// Fast TX ready (synthesizer on)
    FsTxOn = 3,
    /// Frequency synthesizer calibration running
    Calibrate = 4,
    /// PLL settling
    Settling = 5,
    /// RX FIFO overflowed; needs SFRX
    RxFifoOverflow = 6,
    /// TX FIFO underflowed; needs SFTX
    TxFifoUnderflow = 7,
}

impl From<u8> for ChipState {
    fn from(value: u8) -> Self {
        match value & 0x07 {
            0 => Self::Idle,
            1 => Self::Rx,
            2 => Self::Tx,
            3 => Self::FsTxOn,
            4 => Self::Calibrate,
            5 => Self::Settling,
            6 => Self::RxFifoOverflow,
            _ => Self::TxFifoUnderflow,
        }
    }
}

/// Chip status byte
///
/// # Status Byte Format
/// - Bit 7: CHIP_RDYn, low when the crystal is running and the chip is ready
/// - Bits 6:4: [`ChipState`]
/// - Bits 3:0: FIFO bytes available (free TX bytes on a write header, RX bytes
///   on a read header), saturating at 15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte {
    /// Raw byte as clocked in
    pub raw: u8,
    /// The chip reported ready
    pub chip_ready: bool,
    /// Coarse state
    pub state: ChipState,
    /// FIFO bytes available
    pub fifo_bytes: u8,
}

impl StatusByte {
    /// Decodes a status byte. Pure; every byte value decodes.
    pub const fn decode(raw: u8) -> Self {
        let state = match (raw >> 4) & 0x07 {
            0 => ChipState::Idle,
            1 => ChipState::Rx,
            2 => ChipState::Tx,
            3 => ChipState::FsTxOn,
            4 => ChipState::Calibrate,
            5 => ChipState::Settling,
            6 => ChipState::RxFifoOverflow,
            _ => ChipState::TxFifoUnderflow,
        };
        Self {
            raw,
            chip_ready: raw & 0x80 == 0,
            state,
            fifo_bytes: raw & 0x0F,
        }
    }
}

impl From<u8> for StatusByte {
    fn from(value: u8) -> Self {
        Self::decode(value)
    }
}

impl FromByteArray for StatusByte {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::decode(bytes[0]))
    }
}

/// Main radio control state (MARCSTATE register, 5 bits)
///
/// Codes 0x17-0x1F are not assigned by the chip. They show up when the bus is
/// garbled (0x1F is a data-in line stuck high) and are kept as [`MarcState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarcState {
    Sleep,
    Idle,
    Xoff,
    VcoOnMc,
    RegOnMc,
    Mancal,
    VcoOn,
    RegOn,
    StartCal,
    BwBoost,
    FsLock,
    IfadcOn,
    EndCal,
    Rx,
    RxEnd,
    RxRst,
    TxRxSwitch,
    RxFifoOverflow,
    FsTxOn,
    Tx,
    TxEnd,
    RxTxSwitch,
    TxFifoUnderflow,
    /// Unassigned code
    Unknown(u8),
}

impl MarcState {
    /// Decodes the low five bits of a MARCSTATE read
    pub const fn from_bits(value: u8) -> Self {
        match value & 0x1F {
            0x00 => Self::Sleep,
            0x01 => Self::Idle,
            0x02 => Self::Xoff,
            0x03 => Self::VcoOnMc,
            0x04 => Self::RegOnMc,
            0x05 => Self::Mancal,
            0x06 => Self::VcoOn,
            0x07 => Self::RegOn,
            0x08 => Self::StartCal,
            0x09 => Self::BwBoost,
            0x0A => Self::FsLock,
            0x0B => Self::IfadcOn,
            0x0C => Self::EndCal,
            0x0D => Self::Rx,
            0x0E => Self::RxEnd,
            0x0F => Self::RxRst,
            0x10 => Self::TxRxSwitch,
            0x11 => Self::RxFifoOverflow,
            0x12 => Self::FsTxOn,
            0x13 => Self::Tx,
            0x14 => Self::TxEnd,
            0x15 => Self::RxTxSwitch,
            0x16 => Self::TxFifoUnderflow,
            other => Self::Unknown(other),
        }
    }

    /// Raw 5-bit code
    pub const fn bits(self) -> u8 {
        match self {
            Self::Sleep => 0x00,
            Self::Idle => 0x01,
            Self::Xoff => 0x02,
            Self::VcoOnMc => 0x03,
            Self::RegOnMc => 0x04,
            Self::Mancal => 0x05,
            Self::VcoOn => 0x06,
            Self::RegOn => 0x07,
            Self::StartCal => 0x08,
            Self::BwBoost => 0x09,
            Self::FsLock => 0x0A,
            Self::IfadcOn => 0x0B,
            Self::EndCal => 0x0C,
            Self::Rx => 0x0D,
            Self::RxEnd => 0x0E,
            Self::RxRst => 0x0F,
            Self::TxRxSwitch => 0x10,
            Self::RxFifoOverflow => 0x11,
            Self::FsTxOn => 0x12,
            Self::Tx => 0x13,
            Self::TxEnd => 0x14,
            Self::RxTxSwitch => 0x15,
            Self::TxFifoUnderflow => 0x16,
            Self::Unknown(code) => code & 0x1F,
        }
    }

    /// Datasheet name of the state
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sleep => "SLEEP",
            Self::Idle => "IDLE",
            Self::Xoff => "XOFF",
            Self::VcoOnMc => "VCOON_MC",
            Self::RegOnMc => "REGON_MC",
            Self::Mancal => "MANCAL",
            Self::VcoOn => "VCOON",
            Self::RegOn => "REGON",
            Self::StartCal => "STARTCAL",
            Self::BwBoost => "BWBOOST",
            Self::FsLock => "FS_LOCK",
            Self::IfadcOn => "IFADCON",
            Self::EndCal => "ENDCAL",
            Self::Rx => "RX",
            Self::RxEnd => "RX_END",
            Self::RxRst => "RX_RST",
            Self::TxRxSwitch => "TXRX_SWITCH",
            Self::RxFifoOverflow => "RXFIFO_OVERFLOW",
            Self::FsTxOn => "FSTXON",
            Self::Tx => "TX",
            Self::TxEnd => "TX_END",
            Self::RxTxSwitch => "RXTX_SWITCH",
            Self::TxFifoUnderflow => "TXFIFO_UNDERFLOW",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Calibration and synthesizer start-up states the chip passes through on its own
    pub const fn is_transitional(self) -> bool {
        matches!(
            self,
            Self::VcoOnMc
                | Self::RegOnMc
                | Self::Mancal
                | Self::VcoOn
                | Self::RegOn
                | Self::StartCal
                | Self::BwBoost
                | Self::FsLock
                | Self::IfadcOn
                | Self::EndCal
                | Self::TxRxSwitch
                | Self::RxTxSwitch
        )
    }

    /// States observed after a transmit strobe that mean nothing went out correctly.
    ///
    /// SLEEP means the chip lost its configuration, the FIFO error states need a
    /// flush, and unassigned codes mean the bus itself is unreliable.
    pub const fn is_tx_failure(self) -> bool {
        matches!(
            self,
            Self::Sleep | Self::RxFifoOverflow | Self::TxFifoUnderflow | Self::Unknown(_)
        )
    }
}

impl From<u8> for MarcState {
    fn from(value: u8) -> Self {
        Self::from_bits(value)
    }
}

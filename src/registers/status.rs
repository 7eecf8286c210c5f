//! Read-only status registers (0x30-0x3D)
//!
//! These addresses double as command strobes. A status register is only read
//! when the header carries both the read and the burst bit; the device layer
//! takes care of that for every address in this range.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

use crate::MarcState;

pub const PARTNUM: u8 = 0x30;
pub const VERSION: u8 = 0x31;
pub const FREQEST: u8 = 0x32;
pub const LQI: u8 = 0x33;
pub const RSSI: u8 = 0x34;
pub const MARCSTATE: u8 = 0x35;
pub const WORTIME1: u8 = 0x36;
pub const WORTIME0: u8 = 0x37;
pub const PKTSTATUS: u8 = 0x38;
pub const VCO_VC_DAC: u8 = 0x39;
pub const TXBYTES: u8 = 0x3A;
pub const RXBYTES: u8 = 0x3B;
pub const RCCTRL1_STATUS: u8 = 0x3C;
pub const RCCTRL0_STATUS: u8 = 0x3D;

/// Value of the VERSION register on a genuine CC1101
pub const EXPECTED_VERSION: u8 = 0x14;

/// Chip part number (address: 0x30), always 0x00 for the CC1101
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct PartNumber(pub u8);

impl FromByteArray for PartNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0]))
    }
}

/// Chip version (address: 0x31)
///
/// The identity register used to confirm the bus works. A floating data line
/// reads as 0x00 or 0xFF, a bus that is clocked too fast reads as anything.
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct Version(pub u8);

impl Version {
    /// Whether this is the value a CC1101 reports
    pub fn is_expected(&self) -> bool {
        self.0 == EXPECTED_VERSION
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0]))
    }
}

/// Main radio control state machine state (address: 0x35)
#[register(0x35u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct MarcStateRegister {
    /// Decoded 5-bit state
    pub state: MarcState,
}

impl FromByteArray for MarcStateRegister {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: MarcState::from_bits(bytes[0]),
        })
    }
}

/// TX FIFO status (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct TxBytes {
    /// The FIFO ran empty while transmitting
    pub underflow: bool,
    /// Bytes still queued
    pub count: u8,
}

impl FromByteArray for TxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            underflow: bytes[0] & 0x80 != 0,
            count: bytes[0] & 0x7F,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_check() {
        assert!(Version(0x14).is_expected());
        assert!(!Version(0x00).is_expected());
        assert!(!Version(0xFF).is_expected());
    }

    #[test]
    fn tx_bytes_split() {
        let reg = TxBytes::from_bytes([0x85]).unwrap();
        assert!(reg.underflow);
        assert_eq!(reg.count, 5);
    }

    #[test]
    fn marcstate_masks_upper_bits() {
        let reg = MarcStateRegister::from_bytes([0xE1]).unwrap();
        assert_eq!(reg.state, MarcState::Idle);
    }
}

//! Configuration registers (0x00-0x2E)
//!
//! None of these survive a reset strobe: they return to their power-on defaults
//! and must be written again before the chip is usable.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::{Frequency, Modulation};

pub const IOCFG2: u8 = 0x00;
pub const IOCFG1: u8 = 0x01;
pub const IOCFG0: u8 = 0x02;
pub const FIFOTHR: u8 = 0x03;
pub const SYNC1: u8 = 0x04;
pub const SYNC0: u8 = 0x05;
pub const PKTLEN: u8 = 0x06;
pub const PKTCTRL1: u8 = 0x07;
pub const PKTCTRL0: u8 = 0x08;
pub const ADDR: u8 = 0x09;
pub const CHANNR: u8 = 0x0A;
pub const FSCTRL1: u8 = 0x0B;
pub const FSCTRL0: u8 = 0x0C;
pub const FREQ2: u8 = 0x0D;
pub const FREQ1: u8 = 0x0E;
pub const FREQ0: u8 = 0x0F;
pub const MDMCFG4: u8 = 0x10;
pub const MDMCFG3: u8 = 0x11;
pub const MDMCFG2: u8 = 0x12;
pub const MDMCFG1: u8 = 0x13;
pub const MDMCFG0: u8 = 0x14;
pub const DEVIATN: u8 = 0x15;
pub const MCSM2: u8 = 0x16;
pub const MCSM1: u8 = 0x17;
pub const MCSM0: u8 = 0x18;
pub const FOCCFG: u8 = 0x19;
pub const BSCFG: u8 = 0x1A;
pub const AGCCTRL2: u8 = 0x1B;
pub const AGCCTRL1: u8 = 0x1C;
pub const AGCCTRL0: u8 = 0x1D;
pub const WOREVT1: u8 = 0x1E;
pub const WOREVT0: u8 = 0x1F;
pub const WORCTRL: u8 = 0x20;
pub const FREND1: u8 = 0x21;
pub const FREND0: u8 = 0x22;
pub const FSCAL3: u8 = 0x23;
pub const FSCAL2: u8 = 0x24;
pub const FSCAL1: u8 = 0x25;
pub const FSCAL0: u8 = 0x26;
pub const RCCTRL1: u8 = 0x27;
pub const RCCTRL0: u8 = 0x28;
pub const FSTEST: u8 = 0x29;
pub const PTEST: u8 = 0x2A;
pub const AGCTEST: u8 = 0x2B;
pub const TEST2: u8 = 0x2C;
pub const TEST1: u8 = 0x2D;
pub const TEST0: u8 = 0x2E;

/// Synthesizer, modem and front-end settings loaded by `configure`, in write order.
///
/// Frequency, modulation (MDMCFG2), GDO0 and PATABLE are not part of this table;
/// they follow it, with MDMCFG2 always written after the frequency.
pub const CALIBRATION_PROFILE: [(u8, u8); 15] = [
    (FSCTRL1, 0x06),
    (MDMCFG4, 0xF5),
    (MDMCFG3, 0x83),
    (DEVIATN, 0x34),
    (MCSM0, 0x16),
    (FOCCFG, 0x1D),
    (AGCCTRL1, 0xC7),
    (AGCCTRL0, 0x00),
    (WOREVT1, 0xB0),
    (FREND1, 0xB6),
    (FREND0, 0x10),
    (FSCAL3, 0xEA),
    (FSCAL2, 0x2A),
    (FSCAL1, 0x00),
    (FSCAL0, 0x1F),
];

/// GDO0 output pin configuration (address: 0x02)
///
/// Selects which internal signal drives GDO0. The driver uses signal 0x06:
/// asserted when a sync word has been sent, de-asserted at the end of the packet,
/// which makes GDO0 a cheap "on air" indicator after a transmit strobe.
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Iocfg0 {
    /// Invert the output (active low)
    pub invert: bool,
    /// Signal selection, 6 bits
    pub signal: u8,
}

impl Iocfg0 {
    /// Sync word sent/received until end of packet
    pub const SYNC_WORD: u8 = 0x06;
}

impl Default for Iocfg0 {
    fn default() -> Self {
        Self {
            invert: false,
            signal: Self::SYNC_WORD,
        }
    }
}

impl FromByteArray for Iocfg0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            invert: bytes[0] & 0x40 != 0,
            signal: bytes[0] & 0x3F,
        })
    }
}

impl ToByteArray for Iocfg0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(if self.invert { 0x40 } else { 0x00 }) | (self.signal & 0x3F)])
    }
}

/// Frequency control word (addresses: 0x0D-0x0F)
///
/// 24-bit value spread over FREQ2 (high), FREQ1 and FREQ0 (low). The carrier is
/// `word * f_xosc / 2^16`. Accessed as three consecutive single-register
/// transfers.
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct FrequencyWord {
    /// Raw control word, low 24 bits
    pub word: u32,
}

impl From<Frequency> for FrequencyWord {
    fn from(frequency: Frequency) -> Self {
        Self {
            word: frequency.to_register_word(),
        }
    }
}

impl From<FrequencyWord> for Frequency {
    fn from(value: FrequencyWord) -> Self {
        Frequency::from_register_word(value.word)
    }
}

impl FromByteArray for FrequencyWord {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            word: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for FrequencyWord {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [_, high, mid, low] = self.word.to_be_bytes();
        Ok([high, mid, low])
    }
}

/// Modem configuration 2 (address: 0x12)
///
/// Holds the modulation format together with the sync-word mode.
///
/// # Important Notes
/// - Must be written after the frequency and calibration registers
/// - The driver always disables sync words: replayed codes carry their own framing
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Mdmcfg2 {
    /// Disable the digital DC blocking filter
    pub dc_filter_off: bool,
    /// Modulation format, 3 bits
    pub mod_format: u8,
    /// Manchester encoding
    pub manchester: bool,
    /// Sync word qualifier mode, 3 bits
    pub sync_mode: u8,
}

impl Mdmcfg2 {
    /// Modulation selected by `mod_format`, if it is one the driver uses
    pub fn modulation(&self) -> Option<Modulation> {
        [Modulation::AskOok, Modulation::TwoFsk]
            .into_iter()
            .find(|m| (m.mdmcfg2() >> 4) & 0x07 == self.mod_format)
    }
}

impl From<Modulation> for Mdmcfg2 {
    fn from(modulation: Modulation) -> Self {
        Self::from_bytes([modulation.mdmcfg2()]).unwrap_or_else(|never| match never {})
    }
}

impl FromByteArray for Mdmcfg2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dc_filter_off: bytes[0] & 0x80 != 0,
            mod_format: (bytes[0] >> 4) & 0x07,
            manchester: bytes[0] & 0x08 != 0,
            sync_mode: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for Mdmcfg2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(if self.dc_filter_off { 0x80 } else { 0x00 })
            | (self.mod_format & 0x07) << 4
            | (if self.manchester { 0x08 } else { 0x00 })
            | (self.sync_mode & 0x07)])
    }
}

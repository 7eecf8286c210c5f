//! Register map of the CC1101
//! Taken from the CC1101 datasheet (SWRS061), table 41 "SPI Address Space"
//!
//! Every transfer starts with a header byte: bit 7 selects read, bit 6 selects
//! burst access and bits 5:0 carry the address.
//!
//! - `0x00..=0x2E` configuration registers, read/write
//! - `0x30..=0x3D` command strobes when written without the burst bit,
//!   read-only status registers when read with read and burst bits set
//! - `0x3E` PATABLE, `0x3F` TX FIFO (write) / RX FIFO (read)

mod config;
mod status;

pub use config::*;
pub use status::*;

use bitflags::bitflags;

bitflags! {
    /// Access flags OR-ed into the header byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        /// Read instead of write
        const READ = 0x80;
        /// Burst access: the address is followed by a stream of data bytes
        const BURST = 0x40;
    }
}

/// Power amplifier table (8 bytes, burst access)
pub const PATABLE: u8 = 0x3E;

/// TX FIFO when written, RX FIFO when read
pub const FIFO: u8 = 0x3F;

/// Depth of both FIFOs in bytes
pub const FIFO_SIZE: usize = 64;

/// Builds the header byte for an access to `address`.
pub const fn header(address: u8, access: Access) -> u8 {
    (address & 0x3F) | access.bits()
}

/// Status registers share their addresses with the command strobes
/// and are only reachable with both the read and burst bits set.
pub const fn is_status_register(address: u8) -> bool {
    address >= 0x30 && address <= 0x3D
}

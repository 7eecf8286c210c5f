//! Chip commands and status decoding
//!
//! # Command Categories
//! - [`strobe`]: single-byte command strobes (reset, idle, flush, transmit, ...)
//!   - Each is a [`regiface::Command`] answered by a [`StatusByte`]
//!
//! - [`status`]: decoding of the status byte and of the MARCSTATE register
//!   - Pure functions, no bus access
//!
//! # Common Patterns
//! 1. Strobe SIDLE and wait for the chip to settle
//! 2. Strobe SFTX before loading new TX data
//! 3. Strobe STX, wait, then read MARCSTATE to see where the chip ended up
//!
//! # Important Notes
//! - The chip has no interrupt usable without extra wiring; state must be polled
//! - A status byte with CHIP_RDYn set means the crystal is not running yet

pub mod status;
pub mod strobe;

pub use status::*;
pub use strobe::*;

#![cfg_attr(not(any(test, feature = "std")), no_std)]
//! CC1101 Radio Driver
//!
//! This crate drives the Texas Instruments CC1101 sub-GHz transceiver over a
//! bit-banged serial bus built from plain GPIO lines, to configure it and replay
//! captured RF codes.
//!
//! # Features
//! - Frequency bands: 300-348, 387-464 and 779-928 MHz
//! - Modulation: ASK/OOK and 2-FSK
//! - Output power: 8 steps through the PATABLE
//! - 64-byte TX FIFO loaded in a single burst
//! - Transmission verified by polling MARCSTATE, with retry through a full
//!   reset and reconfiguration
//!
//! # Architecture
//! The driver is organized into several layers:
//!
//! - [`bus`]: the [`Transport`] trait and [`BitBangBus`], which clocks bytes MSB
//!   first over clock/data-out/data-in/select lines with a tunable half-cycle delay
//!
//! - [`device`]: register protocol on top of a transport
//!   - Single and burst register access, command strobes
//!   - Every access is traced and reported to an [`Observer`]
//!
//! - [`registers`]: address map, calibration profile and typed registers
//!
//! - [`commands`]: command strobes and status decoding
//!   - [`commands::strobe`]: SRES, SIDLE, SFTX, STX, ...
//!   - [`commands::status`]: [`StatusByte`] and [`MarcState`]
//!
//! - [`controller`]: [`RadioController`], reset/verify/configure lifecycle
//!
//! - [`transmit`]: the transmit pipeline on [`RadioController`], returning a [`TxOutcome`]
//!
//! - [`config`]: [`RadioConfig`] and [`Timing`], the knobs that vary between setups
//!
//! - [`payload`]: hex and bit-string decoding into FIFO-sized payloads
//!
//! # Usage
//! The driver uses the `regiface` crate for typed register access and command
//! execution. The main entry point is [`RadioController`], which owns the six
//! lines of one chip.
//!
//! Bring-up follows a fixed sequence:
//!
//! 1. Bind the pins with [`RadioController::from_pins`]
//! 2. [`reset`](RadioController::reset) the chip
//! 3. Check the VERSION register with [`verify_communication`](RadioController::verify_communication)
//! 4. [`configure`](RadioController::configure) frequency, modulation and power
//! 5. [`send`](RadioController::send) payloads
//!
//! Steps 2-4 are bundled as [`RadioController::init`].
//!
//! # Important Notes
//! - A too short half-cycle delay corrupts transfers silently; the bus has no CRC
//! - Status registers share addresses with strobes and are read with the burst bit set
//! - Every reset wipes the configuration; a retry re-applies the last [`RadioConfig`]
//! - One controller per chip; nothing prevents two owners of the same pins
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}};
//! use cc1101_bitbang::{payload, Error, Pins, RadioConfig, RadioController, Timing};
//!
//! fn replay<O: OutputPin, I: InputPin, D: DelayNs>(
//!     pins: Pins<O, O, I, O, I, I>,
//!     delay: D,
//! ) -> Result<(), Error> {
//!     let mut radio = RadioController::from_pins(pins, delay, Timing::SLOW)?;
//!     radio.init(RadioConfig::default())?;
//!
//!     let code = payload::decode_hex("8E8E888EEEEEEE8E8EEE888E").unwrap_or_default();
//!     for _ in 0..5 {
//!         let outcome = radio.send(&code)?;
//!         if !outcome.is_success() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#[macro_use]
mod fmt;

use regiface::*;

pub mod bus;
pub mod commands;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod payload;
pub mod registers;
pub mod transmit;

pub use bus::{BitBangBus, Pins, StatusLine, Transport};
pub use commands::*;
pub use config::{Frequency, Modulation, PowerLevel, RadioConfig, Timing, PA_TABLE};
pub use controller::{ControllerState, RadioController};
pub use device::{BusEvent, Device, NoObserver, Observer, Operation};
pub use error::{Error, Precondition};
pub use payload::{Payload, PayloadError};
pub use registers::{FrequencyWord, Iocfg0, MarcStateRegister, Mdmcfg2, PartNumber, TxBytes, Version};
pub use transmit::TxOutcome;

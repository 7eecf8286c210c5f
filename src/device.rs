//! CC1101 register protocol
//!
//! This module turns byte transfers into the chip's addressing convention:
//! single and burst access, read and write, command strobes. It is built around
//! [`Device<T, O>`], which wraps a [`Transport`] and provides methods for:
//! - Reading and writing single registers, raw or typed
//! - Streaming bytes into the TX FIFO and PATABLE with burst access
//! - Executing command strobes and decoding the returned status byte
//!
//! Every access is logged at trace level and reported to an [`Observer`], which
//! lets an operator validating wiring or timing see exactly what went over the bus.
//!
//! # Example
//! ```no_run
//! # use cc1101_bitbang::{Device, Transport, Error, registers, EnterIdle};
//! fn check<T: Transport>(transport: T) -> Result<(), Error> {
//!     let mut device = Device::new(transport);
//!     let status = device.strobe(EnterIdle)?;
//!     let version = device.read(registers::VERSION)?;
//!     device.write(registers::IOCFG0, 0x06)?;
//!     Ok(())
//! }
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, Command, NoParameters, ReadableRegister, WritableRegister};

use crate::{
    registers::{self, Access},
    Error, StatusByte, Transport,
};

/// Kind of bus access reported to an [`Observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Single register write
    Write,
    /// Single register read
    Read,
    /// Command strobe
    Strobe,
    /// Burst write (TX FIFO, PATABLE)
    WriteBurst,
    /// Burst read (RX FIFO, PATABLE)
    ReadBurst,
}

/// One completed bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusEvent<'a> {
    /// What kind of access this was
    pub operation: Operation,
    /// Register, strobe or FIFO address, without access flags
    pub address: u8,
    /// Bytes written or read; empty for strobes
    pub data: &'a [u8],
    /// Status returned by the chip, for strobes
    pub status: Option<StatusByte>,
}

/// Receives every bus access made through a [`Device`].
///
/// Any `FnMut(&BusEvent)` closure is an observer.
pub trait Observer {
    /// Called once per access, after chip-select is released
    fn observe(&mut self, event: &BusEvent<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&BusEvent<'_>),
{
    fn observe(&mut self, event: &BusEvent<'_>) {
        self(event)
    }
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl Observer for NoObserver {
    fn observe(&mut self, _event: &BusEvent<'_>) {}
}

/// Register-level interface to the CC1101.
pub struct Device<T, O = NoObserver> {
    transport: T,
    observer: O,
}

impl<T> Device<T> {
    /// Creates a new Device instance wrapping the provided transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            observer: NoObserver,
        }
    }
}

impl<T, O> Device<T, O> {
    /// Replaces the observer that receives every bus access.
    pub fn with_observer<O2: Observer>(self, observer: O2) -> Device<T, O2> {
        Device {
            transport: self.transport,
            observer,
        }
    }

    /// Direct access to the transport, for sequences outside the register
    /// protocol such as the power-on-reset pulse.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Releases the underlying transport.
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T, O> Device<T, O>
where
    T: Transport,
    O: Observer,
{
    /// Writes one configuration register.
    ///
    /// select, address, value, deselect.
    ///
    /// # Arguments
    /// * `address` - Register address, 0x00-0x2E
    /// * `value` - Byte to store
    ///
    /// # Errors
    /// * `Error::Pin` - a bus line could not be driven
    pub fn write(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.transport.select()?;
        self.transport
            .write_byte(registers::header(address, Access::empty()))?;
        self.transport.write_byte(value)?;
        self.transport.deselect()?;

        trace!("write 0x{:02x} <- 0x{:02x}", address, value);
        self.observer.observe(&BusEvent {
            operation: Operation::Write,
            address,
            data: &[value],
            status: None,
        });
        Ok(())
    }

    /// Reads one register.
    ///
    /// Status registers (0x30-0x3D) are addressed with the burst bit as well,
    /// otherwise the chip would execute the strobe sharing their address.
    ///
    /// # Arguments
    /// * `address` - Register address, without access flags
    ///
    /// # Errors
    /// * `Error::Pin` - a bus line could not be driven or sampled
    pub fn read(&mut self, address: u8) -> Result<u8, Error> {
        let access = if registers::is_status_register(address) {
            Access::READ | Access::BURST
        } else {
            Access::READ
        };

        self.transport.select()?;
        self.transport
            .write_byte(registers::header(address, access))?;
        let value = self.transport.read_byte()?;
        self.transport.deselect()?;

        trace!("read 0x{:02x} -> 0x{:02x}", address, value);
        self.observer.observe(&BusEvent {
            operation: Operation::Read,
            address,
            data: &[value],
            status: None,
        });
        Ok(value)
    }

    /// Executes a command strobe and returns the status byte the chip answers with.
    ///
    /// # Errors
    /// * `Error::Pin` - a bus line could not be driven or sampled
    pub fn strobe<C>(&mut self, _command: C) -> Result<StatusByte, Error>
    where
        C: Command<IdType = u8, CommandParameters = NoParameters, ResponseParameters = StatusByte>,
    {
        let id = C::id();

        self.transport.select()?;
        self.transport.write_byte(registers::header(id, Access::empty()))?;
        let status = StatusByte::decode(self.transport.read_byte()?);
        self.transport.deselect()?;

        trace!(
            "strobe 0x{:02x} -> status 0x{:02x} ({:?})",
            id,
            status.raw,
            status.state
        );
        self.observer.observe(&BusEvent {
            operation: Operation::Strobe,
            address: id,
            data: &[],
            status: Some(status),
        });
        Ok(status)
    }

    /// Streams `bytes` to consecutive locations starting at `address`.
    ///
    /// Used for the TX FIFO and the PATABLE. An empty slice still sends the header.
    ///
    /// # Arguments
    /// * `address` - First address, usually [`registers::FIFO`] or [`registers::PATABLE`]
    /// * `bytes` - Data to stream, in order
    ///
    /// # Errors
    /// * `Error::Pin` - a bus line could not be driven
    pub fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.transport.select()?;
        self.transport
            .write_byte(registers::header(address, Access::BURST))?;
        for &byte in bytes {
            self.transport.write_byte(byte)?;
        }
        self.transport.deselect()?;

        trace!("burst write 0x{:02x} <- {} bytes", address, bytes.len());
        self.observer.observe(&BusEvent {
            operation: Operation::WriteBurst,
            address,
            data: bytes,
            status: None,
        });
        Ok(())
    }

    /// Fills `buffer` from consecutive locations starting at `address`.
    pub fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.transport.select()?;
        self.transport
            .write_byte(registers::header(address, Access::READ | Access::BURST))?;
        for byte in buffer.iter_mut() {
            *byte = self.transport.read_byte()?;
        }
        self.transport.deselect()?;

        trace!("burst read 0x{:02x} -> {} bytes", address, buffer.len());
        self.observer.observe(&BusEvent {
            operation: Operation::ReadBurst,
            address,
            data: buffer,
            status: None,
        });
        Ok(())
    }

    /// Reads a typed register.
    ///
    /// Multi-byte registers are read as consecutive single-register accesses,
    /// most significant address first.
    ///
    /// # Errors
    /// * `Error::Pin` - a bus line could not be driven or sampled
    /// * `Error::Deserialization` - failed to parse the register value
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        for (offset, byte) in raw_value.as_mut().iter_mut().enumerate() {
            *byte = self.read(R::id() + offset as u8)?;
        }

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a typed register, one single-register access per byte.
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = register.to_bytes().unwrap_or_else(|never| match never {});
        for (offset, &byte) in raw_value.as_ref().iter().enumerate() {
            self.write(R::id() + offset as u8, byte)?;
        }
        Ok(())
    }

    /// Writes the reset strobe without clocking in a status byte.
    ///
    /// The chip restarts while the byte is in flight, so whatever it would
    /// return is meaningless.
    pub(crate) fn reset_strobe(&mut self) -> Result<(), Error> {
        use crate::ResetChip;

        let id = ResetChip::id();
        self.transport.select()?;
        self.transport.write_byte(id)?;
        self.transport.deselect()?;

        trace!("strobe 0x{:02x} (reset)", id);
        self.observer.observe(&BusEvent {
            operation: Operation::Strobe,
            address: id,
            data: &[],
            status: None,
        });
        Ok(())
    }
}

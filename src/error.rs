//! Driver error types
//!
//! Bus-level bit corruption cannot be detected by the chip's protocol, so it never
//! shows up here directly. It surfaces either as a [`Error::Communication`] failure
//! during bring-up or as a failed transmission outcome from the transmit pipeline.

use core::fmt;

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Driving or sampling one of the digital lines failed
    Pin,
    /// The identity register did not hold the expected constant after reset.
    ///
    /// Usually points at wiring, power or bus timing. Retrying with a slower
    /// [`Timing`](crate::Timing) profile is the common remedy.
    Communication {
        /// Value actually read from the VERSION register
        version: u8,
    },
    /// An operation was called out of order, or with an argument the chip cannot take
    Precondition(Precondition),
    /// A typed register value could not be decoded
    Deserialization,
}

/// Programmer errors: operations invoked in a state that does not allow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Precondition {
    /// `configure` was called before the chip was ever reset
    NotReset,
    /// A transmission or re-initialization was requested before `configure`
    NotConfigured,
    /// The payload does not fit in the transmit FIFO
    PayloadTooLong {
        /// Length of the rejected payload
        len: usize,
    },
}

impl From<Precondition> for Error {
    fn from(value: Precondition) -> Self {
        Self::Precondition(value)
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReset => write!(f, "radio must be reset before it is configured"),
            Self::NotConfigured => write!(f, "radio must be configured before transmitting"),
            Self::PayloadTooLong { len } => write!(
                f,
                "payload of {} bytes exceeds the {}-byte TX FIFO",
                len,
                crate::registers::FIFO_SIZE
            ),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin => write!(f, "GPIO error"),
            Self::Communication { version } => write!(
                f,
                "unexpected VERSION 0x{:02X} (expected 0x{:02X})",
                version,
                crate::registers::EXPECTED_VERSION
            ),
            Self::Precondition(p) => write!(f, "precondition violated: {}", p),
            Self::Deserialization => write!(f, "register value could not be decoded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

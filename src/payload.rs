//! Payload decoding
//!
//! Captured codes reach the driver as text: hex strings written by the decoders,
//! or raw bit strings read off a capture. Both decode into a [`Payload`], which
//! is bounded by the TX FIFO so anything that decodes can be sent in one burst.
//!
//! With the `std` feature, the per-decoder `latest_<kind>.txt` files can be read
//! and written directly.

use core::fmt;

use heapless::Vec;

use crate::registers::FIFO_SIZE;

/// Bytes ready for the TX FIFO
pub type Payload = Vec<u8, FIFO_SIZE>;

/// Why a payload string could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Hex input with an odd number of digits
    OddLength,
    /// Character that is not a digit of the expected base
    InvalidDigit {
        /// Position in the input after trimming and prefix removal
        index: usize,
        /// The offending byte
        byte: u8,
    },
    /// Decoded payload would not fit in the TX FIFO
    TooLong,
    /// Reading or writing a payload file failed
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddLength => write!(f, "hex payload has an odd number of digits"),
            Self::InvalidDigit { index, byte } => {
                write!(f, "invalid digit 0x{:02X} at position {}", byte, index)
            }
            Self::TooLong => write!(f, "payload exceeds the {}-byte TX FIFO", FIFO_SIZE),
            #[cfg(feature = "std")]
            Self::Io(kind) => write!(f, "payload file: {}", kind),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for PayloadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.kind())
    }
}

/// Decodes a hex string such as `"0x8E8E88"`.
///
/// Surrounding whitespace and a leading `0x`/`0X` are ignored, digits may be of
/// either case. An empty string decodes to an empty payload.
pub fn decode_hex(input: &str) -> Result<Payload, PayloadError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .as_bytes();

    if digits.len() % 2 != 0 {
        return Err(PayloadError::OddLength);
    }
    if digits.len() / 2 > FIFO_SIZE {
        return Err(PayloadError::TooLong);
    }

    let mut payload = Payload::new();
    for (pair, chunk) in digits.chunks(2).enumerate() {
        let high = hex_value(chunk[0], pair * 2)?;
        let low = hex_value(chunk[1], pair * 2 + 1)?;
        payload
            .push(high << 4 | low)
            .map_err(|_| PayloadError::TooLong)?;
    }
    Ok(payload)
}

/// Decodes a string of `0`/`1` characters, most significant bit first.
///
/// Whitespace anywhere in the input is skipped. A bit count that is not a
/// multiple of eight is padded with leading zeros, so `"1000111"` becomes `[0x47]`.
pub fn decode_bits(input: &str) -> Result<Payload, PayloadError> {
    let mut bit_count = 0;
    for (index, byte) in input.bytes().enumerate() {
        match byte {
            b'0' | b'1' => bit_count += 1,
            b if b.is_ascii_whitespace() => {}
            _ => return Err(PayloadError::InvalidDigit { index, byte }),
        }
    }

    let padding = (8 - bit_count % 8) % 8;
    if (bit_count + padding) / 8 > FIFO_SIZE {
        return Err(PayloadError::TooLong);
    }

    let mut payload = Payload::new();
    let mut acc = 0u8;
    let mut filled = padding;
    for byte in input.bytes().filter(|b| !b.is_ascii_whitespace()) {
        acc = acc << 1 | (byte - b'0');
        filled += 1;
        if filled == 8 {
            payload.push(acc).map_err(|_| PayloadError::TooLong)?;
            acc = 0;
            filled = 0;
        }
    }
    Ok(payload)
}

fn hex_value(byte: u8, index: usize) -> Result<u8, PayloadError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(PayloadError::InvalidDigit { index, byte }),
    }
}

#[cfg(feature = "std")]
pub use files::*;

#[cfg(feature = "std")]
mod files {
    use std::{
        fmt::Write as _,
        fs::{self, OpenOptions},
        io::Write as _,
        path::{Path, PathBuf},
    };

    use super::{decode_hex, Payload, PayloadError};
    use crate::Modulation;

    /// Decoders that leave a `latest_<kind>.txt` file behind
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DecoderKind {
        KeeLoq,
        Ook,
        Fsk,
        Generic,
    }

    impl DecoderKind {
        /// Maps a decoder name, case-insensitively. Unrecognized names are `Generic`.
        pub fn from_name(name: &str) -> Self {
            match name.trim().to_ascii_lowercase().as_str() {
                "keeloq" => Self::KeeLoq,
                "ook" => Self::Ook,
                "fsk" => Self::Fsk,
                _ => Self::Generic,
            }
        }

        /// Lowercase name used in file names
        pub fn name(self) -> &'static str {
            match self {
                Self::KeeLoq => "keeloq",
                Self::Ook => "ook",
                Self::Fsk => "fsk",
                Self::Generic => "generic",
            }
        }

        /// `latest_<kind>.txt`
        pub fn file_name(self) -> String {
            format!("latest_{}.txt", self.name())
        }

        /// `<kind>_decoded.txt`, every payload this decoder produced
        pub fn log_file_name(self) -> String {
            format!("{}_decoded.txt", self.name())
        }

        /// Modulation the code was captured with
        pub fn modulation(self) -> Modulation {
            match self {
                Self::Fsk => Modulation::TwoFsk,
                _ => Modulation::AskOok,
            }
        }
    }

    /// Reads a file holding one hex payload.
    pub fn load_hex_file(path: impl AsRef<Path>) -> Result<Payload, PayloadError> {
        let text = fs::read_to_string(path)?;
        decode_hex(&text)
    }

    /// Reads the most recent payload stored by `kind`'s decoder in `dir`.
    pub fn load_latest(dir: impl AsRef<Path>, kind: DecoderKind) -> Result<Payload, PayloadError> {
        load_hex_file(dir.as_ref().join(kind.file_name()))
    }

    /// Running log of every decode, whatever the decoder
    pub const ALL_DECODES_FILE: &str = "decoded_bits.txt";

    /// Overwrites `kind`'s latest file in `dir` with `payload`.
    ///
    /// Written as lowercase hex, left-padded with zeros to at least 16 digits.
    /// The padding is kept when the file is read back, so a payload shorter than
    /// eight bytes loads with leading zero bytes: `[0x12, 0xAB]` comes back as
    /// `[0, 0, 0, 0, 0, 0, 0x12, 0xAB]`.
    pub fn store_latest(
        dir: impl AsRef<Path>,
        kind: DecoderKind,
        payload: &[u8],
    ) -> Result<PathBuf, PayloadError> {
        let path = dir.as_ref().join(kind.file_name());
        fs::write(&path, padded_hex(payload))?;
        Ok(path)
    }

    /// Appends `payload` as one line to both [`ALL_DECODES_FILE`] and `kind`'s
    /// `<kind>_decoded.txt` in `dir`, creating them as needed.
    ///
    /// Lines use the same padded hex as [`store_latest`].
    pub fn append_log(
        dir: impl AsRef<Path>,
        kind: DecoderKind,
        payload: &[u8],
    ) -> Result<(), PayloadError> {
        let line = padded_hex(payload) + "\n";
        for name in [ALL_DECODES_FILE.to_string(), kind.log_file_name()] {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.as_ref().join(name))?;
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    fn padded_hex(payload: &[u8]) -> String {
        let mut hex = String::with_capacity(payload.len() * 2);
        for byte in payload {
            let _ = write!(hex, "{:02x}", byte);
        }
        format!("{:0>16}", hex)
    }
}

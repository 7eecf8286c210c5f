//! Command strobes
//!
//! A strobe is a single header byte in the 0x30-0x3D range written without the
//! burst bit. The chip acts on it immediately and answers with a
//! [`StatusByte`], so every strobe doubles as a status poll.
//!
//! # Important Notes
//! - The chip reports the status *before* acting on the strobe
//! - SRES makes every configuration register revert to its default
//! - SFTX/SFRX are only accepted in IDLE or in the matching FIFO error state

use crate::{Command, NoParameters, StatusByte};

macro_rules! strobes {
    ($($(#[$meta:meta])* $name:ident = $id:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl Command for $name {
                type IdType = u8;
                type CommandParameters = NoParameters;
                type ResponseParameters = StatusByte;

                fn id() -> Self::IdType {
                    $id
                }

                fn invoking_parameters(self) -> Self::CommandParameters {
                    NoParameters::default()
                }
            }
        )*
    };
}

strobes! {
    /// SRES (0x30): reset the chip
    ResetChip = 0x30;
    /// SFSTXON (0x31): enable and calibrate the frequency synthesizer
    EnableSynthesizer = 0x31;
    /// SXOFF (0x32): turn off the crystal oscillator
    CrystalOff = 0x32;
    /// SCAL (0x33): calibrate the frequency synthesizer and turn it off
    Calibrate = 0x33;
    /// SRX (0x34): enable RX
    EnterRx = 0x34;
    /// STX (0x35): enable TX and start sending the FIFO contents
    EnterTx = 0x35;
    /// SIDLE (0x36): exit RX/TX and turn off the frequency synthesizer
    EnterIdle = 0x36;
    /// SAFC (0x37): perform AFC adjustment of the frequency synthesizer
    AdjustFrequency = 0x37;
    /// SWOR (0x38): start automatic RX polling (wake-on-radio)
    WakeOnRadio = 0x38;
    /// SPWD (0x39): enter power down mode when chip-select goes high
    PowerDown = 0x39;
    /// SFRX (0x3A): flush the RX FIFO
    FlushRx = 0x3A;
    /// SFTX (0x3B): flush the TX FIFO
    FlushTx = 0x3B;
    /// SWORRST (0x3C): reset the wake-on-radio timer
    ResetWorTimer = 0x3C;
    /// SNOP (0x3D): no operation, returns the status byte
    NoOperation = 0x3D;
}

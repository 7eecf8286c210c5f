//! Bit-banged serial bus
//!
//! The CC1101 speaks SPI mode 0: data is sampled by the chip on the rising clock
//! edge and shifted out on the falling edge, MSB first. [`BitBangBus`] reproduces
//! that with plain GPIO lines and a fixed settle delay at every half-cycle.
//!
//! The bus carries no protocol knowledge and no error detection: a transfer that
//! violates the chip's setup/hold times simply yields a wrong byte. The layers
//! above deal with that by verification and retry.
//!
//! Everything above this module talks to the chip through the [`Transport`]
//! trait, so a simulated chip can stand in for the real wiring.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin, PinState},
};

use crate::{Error, Timing};

/// One of the two general purpose status outputs of the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLine {
    /// GDO0, configured by the driver to assert while a packet is on air
    Gdo0,
    /// GDO2, left at its power-on function
    Gdo2,
}

/// Byte-level access to the chip.
///
/// Chip-select framing is the caller's job: a logical transaction is
/// `select`, any number of byte transfers, `deselect`.
pub trait Transport {
    /// Asserts chip-select (drives it low)
    fn select(&mut self) -> Result<(), Error>;

    /// Releases chip-select (drives it high)
    fn deselect(&mut self) -> Result<(), Error>;

    /// Clocks one byte out to the chip, MSB first
    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// Clocks one byte in from the chip, MSB first
    fn read_byte(&mut self) -> Result<u8, Error>;

    /// Samples one of the status lines; `true` when high
    fn status_line(&mut self, line: StatusLine) -> Result<bool, Error>;

    /// Blocks for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn select(&mut self) -> Result<(), Error> {
        T::select(self)
    }

    fn deselect(&mut self) -> Result<(), Error> {
        T::deselect(self)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        T::write_byte(self, byte)
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        T::read_byte(self)
    }

    fn status_line(&mut self, line: StatusLine) -> Result<bool, Error> {
        T::status_line(self, line)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

/// The six lines wired between host and chip.
pub struct Pins<SCK, MOSI, MISO, CS, GDO0, GDO2> {
    /// Serial clock (SCLK), output
    pub clock: SCK,
    /// Host to chip data (SI), output
    pub data_out: MOSI,
    /// Chip to host data (SO), input
    pub data_in: MISO,
    /// Chip select (CSn), output, active low
    pub select: CS,
    /// GDO0 status line, input
    pub gdo0: GDO0,
    /// GDO2 status line, input
    pub gdo2: GDO2,
}

/// Software serial bus over six GPIO lines.
pub struct BitBangBus<SCK, MOSI, MISO, CS, GDO0, GDO2, D> {
    pins: Pins<SCK, MOSI, MISO, CS, GDO0, GDO2>,
    delay: D,
    half_cycle_us: u32,
    select_setup_us: u32,
}

impl<SCK, MOSI, MISO, CS, GDO0, GDO2, D> BitBangBus<SCK, MOSI, MISO, CS, GDO0, GDO2, D>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    GDO0: InputPin,
    GDO2: InputPin,
    D: DelayNs,
{
    /// Takes ownership of the lines and drives them to their idle levels:
    /// clock low, data low, chip-select high.
    pub fn new(
        mut pins: Pins<SCK, MOSI, MISO, CS, GDO0, GDO2>,
        delay: D,
        timing: &Timing,
    ) -> Result<Self, Error> {
        pins.clock.set_low().map_err(|_| Error::Pin)?;
        pins.data_out.set_low().map_err(|_| Error::Pin)?;
        pins.select.set_high().map_err(|_| Error::Pin)?;

        Ok(Self {
            pins,
            delay,
            half_cycle_us: timing.half_cycle_us,
            select_setup_us: timing.select_setup_us,
        })
    }

    /// Stops driving the lines and hands them back.
    pub fn release(self) -> (Pins<SCK, MOSI, MISO, CS, GDO0, GDO2>, D) {
        (self.pins, self.delay)
    }
}

impl<SCK, MOSI, MISO, CS, GDO0, GDO2, D> Transport
    for BitBangBus<SCK, MOSI, MISO, CS, GDO0, GDO2, D>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    GDO0: InputPin,
    GDO2: InputPin,
    D: DelayNs,
{
    fn select(&mut self) -> Result<(), Error> {
        self.pins.select.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_us(self.select_setup_us);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Error> {
        self.delay.delay_us(self.select_setup_us);
        self.pins.select.set_high().map_err(|_| Error::Pin)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        for bit in (0..8).rev() {
            self.pins.clock.set_low().map_err(|_| Error::Pin)?;
            self.pins
                .data_out
                .set_state(PinState::from(byte & (1 << bit) != 0))
                .map_err(|_| Error::Pin)?;
            self.delay.delay_us(self.half_cycle_us);
            self.pins.clock.set_high().map_err(|_| Error::Pin)?;
            self.delay.delay_us(self.half_cycle_us);
        }
        // The falling edge makes the chip shift out its first response bit.
        self.pins.clock.set_low().map_err(|_| Error::Pin)
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut value = 0u8;
        for bit in (0..8).rev() {
            self.pins.clock.set_low().map_err(|_| Error::Pin)?;
            self.delay.delay_us(self.half_cycle_us);
            if self.pins.data_in.is_high().map_err(|_| Error::Pin)? {
                value |= 1 << bit;
            }
            self.pins.clock.set_high().map_err(|_| Error::Pin)?;
            self.delay.delay_us(self.half_cycle_us);
        }
        self.pins.clock.set_low().map_err(|_| Error::Pin)?;
        Ok(value)
    }

    fn status_line(&mut self, line: StatusLine) -> Result<bool, Error> {
        match line {
            StatusLine::Gdo0 => self.pins.gdo0.is_high().map_err(|_| Error::Pin),
            StatusLine::Gdo2 => self.pins.gdo2.is_high().map_err(|_| Error::Pin),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
    use std::vec::Vec;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type MockBus = BitBangBus<PinMock, PinMock, PinMock, PinMock, PinMock, PinMock, NoDelay>;

    fn level(high: bool) -> State {
        if high {
            State::High
        } else {
            State::Low
        }
    }

    /// Clock activity for one byte: low/high per bit, then back to idle low.
    fn clock_byte() -> Vec<Transaction> {
        let mut t = Vec::new();
        for _ in 0..8 {
            t.push(Transaction::set(State::Low));
            t.push(Transaction::set(State::High));
        }
        t.push(Transaction::set(State::Low));
        t
    }

    fn bus(
        clock: &[Transaction],
        data_out: &[Transaction],
        data_in: &[Transaction],
        select: &[Transaction],
        gdo0: &[Transaction],
    ) -> MockBus {
        let mut clock_t = vec![Transaction::set(State::Low)];
        clock_t.extend_from_slice(clock);
        let mut data_out_t = vec![Transaction::set(State::Low)];
        data_out_t.extend_from_slice(data_out);
        let mut select_t = vec![Transaction::set(State::High)];
        select_t.extend_from_slice(select);

        let pins = Pins {
            clock: PinMock::new(&clock_t),
            data_out: PinMock::new(&data_out_t),
            data_in: PinMock::new(data_in),
            select: PinMock::new(&select_t),
            gdo0: PinMock::new(gdo0),
            gdo2: PinMock::new(&[]),
        };
        BitBangBus::new(pins, NoDelay, &Timing::FAST).unwrap()
    }

    fn finish(bus: MockBus) {
        let (mut pins, _) = bus.release();
        pins.clock.done();
        pins.data_out.done();
        pins.data_in.done();
        pins.select.done();
        pins.gdo0.done();
        pins.gdo2.done();
    }

    #[test]
    fn new_drives_idle_levels() {
        let bus = bus(&[], &[], &[], &[], &[]);
        finish(bus);
    }

    #[test]
    fn write_byte_is_msb_first() {
        let byte = 0xA5u8;
        let data: Vec<_> = (0..8)
            .rev()
            .map(|bit| Transaction::set(level(byte & (1 << bit) != 0)))
            .collect();

        let mut bus = bus(&clock_byte(), &data, &[], &[], &[]);
        bus.write_byte(byte).unwrap();
        finish(bus);
    }

    #[test]
    fn read_byte_samples_msb_first() {
        let byte = 0x3Cu8;
        let data_in: Vec<_> = (0..8)
            .rev()
            .map(|bit| Transaction::get(level(byte & (1 << bit) != 0)))
            .collect();

        let mut bus = bus(&clock_byte(), &[], &data_in, &[], &[]);
        assert_eq!(bus.read_byte().unwrap(), byte);
        finish(bus);
    }

    #[test]
    fn select_frames_a_transaction() {
        let select = [Transaction::set(State::Low), Transaction::set(State::High)];
        let mut bus = bus(&[], &[], &[], &select, &[]);
        bus.select().unwrap();
        bus.deselect().unwrap();
        finish(bus);
    }

    #[test]
    fn status_line_reads_gdo0() {
        let gdo0 = [Transaction::get(State::High), Transaction::get(State::Low)];
        let mut bus = bus(&[], &[], &[], &[], &gdo0);
        assert!(bus.status_line(StatusLine::Gdo0).unwrap());
        assert!(!bus.status_line(StatusLine::Gdo0).unwrap());
        finish(bus);
    }

    /// Input that never fails, so its error type differs from the mock's.
    struct FixedLine(bool);

    impl embedded_hal::digital::ErrorType for FixedLine {
        type Error = core::convert::Infallible;
    }

    impl InputPin for FixedLine {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn status_lines_may_use_different_pin_types() {
        let pins = Pins {
            clock: PinMock::new(&[Transaction::set(State::Low)]),
            data_out: PinMock::new(&[Transaction::set(State::Low)]),
            data_in: PinMock::new(&[]),
            select: PinMock::new(&[Transaction::set(State::High)]),
            gdo0: PinMock::new(&[Transaction::get(State::Low)]),
            gdo2: FixedLine(true),
        };
        let mut bus = BitBangBus::new(pins, NoDelay, &Timing::FAST).unwrap();

        assert!(!bus.status_line(StatusLine::Gdo0).unwrap());
        assert!(bus.status_line(StatusLine::Gdo2).unwrap());

        let (mut pins, _) = bus.release();
        pins.clock.done();
        pins.data_out.done();
        pins.data_in.done();
        pins.select.done();
        pins.gdo0.done();
    }
}

#![allow(dead_code)]

//! Simulated CC1101 for integration tests.
//!
//! The chip model understands the header byte convention (read/burst flags,
//! strobes, status registers), keeps a register file, PATABLE and TX FIFO, and
//! answers MARCSTATE reads from a scripted queue. It can be driven either at byte
//! level through [`SimChip`] (a `Transport`) or at pin level through [`SimPin`]s
//! handed to a real `BitBangBus`.

use std::{
    cell::{RefCell, RefMut},
    collections::{HashMap, VecDeque},
    convert::Infallible,
    rc::Rc,
};

use cc1101_bitbang::{Error, Pins, StatusLine, Transport};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

pub const SRES: u8 = 0x30;
pub const STX: u8 = 0x35;
pub const SIDLE: u8 = 0x36;
pub const SFTX: u8 = 0x3B;

const PATABLE: u8 = 0x3E;
const FIFO: u8 = 0x3F;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Header,
    Write(u8),
    WriteBurst(u8, Vec<u8>),
    Read(u8),
    ReadBurst(u8, usize),
    Strobe,
    Done,
}

/// Bit-level shift registers, used only when driven through pins
#[derive(Debug, Default)]
struct Wire {
    selected: bool,
    clock: bool,
    mosi: bool,
    bits: u8,
    shift_in: u8,
    shift_out: u8,
}

#[derive(Debug)]
pub struct SimState {
    /// Configuration registers 0x00-0x2E
    pub registers: [u8; 0x2F],
    pub patable: [u8; 8],
    pub tx_fifo: Vec<u8>,
    /// FIFO contents at every STX
    pub transmitted: Vec<Vec<u8>>,
    pub version: u8,
    pub part_number: u8,
    /// Answers to MARCSTATE reads, front first
    pub marcstates: VecDeque<u8>,
    /// MARCSTATE once the script is exhausted
    pub settled_marcstate: u8,
    /// Status byte returned for strobes
    pub status: u8,
    pub gdo0: bool,
    pub gdo2: bool,
    /// Every strobe executed, in order
    pub strobes: Vec<u8>,
    /// Every single-register write, in order
    pub writes: Vec<(u8, u8)>,
    /// Every burst write, in order
    pub bursts: Vec<(u8, Vec<u8>)>,
    /// Every millisecond delay requested, blocking or async
    pub delays: Vec<u32>,
    /// Last level driven on each output pin, by pin number
    pub levels: HashMap<u8, bool>,
    phase: Phase,
    wire: Wire,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            registers: [0; 0x2F],
            patable: [0; 8],
            tx_fifo: Vec::new(),
            transmitted: Vec::new(),
            version: 0x14,
            part_number: 0x00,
            marcstates: VecDeque::new(),
            settled_marcstate: 0x01,
            status: 0x0F,
            gdo0: false,
            gdo2: false,
            strobes: Vec::new(),
            writes: Vec::new(),
            bursts: Vec::new(),
            delays: Vec::new(),
            levels: HashMap::new(),
            phase: Phase::Idle,
            wire: Wire::default(),
        }
    }
}

impl SimState {
    pub fn resets(&self) -> usize {
        self.strobes.iter().filter(|&&s| s == SRES).count()
    }

    /// Number of PATABLE loads, i.e. completed `configure` calls
    pub fn patable_loads(&self) -> usize {
        self.bursts.iter().filter(|(addr, _)| *addr == PATABLE).count()
    }

    pub fn last_patable_load(&self) -> Option<&[u8]> {
        self.bursts
            .iter()
            .rev()
            .find(|(addr, _)| *addr == PATABLE)
            .map(|(_, data)| data.as_slice())
    }

    fn begin(&mut self) {
        self.phase = Phase::Header;
    }

    fn end(&mut self) {
        if let Phase::WriteBurst(addr, data) = std::mem::replace(&mut self.phase, Phase::Idle) {
            match addr {
                FIFO => self.tx_fifo.extend_from_slice(&data),
                PATABLE => {
                    for (slot, byte) in self.patable.iter_mut().zip(&data) {
                        *slot = *byte;
                    }
                }
                _ => {
                    for (offset, byte) in data.iter().enumerate() {
                        if let Some(reg) = self.registers.get_mut(addr as usize + offset) {
                            *reg = *byte;
                        }
                    }
                }
            }
            self.bursts.push((addr, data));
        }
    }

    fn receive(&mut self, byte: u8) {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Header => self.header(byte),
            Phase::Write(addr) => {
                match addr {
                    0x00..=0x2E => self.registers[addr as usize] = byte,
                    PATABLE => self.patable[0] = byte,
                    FIFO => self.tx_fifo.push(byte),
                    _ => {}
                }
                self.writes.push((addr, byte));
            }
            Phase::WriteBurst(addr, mut data) => {
                data.push(byte);
                self.phase = Phase::WriteBurst(addr, data);
            }
            // Dummy byte clocked in while the chip answers
            phase @ (Phase::Read(_) | Phase::ReadBurst(..)) => self.phase = phase,
            Phase::Idle | Phase::Strobe | Phase::Done => {}
        }
    }

    fn header(&mut self, byte: u8) {
        let addr = byte & 0x3F;
        let read = byte & 0x80 != 0;
        let burst = byte & 0x40 != 0;
        let strobe_address = (0x30..=0x3D).contains(&addr);

        self.phase = match (read, burst) {
            (false, false) if strobe_address => {
                self.strobe(addr);
                Phase::Strobe
            }
            // Without the burst bit a status address executes the strobe instead
            (true, false) if strobe_address => {
                self.strobe(addr);
                Phase::Strobe
            }
            (false, false) => Phase::Write(addr),
            (false, true) => Phase::WriteBurst(addr, Vec::new()),
            (true, true) if strobe_address => Phase::Read(addr),
            (true, false) => Phase::Read(addr),
            (true, true) => Phase::ReadBurst(addr, 0),
        };
    }

    fn strobe(&mut self, id: u8) {
        self.strobes.push(id);
        match id {
            SRES => {
                self.registers = [0; 0x2F];
                self.patable = [0; 8];
                self.tx_fifo.clear();
            }
            SFTX => self.tx_fifo.clear(),
            STX => self.transmitted.push(std::mem::take(&mut self.tx_fifo)),
            _ => {}
        }
    }

    /// Byte the chip shifts out during the next transfer
    fn respond(&mut self) -> u8 {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Read(addr) => self.register_value(addr),
            Phase::ReadBurst(addr, offset) => {
                let value = match addr {
                    PATABLE => self.patable.get(offset).copied().unwrap_or(0),
                    FIFO => 0,
                    _ => self.register_value(addr + offset as u8),
                };
                self.phase = Phase::ReadBurst(addr, offset + 1);
                value
            }
            phase => {
                self.phase = phase;
                self.status
            }
        }
    }

    fn register_value(&mut self, addr: u8) -> u8 {
        match addr {
            0x00..=0x2E => self.registers[addr as usize],
            0x30 => self.part_number,
            0x31 => self.version,
            0x35 => self
                .marcstates
                .pop_front()
                .unwrap_or(self.settled_marcstate),
            0x3A => self.tx_fifo.len() as u8,
            PATABLE => self.patable[0],
            _ => 0,
        }
    }
}

/// Byte-level simulated chip. Clones share the same chip.
#[derive(Clone, Default)]
pub struct SimChip {
    state: Rc<RefCell<SimState>>,
}

impl SimChip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: u8) -> Self {
        let chip = Self::new();
        chip.state().version = version;
        chip
    }

    pub fn state(&self) -> RefMut<'_, SimState> {
        self.state.borrow_mut()
    }

    /// Queues MARCSTATE codes returned by the next reads.
    pub fn script_marcstates(&self, codes: &[u8]) {
        self.state().marcstates.extend(codes.iter().copied());
    }

    /// Async delay recording into this chip's delay log
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            state: self.state.clone(),
        }
    }

    /// The six lines of this chip, numbered clock, data-out, data-in, select,
    /// GDO0, GDO2 in the order given.
    pub fn pins(&self, numbers: [u8; 6]) -> Pins<SimPin, SimPin, SimPin, SimPin, SimPin, SimPin> {
        let pin = |role, number| SimPin {
            role,
            number,
            state: self.state.clone(),
        };
        Pins {
            clock: pin(Role::Clock, numbers[0]),
            data_out: pin(Role::DataOut, numbers[1]),
            data_in: pin(Role::DataIn, numbers[2]),
            select: pin(Role::Select, numbers[3]),
            gdo0: pin(Role::Gdo0, numbers[4]),
            gdo2: pin(Role::Gdo2, numbers[5]),
        }
    }
}

impl Transport for SimChip {
    fn select(&mut self) -> Result<(), Error> {
        self.state().begin();
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Error> {
        self.state().end();
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.state().receive(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut state = self.state();
        let value = state.respond();
        state.receive(0x00);
        Ok(value)
    }

    fn status_line(&mut self, line: StatusLine) -> Result<bool, Error> {
        let state = self.state();
        Ok(match line {
            StatusLine::Gdo0 => state.gdo0,
            StatusLine::Gdo2 => state.gdo2,
        })
    }

    fn delay_ms(&mut self, ms: u32) {
        self.state().delays.push(ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Clock,
    DataOut,
    DataIn,
    Select,
    Gdo0,
    Gdo2,
}

/// One GPIO line wired to the simulated chip.
pub struct SimPin {
    pub role: Role,
    pub number: u8,
    state: Rc<RefCell<SimState>>,
}

impl SimPin {
    fn drive(&mut self, high: bool) {
        let mut chip = self.state.borrow_mut();
        chip.levels.insert(self.number, high);

        match self.role {
            Role::DataOut => chip.wire.mosi = high,
            Role::Select => {
                let was_selected = chip.wire.selected;
                chip.wire.selected = !high;
                if !was_selected && !high {
                    chip.begin();
                    let status = chip.status;
                    chip.wire.bits = 0;
                    chip.wire.shift_in = 0;
                    chip.wire.shift_out = status;
                } else if was_selected && high {
                    chip.end();
                }
            }
            Role::Clock => {
                let rising = !chip.wire.clock && high;
                chip.wire.clock = high;
                if rising && chip.wire.selected {
                    let bit = chip.wire.mosi as u8;
                    chip.wire.shift_in = chip.wire.shift_in << 1 | bit;
                    chip.wire.bits += 1;
                    if chip.wire.bits == 8 {
                        let byte = chip.wire.shift_in;
                        chip.receive(byte);
                        let next = chip.respond();
                        chip.wire.shift_out = next;
                        chip.wire.bits = 0;
                        chip.wire.shift_in = 0;
                    }
                }
            }
            Role::DataIn | Role::Gdo0 | Role::Gdo2 => {}
        }
    }

    fn sample(&mut self) -> bool {
        let chip = self.state.borrow();
        match self.role {
            Role::DataIn if chip.wire.selected => {
                chip.wire.shift_out >> (7 - chip.wire.bits) & 1 != 0
            }
            Role::Gdo0 => chip.gdo0,
            Role::Gdo2 => chip.gdo2,
            _ => false,
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sample())
    }
}

/// Blocking delay that returns immediately
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Async delay that completes immediately and logs millisecond waits on the chip
pub struct SimDelay {
    state: Rc<RefCell<SimState>>,
}

impl embedded_hal_async::delay::DelayNs for SimDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.state.borrow_mut().delays.push(ms);
    }
}

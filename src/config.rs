//! Radio and bus configuration
//!
//! The CC1101 keeps no configuration across a reset strobe, so a [`RadioConfig`]
//! is retained by the controller and re-applied after every reset.
//!
//! Bus timing is plain data ([`Timing`]) rather than code: slow wiring or a busy
//! host calls for longer half-cycles, and the same driver covers both cases.

/// Crystal reference clock of the CC1101 module, in Hz
pub const REFERENCE_CLOCK_HZ: u32 = 26_000_000;

/// Frequency resolution of the synthesizer: `REFERENCE_CLOCK_HZ / 2^16`, ~397 Hz
pub const FREQUENCY_STEP_HZ: f64 = REFERENCE_CLOCK_HZ as f64 / 65536.0;

/// Power amplifier settings, indexed by [`PowerLevel`] (0 = max .. 7 = min)
pub const PA_TABLE: [u8; 8] = [0xC0, 0xC3, 0xC6, 0xC9, 0xCC, 0xCF, 0x12, 0x03];

/// Carrier frequency in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frequency(u32);

impl Frequency {
    /// Creates a frequency from a value in Hz
    pub const fn from_hz(hz: u32) -> Self {
        Self(hz)
    }

    /// Creates a frequency from a value in MHz, rounded to the nearest Hz
    pub fn from_mhz(mhz: f64) -> Self {
        Self((mhz * 1_000_000.0 + 0.5) as u32)
    }

    /// Frequency in Hz
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// Frequency in MHz
    pub fn mhz(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Converts to the 24-bit FREQ2:FREQ1:FREQ0 word.
    ///
    /// `word = round(hz / (REFERENCE_CLOCK_HZ / 2^16))`
    pub const fn to_register_word(self) -> u32 {
        let clock = REFERENCE_CLOCK_HZ as u64;
        ((((self.0 as u64) << 16) + clock / 2) / clock) as u32 & 0x00FF_FFFF
    }

    /// Converts a FREQ2:FREQ1:FREQ0 word back to a frequency, rounded to the nearest Hz
    pub const fn from_register_word(word: u32) -> Self {
        let hz = ((word as u64 & 0x00FF_FFFF) * REFERENCE_CLOCK_HZ as u64 + (1 << 15)) >> 16;
        Self(hz as u32)
    }

    /// Whether the frequency lies in one of the synthesizer's bands
    /// (300-348, 387-464 or 779-928 MHz)
    pub fn is_in_band(self) -> bool {
        matches!(
            self.0,
            300_000_000..=348_000_000 | 387_000_000..=464_000_000 | 779_000_000..=928_000_000
        )
    }
}

/// Modulation format written to MDMCFG2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modulation {
    /// Amplitude/on-off keying, used by most fixed- and rolling-code remotes
    AskOok,
    /// Two-level frequency shift keying
    TwoFsk,
}

impl Modulation {
    /// Full MDMCFG2 value selecting this modulation (no sync word, no Manchester)
    pub const fn mdmcfg2(self) -> u8 {
        match self {
            Self::AskOok => 0x30,
            Self::TwoFsk => 0x10,
        }
    }

    /// Modulation named by a decoder, as used in replay configuration.
    ///
    /// Accepts `"2-FSK"`/`"FSK"` and `"ASK_OOK"`/`"OOK"`/`"ASK"`, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if ["2-FSK", "2FSK", "FSK"].iter().any(|n| name.eq_ignore_ascii_case(n)) {
            Some(Self::TwoFsk)
        } else if ["ASK_OOK", "ASK/OOK", "OOK", "ASK"]
            .iter()
            .any(|n| name.eq_ignore_ascii_case(n))
        {
            Some(Self::AskOok)
        } else {
            None
        }
    }
}

/// Output power as an index into [`PA_TABLE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerLevel(u8);

impl PowerLevel {
    /// Highest output power (index 0)
    pub const MAX: Self = Self(0);
    /// Lowest output power (index 7)
    pub const MIN: Self = Self(7);

    /// Returns `None` for indices outside `0..=7`
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < PA_TABLE.len() {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Table index, 0 (max) to 7 (min)
    pub const fn index(self) -> u8 {
        self.0
    }

    /// PATABLE byte for this level
    pub const fn pa_value(self) -> u8 {
        PA_TABLE[self.0 as usize]
    }
}

/// Everything that must be written to the chip after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Carrier frequency
    pub frequency: Frequency,
    /// Modulation format
    pub modulation: Modulation,
    /// Output power
    pub power: PowerLevel,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::from_hz(433_920_000),
            modulation: Modulation::AskOok,
            power: PowerLevel::MAX,
        }
    }
}

/// Bus and sequencing delays, plus the transmit retry budget.
///
/// # Important Notes
/// - Too short a `half_cycle_us` violates the chip's setup/hold times. The result
///   is not an error but intermittently corrupted registers, caught only by the
///   identity check or by transmit verification.
/// - `reset_settle_ms` is the wait after the reset strobe. Accessing the chip
///   earlier is the most common cause of garbled reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Delay at each clock edge, in µs
    pub half_cycle_us: u32,
    /// Delay between chip-select edges and the first/last clock, in µs
    pub select_setup_us: u32,
    /// Duration of each half of the chip-select power-on-reset pulse, in ms
    pub reset_pulse_ms: u32,
    /// Time chip-select is held high before the reset strobe, in ms
    pub reset_hold_ms: u32,
    /// Wait after the reset strobe before any further access, in ms
    pub reset_settle_ms: u32,
    /// Wait after the idle and flush strobes, in ms
    pub strobe_settle_ms: u32,
    /// Wait after the transmit strobe before checking the chip state, in ms
    pub tx_settle_ms: u32,
    /// Re-initialize-and-retry attempts after a failed transmission
    pub max_retries: u8,
}

impl Timing {
    /// 10 µs half-cycles, for hosts with accurate GPIO timing
    pub const FAST: Self = Self {
        half_cycle_us: 10,
        select_setup_us: 10,
        reset_pulse_ms: 10,
        reset_hold_ms: 10,
        reset_settle_ms: 100,
        strobe_settle_ms: 1,
        tx_settle_ms: 100,
        max_retries: 1,
    };

    /// 1 ms half-cycles, for long wires or jittery hosts
    pub const SLOW: Self = Self {
        half_cycle_us: 1_000,
        select_setup_us: 1_000,
        reset_pulse_ms: 10,
        reset_hold_ms: 45,
        reset_settle_ms: 200,
        strobe_settle_ms: 10,
        tx_settle_ms: 50,
        max_retries: 1,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::SLOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_for_433_92_mhz() {
        let word = Frequency::from_mhz(433.92).to_register_word();
        assert_eq!(word, 0x10B071);
    }

    #[test]
    fn word_round_trips_within_one_step() {
        let bands = [(300u32, 348u32), (387, 464), (779, 928)];
        for (lo, hi) in bands {
            let mut hz = lo * 1_000_000;
            while hz <= hi * 1_000_000 {
                let f = Frequency::from_hz(hz);
                let back = Frequency::from_register_word(f.to_register_word());
                let diff = (back.hz() as f64 - hz as f64).abs();
                assert!(diff <= FREQUENCY_STEP_HZ, "{} Hz came back as {}", hz, back.hz());
                hz += 1_234_567;
            }
        }
    }

    #[test]
    fn power_levels_are_bounded() {
        for index in 0..8 {
            let level = PowerLevel::new(index).unwrap();
            assert_eq!(level.pa_value(), PA_TABLE[index as usize]);
        }
        assert_eq!(PowerLevel::new(8), None);
        assert_eq!(PowerLevel::new(255), None);
        assert_eq!(PowerLevel::MAX.pa_value(), 0xC0);
        assert_eq!(PowerLevel::MIN.pa_value(), 0x03);
    }

    #[test]
    fn band_edges() {
        assert!(Frequency::from_mhz(315.0).is_in_band());
        assert!(Frequency::from_mhz(868.35).is_in_band());
        assert!(!Frequency::from_mhz(500.0).is_in_band());
        assert!(!Frequency::from_mhz(2400.0).is_in_band());
    }

    #[test]
    fn modulation_register_values() {
        assert_eq!(Modulation::AskOok.mdmcfg2(), 0x30);
        assert_eq!(Modulation::TwoFsk.mdmcfg2(), 0x10);
    }

    #[test]
    fn modulation_names() {
        assert_eq!(Modulation::from_name("2-FSK"), Some(Modulation::TwoFsk));
        assert_eq!(Modulation::from_name("ask_ook"), Some(Modulation::AskOok));
        assert_eq!(Modulation::from_name("lora"), None);
    }
}

//! Radio controller
//!
//! Owns the chip for its whole lifetime: reset, identity check, register load and
//! state queries. The chip has no persistent memory, so the controller remembers
//! the last [`RadioConfig`] it applied and can put it back after any reset.
//!
//! # Lifecycle
//! ```text
//!  Uninitialized --reset--> Reset --configure--> Configured
//!        ^                    ^                       |
//!        |                    +-------reset-----------+
//! ```
//! `reset` always lands in [`ControllerState::Reset`], whatever the prior state.
//!
//! # Example
//! ```no_run
//! # use cc1101_bitbang::{RadioController, RadioConfig, Timing, Transport, Error};
//! fn bring_up<T: Transport>(transport: T) -> Result<RadioController<T>, Error> {
//!     let mut radio = RadioController::new(transport, Timing::SLOW);
//!     radio.init(RadioConfig::default())?;
//!     Ok(radio)
//! }
//! ```

use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}};
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::{
    bus::{BitBangBus, Pins, StatusLine},
    device::{Device, NoObserver, Observer},
    registers::{self, Iocfg0, MarcStateRegister, Mdmcfg2, PartNumber, TxBytes, Version},
    Error, Frequency, FrequencyWord, MarcState, Precondition, RadioConfig, Timing, Transport,
};

/// Where the controller is in its bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Constructed, chip never reset
    Uninitialized,
    /// Reset strobe issued, registers at power-on defaults
    Reset,
    /// Registers loaded with a [`RadioConfig`]
    Configured,
}

/// Exclusive owner of one CC1101.
pub struct RadioController<T, O = NoObserver> {
    pub(crate) device: Device<T, O>,
    pub(crate) timing: Timing,
    state: ControllerState,
    config: Option<RadioConfig>,
}

impl<SCK, MOSI, MISO, CS, GDO0, GDO2, D>
    RadioController<BitBangBus<SCK, MOSI, MISO, CS, GDO0, GDO2, D>>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    GDO0: InputPin,
    GDO2: InputPin,
    D: DelayNs,
{
    /// Binds the six lines of one chip and drives them to idle.
    pub fn from_pins(
        pins: Pins<SCK, MOSI, MISO, CS, GDO0, GDO2>,
        delay: D,
        timing: Timing,
    ) -> Result<Self, Error> {
        let bus = BitBangBus::new(pins, delay, &timing)?;
        Ok(Self::new(bus, timing))
    }
}

impl<T> RadioController<T> {
    /// Creates a controller over an already initialized transport.
    pub fn new(transport: T, timing: Timing) -> Self {
        Self {
            device: Device::new(transport),
            timing,
            state: ControllerState::Uninitialized,
            config: None,
        }
    }
}

impl<T, O> RadioController<T, O> {
    /// Reports every bus access to `observer` from now on.
    pub fn with_observer<O2: Observer>(self, observer: O2) -> RadioController<T, O2> {
        RadioController {
            device: self.device.with_observer(observer),
            timing: self.timing,
            state: self.state,
            config: self.config,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Last configuration requested through [`configure`](Self::configure)
    pub fn config(&self) -> Option<RadioConfig> {
        self.config
    }

    /// Timing profile in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Register-level access for operations the controller does not wrap.
    pub fn device(&mut self) -> &mut Device<T, O> {
        &mut self.device
    }

    /// Stops driving the chip and hands back the transport.
    pub fn release(self) -> T {
        self.device.release()
    }
}

impl<T, O> RadioController<T, O>
where
    T: Transport,
    O: Observer,
{
    /// Power-on-reset pulse on chip-select followed by the reset strobe.
    ///
    /// Blocks for the full settle period afterwards; reading the chip earlier
    /// returns garbage. Leaves the controller in [`ControllerState::Reset`].
    pub fn reset(&mut self) -> Result<(), Error> {
        let t = self.timing;
        debug!("resetting radio");

        let bus = self.device.transport_mut();
        bus.deselect()?;
        bus.delay_ms(t.reset_pulse_ms);
        bus.select()?;
        bus.delay_ms(t.reset_pulse_ms);
        bus.deselect()?;
        bus.delay_ms(t.reset_hold_ms);

        self.device.reset_strobe()?;
        self.device.transport_mut().delay_ms(t.reset_settle_ms);

        self.state = ControllerState::Reset;
        Ok(())
    }

    /// Async variant of [`reset`](Self::reset): the millisecond waits yield to
    /// the executor instead of blocking.
    pub async fn reset_async<D: AsyncDelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        let t = self.timing;
        debug!("resetting radio");

        self.device.transport_mut().deselect()?;
        delay.delay_ms(t.reset_pulse_ms).await;
        self.device.transport_mut().select()?;
        delay.delay_ms(t.reset_pulse_ms).await;
        self.device.transport_mut().deselect()?;
        delay.delay_ms(t.reset_hold_ms).await;

        self.device.reset_strobe()?;
        delay.delay_ms(t.reset_settle_ms).await;

        self.state = ControllerState::Reset;
        Ok(())
    }

    /// Reads the VERSION register.
    pub fn read_version(&mut self) -> Result<u8, Error> {
        let version: Version = self.device.read_register()?;
        Ok(version.0)
    }

    /// Reads the PARTNUM register.
    pub fn read_part_number(&mut self) -> Result<u8, Error> {
        let part: PartNumber = self.device.read_register()?;
        Ok(part.0)
    }

    /// Checks that the chip answers with its known identity.
    ///
    /// Returns `Ok(false)` on a mismatch; the caller decides whether to abort or
    /// to retry with slower timing.
    pub fn verify_communication(&mut self) -> Result<bool, Error> {
        let version = self.read_version()?;
        let ok = version == registers::EXPECTED_VERSION;
        if ok {
            debug!("VERSION 0x{:02x}, bus ok", version);
        } else {
            warn!(
                "VERSION 0x{:02x}, expected 0x{:02x}",
                version,
                registers::EXPECTED_VERSION
            );
        }
        Ok(ok)
    }

    /// Loads the full register set for `config`.
    ///
    /// Order: calibration profile, GDO0 function, frequency, modulation, PATABLE.
    /// The modulation must follow the frequency and calibration registers.
    ///
    /// # Errors
    /// * `Precondition::NotReset` - the chip was never reset
    pub fn configure(&mut self, config: RadioConfig) -> Result<(), Error> {
        if self.state == ControllerState::Uninitialized {
            error!("configure called before reset");
            return Err(Precondition::NotReset.into());
        }
        if !config.frequency.is_in_band() {
            warn!("{} Hz is outside the synthesizer bands", config.frequency.hz());
        }

        for (address, value) in registers::CALIBRATION_PROFILE {
            self.device.write(address, value)?;
        }
        self.device.write_register(Iocfg0::default())?;
        self.device
            .write_register(FrequencyWord::from(config.frequency))?;
        self.device
            .write_register(Mdmcfg2::from(config.modulation))?;
        self.device
            .write_burst(registers::PATABLE, &[config.power.pa_value()])?;

        info!(
            "configured {} Hz, {:?}, power index {}",
            config.frequency.hz(),
            config.modulation,
            config.power.index()
        );
        self.config = Some(config);
        self.state = ControllerState::Configured;
        Ok(())
    }

    /// Reset, identity check, configure.
    ///
    /// # Errors
    /// * `Error::Communication` - the identity register did not match
    pub fn init(&mut self, config: RadioConfig) -> Result<(), Error> {
        self.reset()?;
        self.check_identity()?;
        self.configure(config)
    }

    /// Async variant of [`init`](Self::init).
    pub async fn init_async<D: AsyncDelayNs>(
        &mut self,
        config: RadioConfig,
        delay: &mut D,
    ) -> Result<(), Error> {
        self.reset_async(delay).await?;
        self.check_identity()?;
        self.configure(config)
    }

    /// Resets the chip and re-applies the last requested configuration unchanged.
    ///
    /// # Errors
    /// * `Precondition::NotConfigured` - nothing has been configured yet
    pub fn reinitialize(&mut self) -> Result<(), Error> {
        let config = self.last_config()?;
        self.reset()?;
        self.configure(config)
    }

    /// Async variant of [`reinitialize`](Self::reinitialize).
    pub async fn reinitialize_async<D: AsyncDelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        let config = self.last_config()?;
        self.reset_async(delay).await?;
        self.configure(config)
    }

    /// Main radio control state, read from MARCSTATE. No side effects.
    pub fn get_state(&mut self) -> Result<MarcState, Error> {
        let reg: MarcStateRegister = self.device.read_register()?;
        Ok(reg.state)
    }

    /// Frequency currently held in FREQ2:FREQ1:FREQ0
    pub fn read_frequency(&mut self) -> Result<Frequency, Error> {
        let word: FrequencyWord = self.device.read_register()?;
        Ok(word.into())
    }

    /// TX FIFO fill level and underflow flag
    pub fn tx_bytes(&mut self) -> Result<TxBytes, Error> {
        self.device.read_register()
    }

    /// Samples the GDO0 line
    pub fn gdo0(&mut self) -> Result<bool, Error> {
        self.device.transport_mut().status_line(StatusLine::Gdo0)
    }

    /// Samples the GDO2 line
    pub fn gdo2(&mut self) -> Result<bool, Error> {
        self.device.transport_mut().status_line(StatusLine::Gdo2)
    }

    pub(crate) fn last_config(&self) -> Result<RadioConfig, Error> {
        match (self.state, self.config) {
            (ControllerState::Uninitialized, _) | (_, None) => {
                error!("radio used before configure");
                Err(Precondition::NotConfigured.into())
            }
            (_, Some(config)) => Ok(config),
        }
    }

    /// A reset wipes the registers, so a stored config is not enough: the chip
    /// must have been configured since the last reset.
    pub(crate) fn ensure_configured(&self) -> Result<(), Error> {
        if self.state == ControllerState::Configured {
            Ok(())
        } else {
            error!("radio used while {:?}", self.state);
            Err(Precondition::NotConfigured.into())
        }
    }

    fn check_identity(&mut self) -> Result<(), Error> {
        let version = self.read_version()?;
        if version == registers::EXPECTED_VERSION {
            Ok(())
        } else {
            error!(
                "no CC1101 on the bus: VERSION 0x{:02x}, expected 0x{:02x}",
                version,
                registers::EXPECTED_VERSION
            );
            Err(Error::Communication { version })
        }
    }
}

//! Transmit pipeline
//!
//! Loads a payload into the TX FIFO, starts transmission and polls MARCSTATE to
//! decide whether it went out. The chip offers no completion interrupt without
//! extra wiring, so a fixed settle period stands in for the on-air time.
//!
//! # Sequence (one attempt)
//! 1. SIDLE, settle
//! 2. SFTX, settle. Without the flush, bytes left over from an earlier call go out too
//! 3. Burst write of the payload to the TX FIFO
//! 4. STX, wait [`Timing::tx_settle_ms`](crate::Timing)
//! 5. Read MARCSTATE; [`MarcState::is_tx_failure`] decides the verdict
//!
//! A failed attempt is followed by a full reset and reconfiguration with the last
//! requested [`RadioConfig`](crate::RadioConfig) before the next one. Partial
//! recovery (flushing the FIFO again) leaves the synthesizer calibration in an
//! inconsistent state.
//!
//! Repetition of a successful transmission is up to the caller; RF replay usually
//! repeats the same code several times with a pause in between.

use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::{
    controller::RadioController, device::Observer, registers, EnterIdle, EnterTx, Error,
    FlushTx, MarcState, Precondition, Transport,
};

/// Result of a [`send`](RadioController::send).
///
/// A failed transmission is routine in RF work and is reported here, not as an
/// [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// The chip left TX cleanly
    Success {
        /// Attempts used, including the successful one
        attempts: u16,
    },
    /// Every attempt ended in a failure state
    Failed {
        /// State observed after the last attempt
        state: MarcState,
        /// Attempts made
        attempts: u16,
    },
}

impl TxOutcome {
    /// `true` when some attempt left TX cleanly
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Attempts made, whatever the verdict
    pub fn attempts(&self) -> u16 {
        match *self {
            Self::Success { attempts } | Self::Failed { attempts, .. } => attempts,
        }
    }
}

/// What one pass through the sequence observed. Lives for one `send` call.
struct TransmissionAttempt<'a> {
    payload: &'a [u8],
    index: u16,
    state: MarcState,
}

impl<T, O> RadioController<T, O>
where
    T: Transport,
    O: Observer,
{
    /// Transmits `payload`, retrying up to [`Timing::max_retries`](crate::Timing) times.
    pub fn send(&mut self, payload: &[u8]) -> Result<TxOutcome, Error> {
        let max_retries = self.timing.max_retries;
        self.send_with_retries(payload, max_retries)
    }

    /// Transmits `payload` with an explicit retry budget.
    ///
    /// `max_retries = 0` makes exactly one attempt. An empty payload still runs
    /// SIDLE and SFTX, then reports success without strobing STX.
    ///
    /// # Errors
    /// * `Precondition::NotConfigured` - [`configure`](RadioController::configure) has
    ///   not run since the last reset
    /// * `Precondition::PayloadTooLong` - more than 64 bytes
    /// * `Error::Pin` - a bus line failed
    pub fn send_with_retries(&mut self, payload: &[u8], max_retries: u8) -> Result<TxOutcome, Error> {
        self.check_payload(payload)?;

        let settle = self.timing.strobe_settle_ms;
        let mut index = 0;
        loop {
            self.device.strobe(EnterIdle)?;
            self.device.transport_mut().delay_ms(settle);
            self.device.strobe(FlushTx)?;
            self.device.transport_mut().delay_ms(settle);

            if payload.is_empty() {
                debug!("empty payload, FIFO flushed");
                return Ok(TxOutcome::Success { attempts: 1 });
            }

            self.start_transmission(payload)?;
            let tx_settle = self.timing.tx_settle_ms;
            self.device.transport_mut().delay_ms(tx_settle);

            let attempt = TransmissionAttempt {
                payload,
                index,
                state: self.get_state()?,
            };
            if let Some(outcome) = self.judge(&attempt, max_retries)? {
                return Ok(outcome);
            }

            self.reinitialize()?;
            index += 1;
        }
    }

    /// Async variant of [`send`](Self::send). Settle periods and the reset
    /// inside a retry wait on `delay`; bus transfers stay blocking.
    pub async fn send_async<D: AsyncDelayNs>(
        &mut self,
        payload: &[u8],
        delay: &mut D,
    ) -> Result<TxOutcome, Error> {
        self.check_payload(payload)?;

        let max_retries = self.timing.max_retries;
        let settle = self.timing.strobe_settle_ms;
        let mut index = 0;
        loop {
            self.device.strobe(EnterIdle)?;
            delay.delay_ms(settle).await;
            self.device.strobe(FlushTx)?;
            delay.delay_ms(settle).await;

            if payload.is_empty() {
                debug!("empty payload, FIFO flushed");
                return Ok(TxOutcome::Success { attempts: 1 });
            }

            self.start_transmission(payload)?;
            delay.delay_ms(self.timing.tx_settle_ms).await;

            let attempt = TransmissionAttempt {
                payload,
                index,
                state: self.get_state()?,
            };
            if let Some(outcome) = self.judge(&attempt, max_retries)? {
                return Ok(outcome);
            }

            self.reinitialize_async(delay).await?;
            index += 1;
        }
    }

    fn check_payload(&self, payload: &[u8]) -> Result<(), Error> {
        self.ensure_configured()?;
        if payload.len() > registers::FIFO_SIZE {
            error!("payload of {} bytes does not fit the TX FIFO", payload.len());
            return Err(Precondition::PayloadTooLong { len: payload.len() }.into());
        }
        Ok(())
    }

    fn start_transmission(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.device.write_burst(registers::FIFO, payload)?;
        let status = self.device.strobe(EnterTx)?;
        trace!("STX accepted in {:?}", status.state);
        Ok(())
    }

    /// `Some` once the call is decided, `None` to retry.
    fn judge(
        &mut self,
        attempt: &TransmissionAttempt<'_>,
        max_retries: u8,
    ) -> Result<Option<TxOutcome>, Error> {
        let attempts = attempt.index + 1;

        if !attempt.state.is_tx_failure() {
            let gdo0 = self.gdo0()?;
            info!(
                "sent {} bytes, attempt {}, {}, GDO0 {}",
                attempt.payload.len(),
                attempts,
                attempt.state.name(),
                gdo0
            );
            return Ok(Some(TxOutcome::Success { attempts }));
        }

        if attempt.index >= u16::from(max_retries) {
            warn!(
                "transmission failed in {} after {} attempt(s)",
                attempt.state.name(),
                attempts
            );
            return Ok(Some(TxOutcome::Failed {
                state: attempt.state,
                attempts,
            }));
        }

        warn!(
            "attempt {} ended in {} (0x{:02x}), reinitializing",
            attempts,
            attempt.state.name(),
            attempt.state.bits()
        );
        Ok(None)
    }
}

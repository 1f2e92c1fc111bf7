//! Session bring-up: a bounded walk over the probe states Standard,
//! Autobaud and PowerOnReset until the module answers, then the idempotent
//! post-conditions every session relies on.

use embassy_time::Duration;

use crate::client::SaraR4;
use crate::config::{NUM_SOCKETS, SUPPORTED_BAUD_RATES};
use crate::error::Error;
use crate::timer::block_for;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::{Functionality, GpioMode, GpioPin, SmsMessageFormat};

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ProbeState {
    /// Assume the module already talks at the requested rate.
    Standard,
    /// Walk the supported rates, retargeting `+IPR` at each.
    Autobaud,
    /// Toggle the power key, then probe again.
    PowerOnReset,
}

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// Bring the module to a known state at `baud`.
    ///
    /// Probing starts optimistic and escalates: Standard, then Autobaud,
    /// then PowerOnReset, then back to Autobaud, for at most the configured
    /// number of attempts. A module that never answers is fatal. Echo-off is
    /// the verification gate; the remaining post-conditions are best-effort
    /// and idempotent.
    pub fn begin(&mut self, baud: u32) -> Result<(), Error> {
        if !SUPPORTED_BAUD_RATES.contains(&baud) {
            return Err(Error::UnexpectedParam);
        }

        let mut state = ProbeState::Standard;
        let mut attempts = self.config.bringup_attempts;
        loop {
            debug!("Bring-up probe: {:?}", state);
            let probed = match state {
                ProbeState::Standard => {
                    self.serial.set_baud(baud).map_err(|_| Error::Write)?;
                    block_for(self.config.settle_delay);
                    true
                }
                ProbeState::Autobaud => self.autobaud(baud).is_ok(),
                ProbeState::PowerOnReset => {
                    self.power_on();
                    self.at().is_ok()
                }
            };
            if probed && self.enable_echo(false).is_ok() {
                break;
            }
            attempts = attempts.saturating_sub(1);
            if attempts == 0 {
                error!("Module unresponsive, bring-up cycle exhausted");
                return Err(Error::NoResponse);
            }
            state = match state {
                ProbeState::Standard => ProbeState::Autobaud,
                ProbeState::Autobaud => ProbeState::PowerOnReset,
                ProbeState::PowerOnReset => ProbeState::Autobaud,
            };
        }
        self.baud = baud;

        let _ = self.set_gpio_mode(GpioPin::Gpio1, GpioMode::NetworkStatus);
        let _ = self.set_gpio_mode(GpioPin::Gpio2, GpioMode::GnssSupplyEnable);
        let _ = self.set_sms_message_format(SmsMessageFormat::Text);
        let _ = self.set_auto_time_zone(true);
        // A previous session may have left sockets open on the module.
        let close_timeout = Duration::from_millis(100).min(self.config.response_timeout);
        for socket in 0..NUM_SOCKETS {
            let _ = self.socket_close_within(socket, close_timeout);
        }
        Ok(())
    }

    fn autobaud(&mut self, desired: u32) -> Result<(), Error> {
        for &candidate in SUPPORTED_BAUD_RATES.iter() {
            trace!("Autobaud: retargeting {} via {}", desired, candidate);
            self.serial.set_baud(candidate).map_err(|_| Error::Write)?;
            let _ = self.set_baud(desired);
            block_for(self.config.settle_delay);
            self.serial.set_baud(desired).map_err(|_| Error::Write)?;
            if self.at().is_ok() {
                return Ok(());
            }
        }
        Err(Error::NoResponse)
    }

    /// Toggle the module's power key for its documented pulse width.
    pub fn power_on(&mut self) {
        self.power_pin.drive_low();
        block_for(self.config.power_pulse);
        self.power_pin.release();
        block_for(self.config.settle_delay);
    }

    /// Hold the hardware reset line low for its documented pulse width.
    /// Escape hatch for a module that no longer answers AT commands.
    pub fn hard_reset(&mut self) {
        self.reset_pin.drive_low();
        block_for(self.config.reset_pulse);
        self.reset_pin.release();
    }

    /// Soft reset: silent `+CFUN` reset, then renegotiate the session at the
    /// current rate. The module falls back to its default rate while
    /// rebooting, which the bring-up walk recovers from.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.functionality(Functionality::SilentReset)?;
        block_for(self.config.settle_delay);
        self.begin(self.baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fast_config, MockPin, MockSerial};

    fn driver(serial: MockSerial) -> SaraR4<'static, MockSerial, MockPin, MockPin> {
        SaraR4::new(serial, MockPin::new(), MockPin::new(), fast_config())
    }

    fn queue_post_condition_replies(serial: &mut MockSerial) {
        // GPIO x2, +CMGF, +CTZU, six socket closes.
        for _ in 0..10 {
            serial.queue_reply(b"\r\nOK\r\n");
        }
    }

    #[test]
    fn responsive_module_completes_on_the_standard_path() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n"); // ATE0
        queue_post_condition_replies(&mut serial);
        let mut driver = driver(serial);

        driver.begin(115_200).unwrap();

        let sent = driver.serial.sent();
        assert!(sent.starts_with("ATE0\r"));
        assert!(sent.contains("AT+UGPIOC=16,2\r"));
        assert!(sent.contains("AT+UGPIOC=23,3\r"));
        assert!(sent.contains("AT+CMGF=1\r"));
        assert!(sent.contains("AT+CTZU=1\r"));
        for socket in 0..NUM_SOCKETS {
            assert!(sent.contains(&format!("AT+USOCL={}\r", socket)));
        }
        assert_eq!(driver.serial.bauds, vec![115_200]);
        assert_eq!(driver.power_pin.pulses, 0);
    }

    #[test]
    fn unsupported_rate_is_rejected_before_touching_the_module() {
        let mut driver = driver(MockSerial::new());
        assert_eq!(driver.begin(4_800), Err(Error::UnexpectedParam));
        assert!(driver.serial.sent().is_empty());
    }

    #[test]
    fn silent_module_exhausts_the_cycle_including_a_power_pulse() {
        let serial = MockSerial::new();
        let mut driver = driver(serial);
        driver.config = driver.config.bringup_attempts(3);

        assert_eq!(driver.begin(115_200), Err(Error::NoResponse));
        // Standard, then Autobaud, then PowerOnReset were all walked.
        assert_eq!(driver.power_pin.pulses, 1);
        assert!(driver.serial.bauds.len() > 1);
    }

    #[test]
    fn post_condition_failures_do_not_fail_begin() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n"); // ATE0 only; everything after times out
        let mut driver = driver(serial);
        assert_eq!(driver.begin(115_200), Ok(()));
    }

    #[test]
    fn soft_reset_renegotiates_the_session() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n"); // +CFUN=15
        serial.queue_reply(b"\r\nOK\r\n"); // ATE0
        queue_post_condition_replies(&mut serial);
        let mut driver = driver(serial);

        driver.reset().unwrap();
        assert!(driver.serial.sent().starts_with("AT+CFUN=15\r"));
    }

    #[test]
    fn hard_reset_pulses_the_reset_line() {
        let mut driver = driver(MockSerial::new());
        driver.hard_reset();
        assert_eq!(driver.reset_pin.pulses, 1);
    }
}

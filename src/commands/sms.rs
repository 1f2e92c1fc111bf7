//! SMS in text mode.

use core::fmt::Write as _;

use embedded_io::Write as _;
use heapless::{String, Vec};

use crate::client::{SaraR4, RESPONSE_OK};
use crate::error::Error;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::SmsMessageFormat;

const CTRL_Z: u8 = 0x1A;
const ESC: u8 = 0x1B;
const SMS_MAX_LEN: usize = 160;

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// `+CMGF` — PDU or text mode.
    pub fn set_sms_message_format(&mut self, format: SmsMessageFormat) -> Result<(), Error> {
        let mut cmd: String<12> = String::new();
        write!(cmd, "+CMGF={}", format as u8).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    /// Send a text-mode SMS as the documented two-stage exchange: `+CMGS`
    /// answered by the `>` prompt, then the raw body terminated by CTRL-Z.
    ///
    /// Once the prompt has been issued the module sits in SMS-entry mode, so
    /// any local failure past that point emits ESC before reporting the
    /// error.
    pub fn send_sms(&mut self, number: &str, message: &str) -> Result<(), Error> {
        let mut cmd: String<44> = String::new();
        write!(cmd, "+CMGS=\"{}\"", number).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, b">", self.config.response_timeout)?;

        let mut body: Vec<u8, { SMS_MAX_LEN + 1 }> = Vec::new();
        if body.extend_from_slice(message.as_bytes()).is_err() || body.push(CTRL_Z).is_err() {
            self.abort_sms_entry();
            return Err(Error::Overflow);
        }
        match self.send_raw_with_response(&body, RESPONSE_OK, self.config.sms_timeout) {
            Err(Error::Write) => {
                self.abort_sms_entry();
                Err(Error::Write)
            }
            result => result,
        }
    }

    fn abort_sms_entry(&mut self) {
        warn!("Aborting SMS entry mode");
        let _ = self.serial.write_all(&[ESC]);
        let _ = self.serial.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fast_config, MockPin, MockSerial};

    fn driver(serial: MockSerial) -> SaraR4<'static, MockSerial, MockPin, MockPin> {
        SaraR4::new(serial, MockPin::new(), MockPin::new(), fast_config())
    }

    #[test]
    fn two_stage_exchange_appends_ctrl_z() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n> ");
        serial.queue_reply(b"\r\n+CMGS: 5\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.send_sms("+15551234567", "hello").unwrap();
        let sent = driver.serial.sent();
        assert!(sent.starts_with("AT+CMGS=\"+15551234567\"\r"));
        assert!(sent.ends_with("hello\u{1a}"));
    }

    #[test]
    fn oversized_body_aborts_entry_mode_with_esc() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n> ");
        let mut driver = driver(serial);
        let long = core::str::from_utf8(&[b'a'; 200]).unwrap().to_owned();
        assert_eq!(driver.send_sms("+15551234567", &long), Err(Error::Overflow));
        let sent = driver.serial.sent();
        // ESC released the module from entry mode; no body bytes were sent.
        assert!(sent.ends_with('\u{1b}'));
        assert!(!sent.contains("aaa"));
    }

    #[test]
    fn missing_prompt_fails_before_any_body_write() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nERROR\r\n");
        let mut driver = driver(serial);
        assert_eq!(
            driver.send_sms("+15551234567", "hello"),
            Err(Error::UnexpectedResponse)
        );
        assert!(!driver.serial.sent().contains("hello"));
    }

    #[test]
    fn format_selection_framing() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.set_sms_message_format(SmsMessageFormat::Text).unwrap();
        assert_eq!(driver.serial.sent(), "AT+CMGF=1\r");
    }
}

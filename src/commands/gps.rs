//! GNSS receiver control and CellLocate requests.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::client::{SaraR4, RESPONSE_OK};
use crate::error::Error;
use crate::nmea::parse_rmc;
use crate::parse;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::{GnssSystem, RmcFix};

const MAX_ULOC_TIMEOUT_S: u16 = 999;
const MAX_ULOC_ACCURACY_M: u32 = 999_999;

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// Whether the GNSS receiver is powered (`+UGPS?`).
    pub fn gps_on(&mut self) -> Result<bool, Error> {
        let capture: Vec<u8, 64> =
            self.send_capturing("+UGPS?", RESPONSE_OK, self.config.gps_timeout)?;
        parse::gps_power_response(&capture).ok_or(Error::UnexpectedResponse)
    }

    /// Power the GNSS receiver up or down (`+UGPS`), with no local aiding.
    pub fn gps_power(&mut self, enable: bool, gnss: GnssSystem) -> Result<(), Error> {
        let mut cmd: String<20> = String::new();
        if enable {
            write!(cmd, "+UGPS=1,0,{}", gnss as u8).map_err(|_| Error::Overflow)?;
        } else {
            cmd.push_str("+UGPS=0").map_err(|_| Error::Overflow)?;
        }
        self.send_with_response(&cmd, RESPONSE_OK, self.config.gps_timeout)
    }

    /// Route `$GPRMC` sentences to the AT interface (`+UGRMC`).
    pub fn gps_enable_rmc(&mut self, enable: bool) -> Result<(), Error> {
        let mut cmd: String<12> = String::new();
        write!(cmd, "+UGRMC={}", u8::from(enable)).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.gps_timeout)
    }

    /// Read and decode the latest stored `$GPRMC` sentence (`+UGRMC?`).
    /// An idle receiver yields a fix with `valid == false`.
    pub fn gps_get_rmc(&mut self) -> Result<RmcFix, Error> {
        let capture: Vec<u8, 160> =
            self.send_capturing("+UGRMC?", RESPONSE_OK, self.config.gps_timeout)?;
        Ok(parse_rmc(&capture))
    }

    /// Kick off a CellLocate position estimate (`+ULOC`). The answer
    /// arrives later as a `+UULOC` event through [`SaraR4::poll`].
    pub fn gps_request(
        &mut self,
        timeout_s: u16,
        accuracy_m: u32,
        detailed: bool,
    ) -> Result<(), Error> {
        let timeout_s = timeout_s.min(MAX_ULOC_TIMEOUT_S);
        let accuracy_m = accuracy_m.min(MAX_ULOC_ACCURACY_M);
        let mut cmd: String<28> = String::new();
        write!(
            cmd,
            "+ULOC=2,3,{},{},{}",
            u8::from(detailed),
            timeout_s,
            accuracy_m
        )
        .map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
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
    fn power_state_query() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n+UGPS: 1,0,1\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        assert!(driver.gps_on().unwrap());
    }

    #[test]
    fn power_up_selects_constellation() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.gps_power(true, GnssSystem::Gps).unwrap();
        assert_eq!(driver.serial.sent(), "AT+UGPS=1,0,1\r");
    }

    #[test]
    fn rmc_query_decodes_sentence() {
        let mut serial = MockSerial::new();
        serial.queue_reply(
            b"\r\n+UGRMC: 1,$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n\r\nOK\r\n",
        );
        let mut driver = driver(serial);
        let fix = driver.gps_get_rmc().unwrap();
        assert!(fix.valid);
        assert_eq!(fix.clock.date.day, 23);
    }

    #[test]
    fn rmc_query_without_fix_is_invalid_not_an_error() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n+UGRMC: 1,$GPRMC,,,,,,,,,,,*00\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        let fix = driver.gps_get_rmc().unwrap();
        assert!(!fix.valid);
        assert_eq!(fix.position.status, 'X');
    }

    #[test]
    fn location_request_clamps_limits() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.gps_request(5_000, 10_000_000, false).unwrap();
        assert_eq!(driver.serial.sent(), "AT+ULOC=2,3,0,999,999999\r");
    }
}

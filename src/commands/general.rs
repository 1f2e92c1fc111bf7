//! Identity, clock, echo, GPIO and rate control.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::client::{SaraR4, RESPONSE_OK};
use crate::config::SUPPORTED_BAUD_RATES;
use crate::error::Error;
use crate::helpers::{first_line, SliceExt};
use crate::parse;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::{ClockData, Functionality, GpioMode, GpioPin};

const IDENTITY_CAPTURE: usize = 64;

fn to_token<const N: usize>(bytes: &[u8]) -> Result<String<N>, Error> {
    let trimmed = bytes.trim_whitespace();
    let end = trimmed
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(trimmed.len());
    let text = core::str::from_utf8(&trimmed[..end]).map_err(|_| Error::UnexpectedResponse)?;
    let mut out = String::new();
    out.push_str(text).map_err(|_| Error::Overflow)?;
    Ok(out)
}

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// Attention probe (`AT`).
    pub fn at(&mut self) -> Result<(), Error> {
        self.send_with_response("", RESPONSE_OK, self.config.response_timeout)
    }

    /// `ATE0` / `ATE1`.
    pub fn enable_echo(&mut self, enable: bool) -> Result<(), Error> {
        let mut cmd: String<4> = String::new();
        write!(cmd, "E{}", u8::from(enable)).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    fn identity<const N: usize>(&mut self, command: &str) -> Result<String<N>, Error> {
        let capture: Vec<u8, IDENTITY_CAPTURE> =
            self.send_capturing(command, RESPONSE_OK, self.config.response_timeout)?;
        let line = first_line(&capture).ok_or(Error::UnexpectedResponse)?;
        to_token(line)
    }

    /// Module IMEI (`+CGSN`).
    pub fn imei(&mut self) -> Result<String<16>, Error> {
        self.identity("+CGSN")
    }

    /// Subscriber IMSI (`+CIMI`).
    pub fn imsi(&mut self) -> Result<String<16>, Error> {
        self.identity("+CIMI")
    }

    /// SIM ICCID (`+CCID`).
    pub fn ccid(&mut self) -> Result<String<22>, Error> {
        let capture: Vec<u8, IDENTITY_CAPTURE> =
            self.send_capturing("+CCID", RESPONSE_OK, self.config.response_timeout)?;
        let rest = parse::after(&capture, b"+CCID:").ok_or(Error::UnexpectedResponse)?;
        to_token(rest)
    }

    /// Network time (`+CCLK?`).
    pub fn clock(&mut self) -> Result<ClockData, Error> {
        let capture: Vec<u8, IDENTITY_CAPTURE> =
            self.send_capturing("+CCLK?", RESPONSE_OK, self.config.response_timeout)?;
        parse::clock_response(&capture).ok_or(Error::UnexpectedResponse)
    }

    /// `+CTZU` — let the network discipline the module clock.
    pub fn set_auto_time_zone(&mut self, enable: bool) -> Result<(), Error> {
        let mut cmd: String<12> = String::new();
        write!(cmd, "+CTZU={}", u8::from(enable)).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    /// Reconfigure the module UART (`+IPR`). The caller reopens its own
    /// interface afterwards.
    pub fn set_baud(&mut self, baud: u32) -> Result<(), Error> {
        if !SUPPORTED_BAUD_RATES.contains(&baud) {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<16> = String::new();
        write!(cmd, "+IPR={}", baud).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.set_baud_timeout)
    }

    /// `+UGPIOC` — assign a function to a module GPIO.
    pub fn set_gpio_mode(&mut self, pin: GpioPin, mode: GpioMode) -> Result<(), Error> {
        let mut cmd: String<20> = String::new();
        write!(cmd, "+UGPIOC={},{}", pin as u8, mode as u8).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    pub fn get_gpio_mode(&mut self, pin: GpioPin) -> Result<GpioMode, Error> {
        let capture: Vec<u8, 128> =
            self.send_capturing("+UGPIOC?", RESPONSE_OK, self.config.response_timeout)?;
        let mode =
            parse::gpio_mode_response(&capture, pin as u8).ok_or(Error::UnexpectedResponse)?;
        GpioMode::try_from(mode).map_err(|_| Error::UnexpectedResponse)
    }

    /// `+CFUN` functionality level.
    pub fn functionality(&mut self, level: Functionality) -> Result<(), Error> {
        let mut cmd: String<12> = String::new();
        write!(cmd, "+CFUN={}", level as u8).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }
}

//! Blocking driver core: command dispatch, response matching and the
//! unsolicited-event pump.

use embassy_time::{Duration, Instant};
use embedded_io::Write as _;
use heapless::Vec;

use crate::config::Config;
use crate::error::Error;
use crate::helpers::{LossyStr, SliceExt};
use crate::matcher::TokenMatcher;
use crate::traits::{
    ControlPin, LocationHandler, SerialInterface, SocketCloseHandler, SocketReadHandler,
};
use crate::types::IpAddress;
use crate::urc::{classify, Urc};

/// Line buffer for the unsolicited-event pump. An unsolicited line that does
/// not fit is dropped whole.
pub const LINE_BUFFER_LEN: usize = 128;

/// Largest payload a single `socket_read` exchange can carry.
pub const SOCKET_READ_LEN: usize = 512;

pub(crate) const RESPONSE_OK: &[u8] = b"OK\r\n";

/// Driver for a SARA-R4 module behind a byte-stream serial interface.
///
/// All command methods are blocking: they dispatch one AT command and scan
/// the receive stream for the expected token until a deadline. Unsolicited
/// result codes arriving between commands are consumed by [`SaraR4::poll`],
/// which the application calls from its idle loop.
pub struct SaraR4<'h, S, PWR, RST> {
    pub(crate) serial: S,
    pub(crate) power_pin: PWR,
    pub(crate) reset_pin: RST,
    pub(crate) config: Config,
    pub(crate) baud: u32,
    pub(crate) last_remote_ip: IpAddress,
    pub(crate) last_local_ip: IpAddress,
    pub(crate) read_handler: Option<&'h mut dyn SocketReadHandler>,
    pub(crate) close_handler: Option<&'h mut dyn SocketCloseHandler>,
    pub(crate) location_handler: Option<&'h mut dyn LocationHandler>,
}

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    pub fn new(serial: S, power_pin: PWR, reset_pin: RST, config: Config) -> Self {
        Self {
            serial,
            power_pin,
            reset_pin,
            config,
            baud: crate::config::DEFAULT_BAUD_RATE,
            last_remote_ip: IpAddress::UNSPECIFIED,
            last_local_ip: IpAddress::UNSPECIFIED,
            read_handler: None,
            close_handler: None,
            location_handler: None,
        }
    }

    /// Give the transport and control pins back.
    pub fn release(self) -> (S, PWR, RST) {
        (self.serial, self.power_pin, self.reset_pin)
    }

    pub fn set_socket_read_handler(&mut self, handler: &'h mut dyn SocketReadHandler) {
        self.read_handler = Some(handler);
    }

    pub fn clear_socket_read_handler(&mut self) {
        self.read_handler = None;
    }

    pub fn set_socket_close_handler(&mut self, handler: &'h mut dyn SocketCloseHandler) {
        self.close_handler = Some(handler);
    }

    pub fn clear_socket_close_handler(&mut self) {
        self.close_handler = None;
    }

    pub fn set_location_handler(&mut self, handler: &'h mut dyn LocationHandler) {
        self.location_handler = Some(handler);
    }

    pub fn clear_location_handler(&mut self) {
        self.location_handler = None;
    }

    /// Remote address of the last accepted incoming connection.
    pub fn last_remote_ip(&self) -> IpAddress {
        self.last_remote_ip
    }

    /// Local address reported with the last accepted incoming connection.
    pub fn last_local_ip(&self) -> IpAddress {
        self.last_local_ip
    }

    /// Discard every byte sitting in the receive buffer. Runs before every
    /// dispatch so a stale response can never satisfy the next command's
    /// matcher.
    pub(crate) fn drain(&mut self) {
        let mut dropped = 0usize;
        while self.serial.read_byte().is_some() {
            dropped += 1;
        }
        if dropped > 0 {
            trace!("Drained {} stale bytes before dispatch", dropped);
        }
    }

    /// Dispatch one command: `AT` + `command` + `\r`.
    pub fn send_command(&mut self, command: &str) -> Result<(), Error> {
        self.drain();
        debug!("TX: AT{}", command);
        self.serial.write_all(b"AT").map_err(|_| Error::Write)?;
        self.serial
            .write_all(command.as_bytes())
            .map_err(|_| Error::Write)?;
        self.serial.write_all(b"\r").map_err(|_| Error::Write)?;
        self.serial.flush().map_err(|_| Error::Write)
    }

    /// Dispatch raw bytes with no `AT` prefix or terminator, for the second
    /// stage of prompt-based exchanges.
    pub fn send_raw(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.drain();
        debug!("TX raw: {:?}", LossyStr(payload));
        self.serial.write_all(payload).map_err(|_| Error::Write)?;
        self.serial.flush().map_err(|_| Error::Write)
    }

    fn wait_for_token(
        &mut self,
        expected: &[u8],
        timeout: Duration,
        mut sink: impl FnMut(u8) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut matcher = TokenMatcher::new(expected);
        let deadline = Instant::now() + timeout;
        let mut seen = false;
        while Instant::now() < deadline {
            let Some(byte) = self.serial.read_byte() else {
                continue;
            };
            seen = true;
            sink(byte)?;
            if matcher.feed(byte) {
                return Ok(());
            }
        }
        if seen {
            Err(Error::UnexpectedResponse)
        } else {
            Err(Error::NoResponse)
        }
    }

    /// Scan the receive stream for `expected` until the deadline.
    pub fn wait_for_response(&mut self, expected: &[u8], timeout: Duration) -> Result<(), Error> {
        self.wait_for_token(expected, timeout, |_| Ok(()))
    }

    /// Like [`Self::wait_for_response`], appending every consumed byte
    /// (matched or not) to `capture`. A full capture buffer fails the
    /// exchange with [`Error::Overflow`].
    pub fn wait_for_response_capturing<const N: usize>(
        &mut self,
        expected: &[u8],
        timeout: Duration,
        capture: &mut Vec<u8, N>,
    ) -> Result<(), Error> {
        self.wait_for_token(expected, timeout, |byte| {
            capture.push(byte).map_err(|_| Error::Overflow)
        })
    }

    pub fn send_with_response(
        &mut self,
        command: &str,
        expected: &[u8],
        timeout: Duration,
    ) -> Result<(), Error> {
        self.send_command(command)?;
        self.wait_for_response(expected, timeout)
    }

    pub fn send_capturing<const N: usize>(
        &mut self,
        command: &str,
        expected: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8, N>, Error> {
        self.send_command(command)?;
        let mut capture = Vec::new();
        self.wait_for_response_capturing(expected, timeout, &mut capture)?;
        trace!("RX: {:?}", LossyStr(&capture));
        Ok(capture)
    }

    pub fn send_raw_with_response(
        &mut self,
        payload: &[u8],
        expected: &[u8],
        timeout: Duration,
    ) -> Result<(), Error> {
        self.send_raw(payload)?;
        self.wait_for_response(expected, timeout)
    }

    /// Service one pending unsolicited line, if any. Returns `Ok(true)` when
    /// a line was recognized and handled, `Ok(false)` when nothing was
    /// pending or the line was not an event this driver routes.
    ///
    /// Call this from the idle loop, never between the stages of a
    /// multi-stage exchange.
    pub fn poll(&mut self) -> Result<bool, Error> {
        if self.serial.available() == 0 {
            return Ok(false);
        }
        // Skip the blank framing lines between events.
        let line;
        loop {
            match self.read_line() {
                Some(l) if !l.trim_whitespace().is_empty() => {
                    line = l;
                    break;
                }
                Some(_) if self.serial.available() > 0 => {}
                _ => return Ok(false),
            }
        }
        let line = line.trim_whitespace();

        match classify(line) {
            Some(Urc::SocketDataAvailable { socket, length }) => {
                let length = length.min(SOCKET_READ_LEN);
                let data = self.socket_read(socket, length)?;
                if let Some(handler) = self.read_handler.take() {
                    handler.on_socket_data(socket, &data);
                    self.read_handler = Some(handler);
                }
                Ok(true)
            }
            Some(Urc::SocketListen {
                remote_ip, local_ip, ..
            }) => {
                self.last_remote_ip = remote_ip;
                self.last_local_ip = local_ip;
                Ok(true)
            }
            Some(Urc::SocketClosed { socket }) => {
                if socket <= crate::config::NUM_SOCKETS {
                    if let Some(handler) = self.close_handler.take() {
                        handler.on_socket_closed(socket);
                        self.close_handler = Some(handler);
                    }
                }
                Ok(true)
            }
            Some(Urc::LocationFix(estimate)) => {
                if let Some(handler) = self.location_handler.take() {
                    handler.on_location(
                        &estimate.clock,
                        &estimate.position,
                        &estimate.speed,
                        estimate.uncertainty,
                    );
                    self.location_handler = Some(handler);
                }
                Ok(true)
            }
            None => {
                debug!("Unrouted line: {:?}", LossyStr(line));
                Ok(false)
            }
        }
    }

    /// One `\n`-terminated line. Bytes beyond the buffer are discarded and
    /// the whole line is dropped (`None`); a line that never terminates
    /// before the deadline is dropped too.
    fn read_line(&mut self) -> Option<Vec<u8, LINE_BUFFER_LEN>> {
        let mut line = Vec::new();
        let mut overflowed = false;
        let deadline = Instant::now() + self.config.response_timeout;
        while Instant::now() < deadline {
            let Some(byte) = self.serial.read_byte() else {
                continue;
            };
            if byte == b'\n' {
                if overflowed {
                    warn!("Dropped overlong unsolicited line");
                    return None;
                }
                return Some(line);
            }
            if line.push(byte).is_err() {
                overflowed = true;
            }
        }
        None
    }
}

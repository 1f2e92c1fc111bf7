//! TCP/UDP sockets on the module's internal stack.

use core::fmt::Write as _;

use embassy_time::Duration;
use embedded_io::Write as _;
use heapless::{String, Vec};

use crate::client::{SaraR4, RESPONSE_OK, SOCKET_READ_LEN};
use crate::config::NUM_SOCKETS;
use crate::error::Error;
use crate::parse;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::SocketProtocol;

// Payload plus response framing (+USORD header, quotes, final OK).
const SOCKET_READ_CAPTURE: usize = SOCKET_READ_LEN + 64;

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// Allocate a socket (`+USOCR`). Returns the module's handle.
    pub fn socket_open(&mut self, protocol: SocketProtocol, local_port: u16) -> Result<u8, Error> {
        let mut cmd: String<24> = String::new();
        write!(cmd, "+USOCR={},{}", protocol as u8, local_port).map_err(|_| Error::Overflow)?;
        let capture: Vec<u8, 64> =
            self.send_capturing(&cmd, RESPONSE_OK, self.config.response_timeout)?;
        parse::socket_open_response(&capture).ok_or(Error::UnexpectedResponse)
    }

    /// Close a socket (`+USOCL`). Closing an already-closed handle is still
    /// a success on the module side.
    pub fn socket_close(&mut self, socket: u8) -> Result<(), Error> {
        self.socket_close_within(socket, self.config.response_timeout)
    }

    pub(crate) fn socket_close_within(
        &mut self,
        socket: u8,
        timeout: Duration,
    ) -> Result<(), Error> {
        if socket >= NUM_SOCKETS {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<12> = String::new();
        write!(cmd, "+USOCL={}", socket).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, timeout)
    }

    /// Connect a TCP socket (`+USOCO`). Allow the full connect timeout; the
    /// module answers only once the handshake resolves.
    pub fn socket_connect(&mut self, socket: u8, address: &str, port: u16) -> Result<(), Error> {
        if socket >= NUM_SOCKETS {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<96> = String::new();
        write!(cmd, "+USOCO={},\"{}\",{}", socket, address, port).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.connect_timeout)
    }

    /// Write to a connected socket as the documented two-stage exchange:
    /// `+USOWR` answered by the `@` prompt, then the raw payload. The
    /// receive buffer is deliberately not drained between the prompt and the
    /// payload.
    pub fn socket_write(&mut self, socket: u8, data: &[u8]) -> Result<(), Error> {
        if socket >= NUM_SOCKETS {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<24> = String::new();
        write!(cmd, "+USOWR={},{}", socket, data.len()).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, b"@", self.config.response_timeout)?;

        self.serial.write_all(data).map_err(|_| Error::Write)?;
        self.serial.flush().map_err(|_| Error::Write)?;
        self.wait_for_response(RESPONSE_OK, self.config.socket_write_timeout)
    }

    /// Fetch `length` bytes of buffered data (`+USORD`). The payload is the
    /// quoted span of the response.
    pub fn socket_read(
        &mut self,
        socket: u8,
        length: usize,
    ) -> Result<Vec<u8, SOCKET_READ_LEN>, Error> {
        if socket >= NUM_SOCKETS || length > SOCKET_READ_LEN {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<24> = String::new();
        write!(cmd, "+USORD={},{}", socket, length).map_err(|_| Error::Overflow)?;
        let capture: Vec<u8, SOCKET_READ_CAPTURE> =
            self.send_capturing(&cmd, RESPONSE_OK, self.config.response_timeout)?;

        let quote = capture
            .iter()
            .position(|&b| b == b'"')
            .ok_or(Error::UnexpectedResponse)?;
        let payload = &capture[quote + 1..];
        let take = length.min(payload.len());
        let mut out = Vec::new();
        out.extend_from_slice(&payload[..take])
            .map_err(|_| Error::Overflow)?;
        Ok(out)
    }

    /// Accept incoming TCP connections on `port` (`+USOLI`). Accepted peers
    /// are announced via `+UUSOLI` and surface through
    /// [`SaraR4::last_remote_ip`].
    pub fn socket_listen(&mut self, socket: u8, port: u16) -> Result<(), Error> {
        if socket >= NUM_SOCKETS {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<24> = String::new();
        write!(cmd, "+USOLI={},{}", socket, port).map_err(|_| Error::Overflow)?;
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
    fn open_returns_module_handle() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n+USOCR: 3\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        assert_eq!(driver.socket_open(SocketProtocol::Tcp, 0).unwrap(), 3);
        assert_eq!(driver.serial.sent(), "AT+USOCR=6,0\r");
    }

    #[test]
    fn udp_protocol_number() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n+USOCR: 0\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.socket_open(SocketProtocol::Udp, 2390).unwrap();
        assert_eq!(driver.serial.sent(), "AT+USOCR=17,2390\r");
    }

    #[test]
    fn write_waits_for_prompt_then_sends_payload() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"@");
        serial.queue_reply(b"\r\n+USOWR: 0,4\r\n\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.socket_write(0, b"ping").unwrap();
        assert_eq!(driver.serial.sent(), "AT+USOWR=0,4\rping");
    }

    #[test]
    fn write_without_prompt_never_sends_payload() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nERROR\r\n");
        let mut driver = driver(serial);
        assert_eq!(
            driver.socket_write(0, b"ping"),
            Err(Error::UnexpectedResponse)
        );
        assert!(!driver.serial.sent().contains("ping"));
    }

    #[test]
    fn read_extracts_quoted_payload_of_requested_length() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\n+USORD: 2,5,\"abcde\"\r\nOK\r\n");
        let mut driver = driver(serial);
        let data = driver.socket_read(2, 5).unwrap();
        assert_eq!(&data[..], &b"abcde"[..]);
        assert_eq!(driver.serial.sent(), "AT+USORD=2,5\r");
    }

    #[test]
    fn read_rejects_oversized_request() {
        let mut driver = driver(MockSerial::new());
        assert_eq!(
            driver.socket_read(0, SOCKET_READ_LEN + 1),
            Err(Error::UnexpectedParam)
        );
    }

    #[test]
    fn socket_handle_bounds_are_checked() {
        let mut driver = driver(MockSerial::new());
        assert_eq!(driver.socket_close(6), Err(Error::UnexpectedParam));
        assert_eq!(
            driver.socket_connect(9, "example.com", 80),
            Err(Error::UnexpectedParam)
        );
        assert!(driver.serial.sent().is_empty());
    }

    #[test]
    fn connect_quotes_the_address() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.socket_connect(0, "example.com", 80).unwrap();
        assert_eq!(driver.serial.sent(), "AT+USOCO=0,\"example.com\",80\r");
    }

    #[test]
    fn listen_framing() {
        let mut serial = MockSerial::new();
        serial.queue_reply(b"\r\nOK\r\n");
        let mut driver = driver(serial);
        driver.socket_listen(1, 1200).unwrap();
        assert_eq!(driver.serial.sent(), "AT+USOLI=1,1200\r");
    }
}

//! Host-side driver for u-blox SARA-R4 LTE CAT M1/NB-IoT modules.
//!
//! The module is driven over a plain AT command serial link. This crate
//! provides the blocking protocol engine (dispatch, token matching with
//! deadlines, multi-stage prompt exchanges), a poll-driven router for
//! unsolicited result codes (socket data, remote close, incoming
//! connections, CellLocate fixes), the bring-up state machine (autobaud and
//! power-on fallback), and a typed command surface covering identity,
//! network registration, operator selection, packet data contexts, SMS,
//! sockets and GNSS.
//!
//! The transport seam is [`SerialInterface`]: [`embedded_io::Write`] plus
//! non-blocking reads and rate control. Timed power and reset pulses go
//! through [`ControlPin`] ([`NoPin`] when a line is not wired).
//!
//! ```ignore
//! let mut modem = SaraR4::new(serial, power_key, NoPin, Config::new());
//! modem.begin(115_200)?;
//!
//! let socket = modem.socket_open(SocketProtocol::Tcp, 0)?;
//! modem.socket_connect(socket, "example.com", 80)?;
//! modem.socket_write(socket, b"ping")?;
//!
//! let mut sink = MyReadSink::default();
//! modem.set_socket_read_handler(&mut sink);
//! loop {
//!     modem.poll()?;
//! }
//! ```
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod bringup;
mod client;
mod commands;
mod config;
mod error;
mod helpers;
mod matcher;
mod nmea;
mod parse;
#[cfg(test)]
mod test_helpers;
mod timer;
mod traits;
mod types;
mod urc;

pub use client::{SaraR4, LINE_BUFFER_LEN, SOCKET_READ_LEN};
pub use config::{Config, DEFAULT_BAUD_RATE, NUM_SOCKETS, SUPPORTED_BAUD_RATES};
pub use error::Error;
pub use nmea::parse_rmc;
pub use traits::{
    ControlPin, LocationHandler, NoPin, SerialInterface, SocketCloseHandler, SocketReadHandler,
};
pub use types::{
    ClockData, DateData, Functionality, GnssSystem, GpioMode, GpioPin, IpAddress,
    MobileNetworkOperator, OperatorInfo, PdpType, PositionData, RegistrationStatus, RmcFix,
    SmsMessageFormat, SocketProtocol, SpeedData, TimeData,
};

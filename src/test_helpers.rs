//! Shared mocks for the unit tests: a scripted serial port and a recording
//! control pin.

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embassy_time::Duration;
use embedded_io::ErrorType;

use crate::config::Config;
use crate::traits::{ControlPin, SerialInterface};

/// Timeouts shortened so failing exchanges resolve in milliseconds.
pub fn fast_config() -> Config {
    Config::new()
        .response_timeout(Duration::from_millis(50))
        .set_baud_timeout(Duration::from_millis(20))
        .connect_timeout(Duration::from_millis(50))
        .socket_write_timeout(Duration::from_millis(50))
        .sms_timeout(Duration::from_millis(50))
        .operator_timeout(Duration::from_millis(50))
        .gps_timeout(Duration::from_millis(50))
        .power_pulse(Duration::from_millis(1))
        .reset_pulse(Duration::from_millis(1))
        .settle_delay(Duration::from_millis(1))
}

#[derive(Debug)]
pub struct IoError;

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// Serial port double. Writes accumulate in `tx`; each `flush` moves the
/// next scripted reply into the receive buffer, so one queued reply answers
/// one dispatched command.
pub struct MockSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    pub bauds: Vec<u32>,
    pub fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            replies: VecDeque::new(),
            bauds: Vec::new(),
            fail_writes: false,
        }
    }

    /// Bytes already sitting in the receive buffer (unsolicited data).
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Script the reply delivered by the next flushed command.
    pub fn queue_reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    /// Everything the driver wrote, lossily decoded.
    pub fn sent(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }

}

impl ErrorType for MockSerial {
    type Error = IoError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(IoError);
        }
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }
}

impl SerialInterface for MockSerial {
    fn set_baud(&mut self, baud: u32) -> Result<(), Self::Error> {
        self.bauds.push(baud);
        Ok(())
    }

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// Control pin recording completed low pulses.
pub struct MockPin {
    low: bool,
    pub pulses: usize,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            low: false,
            pulses: 0,
        }
    }
}

impl ControlPin for MockPin {
    fn drive_low(&mut self) {
        self.low = true;
    }

    fn release(&mut self) {
        if self.low {
            self.pulses += 1;
        }
        self.low = false;
    }
}

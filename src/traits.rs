use crate::types::{ClockData, PositionData, SpeedData};

/// Byte-stream transport to the module.
///
/// The write half is [`embedded_io::Write`]; this trait adds the non-blocking
/// read half and rate control the driver needs. The stream is unframed apart
/// from `\n`-terminated response lines.
pub trait SerialInterface: embedded_io::Write {
    /// Reconfigure the interface for a new baud rate.
    fn set_baud(&mut self, baud: u32) -> Result<(), Self::Error>;

    /// Number of bytes ready to be read without blocking.
    fn available(&self) -> usize;

    /// Pop one received byte, `None` when the receive buffer is empty.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Active-low control line (power key or hardware reset).
pub trait ControlPin {
    fn drive_low(&mut self);
    fn release(&mut self);
}

/// Stand-in for a control line that is not wired up.
pub struct NoPin;

impl ControlPin for NoPin {
    fn drive_low(&mut self) {}
    fn release(&mut self) {}
}

/// Receives payloads announced by `+UUSORD` and fetched during `poll`.
pub trait SocketReadHandler {
    fn on_socket_data(&mut self, socket: u8, data: &[u8]);
}

/// Receives `+UUSOCL` remote-close notifications.
pub trait SocketCloseHandler {
    fn on_socket_closed(&mut self, socket: u8);
}

/// Receives `+UULOC` location estimates.
pub trait LocationHandler {
    fn on_location(
        &mut self,
        clock: &ClockData,
        position: &PositionData,
        speed: &SpeedData,
        uncertainty: u32,
    );
}

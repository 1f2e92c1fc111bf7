use embassy_time::Duration;

/// Baud rates the module can negotiate, in autobaud probe order.
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [115_200, 9_600, 19_200, 38_400, 57_600, 230_400];

/// Rate the module falls back to after a reset.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Number of socket handles the module exposes (0..NUM_SOCKETS).
pub const NUM_SOCKETS: u8 = 6;

/// Timing knobs for the driver. All timeouts mirror the module datasheet
/// defaults; tests shorten them to keep mock exchanges fast.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) response_timeout: Duration,
    pub(crate) set_baud_timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) socket_write_timeout: Duration,
    pub(crate) sms_timeout: Duration,
    pub(crate) operator_timeout: Duration,
    pub(crate) gps_timeout: Duration,
    pub(crate) power_pulse: Duration,
    pub(crate) reset_pulse: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) bringup_attempts: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            response_timeout: Duration::from_millis(1_000),
            set_baud_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(60_000),
            socket_write_timeout: Duration::from_millis(10_000),
            sms_timeout: Duration::from_millis(180_000),
            operator_timeout: Duration::from_millis(180_000),
            gps_timeout: Duration::from_millis(10_000),
            power_pulse: Duration::from_millis(3_200),
            reset_pulse: Duration::from_millis(10_000),
            settle_delay: Duration::from_millis(200),
            bringup_attempts: 5,
        }
    }

    /// Deadline for ordinary command/response exchanges.
    #[must_use]
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Deadline for the `+IPR` exchange during autobaud probing.
    #[must_use]
    pub const fn set_baud_timeout(mut self, timeout: Duration) -> Self {
        self.set_baud_timeout = timeout;
        self
    }

    /// Deadline for `socket_connect`.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Deadline for the payload stage of `socket_write`.
    #[must_use]
    pub const fn socket_write_timeout(mut self, timeout: Duration) -> Self {
        self.socket_write_timeout = timeout;
        self
    }

    /// Deadline for the body stage of `send_sms`.
    #[must_use]
    pub const fn sms_timeout(mut self, timeout: Duration) -> Self {
        self.sms_timeout = timeout;
        self
    }

    /// Deadline for `+COPS` registration and scan exchanges.
    #[must_use]
    pub const fn operator_timeout(mut self, timeout: Duration) -> Self {
        self.operator_timeout = timeout;
        self
    }

    /// Deadline for GNSS exchanges (`+UGRMC`, `+UGPS`).
    #[must_use]
    pub const fn gps_timeout(mut self, timeout: Duration) -> Self {
        self.gps_timeout = timeout;
        self
    }

    /// Width of the low pulse on the power pin.
    #[must_use]
    pub const fn power_pulse(mut self, width: Duration) -> Self {
        self.power_pulse = width;
        self
    }

    /// Width of the low pulse on the reset pin.
    #[must_use]
    pub const fn reset_pulse(mut self, width: Duration) -> Self {
        self.reset_pulse = width;
        self
    }

    /// Pause after reopening the serial interface at a new rate.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// How many probe states `begin` walks before giving up.
    #[must_use]
    pub const fn bringup_attempts(mut self, attempts: u8) -> Self {
        self.bringup_attempts = attempts;
        self
    }
}

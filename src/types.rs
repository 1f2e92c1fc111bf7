//! Typed values exchanged with the module.

use heapless::String;

/// Calendar date as reported by `+CCLK` / `+UULOC`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateData {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

/// Wall-clock time. `tz` is the network offset in quarter-hours and is only
/// populated by `clock()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeData {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub ms: u16,
    pub tz: i8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockData {
    pub date: DateData,
    pub time: TimeData,
}

/// Position fields of an RMC sentence or a `+UULOC` estimate. Char fields
/// default to `'X'` when the source field is empty.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionData {
    pub utc: f32,
    pub status: char,
    pub lat: f32,
    pub lat_dir: char,
    pub lon: f32,
    pub lon_dir: char,
    pub alt: f32,
    pub mode: char,
}

impl Default for PositionData {
    fn default() -> Self {
        Self {
            utc: 0.0,
            status: 'X',
            lat: 0.0,
            lat_dir: 'X',
            lon: 0.0,
            lon_dir: 'X',
            alt: 0.0,
            mode: 'X',
        }
    }
}

/// Ground speed fields of an RMC sentence.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedData {
    /// Knots.
    pub speed: f32,
    /// Degrees.
    pub track: f32,
    pub mag_var: f32,
    pub mag_var_dir: char,
}

impl Default for SpeedData {
    fn default() -> Self {
        Self {
            speed: 0.0,
            track: 0.0,
            mag_var: 0.0,
            mag_var_dir: 'X',
        }
    }
}

/// Decoded `$GPRMC` sentence. `valid` mirrors the sentence status field
/// (`'A'` = active fix).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RmcFix {
    pub position: PositionData,
    pub clock: ClockData,
    pub speed: SpeedData,
    pub valid: bool,
}

/// IPv4 address in dotted-quad responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpAddress(pub [u8; 4]);

impl IpAddress {
    pub const UNSPECIFIED: Self = Self([0, 0, 0, 0]);

    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }
}

impl core::fmt::Display for IpAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// `+UMNOPROF` operator profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MobileNetworkOperator {
    SwDefault = 0,
    SimIccid = 1,
    Att = 2,
    Verizon = 3,
    Telstra = 4,
    TMobile = 5,
    ChinaTelecom = 6,
}

impl TryFrom<u8> for MobileNetworkOperator {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::SwDefault),
            1 => Ok(Self::SimIccid),
            2 => Ok(Self::Att),
            3 => Ok(Self::Verizon),
            4 => Ok(Self::Telstra),
            5 => Ok(Self::TMobile),
            6 => Ok(Self::ChinaTelecom),
            _ => Err(()),
        }
    }
}

/// `+CREG` network registration states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    NotRegistered = 0,
    RegisteredHome = 1,
    Searching = 2,
    RegistrationDenied = 3,
    RegistrationUnknown = 4,
    RegisteredRoaming = 5,
    RegisteredHomeSmsOnly = 6,
    RegisteredRoamingSmsOnly = 7,
    RegisteredHomeCsfbNotPreferred = 8,
    RegisteredRoamingCsfbNotPreferred = 9,
}

impl TryFrom<u8> for RegistrationStatus {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::NotRegistered),
            1 => Ok(Self::RegisteredHome),
            2 => Ok(Self::Searching),
            3 => Ok(Self::RegistrationDenied),
            4 => Ok(Self::RegistrationUnknown),
            5 => Ok(Self::RegisteredRoaming),
            6 => Ok(Self::RegisteredHomeSmsOnly),
            7 => Ok(Self::RegisteredRoamingSmsOnly),
            8 => Ok(Self::RegisteredHomeCsfbNotPreferred),
            9 => Ok(Self::RegisteredRoamingCsfbNotPreferred),
            _ => Err(()),
        }
    }
}

/// `+USOCR` protocol numbers (IANA).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocketProtocol {
    Tcp = 6,
    Udp = 17,
}

/// `+CMGF` message formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmsMessageFormat {
    Pdu = 0,
    Text = 1,
}

/// `+CGDCONT` PDP context types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PdpType {
    Ip,
    NonIp,
    Ipv4v6,
    Ipv6,
}

impl PdpType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ip => "IP",
            Self::NonIp => "NONIP",
            Self::Ipv4v6 => "IPV4V6",
            Self::Ipv6 => "IPV6",
        }
    }
}

/// Module GPIO pins addressable through `+UGPIOC`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPin {
    Gpio1 = 16,
    Gpio2 = 23,
    Gpio3 = 24,
    Gpio4 = 25,
    Gpio5 = 42,
    Gpio6 = 19,
}

/// `+UGPIOC` pin functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
    Output = 0,
    Input = 1,
    NetworkStatus = 2,
    GnssSupplyEnable = 3,
    GnssDataReady = 4,
    GnssRtcSharing = 5,
    SimCardDetection = 6,
    HeadsetDetection = 7,
    GsmTxBurstIndication = 8,
    ModuleOperatingStatusIndication = 9,
    ModuleFunctionalityStatusIndication = 10,
    I2sDigitalAudioInterface = 11,
    SpiSerialInterface = 12,
    MasterClockGeneration = 13,
    UartInterface = 14,
    WifiEnable = 15,
    RingIndication = 16,
    LastGaspEnable = 17,
    PadDisabled = 255,
}

impl TryFrom<u8> for GpioMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        Ok(match value {
            0 => Self::Output,
            1 => Self::Input,
            2 => Self::NetworkStatus,
            3 => Self::GnssSupplyEnable,
            4 => Self::GnssDataReady,
            5 => Self::GnssRtcSharing,
            6 => Self::SimCardDetection,
            7 => Self::HeadsetDetection,
            8 => Self::GsmTxBurstIndication,
            9 => Self::ModuleOperatingStatusIndication,
            10 => Self::ModuleFunctionalityStatusIndication,
            11 => Self::I2sDigitalAudioInterface,
            12 => Self::SpiSerialInterface,
            13 => Self::MasterClockGeneration,
            14 => Self::UartInterface,
            15 => Self::WifiEnable,
            16 => Self::RingIndication,
            17 => Self::LastGaspEnable,
            255 => Self::PadDisabled,
            _ => return Err(()),
        })
    }
}

/// GNSS constellation selection bits for `+UGPS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssSystem {
    Gps = 1,
    Sbas = 2,
    Galileo = 4,
    Beidou = 8,
    Imes = 16,
    Qzss = 32,
    Glonass = 64,
}

/// `+CFUN` functionality levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Functionality {
    Minimum = 0,
    Full = 1,
    SilentReset = 15,
    SilentResetWithSim = 16,
}

/// One operator entry from a `+COPS=?` scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorInfo {
    pub stat: u8,
    pub long_name: String<26>,
    pub short_name: String<11>,
    pub numeric: u32,
    pub act: u8,
}

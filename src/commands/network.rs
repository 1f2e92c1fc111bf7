//! Registration, operator selection and packet data context.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::client::{SaraR4, RESPONSE_OK};
use crate::error::Error;
use crate::parse;
use crate::traits::{ControlPin, SerialInterface};
use crate::types::{
    Functionality, IpAddress, MobileNetworkOperator, OperatorInfo, PdpType, RegistrationStatus,
};

const MAX_CONTEXT_ID: u8 = 7;

impl<'h, S, PWR, RST> SaraR4<'h, S, PWR, RST>
where
    S: SerialInterface,
    PWR: ControlPin,
    RST: ControlPin,
{
    /// Signal quality (`+CSQ`), 0..=31 or 99 when unknown.
    pub fn rssi(&mut self) -> Result<u8, Error> {
        let capture: Vec<u8, 64> =
            self.send_capturing("+CSQ", RESPONSE_OK, self.config.response_timeout)?;
        parse::rssi_response(&capture).ok_or(Error::UnexpectedResponse)
    }

    /// Network registration state (`+CREG?`).
    pub fn registration(&mut self) -> Result<RegistrationStatus, Error> {
        let capture: Vec<u8, 64> =
            self.send_capturing("+CREG?", RESPONSE_OK, self.config.response_timeout)?;
        let stat = parse::registration_response(&capture).ok_or(Error::UnexpectedResponse)?;
        RegistrationStatus::try_from(stat).map_err(|_| Error::UnexpectedResponse)
    }

    /// Active operator profile (`+UMNOPROF?`).
    pub fn get_network(&mut self) -> Result<MobileNetworkOperator, Error> {
        let capture: Vec<u8, 64> =
            self.send_capturing("+UMNOPROF?", RESPONSE_OK, self.config.response_timeout)?;
        let mno = parse::mno_response(&capture).ok_or(Error::UnexpectedResponse)?;
        MobileNetworkOperator::try_from(mno).map_err(|_| Error::UnexpectedResponse)
    }

    fn set_mno(&mut self, mno: MobileNetworkOperator) -> Result<(), Error> {
        let mut cmd: String<16> = String::new();
        write!(cmd, "+UMNOPROF={}", mno as u8).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    /// Select an operator profile. A profile change only takes effect after
    /// a reset, so the sequence is: minimum functionality, reprofile, silent
    /// reset and session renegotiation. Any failing step aborts the
    /// remainder.
    pub fn set_network(&mut self, mno: MobileNetworkOperator) -> Result<(), Error> {
        if self.get_network()? == mno {
            return Ok(());
        }
        self.functionality(Functionality::Minimum)?;
        self.set_mno(mno)?;
        self.reset()
    }

    /// Define the packet data context (`+CGDCONT`).
    pub fn set_apn(&mut self, apn: &str, cid: u8, pdp: PdpType) -> Result<(), Error> {
        if cid > MAX_CONTEXT_ID {
            return Err(Error::UnexpectedParam);
        }
        let mut cmd: String<96> = String::new();
        write!(cmd, "+CGDCONT={},\"{}\",\"{}\"", cid, pdp.as_str(), apn)
            .map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.response_timeout)
    }

    /// Read back the packet data context: APN and assigned address.
    pub fn get_apn(&mut self) -> Result<(String<64>, IpAddress), Error> {
        let capture: Vec<u8, 192> =
            self.send_capturing("+CGDCONT?", RESPONSE_OK, self.config.response_timeout)?;
        parse::apn_response(&capture).ok_or(Error::UnexpectedResponse)
    }

    /// Currently selected operator (`+COPS?`).
    pub fn get_operator(&mut self) -> Result<String<24>, Error> {
        let capture: Vec<u8, 96> =
            self.send_capturing("+COPS?", RESPONSE_OK, self.config.operator_timeout)?;
        let (mode, name) = parse::operator_response(&capture).ok_or(Error::UnexpectedResponse)?;
        if mode == 2 {
            return Err(Error::Deregistered);
        }
        name.ok_or(Error::Deregistered)
    }

    /// Manually register with an operator by its numeric MCC/MNC code.
    pub fn register_operator(&mut self, numeric: u32) -> Result<(), Error> {
        let mut cmd: String<24> = String::new();
        write!(cmd, "+COPS=1,2,\"{}\"", numeric).map_err(|_| Error::Overflow)?;
        self.send_with_response(&cmd, RESPONSE_OK, self.config.operator_timeout)
    }

    /// Drop the current operator registration.
    pub fn deregister_operator(&mut self) -> Result<(), Error> {
        self.send_with_response("+COPS=2", RESPONSE_OK, self.config.operator_timeout)
    }

    /// Scan for visible operators (`+COPS=?`). Slow; expect minutes on a
    /// congested band.
    pub fn get_operators<const N: usize>(&mut self) -> Result<Vec<OperatorInfo, N>, Error> {
        let capture: Vec<u8, 512> =
            self.send_capturing("+COPS=?", RESPONSE_OK, self.config.operator_timeout)?;
        let mut operators = Vec::new();
        parse::operators_response(&capture, &mut operators);
        Ok(operators)
    }
}

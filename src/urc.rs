//! Classification of unsolicited result codes.
//!
//! `poll` hands each received line to [`classify`]; the first matching
//! pattern wins, in the fixed priority order data-available, incoming
//! connection, remote close, location estimate.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, space0},
    character::complete::{u16 as dec_u16, u32 as dec_u32, u8 as dec_u8},
    combinator::opt,
    sequence::{preceded, separated_pair, tuple},
    IResult,
};

use crate::parse::{decimal_degrees, quoted_ip};
use crate::types::{ClockData, IpAddress, PositionData, SpeedData};

/// A `+UULOC` answer, assembled for the location handler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LocationEstimate {
    pub clock: ClockData,
    pub position: PositionData,
    pub speed: SpeedData,
    pub uncertainty: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Urc {
    /// `+UUSORD: <socket>,<length>` — data waiting in the module's buffer.
    SocketDataAvailable { socket: u8, length: usize },
    /// `+UUSOLI: <socket>,"<remote>",<port>,<listen>,"<local>",<lport>` —
    /// an inbound connection was accepted on a listening socket. Valid with
    /// only the remote address populated.
    SocketListen {
        socket: u8,
        remote_ip: IpAddress,
        remote_port: u16,
        listen_socket: u8,
        local_ip: IpAddress,
        listen_port: u16,
    },
    /// `+UUSOCL: <socket>` — the peer closed the connection.
    SocketClosed { socket: u8 },
    /// `+UULOC: ...` — a CellLocate position estimate.
    LocationFix(LocationEstimate),
}

pub(crate) fn classify(line: &[u8]) -> Option<Urc> {
    alt((socket_data, socket_listen, socket_closed, location))(line)
        .ok()
        .map(|(_, urc)| urc)
}

fn socket_data(i: &[u8]) -> IResult<&[u8], Urc> {
    let (i, _) = tag("+UUSORD:")(i)?;
    let (i, _) = space0(i)?;
    let (i, (socket, length)) = separated_pair(dec_u8, char(','), dec_u16)(i)?;
    Ok((
        i,
        Urc::SocketDataAvailable {
            socket,
            length: usize::from(length),
        },
    ))
}

fn socket_listen(i: &[u8]) -> IResult<&[u8], Urc> {
    let (i, _) = tag("+UUSOLI:")(i)?;
    let (i, _) = space0(i)?;
    let (i, socket) = dec_u8(i)?;
    let (i, _) = char(',')(i)?;
    let (i, remote_ip) = quoted_ip(i)?;
    let (i, rest) = opt(tuple((
        preceded(char(','), dec_u16),
        preceded(char(','), dec_u8),
        preceded(char(','), quoted_ip),
        preceded(char(','), dec_u16),
    )))(i)?;
    let (remote_port, listen_socket, local_ip, listen_port) =
        rest.unwrap_or((0, 0, IpAddress::UNSPECIFIED, 0));
    Ok((
        i,
        Urc::SocketListen {
            socket,
            remote_ip,
            remote_port,
            listen_socket,
            local_ip,
            listen_port,
        },
    ))
}

fn socket_closed(i: &[u8]) -> IResult<&[u8], Urc> {
    let (i, _) = tag("+UUSOCL:")(i)?;
    let (i, socket) = preceded(space0, dec_u8)(i)?;
    Ok((i, Urc::SocketClosed { socket }))
}

// `+UULOC: <dd>/<mm>/<yyyy>,<hh>:<mm>:<ss>.<ms>,<lat>,<lon>,<alt>,<uncertainty>
// [,<speed>,<track>]`. Everything up to the uncertainty is mandatory; the
// speed/track pair is all-or-nothing.
fn location(i: &[u8]) -> IResult<&[u8], Urc> {
    let (i, _) = tag("+UULOC:")(i)?;
    let (i, _) = space0(i)?;
    let (i, (day, _, month, _, year)) = tuple((dec_u8, char('/'), dec_u8, char('/'), dec_u16))(i)?;
    let (i, _) = char(',')(i)?;
    let (i, (hour, _, minute, _, second)) =
        tuple((dec_u8, char(':'), dec_u8, char(':'), dec_u8))(i)?;
    let (i, ms) = preceded(char('.'), dec_u16)(i)?;
    let (i, _) = char(',')(i)?;
    let (i, lat) = decimal_degrees(i)?;
    let (i, _) = char(',')(i)?;
    let (i, lon) = decimal_degrees(i)?;
    let (i, _) = char(',')(i)?;
    let (i, alt) = dec_u32(i)?;
    let (i, _) = char(',')(i)?;
    let (i, uncertainty) = dec_u32(i)?;
    let (i, motion) = opt(tuple((
        preceded(char(','), dec_u32),
        preceded(char(','), dec_u32),
    )))(i)?;

    let mut estimate = LocationEstimate {
        clock: ClockData::default(),
        position: PositionData::default(),
        speed: SpeedData::default(),
        uncertainty,
    };
    estimate.clock.date.day = day;
    estimate.clock.date.month = month;
    estimate.clock.date.year = year;
    estimate.clock.time.hour = hour;
    estimate.clock.time.minute = minute;
    estimate.clock.time.second = second;
    estimate.clock.time.ms = ms;
    estimate.position.lat = lat;
    estimate.position.lon = lon;
    estimate.position.alt = alt as f32;
    if let Some((speed, track)) = motion {
        estimate.speed.speed = speed as f32;
        estimate.speed.track = track as f32;
    }
    Ok((i, Urc::LocationFix(estimate)))
}

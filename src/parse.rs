//! Field extraction for AT response payloads, built on `nom`.
//!
//! Responses arrive as whole captured buffers (echo line, payload line(s),
//! final `OK`), so all parsers here are `complete` and are anchored on the
//! response prefix (`+CSQ:`, `+CGDCONT:`, ...) rather than on line position.

use heapless::{String, Vec};
use nom::{
    bytes::complete::take_while,
    character::complete::{char, digit1, one_of, space0},
    character::complete::{u16 as dec_u16, u32 as dec_u32, u8 as dec_u8},
    combinator::opt,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};

use crate::helpers::{find_subsequence, SliceExt};
use crate::types::{ClockData, IpAddress, OperatorInfo};

/// Slice following the first occurrence of `needle`.
pub(crate) fn after<'a>(haystack: &'a [u8], needle: &[u8]) -> Option<&'a [u8]> {
    find_subsequence(haystack, needle).map(|idx| &haystack[idx + needle.len()..])
}

pub(crate) fn ip_address(i: &[u8]) -> IResult<&[u8], IpAddress> {
    let (i, (a, _, b, _, c, _, d)) =
        tuple((dec_u8, char('.'), dec_u8, char('.'), dec_u8, char('.'), dec_u8))(i)?;
    Ok((i, IpAddress([a, b, c, d])))
}

pub(crate) fn quoted_ip(i: &[u8]) -> IResult<&[u8], IpAddress> {
    delimited(char('"'), ip_address, char('"'))(i)
}

fn quoted_str(i: &[u8]) -> IResult<&[u8], &[u8]> {
    delimited(char('"'), take_while(|b| b != b'"'), char('"'))(i)
}

/// `<whole>.<frac>` where the fraction is reconstructed as an integer scaled
/// by its digit count, e.g. `48.0703` -> 48 + 703/10000... the leading zeros
/// of the fraction are significant.
pub(crate) fn decimal_degrees(i: &[u8]) -> IResult<&[u8], f32> {
    let (i, whole) = dec_u16(i)?;
    let (i, frac) = preceded(char('.'), digit1)(i)?;
    let mut scale = 1u64;
    let mut value = 0u64;
    for &d in frac {
        if scale >= 1_000_000_000 {
            break;
        }
        scale *= 10;
        value = value * 10 + u64::from(d - b'0');
    }
    Ok((i, f32::from(whole) + value as f32 / scale as f32))
}

fn to_bounded_string<const N: usize>(bytes: &[u8]) -> String<N> {
    let mut s = String::new();
    if let Ok(text) = core::str::from_utf8(bytes) {
        for ch in text.chars() {
            if s.push(ch).is_err() {
                break;
            }
        }
    }
    s
}

/// `+CCLK: "yy/MM/dd,hh:mm:ss±tz"`, tz in quarter-hours.
pub(crate) fn clock_response(buf: &[u8]) -> Option<ClockData> {
    let rest = after(buf, b"+CCLK:")?;
    let (_, clock) = cclk_payload(rest).ok()?;
    Some(clock)
}

fn cclk_payload(i: &[u8]) -> IResult<&[u8], ClockData> {
    let (i, _) = space0(i)?;
    let (i, _) = char('"')(i)?;
    let (i, (year, _, month, _, day)) = tuple((dec_u8, char('/'), dec_u8, char('/'), dec_u8))(i)?;
    let (i, _) = char(',')(i)?;
    let (i, (hour, _, minute, _, second)) =
        tuple((dec_u8, char(':'), dec_u8, char(':'), dec_u8))(i)?;
    let (i, sign) = one_of("+-")(i)?;
    let (i, tz) = dec_u8(i)?;
    let (i, _) = char('"')(i)?;

    let mut clock = ClockData::default();
    // Two-digit year, as reported.
    clock.date.year = u16::from(year);
    clock.date.month = month;
    clock.date.day = day;
    clock.time.hour = hour;
    clock.time.minute = minute;
    clock.time.second = second;
    clock.time.tz = if sign == '-' { -(tz as i8) } else { tz as i8 };
    Ok((i, clock))
}

/// `+CSQ: <rssi>,<ber>` -> rssi.
pub(crate) fn rssi_response(buf: &[u8]) -> Option<u8> {
    let rest = after(buf, b"+CSQ:")?;
    let (_, (rssi, _ber)) = csq_payload(rest).ok()?;
    Some(rssi)
}

fn csq_payload(i: &[u8]) -> IResult<&[u8], (u8, u8)> {
    preceded(space0, separated_pair(dec_u8, char(','), dec_u8))(i)
}

/// `+CREG: <n>,<stat>` -> stat.
pub(crate) fn registration_response(buf: &[u8]) -> Option<u8> {
    let rest = after(buf, b"+CREG:")?;
    let (_, (_n, stat)) = creg_payload(rest).ok()?;
    Some(stat)
}

fn creg_payload(i: &[u8]) -> IResult<&[u8], (u8, u8)> {
    preceded(space0, separated_pair(dec_u8, char(','), dec_u8))(i)
}

/// `+USOCR: <socket>` -> allocated socket handle.
pub(crate) fn socket_open_response(buf: &[u8]) -> Option<u8> {
    let rest = after(buf, b"+USOCR:")?;
    let (_, socket) = preceded(space0::<_, nom::error::Error<&[u8]>>, dec_u8)(rest).ok()?;
    Some(socket)
}

/// `+CGDCONT: <cid>,"<type>","<apn>","<ip>",...` -> (apn, ip).
pub(crate) fn apn_response(buf: &[u8]) -> Option<(String<64>, IpAddress)> {
    let rest = after(buf, b"+CGDCONT:")?;
    let (_, (apn, ip)) = cgdcont_payload(rest).ok()?;
    Some((to_bounded_string(apn), ip))
}

fn cgdcont_payload(i: &[u8]) -> IResult<&[u8], (&[u8], IpAddress)> {
    let (i, _) = space0(i)?;
    let (i, _cid) = dec_u8(i)?;
    let (i, _) = char(',')(i)?;
    let (i, _pdp) = quoted_str(i)?;
    let (i, _) = char(',')(i)?;
    let (i, apn) = quoted_str(i)?;
    let (i, _) = char(',')(i)?;
    let (i, ip) = quoted_ip(i)?;
    Ok((i, (apn, ip)))
}

/// `+COPS: <mode>[,<format>,"<oper>"[,<act>]]` -> (mode, operator name).
pub(crate) fn operator_response(buf: &[u8]) -> Option<(u8, Option<String<24>>)> {
    let rest = after(buf, b"+COPS:")?;
    let (_, (mode, name)) = cops_payload(rest).ok()?;
    Some((mode, name.map(to_bounded_string)))
}

fn cops_payload(i: &[u8]) -> IResult<&[u8], (u8, Option<&[u8]>)> {
    let (i, _) = space0(i)?;
    let (i, mode) = dec_u8(i)?;
    let (i, name) = opt(preceded(
        tuple((char(','), dec_u8, char(','))),
        quoted_str,
    ))(i)?;
    Ok((i, (mode, name)))
}

/// `+COPS: (<stat>,"<long>","<short>","<numeric>",<act>),(...)` scan result.
/// Fills `out` until the list or its capacity is exhausted; the trailing
/// supported-modes groups fail the entry parser and are skipped.
pub(crate) fn operators_response<const N: usize>(
    buf: &[u8],
    out: &mut Vec<OperatorInfo, N>,
) -> usize {
    let Some(mut rest) = after(buf, b"+COPS:") else {
        return 0;
    };
    while let Some(start) = rest.iter().position(|&b| b == b'(') {
        match cops_entry(&rest[start..]) {
            Ok((remaining, op)) => {
                if out.push(op).is_err() {
                    break;
                }
                rest = remaining;
            }
            Err(_) => rest = &rest[start + 1..],
        }
    }
    out.len()
}

fn cops_entry(i: &[u8]) -> IResult<&[u8], OperatorInfo> {
    let (i, _) = char('(')(i)?;
    let (i, stat) = dec_u8(i)?;
    let (i, _) = char(',')(i)?;
    let (i, long_name) = quoted_str(i)?;
    let (i, _) = char(',')(i)?;
    let (i, short_name) = quoted_str(i)?;
    let (i, _) = char(',')(i)?;
    let (i, numeric) = delimited(char('"'), dec_u32, char('"'))(i)?;
    let (i, _) = char(',')(i)?;
    let (i, act) = dec_u8(i)?;
    let (i, _) = char(')')(i)?;
    Ok((
        i,
        OperatorInfo {
            stat,
            long_name: to_bounded_string(long_name),
            short_name: to_bounded_string(short_name),
            numeric,
            act,
        },
    ))
}

/// `+UMNOPROF: <mno>` -> first profile digit in the response.
pub(crate) fn mno_response(buf: &[u8]) -> Option<u8> {
    let rest = after(buf, b"+UMNOPROF:")?;
    rest.iter()
        .find(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

/// `+UGPIOC` responses list one `<pin>,<mode>` pair per line.
pub(crate) fn gpio_mode_response(buf: &[u8], pin: u8) -> Option<u8> {
    for line in buf.split(|&b| b == b'\n') {
        let parsed: IResult<&[u8], (u8, u8)> =
            separated_pair(dec_u8, char(','), dec_u8)(line.trim_whitespace());
        if let Ok((_, (p, mode))) = parsed {
            if p == pin {
                return Some(mode);
            }
        }
    }
    None
}

/// `+UGPS: <on>[,...]` -> receiver power state.
pub(crate) fn gps_power_response(buf: &[u8]) -> Option<bool> {
    let rest = after(buf, b"+UGPS:")?;
    let (_, on) = preceded(space0::<_, nom::error::Error<&[u8]>>, dec_u8)(rest).ok()?;
    Some(on == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_with_negative_offset() {
        let clock = clock_response(b"\r\n+CCLK: \"18/10/12,08:20:45-16\"\r\n\r\nOK\r\n").unwrap();
        assert_eq!(clock.date.year, 18);
        assert_eq!(clock.date.month, 10);
        assert_eq!(clock.date.day, 12);
        assert_eq!(clock.time.hour, 8);
        assert_eq!(clock.time.minute, 20);
        assert_eq!(clock.time.second, 45);
        assert_eq!(clock.time.tz, -16);
    }

    #[test]
    fn clock_with_positive_offset() {
        let clock = clock_response(b"+CCLK: \"24/01/02,23:59:01+08\"").unwrap();
        assert_eq!(clock.time.tz, 8);
    }

    #[test]
    fn rssi_field_only() {
        assert_eq!(rssi_response(b"\r\n+CSQ: 14,99\r\n\r\nOK\r\n"), Some(14));
        assert_eq!(rssi_response(b"\r\nOK\r\n"), None);
    }

    #[test]
    fn registration_takes_second_field() {
        assert_eq!(registration_response(b"\r\n+CREG: 0,5\r\n\r\nOK\r\n"), Some(5));
    }

    #[test]
    fn socket_open_handle() {
        assert_eq!(socket_open_response(b"\r\n+USOCR: 3\r\n\r\nOK\r\n"), Some(3));
    }

    #[test]
    fn apn_and_ip_from_context() {
        let (apn, ip) = apn_response(
            b"\r\n+CGDCONT: 1,\"IP\",\"hologram\",\"10.170.241.191\",0,0,0,0\r\n\r\nOK\r\n",
        )
        .unwrap();
        assert_eq!(apn.as_str(), "hologram");
        assert_eq!(ip, IpAddress::new(10, 170, 241, 191));
    }

    #[test]
    fn operator_name_between_quotes() {
        let (mode, name) = operator_response(b"\r\n+COPS: 0,0,\"T-Mobile USA\",7\r\n\r\nOK\r\n").unwrap();
        assert_eq!(mode, 0);
        assert_eq!(name.unwrap().as_str(), "T-Mobile USA");
    }

    #[test]
    fn operator_mode_two_carries_no_name() {
        let (mode, name) = operator_response(b"\r\n+COPS: 2\r\n\r\nOK\r\n").unwrap();
        assert_eq!(mode, 2);
        assert!(name.is_none());
    }

    #[test]
    fn operator_scan_entries_and_tail_skipped() {
        let buf = b"\r\n+COPS: (2,\"Operator A\",\"OpA\",\"310410\",7),(1,\"Operator B\",\"OpB\",\"310260\",9),,(0-4),(0,2)\r\n\r\nOK\r\n";
        let mut ops: Vec<OperatorInfo, 4> = Vec::new();
        assert_eq!(operators_response(buf, &mut ops), 2);
        assert_eq!(ops[0].stat, 2);
        assert_eq!(ops[0].long_name.as_str(), "Operator A");
        assert_eq!(ops[0].numeric, 310410);
        assert_eq!(ops[1].short_name.as_str(), "OpB");
        assert_eq!(ops[1].act, 9);
    }

    #[test]
    fn operator_scan_respects_capacity() {
        let buf = b"+COPS: (2,\"A\",\"A\",\"1\",7),(1,\"B\",\"B\",\"2\",7),(1,\"C\",\"C\",\"3\",7)";
        let mut ops: Vec<OperatorInfo, 2> = Vec::new();
        assert_eq!(operators_response(buf, &mut ops), 2);
    }

    #[test]
    fn mno_profile_digit() {
        assert_eq!(mno_response(b"\r\n+UMNOPROF: 2\r\n\r\nOK\r\n"), Some(2));
        assert_eq!(mno_response(b"\r\nERROR\r\n"), None);
    }

    #[test]
    fn gpio_mode_for_requested_pin() {
        let buf = b"\r\n+UGPIOC:\r\n16,2\r\n23,3\r\n24,255\r\n\r\nOK\r\n";
        assert_eq!(gpio_mode_response(buf, 16), Some(2));
        assert_eq!(gpio_mode_response(buf, 23), Some(3));
        assert_eq!(gpio_mode_response(buf, 42), None);
    }

    #[test]
    fn gps_power_state() {
        assert_eq!(gps_power_response(b"\r\n+UGPS: 1,0,1\r\n\r\nOK\r\n"), Some(true));
        assert_eq!(gps_power_response(b"\r\n+UGPS: 0\r\n\r\nOK\r\n"), Some(false));
    }

    #[test]
    fn decimal_degrees_preserves_leading_fraction_zeros() {
        let (_, value) = decimal_degrees(b"48.0703,").unwrap();
        assert!((value - 48.0703).abs() < 1e-4);
    }
}

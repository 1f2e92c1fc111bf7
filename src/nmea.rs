//! Tolerant parser for the `$GPRMC` sentences the module forwards over
//! `+UGRMC?`.
//!
//! NMEA talkers routinely leave fields empty while the receiver has no fix,
//! so every field decodes independently: an empty or malformed span yields
//! its default (`0.0` for numbers, `'X'` for single characters) and never
//! aborts the fields after it. Coordinates are kept in the sentence's native
//! `ddmm.mmmm` form.

use crate::parse::after;
use crate::types::RmcFix;

/// Comma-separated field walker. A missing terminator yields the remaining
/// bytes once, then empty fields forever, so truncated sentences degrade to
/// defaults instead of failing.
struct Fields<'a> {
    rest: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(rest: &'a [u8]) -> Self {
        Self { rest }
    }

    fn next(&mut self, terminators: &[u8]) -> &'a [u8] {
        match self.rest.iter().position(|b| terminators.contains(b)) {
            Some(idx) => {
                let field = &self.rest[..idx];
                self.rest = &self.rest[idx + 1..];
                field
            }
            None => {
                let field = self.rest;
                self.rest = &[];
                field
            }
        }
    }
}

fn num_field(field: &[u8]) -> f32 {
    core::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0.0)
}

fn int_field(field: &[u8]) -> u32 {
    core::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn char_field(field: &[u8]) -> char {
    if field.len() == 1 {
        field[0] as char
    } else {
        'X'
    }
}

/// Decode the first `$GPRMC` sentence in `buf`. Always returns a fix; the
/// `valid` flag is true only for an active (`'A'`) status field.
pub fn parse_rmc(buf: &[u8]) -> RmcFix {
    let mut fix = RmcFix::default();
    let Some(rest) = after(buf, b"$GPRMC,") else {
        return fix;
    };
    let mut fields = Fields::new(rest);

    fix.position.utc = num_field(fields.next(b","));
    let hhmmss = fix.position.utc as u32;
    fix.clock.time.hour = (hhmmss / 10_000) as u8;
    fix.clock.time.minute = ((hhmmss % 10_000) / 100) as u8;
    fix.clock.time.second = (hhmmss % 100) as u8;
    fix.clock.time.ms = ((fix.position.utc - hhmmss as f32) * 1000.0) as u16;

    fix.position.status = char_field(fields.next(b","));
    fix.position.lat = num_field(fields.next(b","));
    fix.position.lat_dir = char_field(fields.next(b","));
    fix.position.lon = num_field(fields.next(b","));
    fix.position.lon_dir = char_field(fields.next(b","));

    fix.speed.speed = num_field(fields.next(b","));
    fix.speed.track = num_field(fields.next(b","));

    let ddmmyy = int_field(fields.next(b","));
    fix.clock.date.day = (ddmmyy / 10_000) as u8;
    fix.clock.date.month = ((ddmmyy % 10_000) / 100) as u8;
    fix.clock.date.year = (ddmmyy % 100) as u16;

    fix.speed.mag_var = num_field(fields.next(b","));
    // Pre-2.3 talkers end the sentence right after this field, so the
    // checksum delimiter terminates it too.
    fix.speed.mag_var_dir = char_field(fields.next(b",*"));
    fix.position.mode = char_field(fields.next(b"*"));

    fix.valid = fix.position.status == 'A';
    fix
}

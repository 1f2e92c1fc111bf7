/// Wrapper for a byte-slice that formats it as a string where possible, and
/// as raw bytes where not.
pub struct LossyStr<'a>(pub &'a [u8]);

impl<'a> core::fmt::Debug for LossyStr<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match core::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

#[cfg(feature = "defmt")]
impl<'a> defmt::Format for LossyStr<'a> {
    fn format(&self, fmt: defmt::Formatter) {
        match core::str::from_utf8(self.0) {
            Ok(s) => defmt::write!(fmt, "{}", s),
            Err(_) => defmt::write!(fmt, "{:?}", self.0),
        }
    }
}

pub trait SliceExt {
    fn trim_whitespace(&self) -> &Self;
}

impl SliceExt for [u8] {
    fn trim_whitespace(&self) -> &[u8] {
        let is_space = |b: &u8| matches!(*b, b' ' | b'\t' | b'\r' | b'\n');
        let start = self.iter().position(|b| !is_space(b)).unwrap_or(self.len());
        let end = self.iter().rposition(|b| !is_space(b)).map_or(start, |p| p + 1);
        &self[start..end]
    }
}

/// First non-empty line of a response buffer, trimmed of surrounding
/// whitespace. AT responses are CRLF-framed with the payload line first.
pub fn first_line(buf: &[u8]) -> Option<&[u8]> {
    buf.split(|&b| b == b'\n')
        .map(|line| line.trim_whitespace())
        .find(|line| !line.is_empty())
}

/// Byte-level substring search.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_crlf_and_spaces() {
        assert_eq!(b"\r\n  OK \r\n".trim_whitespace(), &b"OK"[..]);
        assert_eq!(b"".trim_whitespace(), &b""[..]);
        assert_eq!(b"\r\n\r\n".trim_whitespace(), &b""[..]);
    }

    #[test]
    fn first_line_skips_leading_blank_lines() {
        assert_eq!(
            first_line(b"\r\n354679090123456\r\n\r\nOK\r\n"),
            Some(&b"354679090123456"[..])
        );
        assert_eq!(first_line(b"\r\n\r\n"), None);
    }

    #[test]
    fn find_subsequence_locates_needle() {
        assert_eq!(find_subsequence(b"abc$GPRMC,12", b"$GPRMC"), Some(3));
        assert_eq!(find_subsequence(b"abc", b"xyz"), None);
    }
}

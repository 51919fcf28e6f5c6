//! Scanner implementation.
//!
//! Pulls JSON tokens one at a time from any `std::io::Read`, buffering
//! a small window of bytes internally. Reading stops the moment the
//! caller stops asking for tokens, which is what makes the parser's
//! bounded-work guarantee possible on multi-megabyte feeds.

use super::token::Token;
use shopfeed_core::FeedError;
use std::io::Read;

const BUF_SIZE: usize = 8 * 1024;

/// Incremental JSON scanner over a byte stream.
pub struct Scanner<R: Read> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
    /// Absolute count of bytes consumed from the reader so far.
    offset: u64,
}

impl<R: Read> Scanner<R> {
    /// Create a new scanner for the given byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; BUF_SIZE],
            pos: 0,
            len: 0,
            offset: 0,
        }
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.offset
    }

    /// Pull the next token from the stream. Whitespace between tokens
    /// is skipped; `Eof` is returned once the stream is exhausted.
    pub fn next_token(&mut self) -> Result<Token, FeedError> {
        loop {
            let Some(b) = self.next_byte()? else {
                return Ok(Token::Eof);
            };
            return match b {
                b' ' | b'\t' | b'\n' | b'\r' => continue,
                b'{' => Ok(Token::ObjectStart),
                b'}' => Ok(Token::ObjectEnd),
                b'[' => Ok(Token::ArrayStart),
                b']' => Ok(Token::ArrayEnd),
                b',' => Ok(Token::Comma),
                b':' => Ok(Token::Colon),
                b'"' => self.scan_string().map(Token::String),
                b't' => {
                    self.expect_keyword(b"rue")?;
                    Ok(Token::Bool(true))
                }
                b'f' => {
                    self.expect_keyword(b"alse")?;
                    Ok(Token::Bool(false))
                }
                b'n' => {
                    self.expect_keyword(b"ull")?;
                    Ok(Token::Null)
                }
                b'-' | b'0'..=b'9' => self.scan_number(b).map(Token::Number),
                other => Err(self.err(format!("unexpected byte 0x{other:02x}"))),
            };
        }
    }

    fn err(&self, reason: impl Into<String>) -> FeedError {
        FeedError::Malformed {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn fill(&mut self) -> Result<bool, FeedError> {
        if self.pos < self.len {
            return Ok(true);
        }
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FeedError::Io(e)),
            }
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, FeedError> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    fn next_byte(&mut self) -> Result<Option<u8>, FeedError> {
        if !self.fill()? {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        self.offset += 1;
        Ok(Some(b))
    }

    /// Scan the remainder of a string literal; the opening quote has
    /// already been consumed. Escape sequences, including `\uXXXX` and
    /// surrogate pairs, are decoded.
    fn scan_string(&mut self) -> Result<String, FeedError> {
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.next_byte()? else {
                return Err(self.err("unterminated string"));
            };
            match b {
                b'"' => {
                    return String::from_utf8(bytes)
                        .map_err(|_| self.err("invalid UTF-8 in string"));
                }
                b'\\' => {
                    let c = self.scan_escape()?;
                    let mut enc = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut enc).as_bytes());
                }
                _ => bytes.push(b),
            }
        }
    }

    fn scan_escape(&mut self) -> Result<char, FeedError> {
        let Some(b) = self.next_byte()? else {
            return Err(self.err("unterminated escape sequence"));
        };
        match b {
            b'"' => Ok('"'),
            b'\\' => Ok('\\'),
            b'/' => Ok('/'),
            b'b' => Ok('\u{0008}'),
            b'f' => Ok('\u{000C}'),
            b'n' => Ok('\n'),
            b'r' => Ok('\r'),
            b't' => Ok('\t'),
            b'u' => self.scan_unicode_escape(),
            other => Err(self.err(format!("invalid escape character 0x{other:02x}"))),
        }
    }

    fn scan_unicode_escape(&mut self) -> Result<char, FeedError> {
        let high = self.scan_hex4()?;
        // High surrogate: a low surrogate escape must follow.
        if (0xD800..=0xDBFF).contains(&high) {
            if self.next_byte()? != Some(b'\\') || self.next_byte()? != Some(b'u') {
                return Err(self.err("unpaired surrogate in string"));
            }
            let low = self.scan_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.err("invalid low surrogate in string"));
            }
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).ok_or_else(|| self.err("invalid surrogate pair"));
        }
        char::from_u32(high).ok_or_else(|| self.err("invalid unicode escape"))
    }

    fn scan_hex4(&mut self) -> Result<u32, FeedError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let Some(b) = self.next_byte()? else {
                return Err(self.err("unterminated unicode escape"));
            };
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| self.err("invalid hex digit in unicode escape"))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// Scan a number literal, collecting its raw text. The first byte
    /// has already been consumed. Validation is left to the consumer;
    /// a price that fails decimal parsing rejects one variant, not the
    /// stream.
    fn scan_number(&mut self, first: u8) -> Result<String, FeedError> {
        let mut text = String::new();
        text.push(first as char);
        while let Some(b) = self.peek_byte()? {
            match b {
                b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-' => {
                    self.next_byte()?;
                    text.push(b as char);
                }
                _ => break,
            }
        }
        Ok(text)
    }

    fn expect_keyword(&mut self, rest: &[u8]) -> Result<(), FeedError> {
        for &expected in rest {
            if self.next_byte()? != Some(expected) {
                return Err(self.err("invalid literal"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokens(input: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(Cursor::new(input.as_bytes().to_vec()));
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("token");
            let eof = token == Token::Eof;
            out.push(token);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn test_scans_structural_tokens() {
        assert_eq!(
            tokens(r#"{"a":[1,true,null]}"#),
            vec![
                Token::ObjectStart,
                Token::String("a".to_string()),
                Token::Colon,
                Token::ArrayStart,
                Token::Number("1".to_string()),
                Token::Comma,
                Token::Bool(true),
                Token::Comma,
                Token::Null,
                Token::ArrayEnd,
                Token::ObjectEnd,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_scans_negative_and_decimal_numbers() {
        assert_eq!(
            tokens("[-12.5, 3e10]"),
            vec![
                Token::ArrayStart,
                Token::Number("-12.5".to_string()),
                Token::Comma,
                Token::Number("3e10".to_string()),
                Token::ArrayEnd,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_decodes_string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\\c\ndé""#),
            vec![Token::String("a\"b\\c\nd\u{e9}".to_string()), Token::Eof]
        );
    }

    #[test]
    fn test_decodes_surrogate_pair() {
        assert_eq!(
            tokens(r#""\ud83d\ude00""#),
            vec![Token::String("\u{1F600}".to_string()), Token::Eof]
        );
    }

    #[test]
    fn test_unterminated_string_is_malformed() {
        let mut scanner = Scanner::new(Cursor::new(b"\"abc".to_vec()));
        let err = scanner.next_token().unwrap_err();
        assert!(matches!(err, FeedError::Malformed { .. }));
    }

    #[test]
    fn test_unexpected_byte_reports_offset() {
        let mut scanner = Scanner::new(Cursor::new(b"   @".to_vec()));
        match scanner.next_token() {
            Err(FeedError::Malformed { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_bytes_consumed_tracks_progress() {
        let mut scanner = Scanner::new(Cursor::new(b"[1, 2]".to_vec()));
        scanner.next_token().unwrap();
        scanner.next_token().unwrap();
        // '[' and '1' consumed; the number peeked one byte ahead (',').
        assert!(scanner.bytes_consumed() <= 3);
        assert!(scanner.bytes_consumed() >= 2);
    }
}

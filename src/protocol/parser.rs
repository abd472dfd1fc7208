//! Incremental RESP Parser
//!
//! Consumes bytes accumulated from the socket and produces whole
//! [`RespValue`] frames. TCP delivers arbitrary chunks, so the parser
//! is resumable: it either yields `(value, consumed)`, reports that the
//! buffer holds an incomplete frame (`Ok(None)`), or fails with a
//! protocol error the connection layer treats as fatal.
//!
//! Bare lines that do not start with a type prefix are accepted as
//! inline commands (`PING\r\n`), split on whitespace.

use crate::protocol::types::{prefix, RespValue, CRLF};
use bytes::Bytes;
use thiserror::Error;

/// Largest accepted bulk string: 512 MB, the conventional RESP cap.
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Largest accepted array nesting before the parser bails out.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Protocol violations reported to the connection layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("protocol error: invalid integer")]
    BadInteger,

    #[error("protocol error: invalid UTF-8 in line")]
    BadUtf8,

    #[error("protocol error: invalid bulk length {0}")]
    BadBulkLength(i64),

    #[error("protocol error: invalid multibulk length {0}")]
    BadArrayLength(i64),

    #[error("protocol error: bulk string too large ({0} bytes)")]
    BulkTooLarge(usize),

    #[error("protocol error: nesting too deep")]
    NestedTooDeep,

    #[error("protocol error: {0}")]
    Malformed(&'static str),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Resumable frame parser; one per connection.
#[derive(Debug, Default)]
pub struct RespParser {
    depth: usize,
}

impl RespParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to parse one frame from the front of `buf`.
    ///
    /// Returns `Ok(Some((value, consumed)))` on success, `Ok(None)`
    /// when the buffer ends mid-frame, or an error on malformed input.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        self.depth = 0;
        self.parse_value(buf)
    }

    fn parse_value(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        if buf.is_empty() {
            return Ok(None);
        }
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::NestedTooDeep);
        }
        match buf[0] {
            prefix::SIMPLE_STRING => self.parse_line(buf, RespValue::SimpleString),
            prefix::ERROR => self.parse_line(buf, RespValue::Error),
            prefix::INTEGER => self.parse_integer(buf),
            prefix::BULK => self.parse_bulk(buf),
            prefix::ARRAY => self.parse_array(buf),
            _ => self.parse_inline(buf),
        }
    }

    /// `+...\r\n` and `-...\r\n` share one shape.
    fn parse_line(
        &mut self,
        buf: &[u8],
        build: fn(String) -> RespValue,
    ) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(end) = find_crlf(&buf[1..]) else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&buf[1..1 + end]).map_err(|_| ParseError::BadUtf8)?;
        Ok(Some((build(text.to_string()), 1 + end + 2)))
    }

    fn parse_integer(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(end) = find_crlf(&buf[1..]) else {
            return Ok(None);
        };
        let n = parse_decimal(&buf[1..1 + end])?;
        Ok(Some((RespValue::Integer(n), 1 + end + 2)))
    }

    fn parse_bulk(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(len_end) = find_crlf(&buf[1..]) else {
            return Ok(None);
        };
        let declared = parse_decimal(&buf[1..1 + len_end])?;
        let header = 1 + len_end + 2;

        if declared == -1 {
            return Ok(Some((RespValue::Null, header)));
        }
        if declared < 0 {
            return Err(ParseError::BadBulkLength(declared));
        }
        let len = declared as usize;
        if len > MAX_BULK_SIZE {
            return Err(ParseError::BulkTooLarge(len));
        }

        let total = header + len + 2;
        if buf.len() < total {
            return Ok(None);
        }
        if &buf[header + len..total] != CRLF {
            return Err(ParseError::Malformed("bulk string missing trailing CRLF"));
        }
        let data = Bytes::copy_from_slice(&buf[header..header + len]);
        Ok(Some((RespValue::Bulk(data), total)))
    }

    fn parse_array(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(count_end) = find_crlf(&buf[1..]) else {
            return Ok(None);
        };
        let declared = parse_decimal(&buf[1..1 + count_end])?;
        let mut consumed = 1 + count_end + 2;

        if declared == -1 {
            return Ok(Some((RespValue::Null, consumed)));
        }
        if declared < 0 {
            return Err(ParseError::BadArrayLength(declared));
        }

        let count = declared as usize;
        let mut elements = Vec::with_capacity(count.min(1024));
        self.depth += 1;
        for _ in 0..count {
            match self.parse_value(&buf[consumed..])? {
                Some((value, used)) => {
                    elements.push(value);
                    consumed += used;
                }
                None => return Ok(None),
            }
        }
        self.depth -= 1;
        Ok(Some((RespValue::Array(elements), consumed)))
    }

    /// Telnet-style commands: a bare whitespace-separated line.
    fn parse_inline(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(end) = find_crlf(buf) else {
            return Ok(None);
        };
        let line = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::BadUtf8)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ParseError::Malformed("empty inline command"));
        }
        let elements = parts
            .into_iter()
            .map(|s| RespValue::Bulk(Bytes::from(s.to_string())))
            .collect();
        Ok(Some((RespValue::Array(elements), end + 2)))
    }
}

fn parse_decimal(raw: &[u8]) -> ParseResult<i64> {
    std::str::from_utf8(raw)
        .map_err(|_| ParseError::BadUtf8)?
        .parse()
        .map_err(|_| ParseError::BadInteger)
}

#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|pair| pair == CRLF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        RespParser::new().parse(input)
    }

    #[test]
    fn test_simple_string() {
        let (value, consumed) = parse_one(b"+OK\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::SimpleString("OK".to_string()));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_error_frame() {
        let (value, _) = parse_one(b"-ERR nope\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Error("ERR nope".to_string()));
    }

    #[test]
    fn test_integer() {
        let (value, _) = parse_one(b":-42\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Integer(-42));
        assert!(parse_one(b":abc\r\n").is_err());
    }

    #[test]
    fn test_bulk_string() {
        let (value, consumed) = parse_one(b"$5\r\nhello\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Bulk(Bytes::from("hello")));
        assert_eq!(consumed, 11);
    }

    #[test]
    fn test_nil_bulk() {
        let (value, _) = parse_one(b"$-1\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Null);
    }

    #[test]
    fn test_bulk_with_binary_payload() {
        let (value, _) = parse_one(b"$4\r\n\x00\x01\r\n\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Bulk(Bytes::from_static(b"\x00\x01\r\n")));
    }

    #[test]
    fn test_bulk_bad_trailer() {
        assert!(parse_one(b"$3\r\nfooXX").is_err());
        assert!(parse_one(b"$-2\r\n").is_err());
    }

    #[test]
    fn test_command_array() {
        let input = b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n";
        let (value, consumed) = parse_one(input).unwrap().unwrap();
        assert_eq!(consumed, input.len());
        let line = value.into_cmd_line().unwrap();
        assert_eq!(line[0], Bytes::from("SET"));
        assert_eq!(line[2], Bytes::from("bar"));
    }

    #[test]
    fn test_incomplete_frames_resume() {
        let full = b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n";
        for cut in 1..full.len() {
            assert_eq!(parse_one(&full[..cut]).unwrap(), None, "cut at {}", cut);
        }
        assert!(parse_one(full).unwrap().is_some());
    }

    #[test]
    fn test_inline_command() {
        let (value, consumed) = parse_one(b"PING\r\n").unwrap().unwrap();
        assert_eq!(consumed, 6);
        let line = value.into_cmd_line().unwrap();
        assert_eq!(line, vec![Bytes::from("PING")]);

        let (value, _) = parse_one(b"SET  foo   bar\r\n").unwrap().unwrap();
        assert_eq!(value.into_cmd_line().unwrap().len(), 3);
    }

    #[test]
    fn test_pipelined_frames() {
        let input = b"+OK\r\n:1\r\n".to_vec();
        let mut parser = RespParser::new();
        let (first, consumed) = parser.parse(&input).unwrap().unwrap();
        assert_eq!(first, RespValue::SimpleString("OK".to_string()));
        let (second, _) = parser.parse(&input[consumed..]).unwrap().unwrap();
        assert_eq!(second, RespValue::Integer(1));
    }

    #[test]
    fn test_nesting_limit() {
        let mut input = Vec::new();
        for _ in 0..MAX_NESTING_DEPTH + 2 {
            input.extend_from_slice(b"*1\r\n");
        }
        input.extend_from_slice(b":1\r\n");
        assert_eq!(parse_one(&input), Err(ParseError::NestedTooDeep));
    }
}

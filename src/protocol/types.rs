//! RESP Values
//!
//! The value vocabulary shared by both directions of the wire: parsed
//! client requests and server replies. Every frame is CRLF-terminated
//! and starts with a one-byte type prefix:
//!
//! - `+` simple string: `+OK\r\n`
//! - `-` error: `-ERR message\r\n`
//! - `:` integer: `:42\r\n`
//! - `$` bulk string: `$5\r\nhello\r\n`, nil bulk: `$-1\r\n`
//! - `*` array: `*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n`

use bytes::Bytes;

/// CRLF frame terminator.
pub const CRLF: &[u8] = b"\r\n";

/// RESP type prefix bytes.
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A single RESP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Non-binary-safe string without CRLF, e.g. `+OK`.
    SimpleString(String),
    /// Error reply; the message carries its own `ERR`/`WRONGTYPE`
    /// prefix.
    Error(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// Binary-safe string.
    Bulk(Bytes),
    /// Nil bulk (`$-1`) or nil array (`*-1`).
    Null,
    /// Array of values, possibly nested.
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    pub fn simple(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(msg.into())
    }

    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        RespValue::Bulk(data.into())
    }

    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(values)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Writes the wire form of this value into `buf`.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Error(msg) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(msg.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Bulk(data) => {
                buf.push(prefix::BULK);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            RespValue::Null => {
                buf.extend_from_slice(b"$-1\r\n");
            }
            RespValue::Array(values) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
        }
    }

    /// The wire form of this value as a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Flattens a parsed request into a raw command line. Only arrays
    /// of (bulk or simple) strings qualify; anything else is not a
    /// command frame.
    pub fn into_cmd_line(self) -> Option<Vec<Bytes>> {
        let RespValue::Array(values) = self else {
            return None;
        };
        let mut line = Vec::with_capacity(values.len());
        for value in values {
            match value {
                RespValue::Bulk(data) => line.push(data),
                RespValue::SimpleString(s) => line.push(Bytes::from(s)),
                _ => return None,
            }
        }
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_simple_and_error() {
        assert_eq!(RespValue::ok().serialize(), b"+OK\r\n");
        assert_eq!(
            RespValue::error("ERR boom").serialize(),
            b"-ERR boom\r\n".to_vec()
        );
    }

    #[test]
    fn test_serialize_integer() {
        assert_eq!(RespValue::integer(1000).serialize(), b":1000\r\n");
        assert_eq!(RespValue::integer(-42).serialize(), b":-42\r\n");
    }

    #[test]
    fn test_serialize_bulk_and_null() {
        assert_eq!(
            RespValue::bulk(Bytes::from("bar")).serialize(),
            b"$3\r\nbar\r\n".to_vec()
        );
        assert_eq!(RespValue::Null.serialize(), b"$-1\r\n");
    }

    #[test]
    fn test_serialize_array() {
        let value = RespValue::array(vec![
            RespValue::bulk(Bytes::from("GET")),
            RespValue::bulk(Bytes::from("foo")),
        ]);
        assert_eq!(
            value.serialize(),
            b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n".to_vec()
        );
    }

    #[test]
    fn test_into_cmd_line() {
        let frame = RespValue::array(vec![
            RespValue::bulk(Bytes::from("SET")),
            RespValue::bulk(Bytes::from("k")),
            RespValue::bulk(Bytes::from("v")),
        ]);
        let line = frame.into_cmd_line().unwrap();
        assert_eq!(
            line,
            vec![Bytes::from("SET"), Bytes::from("k"), Bytes::from("v")]
        );

        assert!(RespValue::integer(1).into_cmd_line().is_none());
        let mixed = RespValue::array(vec![RespValue::integer(1)]);
        assert!(mixed.into_cmd_line().is_none());
    }
}

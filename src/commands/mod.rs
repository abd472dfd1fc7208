//! Command Layer
//!
//! Everything between a parsed request and a reply: the pooled
//! [`CommandContext`] carrying one request through the engine, the
//! [`registry`] mapping verbs to handlers, and the handler modules
//! themselves ([`strings`], [`keys`], [`lists`], [`server`]).
//!
//! Handlers return `Result<RespValue, CommandError>`; every error is
//! converted to a RESP error reply at the dispatch boundary and none
//! terminates the engine.

pub mod context;
pub mod keys;
pub mod lists;
pub mod registry;
pub mod server;
pub mod strings;

pub use context::{CommandContext, ContextPool};
pub use registry::{CommandRegistry, CommandSpec};

use crate::protocol::RespValue;
use crate::storage::ZipListError;
use bytes::Bytes;
use thiserror::Error;

/// Failures a handler can surface. The message text is the full RESP
/// error line (minus the `-` prefix the serializer adds).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(String),

    #[error("ERR index out of range")]
    OutOfRange,

    #[error("ERR value too large to encode")]
    TooLarge,

    #[error("ERR unknown command '{name}', with args beginning with: {with}")]
    UnknownCommand { name: String, with: String },

    #[error("ERR syntax error")]
    Syntax,

    #[error("ERR DB index is out of range")]
    NoSuchDb,
}

impl CommandError {
    /// Builds the unknown-command error, quoting each argument the way
    /// the reply format requires.
    pub fn unknown(name: &str, args: &[Bytes]) -> Self {
        let with = args
            .iter()
            .map(|arg| format!("'{}'", String::from_utf8_lossy(arg)))
            .collect::<Vec<_>>()
            .join(", ");
        CommandError::UnknownCommand {
            name: name.to_string(),
            with,
        }
    }

    /// The RESP error reply for this failure.
    pub fn into_reply(self) -> RespValue {
        RespValue::Error(self.to_string())
    }
}

impl From<ZipListError> for CommandError {
    fn from(err: ZipListError) -> Self {
        match err {
            ZipListError::TooLarge => CommandError::TooLarge,
            ZipListError::OutOfRange => CommandError::OutOfRange,
        }
    }
}

/// Parses a decimal i64 command argument.
pub(crate) fn parse_int(arg: &[u8]) -> Result<i64, CommandError> {
    std::str::from_utf8(arg)
        .map_err(|_| CommandError::NotAnInteger)?
        .parse()
        .map_err(|_| CommandError::NotAnInteger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_reply_format() {
        let err = CommandError::unknown("foox", &[Bytes::from("a"), Bytes::from("b")]);
        assert_eq!(
            err.into_reply(),
            RespValue::error("ERR unknown command 'foox', with args beginning with: 'a', 'b'")
        );

        let bare = CommandError::unknown("nope", &[]);
        assert_eq!(
            bare.into_reply(),
            RespValue::error("ERR unknown command 'nope', with args beginning with: ")
        );
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(b"42"), Ok(42));
        assert_eq!(parse_int(b"-7"), Ok(-7));
        assert_eq!(parse_int(b"x"), Err(CommandError::NotAnInteger));
        assert_eq!(parse_int(b"1.5"), Err(CommandError::NotAnInteger));
    }

    #[test]
    fn test_ziplist_error_conversion() {
        assert_eq!(
            CommandError::from(ZipListError::TooLarge),
            CommandError::TooLarge
        );
        assert_eq!(
            CommandError::from(ZipListError::OutOfRange),
            CommandError::OutOfRange
        );
    }
}

//! RESP Wire Protocol
//!
//! Framing for the CRLF-delimited Redis serialization protocol:
//! [`types`] defines the value vocabulary and its wire form, [`parser`]
//! turns accumulated socket bytes back into values incrementally.

pub mod parser;
pub mod types;

pub use parser::{ParseError, ParseResult, RespParser};
pub use types::RespValue;

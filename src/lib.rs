//! # zipkv — an in-memory, multi-database RESP key/value store
//!
//! zipkv serves Redis-style commands over TCP against a fixed set of
//! numbered in-memory databases. Keys may carry expiration deadlines,
//! reclaimed both lazily on access and actively on a background tick;
//! list values are stored in a compact single-buffer "ziplist"
//! encoding.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   frames    ┌─────────────┐  pooled ctx  ┌─────────────────┐
//! │ TCP accept │ ──────────> │ connection  │ ───────────> │ engine task     │
//! │ (main.rs)  │  per-client │ handler     │  mpsc queue  │ 16 × {dict,ttl} │
//! └────────────┘    tasks    └─────────────┘   oneshot    │ + command table │
//!                                  ▲          replies     │ + expire tick   │
//!                                  └──────────────────────┴─────────────────┘
//! ```
//!
//! All command execution is serialized through the engine task, so the
//! key-space structures need no locks; connections keep ordering per
//! client by awaiting each reply before parsing the next command.
//!
//! ## Modules
//!
//! - [`protocol`]: RESP value types and the incremental frame parser
//! - [`storage`]: ziplist codec, dictionary, TTL index, databases, and
//!   the engine task
//! - [`commands`]: pooled command contexts, the dispatch table, and
//!   the handlers behind every verb
//! - [`connection`]: per-client read-execute-reply loops

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

pub use commands::{CommandContext, CommandError, CommandRegistry, ContextPool};
pub use connection::{handle_connection, Client, ConnectionError};
pub use protocol::{ParseError, RespParser, RespValue};
pub use storage::{Database, Engine, EngineHandle, ExpireStrategy, ZipList};

/// Default bind port, same as the protocol's ancestor.
pub const DEFAULT_PORT: u16 = 6379;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default number of logical databases.
pub const DEFAULT_DATABASES: usize = 16;

/// Crate version, for the startup banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

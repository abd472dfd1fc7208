//! Storage Core
//!
//! The in-memory side of the server, leaves first:
//!
//! - [`ziplist`]: the compact single-buffer list codec
//! - [`entity`]: the tagged value cell stored against each key
//! - [`dict`]: the unsynchronized key → entity dictionary
//! - [`ttl`]: the deadline index (hash map + lazy-deletion min-heap)
//! - [`db`]: one numbered database binding a dictionary and a TTL
//!   index, with lazy and active expiration
//! - [`engine`]: the single-task executor owning all databases and
//!   the command table
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    Engine (one task)                 │
//! │  ┌────────────┐ ┌────────────┐       ┌────────────┐  │
//! │  │ Database 0 │ │ Database 1 │  ...  │ Database N │  │
//! │  │ Dict + TTL │ │ Dict + TTL │       │ Dict + TTL │  │
//! │  └────────────┘ └────────────┘       └────────────┘  │
//! │        ▲ commands (mpsc)      ▲ 100 ms expire tick   │
//! └────────┼──────────────────────┼──────────────────────┘
//! ```

pub mod db;
pub mod dict;
pub mod engine;
pub mod entity;
pub mod ttl;
pub mod ziplist;

pub use db::{AofHook, CmdLine, Database, ExpireStrategy};
pub use dict::Dict;
pub use engine::{Engine, EngineHandle};
pub use entity::DataEntity;
pub use ttl::TtlIndex;
pub use ziplist::{ZipList, ZipListError};

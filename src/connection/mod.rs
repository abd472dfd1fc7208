//! Connection Layer
//!
//! Accepted sockets are handed to [`handle_connection`], one task
//! each. The [`Client`] carries the only per-connection state the
//! command layer cares about: the SELECTed database index.

pub mod handler;

pub use handler::{handle_connection, Client, ConnectionError, ConnectionHandler};

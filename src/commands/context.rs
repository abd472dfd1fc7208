//! Pooled Command Contexts
//!
//! A [`CommandContext`] is the per-request scratch object handed from a
//! connection task to the engine: the raw command line, the cached
//! lowercase verb, the issuing client, the database index the command
//! runs against, and the oneshot the reply travels back on.
//!
//! Contexts are recycled through a [`ContextPool`] to keep per-command
//! allocations down; [`CommandContext::reset`] returns one to its
//! zero state before reuse.

use crate::connection::Client;
use crate::protocol::RespValue;
use crate::storage::CmdLine;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Contexts kept around for reuse; beyond this they are dropped.
const POOL_CAP: usize = 128;

/// Per-request scratch state.
#[derive(Debug, Default)]
pub struct CommandContext {
    db_index: usize,
    cmd_line: CmdLine,
    name: String,
    client: Option<Arc<Client>>,
    reply_to: Option<oneshot::Sender<RespValue>>,
}

impl CommandContext {
    /// Loads a request into the context. The verb is lowercased once
    /// here; the database index is snapshotted from the client.
    pub fn fill(
        &mut self,
        client: Arc<Client>,
        cmd_line: CmdLine,
        reply_to: oneshot::Sender<RespValue>,
    ) {
        self.db_index = client.db_index();
        self.name = cmd_line
            .first()
            .map(|verb| String::from_utf8_lossy(verb).to_lowercase())
            .unwrap_or_default();
        self.cmd_line = cmd_line;
        self.client = Some(client);
        self.reply_to = Some(reply_to);
    }

    /// Returns the context to its zero state.
    pub fn reset(&mut self) {
        self.db_index = 0;
        self.cmd_line = Vec::new();
        self.name.clear();
        self.client = None;
        self.reply_to = None;
    }

    /// The lowercase command verb.
    pub fn cmd_name(&self) -> &str {
        &self.name
    }

    /// The raw command line, verb included.
    pub fn cmd_line(&self) -> &[Bytes] {
        &self.cmd_line
    }

    /// The arguments after the verb.
    pub fn args(&self) -> &[Bytes] {
        if self.cmd_line.is_empty() {
            &[]
        } else {
            &self.cmd_line[1..]
        }
    }

    pub fn arg_count(&self) -> usize {
        self.args().len()
    }

    /// The database this command runs against.
    pub fn db_index(&self) -> usize {
        self.db_index
    }

    pub fn set_db_index(&mut self, index: usize) {
        self.db_index = index;
    }

    /// The client that issued the command.
    pub fn client(&self) -> Option<&Arc<Client>> {
        self.client.as_ref()
    }

    /// Takes the reply channel; the engine loop sends through it once.
    pub fn take_reply_sender(&mut self) -> Option<oneshot::Sender<RespValue>> {
        self.reply_to.take()
    }
}

/// Shared recycling pool for contexts. Safe to acquire and release
/// from any connection task.
#[derive(Debug, Default)]
pub struct ContextPool {
    free: Mutex<Vec<CommandContext>>,
}

impl ContextPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops a recycled context, or makes a fresh one. Either way the
    /// context is in its zero state.
    pub fn acquire(&self) -> CommandContext {
        self.free.lock().unwrap().pop().unwrap_or_default()
    }

    /// Resets and stores the context for reuse (dropped once the pool
    /// is full).
    pub fn release(&self, mut ctx: CommandContext) {
        ctx.reset();
        let mut free = self.free.lock().unwrap();
        if free.len() < POOL_CAP {
            free.push(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Arc<Client> {
        Arc::new(Client::new("127.0.0.1:0".parse().unwrap()))
    }

    fn line(parts: &[&str]) -> CmdLine {
        parts.iter().map(|s| Bytes::from(s.to_string())).collect()
    }

    #[test]
    fn test_fill_caches_lowercase_name() {
        let mut ctx = CommandContext::default();
        let (tx, _rx) = oneshot::channel();
        ctx.fill(test_client(), line(&["SeT", "k", "v"]), tx);

        assert_eq!(ctx.cmd_name(), "set");
        assert_eq!(ctx.arg_count(), 2);
        assert_eq!(ctx.args()[0], Bytes::from("k"));
        assert_eq!(ctx.cmd_line().len(), 3);
    }

    #[test]
    fn test_fill_snapshots_db_index() {
        let client = test_client();
        client.set_db_index(7);
        let mut ctx = CommandContext::default();
        let (tx, _rx) = oneshot::channel();
        ctx.fill(client, line(&["get", "k"]), tx);
        assert_eq!(ctx.db_index(), 7);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut ctx = CommandContext::default();
        let (tx, _rx) = oneshot::channel();
        ctx.fill(test_client(), line(&["get", "k"]), tx);
        ctx.set_db_index(3);

        ctx.reset();
        assert_eq!(ctx.cmd_name(), "");
        assert_eq!(ctx.db_index(), 0);
        assert!(ctx.cmd_line().is_empty());
        assert!(ctx.client().is_none());
        assert!(ctx.take_reply_sender().is_none());
    }

    #[test]
    fn test_pool_recycles_contexts() {
        let pool = ContextPool::new();
        let mut ctx = pool.acquire();
        let (tx, _rx) = oneshot::channel();
        ctx.fill(test_client(), line(&["ping"]), tx);
        pool.release(ctx);

        let recycled = pool.acquire();
        assert_eq!(recycled.cmd_name(), "");
        assert!(recycled.cmd_line().is_empty());
    }
}

//! Database Engine
//!
//! The [`Engine`] owns every database and the command table, and runs
//! as a single task: connection handlers queue pooled command contexts
//! onto an mpsc channel, the engine executes them one at a time, and
//! each reply travels back over a oneshot. Nothing inside the key
//! spaces is locked — serialization through the queue is the
//! concurrency discipline, which is what makes the plain dictionary
//! and TTL structures correct.
//!
//! The same loop owns the expiration tick: every 100 ms it runs one
//! active-expiration cycle across all databases, so background
//! reclamation can never race a command. Shutdown is a watch channel
//! observed between commands.

use crate::commands::{CommandContext, CommandError, CommandRegistry, ContextPool};
use crate::connection::Client;
use crate::protocol::RespValue;
use crate::storage::{AofHook, CmdLine, Database, ExpireStrategy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

/// Interval between active-expiration cycles.
const EXPIRE_TICK: Duration = Duration::from_millis(100);

/// Depth of the command queue feeding the engine task.
const QUEUE_DEPTH: usize = 1024;

/// The single-threaded command executor over a fixed set of databases.
pub struct Engine {
    dbs: Vec<Database>,
    registry: CommandRegistry,
    strategy: ExpireStrategy,
}

impl Engine {
    /// Builds an engine with `databases` key spaces and the standard
    /// command table.
    pub fn new(databases: usize, strategy: ExpireStrategy) -> Self {
        Self {
            dbs: (0..databases).map(Database::new).collect(),
            registry: CommandRegistry::standard(),
            strategy,
        }
    }

    pub fn db_count(&self) -> usize {
        self.dbs.len()
    }

    /// The database at `index`, or the out-of-range error SELECT
    /// guards against.
    pub fn db_mut(&mut self, index: usize) -> Result<&mut Database, CommandError> {
        self.dbs.get_mut(index).ok_or(CommandError::NoSuchDb)
    }

    /// Clears every database.
    pub fn flush_all(&mut self) {
        for db in &mut self.dbs {
            db.flush();
        }
    }

    /// Installs an AOF sink on one database.
    pub fn set_aof_hook(&mut self, index: usize, hook: AofHook) {
        if let Some(db) = self.dbs.get_mut(index) {
            db.set_aof_hook(hook);
        }
    }

    /// Dispatches one command: table lookup, arity check, handler.
    /// Every failure becomes an error reply; none escapes.
    pub fn exec(&mut self, ctx: &mut CommandContext) -> RespValue {
        let Some(spec) = self.registry.lookup(ctx.cmd_name()) else {
            return CommandError::unknown(ctx.cmd_name(), ctx.args()).into_reply();
        };
        if !spec.arity_matches(ctx.cmd_line().len()) {
            return CommandError::WrongArity(spec.name.to_string()).into_reply();
        }
        match (spec.handler)(self, ctx) {
            Ok(reply) => reply,
            Err(err) => err.into_reply(),
        }
    }

    /// One active-expiration cycle over every database. Returns the
    /// number of keys reclaimed.
    pub fn expire_cycle(&mut self) -> usize {
        let strategy = self.strategy;
        self.dbs
            .iter_mut()
            .map(|db| db.active_expire(strategy))
            .sum()
    }

    /// Spawns the engine task and returns the handle connections use
    /// to queue commands. The engine stops when the shutdown channel
    /// flips to true or all handles are dropped.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> EngineHandle {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let pool = Arc::new(ContextPool::new());
        tokio::spawn(self.run(rx, Arc::clone(&pool), shutdown));
        EngineHandle { tx, pool }
    }

    async fn run(
        mut self,
        mut queue: mpsc::Receiver<CommandContext>,
        pool: Arc<ContextPool>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(databases = self.dbs.len(), "engine started");
        let mut tick = tokio::time::interval(EXPIRE_TICK);
        loop {
            tokio::select! {
                received = queue.recv() => {
                    let Some(mut ctx) = received else { break };
                    let reply = self.exec(&mut ctx);
                    if let Some(reply_to) = ctx.take_reply_sender() {
                        let _ = reply_to.send(reply);
                    }
                    pool.release(ctx);
                }
                _ = tick.tick() => {
                    let reclaimed = self.expire_cycle();
                    if reclaimed > 0 {
                        debug!(reclaimed, "expiration tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("engine stopped");
    }
}

/// Cheap-to-clone handle for queueing commands onto the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<CommandContext>,
    pool: Arc<ContextPool>,
}

impl EngineHandle {
    /// Runs one command to completion on the engine task and returns
    /// its reply.
    pub async fn exec(&self, client: Arc<Client>, cmd_line: CmdLine) -> RespValue {
        let (reply_tx, reply_rx) = oneshot::channel();
        let mut ctx = self.pool.acquire();
        ctx.fill(client, cmd_line, reply_tx);
        if self.tx.send(ctx).await.is_err() {
            return RespValue::error("ERR server is shutting down");
        }
        reply_rx
            .await
            .unwrap_or_else(|_| RespValue::error("ERR server is shutting down"))
    }
}

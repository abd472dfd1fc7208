//! Per-Database Key Space
//!
//! A [`Database`] binds one dictionary and one TTL index under a fixed
//! index. All expiration logic lives here:
//!
//! - **Lazy**: every access first checks the key against the TTL index
//!   and removes it from both structures when its deadline has passed,
//!   so expired keys are indistinguishable from absent ones.
//! - **Active**: the engine tick calls one of two sweep strategies —
//!   random sampling of the key space, or draining the TTL heap top —
//!   both bounded by a random budget so a tick never degenerates into
//!   a full scan.
//!
//! Writes never touch the TTL index. A key's deadline is only ever set
//! by an explicit expire, and only cleared by removal or an explicit
//! `remove_ttl`; a plain overwrite leaves it in place.

use crate::storage::{DataEntity, Dict, TtlIndex};
use bytes::Bytes;
use rand::Rng;
use std::time::Instant;
use tracing::debug;

/// A raw command line: verb plus arguments, as received off the wire.
pub type CmdLine = Vec<Bytes>;

/// Sink for successful mutations, fed the raw command line. The
/// default hook does nothing; a persistence layer installs a real one.
pub type AofHook = Box<dyn FnMut(&[Bytes]) + Send>;

/// How the active-expiration tick picks its victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireStrategy {
    /// Sample random keys and drop the expired ones.
    RandomSample,
    /// Pop expired keys off the deadline heap until a live one shows.
    HeapDriven,
}

/// One numbered key space: dictionary, TTL index, and AOF seam.
pub struct Database {
    index: usize,
    data: Dict,
    ttl: TtlIndex,
    aof_hook: AofHook,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("index", &self.index)
            .field("keys", &self.data.len())
            .field("ttls", &self.ttl.len())
            .finish()
    }
}

impl Database {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            data: Dict::new(),
            ttl: TtlIndex::new(),
            aof_hook: Box::new(|_| {}),
        }
    }

    /// The database number, assigned at construction and immutable.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Installs the mutation sink.
    pub fn set_aof_hook(&mut self, hook: AofHook) {
        self.aof_hook = hook;
    }

    /// Feeds a successfully applied mutation to the AOF sink.
    pub fn add_aof(&mut self, line: &[Bytes]) {
        (self.aof_hook)(line)
    }

    /// Lazy expiration: reclaims the key if its deadline has passed.
    /// Returns true when the key was expired and removed.
    pub fn check_expired(&mut self, key: &[u8]) -> bool {
        let (expired, exists) = self.ttl.is_expired(key);
        if exists && expired {
            debug!(db = self.index, key = ?key, "lazily expired");
            self.data.remove(key);
            self.ttl.remove(key);
            true
        } else {
            false
        }
    }

    /// Looks up a live entity, expiring it first if its deadline has
    /// passed.
    pub fn get_entity(&mut self, key: &[u8]) -> Option<&DataEntity> {
        self.check_expired(key);
        self.data.get(key)
    }

    /// Mutable variant of [`Database::get_entity`].
    pub fn get_entity_mut(&mut self, key: &[u8]) -> Option<&mut DataEntity> {
        self.check_expired(key);
        self.data.get_mut(key)
    }

    /// Inserts or overwrites; any existing deadline is left in place.
    pub fn put_entity(&mut self, key: Bytes, entity: DataEntity) -> usize {
        self.check_expired(&key);
        self.data.put(key, entity)
    }

    /// Inserts only when the key is (logically) absent.
    pub fn put_if_absent(&mut self, key: Bytes, entity: DataEntity) -> usize {
        self.check_expired(&key);
        self.data.put_if_absent(key, entity)
    }

    /// Overwrites only when the key is (logically) present.
    pub fn put_if_exists(&mut self, key: Bytes, entity: DataEntity) -> usize {
        self.check_expired(&key);
        self.data.put_if_exists(key, entity)
    }

    /// Removes a key from the dictionary and, when present, its
    /// deadline. Returns the number of keys removed (0 or 1).
    pub fn remove(&mut self, key: &[u8]) -> usize {
        let removed = self.data.remove(key);
        if removed > 0 {
            self.ttl.remove(key);
        }
        removed
    }

    /// Removes each named key, counting only the ones that were live.
    pub fn removes(&mut self, keys: &[Bytes]) -> usize {
        let mut deleted = 0;
        for key in keys {
            if self.check_expired(key) {
                continue;
            }
            deleted += self.remove(key);
        }
        deleted
    }

    /// Counts how many of the given keys are live, expiring stale ones
    /// on the way.
    pub fn exists(&mut self, keys: &[Bytes]) -> i64 {
        let mut present = 0;
        for key in keys {
            self.check_expired(key);
            if self.data.contains(key) {
                present += 1;
            }
        }
        present
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clears the dictionary and the TTL index together.
    pub fn flush(&mut self) {
        if !self.data.is_empty() {
            self.data.clear();
            self.ttl.clear();
        }
    }

    /// Visits every live (key, entity, deadline) triple. Expired keys
    /// are reclaimed before the walk so the visitor only sees live
    /// data; returning false halts iteration.
    pub fn for_each(&mut self, mut visitor: impl FnMut(&Bytes, &DataEntity, Option<Instant>) -> bool) {
        let mut doomed = Vec::new();
        let ttl = &self.ttl;
        self.data.for_each(|key, _| {
            if ttl.is_expired(key).0 {
                doomed.push(key.clone());
            }
            true
        });
        for key in doomed {
            self.data.remove(&key);
            self.ttl.remove(&key);
        }

        let ttl = &self.ttl;
        self.data
            .for_each(|key, entity| visitor(key, entity, ttl.expire_at(key)));
    }

    /* ---- TTL surface ---- */

    /// Sets or replaces the key's absolute deadline.
    pub fn expire(&mut self, key: Bytes, deadline: Instant) {
        self.ttl.expire(key, deadline);
    }

    /// Drops the key's deadline, making it persistent. Returns true
    /// when a deadline existed.
    pub fn remove_ttl(&mut self, key: &[u8]) -> bool {
        self.ttl.remove(key)
    }

    /// The key's deadline, if one is set.
    pub fn expire_at(&self, key: &[u8]) -> Option<Instant> {
        self.ttl.expire_at(key)
    }

    /// One active-expiration cycle using the configured strategy.
    /// Returns the number of keys reclaimed.
    pub fn active_expire(&mut self, strategy: ExpireStrategy) -> usize {
        match strategy {
            ExpireStrategy::RandomSample => self.expire_by_sampling(),
            ExpireStrategy::HeapDriven => self.expire_by_heap(),
        }
    }

    /// Random-sample sweep: draw a random budget r in [0, len], sample
    /// r keys with replacement, reclaim the expired ones.
    fn expire_by_sampling(&mut self) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        let budget = rand::thread_rng().gen_range(0..self.data.len() + 1);
        let mut reclaimed = 0;
        for key in self.data.random_keys(budget) {
            let (expired, exists) = self.ttl.is_expired(&key);
            if exists && expired {
                self.remove(&key);
                reclaimed += 1;
            }
        }
        if reclaimed > 0 {
            debug!(db = self.index, reclaimed, "active expire (sample)");
        }
        reclaimed
    }

    /// Heap-driven sweep: for up to r iterations look at the earliest
    /// deadline and reclaim it while expired, stopping at the first
    /// live key.
    fn expire_by_heap(&mut self) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        let budget = rand::thread_rng().gen_range(0..self.data.len() + 1);
        let now = Instant::now();
        let mut reclaimed = 0;
        for _ in 0..budget {
            match self.ttl.peek() {
                Some((key, deadline)) if now >= deadline => {
                    self.remove(&key);
                    reclaimed += 1;
                }
                _ => break,
            }
        }
        if reclaimed > 0 {
            debug!(db = self.index, reclaimed, "active expire (heap)");
        }
        reclaimed
    }
}

//! Keyed Dictionary
//!
//! The key space of a single database: a plain `HashMap` from key to
//! [`DataEntity`]. No lock lives here — the engine task is the sole
//! owner and serializes every access, so the unsynchronized backend is
//! correct by construction.
//!
//! The put variants return insert/overwrite counts (1 or 0) so callers
//! can reply with integer results without a second lookup.

use crate::storage::DataEntity;
use bytes::Bytes;
use rand::Rng;
use std::collections::HashMap;

/// Unsynchronized key → entity mapping.
#[derive(Debug, Default)]
pub struct Dict {
    map: HashMap<Bytes, DataEntity>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&DataEntity> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut DataEntity> {
        self.map.get_mut(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts or overwrites. Returns 1 when the key was new, 0 when an
    /// existing value was replaced.
    pub fn put(&mut self, key: Bytes, entity: DataEntity) -> usize {
        match self.map.insert(key, entity) {
            None => 1,
            Some(_) => 0,
        }
    }

    /// Inserts only when the key is absent. Returns 1 when inserted,
    /// 0 when the key already existed (no-op).
    pub fn put_if_absent(&mut self, key: Bytes, entity: DataEntity) -> usize {
        if self.map.contains_key(&key) {
            0
        } else {
            self.map.insert(key, entity);
            1
        }
    }

    /// Overwrites only when the key exists. Returns 1 when overwritten,
    /// 0 when the key was absent (no-op).
    pub fn put_if_exists(&mut self, key: Bytes, entity: DataEntity) -> usize {
        if let Some(slot) = self.map.get_mut(&key) {
            *slot = entity;
            1
        } else {
            0
        }
    }

    /// Returns 1 when the key was removed, 0 otherwise.
    pub fn remove(&mut self, key: &[u8]) -> usize {
        match self.map.remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Visits each (key, entity) pair; a visitor returning false halts
    /// the walk. Iteration order is unspecified.
    pub fn for_each(&self, mut visitor: impl FnMut(&Bytes, &DataEntity) -> bool) {
        for (key, entity) in &self.map {
            if !visitor(key, entity) {
                break;
            }
        }
    }

    /// Samples up to `n` keys with replacement. Returns fewer only when
    /// the dictionary is empty; every present key has non-zero
    /// probability of being drawn.
    pub fn random_keys(&self, n: usize) -> Vec<Bytes> {
        if self.map.is_empty() || n == 0 {
            return Vec::new();
        }
        let pool: Vec<&Bytes> = self.map.keys().collect();
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| pool[rng.gen_range(0..pool.len())].clone())
            .collect()
    }
}

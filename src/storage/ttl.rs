//! TTL Index
//!
//! Secondary structure mapping a subset of keys to absolute expiration
//! deadlines. Two structures are kept in step: a hash map for O(1)
//! point queries and removal, and a min-heap ordered by deadline for
//! O(log n) access to the earliest-expiring key.
//!
//! The heap uses lazy deletion: re-expiring or removing a key leaves
//! its old heap entry behind as garbage, and [`TtlIndex::peek`] drains
//! any top entry whose key is gone or whose deadline has been
//! superseded before answering.

use bytes::Bytes;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    deadline: Instant,
    key: Bytes,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Key → deadline index with find-min support.
#[derive(Debug, Default)]
pub struct TtlIndex {
    deadlines: HashMap<Bytes, Instant>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

impl TtlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the deadline for a key. A previous deadline's heap entry
    /// becomes lazy garbage.
    pub fn expire(&mut self, key: Bytes, deadline: Instant) {
        self.deadlines.insert(key.clone(), deadline);
        self.heap.push(Reverse(HeapEntry { deadline, key }));
    }

    /// Drops the key's deadline. Heap entries become lazy garbage.
    /// Returns true when a deadline existed.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Returns `(expired, exists)`: `(false, false)` for keys with no
    /// deadline, otherwise whether `now` has reached the deadline.
    pub fn is_expired(&self, key: &[u8]) -> (bool, bool) {
        match self.deadlines.get(key) {
            None => (false, false),
            Some(&deadline) => (Instant::now() >= deadline, true),
        }
    }

    /// The deadline recorded for a key, if any.
    pub fn expire_at(&self, key: &[u8]) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    /// The earliest live (key, deadline) pair, or None when no key
    /// carries a deadline. Stale heap tops are discarded on the way.
    pub fn peek(&mut self) -> Option<(Bytes, Instant)> {
        while let Some(Reverse(top)) = self.heap.peek() {
            match self.deadlines.get(&top.key) {
                Some(&deadline) if deadline == top.deadline => {
                    return Some((top.key.clone(), deadline));
                }
                _ => {
                    self.heap.pop();
                }
            }
        }
        None
    }

    /// Number of keys carrying a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Empties both the hash side and the heap.
    pub fn clear(&mut self) {
        self.deadlines.clear();
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_is_expired_states() {
        let mut ttl = TtlIndex::new();
        assert_eq!(ttl.is_expired(b"missing"), (false, false));

        let now = Instant::now();
        ttl.expire(key("live"), now + Duration::from_secs(60));
        ttl.expire(key("dead"), now - Duration::from_millis(1));
        assert_eq!(ttl.is_expired(b"live"), (false, true));
        assert_eq!(ttl.is_expired(b"dead"), (true, true));
    }

    #[test]
    fn test_expire_at_and_remove() {
        let mut ttl = TtlIndex::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        ttl.expire(key("k"), deadline);
        assert_eq!(ttl.expire_at(b"k"), Some(deadline));

        assert!(ttl.remove(b"k"));
        assert!(!ttl.remove(b"k"));
        assert_eq!(ttl.expire_at(b"k"), None);
        assert_eq!(ttl.is_expired(b"k"), (false, false));
    }

    #[test]
    fn test_peek_returns_earliest() {
        let mut ttl = TtlIndex::new();
        let now = Instant::now();
        ttl.expire(key("late"), now + Duration::from_secs(30));
        ttl.expire(key("early"), now + Duration::from_secs(1));
        ttl.expire(key("middle"), now + Duration::from_secs(10));

        let (k, d) = ttl.peek().unwrap();
        assert_eq!(k, key("early"));
        assert_eq!(d, now + Duration::from_secs(1));
    }

    #[test]
    fn test_peek_skips_removed_keys() {
        let mut ttl = TtlIndex::new();
        let now = Instant::now();
        ttl.expire(key("a"), now + Duration::from_secs(1));
        ttl.expire(key("b"), now + Duration::from_secs(2));

        ttl.remove(b"a");
        let (k, _) = ttl.peek().unwrap();
        assert_eq!(k, key("b"));
    }

    #[test]
    fn test_peek_skips_superseded_deadlines() {
        let mut ttl = TtlIndex::new();
        let now = Instant::now();
        ttl.expire(key("a"), now + Duration::from_secs(1));
        // Push the deadline back; the old heap entry is now stale.
        ttl.expire(key("a"), now + Duration::from_secs(20));
        ttl.expire(key("b"), now + Duration::from_secs(5));

        let (k, d) = ttl.peek().unwrap();
        assert_eq!(k, key("b"));
        assert_eq!(d, now + Duration::from_secs(5));
        assert_eq!(ttl.len(), 2);
    }

    #[test]
    fn test_peek_empty_and_clear() {
        let mut ttl = TtlIndex::new();
        assert!(ttl.peek().is_none());

        ttl.expire(key("k"), Instant::now() + Duration::from_secs(1));
        ttl.clear();
        assert!(ttl.is_empty());
        assert!(ttl.peek().is_none());
    }
}

//! Typed Value Cells
//!
//! Every key in a database maps to a [`DataEntity`]: a tagged variant
//! carrying the value payload. The entity stores neither its key nor
//! its expiration; those live in the surrounding dictionary and TTL
//! index. Command handlers pattern-match on the tag and raise a
//! wrong-type error on mismatch.

use crate::storage::ZipList;
use bytes::Bytes;

/// The value stored against a key.
///
/// Only byte-strings and ziplist-backed lists carry payloads here; the
/// remaining tags complete the type vocabulary for `TYPE` and
/// wrong-type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEntity {
    Bytes(Bytes),
    List(ZipList),
    Hash,
    Set,
    SortedSet,
}

impl DataEntity {
    /// The type name reported by `TYPE`.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataEntity::Bytes(_) => "string",
            DataEntity::List(_) => "list",
            DataEntity::Hash => "hash",
            DataEntity::Set => "set",
            DataEntity::SortedSet => "zset",
        }
    }

    /// The byte-string payload, if this entity holds one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            DataEntity::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The list payload, if this entity holds one.
    pub fn as_list(&self) -> Option<&ZipList> {
        match self {
            DataEntity::List(zl) => Some(zl),
            _ => None,
        }
    }

    /// Mutable access to the list payload, if this entity holds one.
    pub fn as_list_mut(&mut self) -> Option<&mut ZipList> {
        match self {
            DataEntity::List(zl) => Some(zl),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(DataEntity::Bytes(Bytes::from("v")).type_name(), "string");
        assert_eq!(DataEntity::List(ZipList::new()).type_name(), "list");
        assert_eq!(DataEntity::Hash.type_name(), "hash");
        assert_eq!(DataEntity::Set.type_name(), "set");
        assert_eq!(DataEntity::SortedSet.type_name(), "zset");
    }

    #[test]
    fn test_payload_accessors() {
        let mut list = DataEntity::List(ZipList::new());
        assert!(list.as_bytes().is_none());
        list.as_list_mut().unwrap().push(b"a").unwrap();
        assert_eq!(list.as_list().unwrap().len(), 1);

        let s = DataEntity::Bytes(Bytes::from("v"));
        assert!(s.as_list().is_none());
        assert_eq!(s.as_bytes().unwrap(), &Bytes::from("v"));
    }
}

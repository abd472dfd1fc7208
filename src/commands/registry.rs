//! Command Table
//!
//! Verb → handler mapping, populated once at engine construction and
//! consulted on every dispatch. Names are stored lowercase; lookups go
//! through the context's cached lowercase verb.

use crate::commands::{keys, lists, server, strings, CommandContext, CommandError};
use crate::protocol::RespValue;
use crate::storage::Engine;
use std::collections::HashMap;

/// Handler signature: full engine access plus the request context.
pub type CmdFn = fn(&mut Engine, &mut CommandContext) -> Result<RespValue, CommandError>;

/// One registered command.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Token count including the verb; negative means "at least
    /// that many".
    pub arity: i32,
    pub handler: CmdFn,
}

impl CommandSpec {
    /// Checks a command line's token count against the arity rule.
    pub fn arity_matches(&self, tokens: usize) -> bool {
        if self.arity >= 0 {
            tokens == self.arity as usize
        } else {
            tokens >= self.arity.unsigned_abs() as usize
        }
    }
}

/// The dispatch table.
pub struct CommandRegistry {
    table: HashMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    /// Builds the table with every command this server speaks.
    pub fn standard() -> Self {
        let mut registry = CommandRegistry {
            table: HashMap::new(),
        };

        registry.register("get", 2, strings::get);
        registry.register("set", -3, strings::set);
        registry.register("del", -2, strings::del);
        registry.register("exists", -2, strings::exists);

        registry.register("expire", 3, keys::expire);
        registry.register("pexpire", 3, keys::pexpire);
        registry.register("persist", 2, keys::persist);
        registry.register("ttl", 2, keys::ttl);
        registry.register("pttl", 2, keys::pttl);
        registry.register("keys", 2, keys::keys);
        registry.register("type", 2, keys::key_type);

        registry.register("rpush", -3, lists::rpush);
        registry.register("lpush", -3, lists::lpush);
        registry.register("lrange", 4, lists::lrange);
        registry.register("llen", 2, lists::llen);
        registry.register("lindex", 3, lists::lindex);

        registry.register("ping", -1, server::ping);
        registry.register("echo", 2, server::echo);
        registry.register("select", 2, server::select);
        registry.register("dbsize", 1, server::dbsize);
        registry.register("flushdb", -1, server::flushdb);
        registry.register("flushall", -1, server::flushall);

        registry
    }

    fn register(&mut self, name: &'static str, arity: i32, handler: CmdFn) {
        self.table.insert(
            name,
            CommandSpec {
                name,
                arity,
                handler,
            },
        );
    }

    /// Finds a command by its lowercase verb.
    pub fn lookup(&self, name: &str) -> Option<CommandSpec> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_contents() {
        let registry = CommandRegistry::standard();
        for verb in [
            "get", "set", "del", "exists", "expire", "pexpire", "persist", "ttl", "pttl", "keys",
            "select", "flushdb", "flushall", "rpush", "lpush", "lrange", "llen", "lindex",
        ] {
            assert!(registry.lookup(verb).is_some(), "missing {}", verb);
        }
        assert!(registry.lookup("subscribe").is_none());
        assert!(registry.lookup("GET").is_none());
    }

    #[test]
    fn test_arity_rules() {
        let registry = CommandRegistry::standard();

        let get = registry.lookup("get").unwrap();
        assert!(get.arity_matches(2));
        assert!(!get.arity_matches(1));
        assert!(!get.arity_matches(3));

        let set = registry.lookup("set").unwrap();
        assert!(set.arity_matches(3));
        assert!(set.arity_matches(5));
        assert!(!set.arity_matches(2));
    }
}

//! Generic Key Commands
//!
//! TTL management (EXPIRE, PEXPIRE, PERSIST, TTL, PTTL) plus key-space
//! introspection (KEYS, TYPE). TTL replies follow the usual
//! convention: -2 for a missing key, -1 for a key without a deadline.

use crate::commands::{parse_int, CommandContext, CommandError};
use crate::protocol::RespValue;
use crate::storage::Engine;
use std::time::{Duration, Instant};

/// EXPIRE key seconds
pub fn expire(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    expire_generic(engine, ctx, Duration::from_secs)
}

/// PEXPIRE key milliseconds
pub fn pexpire(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    expire_generic(engine, ctx, Duration::from_millis)
}

fn expire_generic(
    engine: &mut Engine,
    ctx: &mut CommandContext,
    to_duration: fn(u64) -> Duration,
) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let amount = parse_int(&ctx.args()[1])?;

    let db = engine.db_mut(ctx.db_index())?;
    if db.get_entity(&key).is_none() {
        return Ok(RespValue::integer(0));
    }

    // A deadline in the past just deletes the key outright.
    if amount <= 0 {
        db.remove(&key);
    } else {
        db.expire(key, Instant::now() + to_duration(amount as u64));
    }
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::integer(1))
}

/// PERSIST key
pub fn persist(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    if db.get_entity(&key).is_none() {
        return Ok(RespValue::integer(0));
    }
    if db.remove_ttl(&key) {
        db.add_aof(ctx.cmd_line());
        Ok(RespValue::integer(1))
    } else {
        Ok(RespValue::integer(0))
    }
}

/// TTL key
pub fn ttl(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    remaining_generic(engine, ctx, false)
}

/// PTTL key
pub fn pttl(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    remaining_generic(engine, ctx, true)
}

fn remaining_generic(
    engine: &mut Engine,
    ctx: &mut CommandContext,
    in_millis: bool,
) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    if db.get_entity(&key).is_none() {
        return Ok(RespValue::integer(-2));
    }
    let Some(deadline) = db.expire_at(&key) else {
        return Ok(RespValue::integer(-1));
    };
    let millis = deadline
        .saturating_duration_since(Instant::now())
        .as_millis() as i64;
    if in_millis {
        Ok(RespValue::integer(millis))
    } else {
        // Round to the nearest second so a fresh "EX 10" reads back 10.
        Ok(RespValue::integer((millis + 500) / 1000))
    }
}

/// KEYS pattern
pub fn keys(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let pattern = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    let mut matched = Vec::new();
    db.for_each(|key, _, _| {
        if glob_match(&pattern, key) {
            matched.push(RespValue::Bulk(key.clone()));
        }
        true
    });
    Ok(RespValue::Array(matched))
}

/// TYPE key
pub fn key_type(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    let name = db
        .get_entity(&key)
        .map(|entity| entity.type_name())
        .unwrap_or("none");
    Ok(RespValue::simple(name))
}

/// Glob matching over raw bytes: `*`, `?`, `[...]` classes with ranges
/// and `^` negation, and `\` escapes.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    if pattern.is_empty() {
        return text.is_empty();
    }
    match pattern[0] {
        b'*' => (0..=text.len()).any(|i| glob_match(&pattern[1..], &text[i..])),
        b'?' => !text.is_empty() && glob_match(&pattern[1..], &text[1..]),
        b'[' => {
            if text.is_empty() {
                return false;
            }
            let mut i = 1;
            let negate = pattern.get(1) == Some(&b'^');
            if negate {
                i += 1;
            }
            let mut matched = false;
            while i < pattern.len() && pattern[i] != b']' {
                if i + 2 < pattern.len() && pattern[i + 1] == b'-' && pattern[i + 2] != b']' {
                    if text[0] >= pattern[i] && text[0] <= pattern[i + 2] {
                        matched = true;
                    }
                    i += 3;
                } else {
                    if pattern[i] == text[0] {
                        matched = true;
                    }
                    i += 1;
                }
            }
            if i >= pattern.len() {
                return false;
            }
            if negate {
                matched = !matched;
            }
            matched && glob_match(&pattern[i + 1..], &text[1..])
        }
        b'\\' if pattern.len() > 1 => {
            !text.is_empty() && pattern[1] == text[0] && glob_match(&pattern[2..], &text[1..])
        }
        c => !text.is_empty() && c == text[0] && glob_match(&pattern[1..], &text[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_star_and_question() {
        assert!(glob_match(b"*", b""));
        assert!(glob_match(b"*", b"anything"));
        assert!(glob_match(b"h*llo", b"hello"));
        assert!(glob_match(b"h*llo", b"hllo"));
        assert!(glob_match(b"h*llo", b"heeeello"));
        assert!(!glob_match(b"h*llo", b"world"));

        assert!(glob_match(b"h?llo", b"hallo"));
        assert!(!glob_match(b"h?llo", b"hllo"));
    }

    #[test]
    fn test_glob_classes() {
        assert!(glob_match(b"h[ae]llo", b"hello"));
        assert!(glob_match(b"h[ae]llo", b"hallo"));
        assert!(!glob_match(b"h[ae]llo", b"hillo"));
        assert!(glob_match(b"h[a-z]llo", b"hxllo"));
        assert!(glob_match(b"h[^e]llo", b"hallo"));
        assert!(!glob_match(b"h[^e]llo", b"hello"));
    }

    #[test]
    fn test_glob_escape_and_literal() {
        assert!(glob_match(b"exact", b"exact"));
        assert!(!glob_match(b"exact", b"exactly"));
        assert!(glob_match(b"a\\*b", b"a*b"));
        assert!(!glob_match(b"a\\*b", b"aXb"));
    }
}

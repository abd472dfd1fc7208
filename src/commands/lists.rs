//! List Commands
//!
//! RPUSH, LPUSH, LRANGE, LLEN, and LINDEX over ziplist-backed values.
//! The codec only appends at the tail, so a head push rebuilds the
//! buffer with the new entries in front; lists stay small by design
//! and the rebuild is linear in the encoded size.

use crate::commands::{parse_int, CommandContext, CommandError};
use crate::protocol::RespValue;
use crate::storage::{DataEntity, Engine, ZipList};
use bytes::Bytes;

/// RPUSH key value [value ...]
pub fn rpush(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let args = ctx.args();
    let key = args[0].clone();
    let values: Vec<Bytes> = args[1..].to_vec();

    let db = engine.db_mut(ctx.db_index())?;
    let len = match db.get_entity_mut(&key) {
        Some(DataEntity::List(list)) => {
            for value in &values {
                list.push(value)?;
            }
            list.len()
        }
        Some(_) => return Err(CommandError::WrongType),
        None => {
            let mut list = ZipList::new();
            for value in &values {
                list.push(value)?;
            }
            let len = list.len();
            db.put_entity(key, DataEntity::List(list));
            len
        }
    };
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::integer(len as i64))
}

/// LPUSH key value [value ...]
pub fn lpush(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let args = ctx.args();
    let key = args[0].clone();
    let values: Vec<Bytes> = args[1..].to_vec();

    let db = engine.db_mut(ctx.db_index())?;
    let existing: Vec<Bytes> = match db.get_entity(&key) {
        Some(DataEntity::List(list)) => list.iter().collect(),
        Some(_) => return Err(CommandError::WrongType),
        None => Vec::new(),
    };

    // Pushing a, b, c to the head lands them as c, b, a.
    let mut list = ZipList::new();
    for value in values.iter().rev() {
        list.push(value)?;
    }
    for entry in &existing {
        list.push(entry)?;
    }
    let len = list.len();
    db.put_entity(key, DataEntity::List(list));
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::integer(len as i64))
}

/// LLEN key
pub fn llen(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    match db.get_entity(&key) {
        None => Ok(RespValue::integer(0)),
        Some(DataEntity::List(list)) => Ok(RespValue::integer(list.len() as i64)),
        Some(_) => Err(CommandError::WrongType),
    }
}

/// LINDEX key index
pub fn lindex(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let index = parse_int(&ctx.args()[1])?;

    let db = engine.db_mut(ctx.db_index())?;
    let list = match db.get_entity(&key) {
        None => return Ok(RespValue::Null),
        Some(DataEntity::List(list)) => list,
        Some(_) => return Err(CommandError::WrongType),
    };

    let len = list.len() as i64;
    let index = if index < 0 { len + index } else { index };
    if index < 0 || index >= len {
        return Ok(RespValue::Null);
    }
    match list.index(index as usize) {
        Ok(value) => Ok(RespValue::Bulk(value)),
        Err(_) => Ok(RespValue::Null),
    }
}

/// LRANGE key start stop
pub fn lrange(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let start = parse_int(&ctx.args()[1])?;
    let stop = parse_int(&ctx.args()[2])?;

    let db = engine.db_mut(ctx.db_index())?;
    let list = match db.get_entity(&key) {
        None => return Ok(RespValue::Array(Vec::new())),
        Some(DataEntity::List(list)) => list,
        Some(_) => return Err(CommandError::WrongType),
    };

    let len = list.len() as i64;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if start > stop || start >= len {
        return Ok(RespValue::Array(Vec::new()));
    }

    let items = list
        .iter()
        .skip(start as usize)
        .take((stop - start + 1) as usize)
        .map(RespValue::Bulk)
        .collect();
    Ok(RespValue::Array(items))
}

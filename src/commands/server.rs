//! Server Commands
//!
//! Connection-level verbs: PING, ECHO, SELECT (switching the client's
//! database), DBSIZE, and the two flush commands.

use crate::commands::{parse_int, CommandContext, CommandError};
use crate::protocol::RespValue;
use crate::storage::Engine;

/// PING [message]
pub fn ping(_engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    match ctx.arg_count() {
        0 => Ok(RespValue::pong()),
        1 => Ok(RespValue::Bulk(ctx.args()[0].clone())),
        _ => Err(CommandError::WrongArity("ping".to_string())),
    }
}

/// ECHO message
pub fn echo(_engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    Ok(RespValue::Bulk(ctx.args()[0].clone()))
}

/// SELECT index
pub fn select(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let index = parse_int(&ctx.args()[0])?;
    if index < 0 || index as usize >= engine.db_count() {
        return Err(CommandError::NoSuchDb);
    }
    let index = index as usize;
    if let Some(client) = ctx.client() {
        client.set_db_index(index);
    }
    ctx.set_db_index(index);
    Ok(RespValue::ok())
}

/// DBSIZE
pub fn dbsize(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let db = engine.db_mut(ctx.db_index())?;
    Ok(RespValue::integer(db.len() as i64))
}

/// FLUSHDB
pub fn flushdb(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let db = engine.db_mut(ctx.db_index())?;
    db.flush();
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::ok())
}

/// FLUSHALL
pub fn flushall(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    engine.flush_all();
    let db = engine.db_mut(ctx.db_index())?;
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::ok())
}

//! String Commands
//!
//! GET, SET (with EX/PX/NX/XX), DEL, and EXISTS. DEL and EXISTS work
//! on keys of any type; GET refuses non-string entities.

use crate::commands::{parse_int, CommandContext, CommandError};
use crate::protocol::RespValue;
use crate::storage::{DataEntity, Engine};
use std::time::{Duration, Instant};

/// GET key
pub fn get(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let key = ctx.args()[0].clone();
    let db = engine.db_mut(ctx.db_index())?;
    match db.get_entity(&key) {
        None => Ok(RespValue::Null),
        Some(DataEntity::Bytes(value)) => Ok(RespValue::Bulk(value.clone())),
        Some(_) => Err(CommandError::WrongType),
    }
}

/// SET key value [EX seconds] [PX milliseconds] [NX|XX]
pub fn set(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let args = ctx.args();
    let key = args[0].clone();
    let value = args[1].clone();

    let mut ttl: Option<Duration> = None;
    let mut nx = false;
    let mut xx = false;

    let mut i = 2;
    while i < args.len() {
        let option = String::from_utf8_lossy(&args[i]).to_uppercase();
        match option.as_str() {
            "EX" => {
                i += 1;
                let raw = args.get(i).ok_or(CommandError::Syntax)?;
                let secs = parse_int(raw)?;
                if secs <= 0 {
                    return Err(CommandError::InvalidExpireTime("set".to_string()));
                }
                ttl = Some(Duration::from_secs(secs as u64));
            }
            "PX" => {
                i += 1;
                let raw = args.get(i).ok_or(CommandError::Syntax)?;
                let millis = parse_int(raw)?;
                if millis <= 0 {
                    return Err(CommandError::InvalidExpireTime("set".to_string()));
                }
                ttl = Some(Duration::from_millis(millis as u64));
            }
            "NX" => nx = true,
            "XX" => xx = true,
            _ => return Err(CommandError::Syntax),
        }
        i += 1;
    }
    if nx && xx {
        return Err(CommandError::Syntax);
    }

    let db = engine.db_mut(ctx.db_index())?;
    let entity = DataEntity::Bytes(value);
    let stored = if nx {
        db.put_if_absent(key.clone(), entity) == 1
    } else if xx {
        db.put_if_exists(key.clone(), entity) == 1
    } else {
        db.put_entity(key.clone(), entity);
        true
    };

    if !stored {
        return Ok(RespValue::Null);
    }
    if let Some(ttl) = ttl {
        db.expire(key, Instant::now() + ttl);
    }
    db.add_aof(ctx.cmd_line());
    Ok(RespValue::ok())
}

/// DEL key [key ...]
pub fn del(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let keys = ctx.args().to_vec();
    let db = engine.db_mut(ctx.db_index())?;
    let deleted = db.removes(&keys);
    if deleted > 0 {
        db.add_aof(ctx.cmd_line());
    }
    Ok(RespValue::integer(deleted as i64))
}

/// EXISTS key [key ...]
pub fn exists(engine: &mut Engine, ctx: &mut CommandContext) -> Result<RespValue, CommandError> {
    let keys = ctx.args().to_vec();
    let db = engine.db_mut(ctx.db_index())?;
    Ok(RespValue::integer(db.exists(&keys)))
}

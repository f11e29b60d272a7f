//! Conversion between Lua tables and [`TableObject`]s.
//!
//! Only string keys survive the trip into native code: entries keyed by
//! numbers, booleans or anything else are skipped, and so are string keys
//! that are not valid UTF-8. String values keep their bytes: non-UTF-8
//! values become [`TaggedValue::Bytes`]. Lua integers become
//! [`TaggedValue::Integer`] and Lua floats become [`TaggedValue::Double`],
//! following the Lua 5.4 number subtypes. Values with no native counterpart
//! (functions, userdata, threads) become [`TaggedValue::None`].
//!
//! The way back is asymmetric on purpose: an empty [`TableObject`] becomes
//! `nil`, not an empty table.

use luna_domain::{TableObject, TaggedValue};
use mlua::prelude::*;
use thiserror::Error;
use tracing::trace;

/// Errors from table conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("expected table, found {found}")]
    TypeMismatch { found: &'static str },

    #[error(transparent)]
    Lua(#[from] LuaError),
}

impl From<ConvertError> for LuaError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Lua(inner) => inner,
            other => LuaError::external(other),
        }
    }
}

/// Snapshot a Lua table as a [`TableObject`].
pub fn table_to_object(value: &LuaValue) -> Result<TableObject, ConvertError> {
    match value {
        LuaValue::Table(table) => read_table(table),
        other => Err(ConvertError::TypeMismatch {
            found: other.type_name(),
        }),
    }
}

/// Build a Lua value from a [`TableObject`]; empty tables become `nil`.
pub fn object_to_value(lua: &Lua, object: &TableObject) -> LuaResult<LuaValue> {
    if object.is_empty() {
        return Ok(LuaValue::Nil);
    }

    let table = lua.create_table()?;
    for (key, value) in object {
        table.set(key.as_str(), push_tagged(lua, value)?)?;
    }
    Ok(LuaValue::Table(table))
}

/// Classify a single Lua value.
pub fn tagged_from_value(value: &LuaValue) -> Result<TaggedValue, ConvertError> {
    let tagged = match value {
        LuaValue::String(s) => match s.to_str() {
            Ok(text) => TaggedValue::String(text.to_string()),
            Err(_) => TaggedValue::Bytes(s.as_bytes().to_vec()),
        },
        LuaValue::Integer(n) => TaggedValue::Integer(*n),
        LuaValue::Number(n) => TaggedValue::Double(*n),
        LuaValue::Boolean(b) => TaggedValue::Boolean(*b),
        LuaValue::Nil => TaggedValue::None,
        LuaValue::Table(t) => TaggedValue::Table(read_table(t)?),
        _ => TaggedValue::None,
    };
    Ok(tagged)
}

/// Build the Lua value for a single [`TaggedValue`].
pub fn push_tagged(lua: &Lua, value: &TaggedValue) -> LuaResult<LuaValue> {
    let pushed = match value {
        TaggedValue::String(s) => LuaValue::String(lua.create_string(s)?),
        TaggedValue::Bytes(b) => LuaValue::String(lua.create_string(b)?),
        TaggedValue::Integer(n) => LuaValue::Integer(*n),
        TaggedValue::Double(d) => LuaValue::Number(*d),
        TaggedValue::Boolean(b) => LuaValue::Boolean(*b),
        TaggedValue::Table(t) => object_to_value(lua, t)?,
        TaggedValue::None => LuaValue::Nil,
    };
    Ok(pushed)
}

fn read_table(table: &LuaTable) -> Result<TableObject, ConvertError> {
    let mut object = TableObject::new();
    for pair in table.clone().pairs::<LuaValue, LuaValue>() {
        let (key, value) = pair?;
        let LuaValue::String(key) = key else {
            continue;
        };
        let Ok(key) = key.to_str() else {
            trace!("skipping non-UTF-8 table key");
            continue;
        };
        object.insert(key.to_string(), tagged_from_value(&value)?);
    }
    Ok(object)
}

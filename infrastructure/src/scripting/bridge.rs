//! Function bridge: exposes native callables to scripts.
//!
//! Two shapes are supported:
//!
//! - **Free functions** ([`push_function`]): a native closure captured by a
//!   Lua function. The capture lives as long as the Lua function does.
//! - **Methods** ([`push_method`]): a native method bound to a receiver
//!   held behind `Arc<T>`. Only a weak reference is captured, so a script
//!   callback may outlive the receiver; calling it afterwards returns no
//!   values instead of raising an error. The bridge takes no lock of its
//!   own: a method may call back into scripts that call other methods on
//!   the same receiver, so receivers keep their state in interior-mutable
//!   fields and never hold a guard across a script call.
//!
//! Registered functions can be installed at dotted global paths
//! ([`register_function`]) and found again with [`lookup_function`].

use mlua::prelude::*;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// A native function callable from scripts.
pub type NativeFunction =
    Box<dyn Fn(&Lua, LuaMultiValue) -> LuaResult<LuaMultiValue> + Send + 'static>;

/// The native side of one bridged function.
struct BridgeRecord {
    name: String,
    func: NativeFunction,
}

/// Receiver and method captured by a method-style bridge.
struct MethodCapture<T, F> {
    name: String,
    receiver: Weak<T>,
    method: F,
}

/// Wrap a native closure in a Lua function.
pub fn push_function<F>(lua: &Lua, name: &str, func: F) -> LuaResult<LuaFunction>
where
    F: Fn(&Lua, LuaMultiValue) -> LuaResult<LuaMultiValue> + Send + 'static,
{
    let record = BridgeRecord {
        name: name.to_string(),
        func: Box::new(func),
    };

    lua.create_function(move |lua, args: LuaMultiValue| {
        trace!(bridge = %record.name, args = args.len(), "native function called");
        (record.func)(lua, args)
    })
}

/// Wrap a native method bound to `receiver` in a Lua function.
///
/// Once every strong reference to the receiver is gone the function becomes
/// a no-op returning zero values.
pub fn push_method<T, F>(
    lua: &Lua,
    name: &str,
    receiver: &Arc<T>,
    method: F,
) -> LuaResult<LuaFunction>
where
    T: Send + Sync + 'static,
    F: Fn(&T, &Lua, LuaMultiValue) -> LuaResult<LuaMultiValue> + Send + 'static,
{
    let capture = MethodCapture {
        name: name.to_string(),
        receiver: Arc::downgrade(receiver),
        method,
    };

    lua.create_function(move |lua, args: LuaMultiValue| {
        let Some(receiver) = capture.receiver.upgrade() else {
            debug!(bridge = %capture.name, "receiver dropped, call ignored");
            return Ok(LuaMultiValue::new());
        };
        trace!(bridge = %capture.name, args = args.len(), "native method called");
        (capture.method)(&receiver, lua, args)
    })
}

/// Install `function` at a dotted global path, creating intermediate tables.
///
/// Fails if an intermediate segment exists but is not a table.
pub fn register_function(lua: &Lua, path: &str, function: LuaFunction) -> LuaResult<()> {
    let (parents, leaf) = split_path(path)?;

    let mut table = lua.globals();
    for segment in parents {
        table = match table.get::<LuaValue>(segment)? {
            LuaValue::Table(existing) => existing,
            LuaValue::Nil => {
                let created = lua.create_table()?;
                table.set(segment, created.clone())?;
                created
            }
            other => {
                return Err(LuaError::runtime(format!(
                    "cannot register '{}': '{}' is a {}",
                    path,
                    segment,
                    other.type_name()
                )));
            }
        };
    }

    table.set(leaf, function)?;
    debug!("Registered native function '{}'", path);
    Ok(())
}

/// Resolve a dotted global path to a function.
///
/// Returns `None` when a segment is missing or not a table, or when the
/// leaf is not a function.
pub fn lookup_function(lua: &Lua, path: &str) -> LuaResult<Option<LuaFunction>> {
    let (parents, leaf) = split_path(path)?;

    let mut table = lua.globals();
    for segment in parents {
        table = match table.get::<LuaValue>(segment)? {
            LuaValue::Table(next) => next,
            _ => return Ok(None),
        };
    }

    match table.get::<LuaValue>(leaf)? {
        LuaValue::Function(f) => Ok(Some(f)),
        _ => Ok(None),
    }
}

fn split_path(path: &str) -> LuaResult<(Vec<&str>, &str)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(LuaError::runtime(format!("invalid function path '{}'", path)));
    }
    // split always yields at least one segment
    let leaf = segments.pop().unwrap_or_default();
    Ok((segments, leaf))
}

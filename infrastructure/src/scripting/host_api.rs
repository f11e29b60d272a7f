//! `luna` Lua API: the host functions every script can reach.
//!
//! ```lua
//! luna.version                      -- host version string
//! luna.log("info", "loaded")        -- routed to tracing (target luna::script)
//! if luna.set_fence("my.setup") then
//!     -- runs once per interpreter
//! end
//! luna.clear_fence("my.setup")
//! ```

use mlua::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, trace, warn};

use super::bridge::{push_function, push_method};
use super::fence::{clear_fence, set_fence};

/// Receiver behind `luna.log`.
#[derive(Debug, Default)]
pub struct ScriptLog {
    emitted: AtomicUsize,
}

impl ScriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages scripts have logged so far.
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    fn record(&self, level: &str, message: &str) -> LuaResult<()> {
        match level {
            "trace" => trace!(target: "luna::script", "{}", message),
            "debug" => debug!(target: "luna::script", "{}", message),
            "info" => info!(target: "luna::script", "{}", message),
            "warn" => warn!(target: "luna::script", "{}", message),
            "error" => error!(target: "luna::script", "{}", message),
            other => {
                return Err(LuaError::runtime(format!(
                    "unknown log level '{}'. Valid levels: trace, debug, info, warn, error",
                    other
                )));
            }
        }
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Register the `luna` global table.
pub fn register_host_api(lua: &Lua, log: &Arc<ScriptLog>) -> LuaResult<()> {
    let luna = lua.create_table()?;

    luna.set("version", env!("CARGO_PKG_VERSION"))?;

    // luna.log(level, message)
    let log_fn = push_method(lua, "luna.log", log, |log: &ScriptLog, lua, args| {
        let (level, message) = <(String, String)>::from_lua_multi(args, lua)?;
        log.record(&level, &message)?;
        Ok(LuaMultiValue::new())
    })?;
    luna.set("log", log_fn)?;

    // luna.set_fence(name) -> boolean
    let set_fn = push_function(lua, "luna.set_fence", |lua, args| {
        let name = String::from_lua_multi(args, lua)?;
        set_fence(lua, &name).into_lua_multi(lua)
    })?;
    luna.set("set_fence", set_fn)?;

    // luna.clear_fence(name)
    let clear_fn = push_function(lua, "luna.clear_fence", |lua, args| {
        let name = String::from_lua_multi(args, lua)?;
        clear_fence(lua, &name);
        Ok(LuaMultiValue::new())
    })?;
    luna.set("clear_fence", clear_fn)?;

    lua.globals().set("luna", luna)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::fence::has_fence;

    fn setup() -> (Lua, Arc<ScriptLog>) {
        let lua = Lua::new();
        let log = Arc::new(ScriptLog::new());
        register_host_api(&lua, &log).unwrap();
        (lua, log)
    }

    #[test]
    fn test_version_is_exposed() {
        let (lua, _log) = setup();
        let version: String = lua.load("return luna.version").eval().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_log_counts_messages() {
        let (lua, log) = setup();
        lua.load(
            r#"
            luna.log("info", "hello")
            luna.log("debug", "details")
        "#,
        )
        .exec()
        .unwrap();
        assert_eq!(log.emitted(), 2);
    }

    #[test]
    fn test_log_rejects_unknown_level() {
        let (lua, log) = setup();
        let result = lua.load(r#"luna.log("loud", "hello")"#).exec();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
        assert_eq!(log.emitted(), 0);
    }

    #[test]
    fn test_log_after_receiver_dropped_is_silent() {
        let (lua, log) = setup();
        drop(log);
        assert!(lua.load(r#"luna.log("info", "nobody listens")"#).exec().is_ok());
    }

    #[test]
    fn test_script_fences() {
        let (lua, _log) = setup();
        let (first, second, after_clear): (bool, bool, bool) = lua
            .load(
                r#"
                local a = luna.set_fence("plugin.init")
                local b = luna.set_fence("plugin.init")
                luna.clear_fence("plugin.init")
                return a, b, luna.set_fence("plugin.init")
            "#,
            )
            .eval()
            .unwrap();

        assert!(first);
        assert!(!second);
        assert!(after_clear);
        assert!(has_fence(&lua, "plugin.init"));
    }

    #[test]
    fn test_script_and_native_share_fences() {
        let (lua, _log) = setup();
        assert!(set_fence(&lua, "shared"));
        let granted: bool = lua.load(r#"return luna.set_fence("shared")"#).eval().unwrap();
        assert!(!granted);
    }
}

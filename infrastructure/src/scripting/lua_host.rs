//! Main Lua script host: ties together sandbox, host API, bridges,
//! fences, conversion and protected calls.
//!
//! `LuaScriptHost` implements `ScriptHostPort` from the application layer,
//! providing the concrete Lua 5.4 runtime backed by mlua.

use luna_application::{HostError, SandboxPolicy, ScriptHostPort};
use luna_domain::{TableObject, TaggedValue};
use mlua::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::bridge::{lookup_function, push_function, push_method, register_function};
use super::convert::{ConvertError, object_to_value, push_tagged, table_to_object, tagged_from_value};
use super::fence::{clear_fence, set_fence};
use super::host_api::{ScriptLog, register_host_api};
use super::protected::{CallStack, call_protected};
use super::sandbox::apply_sandbox;

/// Lua 5.4 script host implementing `ScriptHostPort`.
///
/// Owns the Lua VM and the receivers of its built-in bridges.
/// Thread-safe via internal `Mutex` wrapping of the Lua state; the state
/// itself is only ever driven by one caller at a time.
pub struct LuaScriptHost {
    lua: Mutex<Lua>,
    script_log: Arc<ScriptLog>,
}

impl LuaScriptHost {
    /// Create a new host with the given sandbox policy.
    ///
    /// Sets up the VM with:
    /// - Sandbox restrictions from `policy`
    /// - `luna.version`, `luna.log(level, message)`
    /// - `luna.set_fence(name)`, `luna.clear_fence(name)`
    pub fn new(policy: &SandboxPolicy) -> Result<Self, HostError> {
        let lua = Lua::new();
        let script_log = Arc::new(ScriptLog::new());

        apply_sandbox(&lua, policy).map_err(|e| {
            HostError::Lua(format!("sandbox setup failed: {}", e))
        })?;
        register_host_api(&lua, &script_log).map_err(lua_to_host_error)?;

        Ok(Self {
            lua: Mutex::new(lua),
            script_log,
        })
    }

    /// Expose a native function to scripts at a dotted global path.
    pub fn register_function<F>(&self, path: &str, func: F) -> Result<(), HostError>
    where
        F: Fn(&Lua, LuaMultiValue) -> LuaResult<LuaMultiValue> + Send + 'static,
    {
        self.with_lua(|lua| {
            let function = push_function(lua, path, func)?;
            register_function(lua, path, function)
        })
    }

    /// Expose a native method bound to `receiver` at a dotted global path.
    ///
    /// The host keeps only a weak reference: once the caller drops the
    /// receiver, script calls to the method return nothing. Methods get a
    /// shared reference, so mutable state lives behind the receiver's own
    /// atomics or short-lived locks.
    pub fn register_method<T, F>(
        &self,
        path: &str,
        receiver: &Arc<T>,
        method: F,
    ) -> Result<(), HostError>
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Lua, LuaMultiValue) -> LuaResult<LuaMultiValue> + Send + 'static,
    {
        self.with_lua(|lua| {
            let function = push_method(lua, path, receiver, method)?;
            register_function(lua, path, function)
        })
    }

    /// Number of messages scripts have logged through `luna.log`.
    pub fn messages_logged(&self) -> usize {
        self.script_log.emitted()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Lua>, HostError> {
        self.lua.lock().map_err(|_| HostError::Poisoned("lua"))
    }

    fn with_lua<R>(&self, f: impl FnOnce(&Lua) -> LuaResult<R>) -> Result<R, HostError> {
        let lua = self.lock()?;
        f(&lua).map_err(lua_to_host_error)
    }
}

impl ScriptHostPort for LuaScriptHost {
    fn load_script(&self, path: &Path) -> Result<(), HostError> {
        let content = std::fs::read_to_string(path).map_err(|e| HostError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.exec_source(&path.to_string_lossy(), &content)
    }

    fn exec_source(&self, name: &str, source: &str) -> Result<(), HostError> {
        debug!("Executing chunk '{}'", name);
        self.with_lua(|lua| lua.load(source).set_name(name).exec())
    }

    fn set_fence(&self, name: &str) -> bool {
        match self.lock() {
            Ok(lua) => set_fence(&lua, name),
            Err(_) => false,
        }
    }

    fn clear_fence(&self, name: &str) {
        if let Ok(lua) = self.lock() {
            clear_fence(&lua, name);
        }
    }

    fn read_table(&self, global: &str) -> Result<TableObject, HostError> {
        let lua = self.lock()?;
        let value: LuaValue = lua.globals().get(global).map_err(lua_to_host_error)?;
        table_to_object(&value).map_err(convert_to_host_error)
    }

    fn write_table(&self, global: &str, table: &TableObject) -> Result<(), HostError> {
        self.with_lua(|lua| {
            let value = object_to_value(lua, table)?;
            lua.globals().set(global, value)
        })
    }

    fn call_function(
        &self,
        path: &str,
        args: Vec<TaggedValue>,
    ) -> Result<Vec<TaggedValue>, HostError> {
        let lua = self.lock()?;

        let function = lookup_function(&lua, path)
            .map_err(lua_to_host_error)?
            .ok_or_else(|| HostError::InvalidCallTarget {
                target: path.to_string(),
            })?;

        let mut stack = CallStack::new();
        stack.push(LuaValue::Function(function));
        for arg in &args {
            stack.push(push_tagged(&lua, arg).map_err(lua_to_host_error)?);
        }

        let mut error = String::new();
        if !call_protected(&mut stack, Some(&mut error), args.len(), None) {
            return Err(HostError::Runtime { message: error });
        }

        stack
            .drain()
            .iter()
            .map(tagged_from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(convert_to_host_error)
    }

    fn has_function(&self, path: &str) -> bool {
        match self.lock() {
            Ok(lua) => matches!(lookup_function(&lua, path), Ok(Some(_))),
            Err(_) => false,
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Convert an mlua error to a HostError.
fn lua_to_host_error(e: LuaError) -> HostError {
    HostError::Lua(e.to_string())
}

fn convert_to_host_error(e: ConvertError) -> HostError {
    match e {
        ConvertError::TypeMismatch { found } => HostError::TypeMismatch {
            found: found.to_string(),
        },
        ConvertError::Lua(inner) => lua_to_host_error(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn make_host() -> LuaScriptHost {
        LuaScriptHost::new(&SandboxPolicy::default()).unwrap()
    }

    #[test]
    fn test_host_is_available() {
        assert!(make_host().is_available());
    }

    #[test]
    fn test_load_script() {
        let host = make_host();

        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("test.lua");
        std::fs::write(&script_path, r#"result = { status = "ok" }"#).unwrap();

        host.load_script(&script_path).unwrap();

        let result = host.read_table("result").unwrap();
        assert_eq!(result.get("status"), Some(&TaggedValue::String("ok".into())));
    }

    #[test]
    fn test_load_nonexistent_script() {
        let host = make_host();
        let result = host.load_script(Path::new("/nonexistent/init.lua"));
        assert!(matches!(result, Err(HostError::Io { .. })));
    }

    #[test]
    fn test_script_syntax_error_names_the_file() {
        let host = make_host();

        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("bad.lua");
        std::fs::write(&script_path, "this is not valid lua {{{{").unwrap();

        let err = host.load_script(&script_path).unwrap_err();
        assert!(err.to_string().contains("bad.lua"));
    }

    #[test]
    fn test_write_then_read_table() {
        let host = make_host();
        let config = TableObject::new()
            .with_entry("name", "demo")
            .with_entry("limits", TableObject::new().with_entry("max", 10));

        host.write_table("config", &config).unwrap();
        host.exec_source("check", "assert(config.limits.max == 10)").unwrap();

        assert_eq!(host.read_table("config").unwrap(), config);
    }

    #[test]
    fn test_write_empty_table_clears_global() {
        let host = make_host();
        host.exec_source("setup", "config = { stale = true }").unwrap();

        host.write_table("config", &TableObject::new()).unwrap();

        let err = host.read_table("config").unwrap_err();
        assert_eq!(err, HostError::TypeMismatch { found: "nil".into() });
    }

    #[test]
    fn test_read_non_table_is_type_mismatch() {
        let host = make_host();
        host.exec_source("setup", "answer = 42").unwrap();

        let err = host.read_table("answer").unwrap_err();
        assert_eq!(err, HostError::TypeMismatch { found: "integer".into() });
    }

    #[test]
    fn test_call_function_converts_args_and_results() {
        let host = make_host();
        host.exec_source(
            "setup",
            r#"
            app = {}
            function app.describe(name, count, opts)
                return name .. ":" .. count, { loud = opts.loud }, 0.5
            end
        "#,
        )
        .unwrap();

        let results = host
            .call_function(
                "app.describe",
                vec![
                    TaggedValue::from("job"),
                    TaggedValue::from(3),
                    TaggedValue::from(TableObject::new().with_entry("loud", true)),
                ],
            )
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], TaggedValue::String("job:3".into()));
        assert_eq!(
            results[1],
            TaggedValue::Table(TableObject::new().with_entry("loud", true))
        );
        assert_eq!(results[2], TaggedValue::Double(0.5));
    }

    #[test]
    fn test_call_missing_function_is_invalid_target() {
        let host = make_host();
        let err = host.call_function("nope", vec![]).unwrap_err();
        assert_eq!(
            err,
            HostError::InvalidCallTarget {
                target: "nope".into()
            }
        );
        assert!(!host.has_function("nope"));
    }

    #[test]
    fn test_call_error_is_runtime_error() {
        let host = make_host();
        host.exec_source("setup", "function fail() error('exploded') end")
            .unwrap();

        match host.call_function("fail", vec![]) {
            Err(HostError::Runtime { message }) => assert!(message.contains("exploded")),
            other => panic!("expected runtime error, got {:?}", other),
        }

        // the host stays usable after a failed call
        host.exec_source("after", "function ok() return true end").unwrap();
        assert_eq!(
            host.call_function("ok", vec![]).unwrap(),
            vec![TaggedValue::Boolean(true)]
        );
    }

    #[test]
    fn test_fences_through_port() {
        let host = make_host();
        assert!(host.set_fence("x"));
        assert!(!host.set_fence("x"));
        host.clear_fence("x");
        assert!(host.set_fence("x"));
    }

    #[test]
    fn test_register_function() {
        let host = make_host();
        host.register_function("native.double", |lua, args| {
            let n = i64::from_lua_multi(args, lua)?;
            (n * 2).into_lua_multi(lua)
        })
        .unwrap();
        host.exec_source("setup", "function run(n) return native.double(n) end")
            .unwrap();

        let results = host.call_function("run", vec![TaggedValue::from(21)]).unwrap();
        assert_eq!(results, vec![TaggedValue::Integer(42)]);
    }

    #[test]
    fn test_register_method_and_drop_receiver() {
        #[derive(Default)]
        struct Tally {
            total: AtomicI64,
        }

        let host = make_host();
        let tally = Arc::new(Tally::default());
        host.register_method("tally.add", &tally, |tally: &Tally, lua, args| {
            let n = i64::from_lua_multi(args, lua)?;
            (tally.total.fetch_add(n, Ordering::SeqCst) + n).into_lua_multi(lua)
        })
        .unwrap();
        host.exec_source("setup", "function add(n) return tally.add(n) end")
            .unwrap();

        host.call_function("add", vec![TaggedValue::from(5)]).unwrap();
        host.call_function("add", vec![TaggedValue::from(7)]).unwrap();
        assert_eq!(tally.total.load(Ordering::SeqCst), 12);

        drop(tally);
        let results = host.call_function("add", vec![TaggedValue::from(1)]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_script_log_is_counted() {
        let host = make_host();
        host.exec_source("log", r#"luna.log("info", "hello from lua")"#)
            .unwrap();
        assert_eq!(host.messages_logged(), 1);
    }

    #[test]
    fn test_sandbox_active() {
        let host = make_host();
        host.exec_source("check", "assert(package.loadlib == nil)")
            .unwrap();
    }
}

//! Lua scripting host (feature-gated: `scripting`)
//!
//! Provides the `LuaScriptHost` that implements `ScriptHostPort`
//! from the application layer, backed by mlua (Lua 5.4).
//!
//! # Modules
//!
//! - `convert`: Lua table ↔ `TableObject` conversion
//! - `bridge`: native functions and methods exposed to scripts
//! - `fence`: per-interpreter one-time registration guards
//! - `protected`: protected calls with a traceback handler
//! - `sandbox`: policy-driven restrictions on a fresh state
//! - `host_api`: the `luna` global table
//! - `lua_host`: Main host struct tying everything together

pub mod bridge;
pub mod convert;
pub mod fence;
mod host_api;
mod lua_host;
pub mod protected;
mod sandbox;

pub use host_api::ScriptLog;
pub use lua_host::LuaScriptHost;

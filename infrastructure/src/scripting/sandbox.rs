//! Lua sandbox: applies a [`SandboxPolicy`] to a fresh state.
//!
//! Script code is trusted, so the pure-Lua standard libraries stay
//! available. Native module loading is blocked by default because a C
//! module built against another Lua ABI crashes the host.

use luna_application::SandboxPolicy;
use mlua::prelude::*;
use tracing::debug;

/// Apply the policy's restrictions to the Lua VM.
pub fn apply_sandbox(lua: &Lua, policy: &SandboxPolicy) -> LuaResult<()> {
    let globals = lua.globals();

    if policy.block_c_modules
        && let Ok(package) = globals.get::<LuaTable>("package")
    {
        package.set("loadlib", LuaValue::Nil)?;
        package.set("cpath", "")?;
        debug!("Blocked C module loading");
    }

    for name in &policy.remove_globals {
        globals.set(name.as_str(), LuaValue::Nil)?;
        debug!("Removed global '{}'", name);
    }

    Ok(())
}

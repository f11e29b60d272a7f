//! Registration fences scoped to one Lua state.
//!
//! The [`FenceSet`] is kept in the state's app data: it is created on first
//! use, dropped together with the `Lua` instance, and never shared between
//! two interpreters. Scripts only see it through the bridges installed by
//! the host.

use luna_domain::FenceSet;
use mlua::Lua;
use tracing::debug;

/// Record `name` for this interpreter. Returns `false` if it already is.
pub fn set_fence(lua: &Lua, name: &str) -> bool {
    if let Some(mut fences) = lua.app_data_mut::<FenceSet>() {
        let inserted = fences.try_set(name);
        debug!(fence = name, inserted, "set fence");
        return inserted;
    }

    let mut fences = FenceSet::new();
    fences.try_set(name);
    lua.set_app_data(fences);
    debug!(fence = name, inserted = true, "set fence");
    true
}

/// Remove `name` for this interpreter; absent names are ignored.
pub fn clear_fence(lua: &Lua, name: &str) {
    if let Some(mut fences) = lua.app_data_mut::<FenceSet>() {
        fences.clear(name);
        debug!(fence = name, "cleared fence");
    }
}

/// Whether `name` is currently recorded for this interpreter.
pub fn has_fence(lua: &Lua, name: &str) -> bool {
    lua.app_data_ref::<FenceSet>()
        .is_some_and(|fences| fences.contains(name))
}

//! Protected calls with a traceback handler.
//!
//! [`CallStack`] is the native call frame: callers push a function followed
//! by its arguments, then [`call_protected`] invokes it. Errors raised by the
//! script are caught and returned as text; they never unwind into native
//! code.
//!
//! The call goes through mlua's protected call, whose message handler
//! appends a `stack traceback:` section to script errors. Scripts cannot
//! replace that handler: no global (`xpcall`, `debug`) is consulted.

use mlua::prelude::*;
use tracing::debug;

/// Native staging area for protected calls.
#[derive(Debug, Default)]
pub struct CallStack {
    slots: Vec<LuaValue>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: LuaValue) {
        self.slots.push(value);
    }

    pub fn pop(&mut self) -> Option<LuaValue> {
        self.slots.pop()
    }

    /// Number of values on the stack.
    pub fn top(&self) -> usize {
        self.slots.len()
    }

    /// Value at a 0-based position from the bottom.
    pub fn get(&self, index: usize) -> Option<&LuaValue> {
        self.slots.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove and return every value, bottom first.
    pub fn drain(&mut self) -> Vec<LuaValue> {
        std::mem::take(&mut self.slots)
    }
}

/// Call the function sitting `arg_count` slots below the top of `stack`.
///
/// Returns `false` without touching the stack when that slot is missing or
/// does not hold a function. Otherwise the function and its arguments are
/// always popped; on success `result_count` values are pushed (padded with
/// nil or truncated; `None` keeps every value), on failure the error text is
/// written to `error` and nothing is pushed.
pub fn call_protected(
    stack: &mut CallStack,
    error: Option<&mut String>,
    arg_count: usize,
    result_count: Option<usize>,
) -> bool {
    if arg_count >= stack.top() {
        debug!(arg_count, top = stack.top(), "no call target below arguments");
        return false;
    }

    let func_index = stack.top() - arg_count - 1;
    let func = match &stack.slots[func_index] {
        LuaValue::Function(f) => f.clone(),
        other => {
            debug!(found = other.type_name(), "call target is not a function");
            return false;
        }
    };

    let args = stack.slots.split_off(func_index + 1);
    stack.slots.truncate(func_index);

    match func.call::<LuaMultiValue>(LuaMultiValue::from_vec(args)) {
        Ok(results) => {
            let mut results = results.into_vec();
            if let Some(count) = result_count {
                results.resize(count, LuaValue::Nil);
            }
            stack.slots.extend(results);
            true
        }
        Err(e) => {
            let message = e.to_string();
            debug!("protected call failed: {}", message);
            if let Some(error) = error {
                *error = message;
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(lua: &Lua, source: &str) -> LuaValue {
        LuaValue::Function(lua.load(source).eval::<LuaFunction>().unwrap())
    }

    #[test]
    fn test_call_with_args_and_results() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(function(&lua, "function(a, b) return a + b, a * b end"));
        stack.push(LuaValue::Integer(3));
        stack.push(LuaValue::Integer(4));

        assert!(call_protected(&mut stack, None, 2, Some(2)));

        assert_eq!(stack.drain(), vec![LuaValue::Integer(7), LuaValue::Integer(12)]);
    }

    #[test]
    fn test_results_are_padded_and_truncated() {
        let lua = Lua::new();

        let mut stack = CallStack::new();
        stack.push(function(&lua, "function() return 1 end"));
        assert!(call_protected(&mut stack, None, 0, Some(3)));
        assert_eq!(
            stack.drain(),
            vec![LuaValue::Integer(1), LuaValue::Nil, LuaValue::Nil]
        );

        stack.push(function(&lua, "function() return 1, 2, 3 end"));
        assert!(call_protected(&mut stack, None, 0, Some(1)));
        assert_eq!(stack.drain(), vec![LuaValue::Integer(1)]);
    }

    #[test]
    fn test_all_results_kept_without_count() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(function(&lua, "function() return 'a', 'b', 'c', 'd' end"));

        assert!(call_protected(&mut stack, None, 0, None));
        assert_eq!(stack.top(), 4);
    }

    #[test]
    fn test_values_below_the_call_are_untouched() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(LuaValue::Integer(99));
        stack.push(function(&lua, "function(x) return x end"));
        stack.push(LuaValue::Boolean(true));

        assert!(call_protected(&mut stack, None, 1, Some(1)));
        assert_eq!(
            stack.drain(),
            vec![LuaValue::Integer(99), LuaValue::Boolean(true)]
        );
    }

    #[test]
    fn test_non_function_target_fails_without_side_effects() {
        let mut stack = CallStack::new();
        stack.push(LuaValue::Integer(1));
        stack.push(LuaValue::Integer(2));
        let mut error = String::from("untouched");

        assert!(!call_protected(&mut stack, Some(&mut error), 1, Some(1)));

        assert_eq!(error, "untouched");
        assert_eq!(stack.drain(), vec![LuaValue::Integer(1), LuaValue::Integer(2)]);
    }

    #[test]
    fn test_missing_target_fails() {
        let mut stack = CallStack::new();
        stack.push(LuaValue::Integer(1));

        assert!(!call_protected(&mut stack, None, 1, None));
        assert!(!call_protected(&mut CallStack::new(), None, 0, None));
        assert_eq!(stack.top(), 1);
    }

    #[test]
    fn test_runtime_error_is_reported_and_stack_cleaned() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(LuaValue::Integer(5));
        stack.push(function(&lua, "function(x) error('boom ' .. x) end"));
        stack.push(LuaValue::Integer(1));
        let mut error = String::new();

        assert!(!call_protected(&mut stack, Some(&mut error), 1, Some(1)));

        assert!(error.contains("boom 1"), "unexpected error text: {}", error);
        assert_eq!(stack.drain(), vec![LuaValue::Integer(5)]);
    }

    #[test]
    fn test_error_without_output_slot() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(function(&lua, "function() error('ignored') end"));

        assert!(!call_protected(&mut stack, None, 0, Some(0)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_error_text_carries_traceback() {
        let lua = Lua::new();
        let mut stack = CallStack::new();
        stack.push(function(
            &lua,
            "function() local function inner() error('deep failure') end inner() end",
        ));
        let mut error = String::new();

        assert!(!call_protected(&mut stack, Some(&mut error), 0, None));
        assert!(error.contains("deep failure"), "unexpected error text: {}", error);
        assert!(error.contains("stack traceback"), "no traceback in: {}", error);
    }

    #[test]
    fn test_script_globals_cannot_replace_the_handler() {
        let lua = Lua::new();
        lua.load(
            r#"
            debug = { traceback = function() return "hijacked" end }
            xpcall = function() return true end
        "#,
        )
        .exec()
        .unwrap();

        let mut stack = CallStack::new();
        stack.push(function(&lua, "function() error('real', 0) end"));
        let mut error = String::new();

        assert!(!call_protected(&mut stack, Some(&mut error), 0, None));
        assert!(error.contains("real"));
        assert!(!error.contains("hijacked"));
    }
}

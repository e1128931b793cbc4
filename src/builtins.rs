// ABOUTME: Built-in functions bound into the root environment at startup

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// Writes each argument's display form to standard output, concatenated
/// with no separators, followed by a single trailing newline. Returns
/// `Value::Unit`.
fn builtin_print(args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        print!("{arg}");
    }
    println!();
    Ok(Value::Unit)
}

/// Binds every built-in into `env`. UP has exactly one built-in category,
/// so there's a single registration entry point rather than one per
/// category.
pub fn register_builtins(env: &Rc<Environment>) {
    env.define("print".to_string(), Value::Builtin("print", builtin_print));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_bound_in_a_fresh_root() {
        let env = Environment::new();
        register_builtins(&env);
        assert!(matches!(env.get("print"), Some(Value::Builtin("print", _))));
    }

    #[test]
    fn print_returns_unit() {
        let result = builtin_print(&[Value::Integer(1), Value::Str("x".into())]);
        assert!(matches!(result, Ok(Value::Unit)));
    }
}

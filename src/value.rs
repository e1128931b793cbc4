// ABOUTME: Runtime value types produced by the evaluator

use crate::error::EvalError;
use std::fmt;
use std::rc::Rc;

use crate::ast::FuncDecl;

/// A tagged runtime value. Functions (user-defined and built-in) live in the
/// environment by name; there is no first-class function type exposed to
/// user code, no closures, and no garbage collector — values are plain
/// integers/strings/function handles that live for the program's duration.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Str(String),
    Function(Rc<FuncDecl>),
    Builtin(&'static str, fn(&[Value]) -> Result<Value, EvalError>),
    /// The result of a statement with no meaningful value (e.g. `print`, or
    /// a zero-iteration `for` loop).
    Unit,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::Builtin(..) => "builtin",
            Value::Unit => "unit",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Function(decl) => write!(f, "<func {}/{}>", decl.name, decl.params.len()),
            Value::Builtin(name, _) => write!(f, "<builtin {name}>"),
            Value::Unit => write!(f, ""),
        }
    }
}

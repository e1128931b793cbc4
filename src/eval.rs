// ABOUTME: Tree-walking evaluator dispatching on AST node variants

use crate::ast::{FuncDecl, Node, Op, Program};
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// The result of evaluating one statement. `Return` carries a value that
/// must propagate out of every enclosing statement (loop bodies, sequences)
/// until it reaches the function call that's executing the body, unlike
/// the "last statement wins" shape that would silently swallow a mid-body
/// `return`.
enum Flow {
    Value(Value),
    Return(Value),
}

/// Runs `program`'s `main` function to completion, for side effects only
/// (the `print` built-in writes to standard output); the returned `Value`
/// is `main`'s own return value and is otherwise unused by callers that
/// only care about program effects.
pub fn run(program: &Program) -> Result<Value, EvalError> {
    let root = Environment::new();
    crate::builtins::register_builtins(&root);

    for func in &program.functions {
        root.define(func.name.clone(), Value::Function(Rc::new(func.clone())));
    }

    call_function("main", &[], &root)
}

/// Looks up `name` in `env` and invokes it (user-defined or built-in) with
/// already-evaluated `args`.
fn call_function(name: &str, args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    match env.get(name) {
        Some(Value::Function(decl)) => call_user_function(&decl, args, env),
        Some(Value::Builtin(_, f)) => f(args),
        Some(_) => Err(EvalError::TypeError {
            operator: "call".to_string(),
            operands: format!("{name} is not callable"),
        }),
        None => Err(EvalError::NameError(name.to_string())),
    }
}

/// Calls a user-defined function. Per the language's design, functions are
/// not closures: the call's scope chains to the *root* environment, never
/// to the caller's local scope.
fn call_user_function(
    decl: &FuncDecl,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    if args.len() != decl.params.len() {
        return Err(EvalError::ArityError {
            function: decl.name.clone(),
            expected: decl.params.len(),
            actual: args.len(),
        });
    }

    let root = env.root();
    let call_scope = Environment::with_parent(root);
    for (param, arg) in decl.params.iter().zip(args) {
        call_scope.define(param.name.clone(), arg.clone());
    }

    match eval_block(&decl.body, &call_scope)? {
        Flow::Value(v) => Ok(v),
        Flow::Return(v) => Ok(v),
    }
}

/// Evaluates `body` in order, short-circuiting on the first `Return`.
fn eval_block(body: &[Node], env: &Rc<Environment>) -> Result<Flow, EvalError> {
    let mut last = Value::Unit;
    for stmt in body {
        match eval_stmt(stmt, env)? {
            Flow::Value(v) => last = v,
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
    }
    Ok(Flow::Value(last))
}

fn eval_stmt(node: &Node, env: &Rc<Environment>) -> Result<Flow, EvalError> {
    match node {
        Node::Return(inner) => Ok(Flow::Return(eval_expr(inner, env)?)),
        Node::ForLoop {
            variable,
            range,
            body,
        } => eval_for_loop(variable, range, body, env),
        other => Ok(Flow::Value(eval_expr(other, env)?)),
    }
}

fn eval_for_loop(
    variable: &str,
    range: &Node,
    body: &[Node],
    env: &Rc<Environment>,
) -> Result<Flow, EvalError> {
    let n = match eval_expr(range, env)? {
        Value::Integer(n) => n,
        other => {
            return Err(EvalError::TypeError {
                operator: "range".to_string(),
                operands: other.type_name().to_string(),
            })
        }
    };

    let mut last = Value::Unit;
    for i in 0..n {
        env.define(variable.to_string(), Value::Integer(i));
        match eval_block(body, env)? {
            Flow::Value(v) => last = v,
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
    }
    Ok(Flow::Value(last))
}

/// Evaluates a node that always produces a value: everything except
/// `Return` and `ForLoop`, which only ever appear as statements (see
/// `eval_stmt`).
fn eval_expr(node: &Node, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match node {
        Node::Int(n) => Ok(Value::Integer(*n)),
        Node::Float(_) => Err(EvalError::TypeError {
            operator: "evaluate".to_string(),
            operands: "float (no operator accepts floating-point operands)".to_string(),
        }),
        Node::Str(s) => Ok(Value::Str(s.clone())),
        Node::Identifier(name) => env
            .get(name)
            .ok_or_else(|| EvalError::NameError(name.clone())),
        Node::Assignment {
            var_name, value, ..
        } => {
            let v = eval_expr(value, env)?;
            env.define(var_name.clone(), v.clone());
            Ok(v)
        }
        Node::BinOp { left, op, right } => {
            let l = eval_expr(left, env)?;
            let r = eval_expr(right, env)?;
            eval_binop(*op, l, r)
        }
        Node::FunctionCall {
            function_name,
            arguments,
        } => {
            let mut args = Vec::with_capacity(arguments.len());
            for arg in arguments {
                args.push(eval_expr(arg, env)?);
            }
            call_function(function_name, &args, env)
        }
        Node::Return(_) | Node::ForLoop { .. } => unreachable!(
            "Return and ForLoop are statements, never nested inside an expression position"
        ),
    }
}

fn eval_binop(op: Op, left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => match op {
            Op::Add => Ok(Value::Integer(a + b)),
            Op::Sub => Ok(Value::Integer(a - b)),
            Op::Mul => Ok(Value::Integer(a * b)),
            Op::Div => {
                if b == 0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Integer(a / b))
                }
            }
        },
        (Value::Str(a), Value::Str(b)) => match op {
            Op::Add => Ok(Value::Str(a + &b)),
            _ => Err(EvalError::TypeError {
                operator: op.lexeme().to_string(),
                operands: "string, string".to_string(),
            }),
        },
        (a, b) => Err(EvalError::TypeError {
            operator: op.lexeme().to_string(),
            operands: format!("{}, {}", a.type_name(), b.type_name()),
        }),
    }
}

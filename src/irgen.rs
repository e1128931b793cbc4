// ABOUTME: LLVM IR emitter lowering the AST to a module via inkwell

use crate::ast::{FuncDecl, Node, Op, Program};
use crate::error::IrError;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, IntValue};
use inkwell::AddressSpace;
use std::collections::HashMap;

/// Walks `program` and emits one LLVM IR function per `FuncDecl` into a
/// fresh module named `"main"`, plus an external variadic `print`
/// declaration. `context` must outlive the returned `Module`.
pub fn emit<'ctx>(context: &'ctx Context, program: &Program) -> Result<Module<'ctx>, IrError> {
    let module = context.create_module("main");
    let builder = context.create_builder();

    declare_print(context, &module);

    for func in &program.functions {
        emit_function(context, &module, &builder, func)?;
    }

    Ok(module)
}

/// `print` is declared as a variadic external function taking one `i8*`
/// parameter and returning `void` — calls to it pass `i32` arguments
/// directly, a known mismatch inherited from the reference emitter.
fn declare_print<'ctx>(context: &'ctx Context, module: &Module<'ctx>) {
    let i8_ptr = context.ptr_type(AddressSpace::default());
    let print_type = context.void_type().fn_type(&[i8_ptr.into()], true);
    module.add_function("print", print_type, None);
}

fn emit_function<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    decl: &FuncDecl,
) -> Result<(), IrError> {
    let i32_type = context.i32_type();
    let param_types: Vec<BasicMetadataTypeEnum> =
        decl.params.iter().map(|_| i32_type.into()).collect();
    let fn_type = i32_type.fn_type(&param_types, false);
    let function = module.add_function(&decl.name, fn_type, None);

    let entry = context.append_basic_block(function, "entry");
    builder.position_at_end(entry);

    // Parameters are seeded with `undef` placeholders: the emitter never
    // threads actual call-site arguments into a callee's IR body.
    let mut vars: HashMap<String, IntValue<'ctx>> = HashMap::new();
    for param in &decl.params {
        vars.insert(param.name.clone(), i32_type.get_undef());
    }

    for stmt in &decl.body {
        emit_stmt(context, module, builder, function, stmt, &mut vars)?;
    }

    if !matches!(decl.body.last(), Some(Node::Return(_))) {
        builder
            .build_return(Some(&i32_type.const_int(0, false)))
            .map_err(|e| IrError(e.to_string()))?;
    }

    Ok(())
}

fn emit_stmt<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    function: inkwell::values::FunctionValue<'ctx>,
    node: &Node,
    vars: &mut HashMap<String, IntValue<'ctx>>,
) -> Result<(), IrError> {
    match node {
        Node::Return(inner) => {
            let value = emit_expr(context, module, builder, inner, vars)?;
            builder
                .build_return(Some(&value))
                .map_err(|e| IrError(e.to_string()))?;
            Ok(())
        }
        Node::ForLoop {
            variable,
            range,
            body,
        } => emit_for_loop(context, module, builder, function, variable, range, body, vars),
        other => {
            emit_expr(context, module, builder, other, vars)?;
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_for_loop<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    function: inkwell::values::FunctionValue<'ctx>,
    variable: &str,
    range: &Node,
    body: &[Node],
    vars: &mut HashMap<String, IntValue<'ctx>>,
) -> Result<(), IrError> {
    let i32_type = context.i32_type();
    vars.insert(variable.to_string(), i32_type.const_int(0, false));

    let loop_cond = context.append_basic_block(function, "loop_cond");
    let loop_body = context.append_basic_block(function, "loop_body");
    let loop_end = context.append_basic_block(function, "loop_end");

    builder
        .build_unconditional_branch(loop_cond)
        .map_err(|e| IrError(e.to_string()))?;
    builder.position_at_end(loop_cond);

    let loop_var = vars[variable];
    let range_val = emit_expr(context, module, builder, range, vars)?;
    let condition = builder
        .build_int_compare(
            inkwell::IntPredicate::SLT,
            loop_var,
            range_val,
            "loop_cond",
        )
        .map_err(|e| IrError(e.to_string()))?;
    builder
        .build_conditional_branch(condition, loop_body, loop_end)
        .map_err(|e| IrError(e.to_string()))?;

    builder.position_at_end(loop_body);
    for stmt in body {
        emit_stmt(context, module, builder, function, stmt, vars)?;
    }
    builder
        .build_unconditional_branch(loop_cond)
        .map_err(|e| IrError(e.to_string()))?;

    builder.position_at_end(loop_end);
    Ok(())
}

fn emit_expr<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    node: &Node,
    vars: &mut HashMap<String, IntValue<'ctx>>,
) -> Result<IntValue<'ctx>, IrError> {
    match node {
        Node::Int(n) => Ok(context.i32_type().const_int(*n as u64, false)),
        Node::Float(_) => Err(IrError(
            "floating-point literals never reach the IR emitter (no shipped lexer rule produces them)"
                .to_string(),
        )),
        Node::Str(_) => Err(IrError(
            "string values have no IR representation in this emitter".to_string(),
        )),
        Node::Identifier(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| IrError::undefined_identifier(name)),
        Node::Assignment {
            var_name, value, ..
        } => {
            let v = emit_expr(context, module, builder, value, vars)?;
            vars.insert(var_name.clone(), v);
            Ok(v)
        }
        Node::BinOp { left, op, right } => {
            let l = emit_expr(context, module, builder, left, vars)?;
            let r = emit_expr(context, module, builder, right, vars)?;
            let result = match op {
                Op::Add => builder.build_int_add(l, r, "addtmp"),
                Op::Sub => builder.build_int_sub(l, r, "subtmp"),
                Op::Mul => builder.build_int_mul(l, r, "multmp"),
                Op::Div => builder.build_int_signed_div(l, r, "divtmp"),
            };
            result.map_err(|e| IrError(e.to_string()))
        }
        Node::FunctionCall {
            function_name,
            arguments,
        } => emit_call(context, module, builder, function_name, arguments, vars),
        Node::Return(_) | Node::ForLoop { .. } => unreachable!(
            "Return and ForLoop are statements, never nested inside an expression position"
        ),
    }
}

fn emit_call<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    function_name: &str,
    arguments: &[Node],
    vars: &mut HashMap<String, IntValue<'ctx>>,
) -> Result<IntValue<'ctx>, IrError> {
    let mut args = Vec::with_capacity(arguments.len());
    for arg in arguments {
        args.push(emit_expr(context, module, builder, arg, vars)?);
    }
    let metadata_args: Vec<BasicMetadataValueEnum> = args.iter().map(|v| (*v).into()).collect();

    let callee = module
        .get_function(function_name)
        .ok_or_else(|| IrError::missing_function(function_name))?;

    let call_site = builder
        .build_call(callee, &metadata_args, "calltmp")
        .map_err(|e| IrError(e.to_string()))?;

    // `print` returns `void`; the call's result is never used as a value.
    if function_name == "print" {
        return Ok(context.i32_type().const_int(0, false));
    }

    call_site
        .try_as_basic_value()
        .left()
        .map(|v| v.into_int_value())
        .ok_or_else(|| IrError(format!("call to '{function_name}' produced no value")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn emit_src(src: &str) -> String {
        let tokens = tokenize(src).unwrap();
        let program = parse(&tokens).unwrap();
        let context = Context::create();
        let module = emit(&context, &program).unwrap();
        module.print_to_string().to_string()
    }

    /// The line in `ir` containing `needle`, for asserting on one piece of
    /// the module's textual form without pinning down the whole dump.
    fn line_containing<'a>(ir: &'a str, needle: &str) -> &'a str {
        ir.lines()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?} in:\n{ir}"))
    }

    #[test]
    fn emits_one_function_per_decl() {
        let ir = emit_src("func add(a: int, b: int) -> int { return a + b }");
        let signature = line_containing(&ir, "@add");
        let prefix: String = signature.chars().take("define i32 @add(i32".len()).collect();
        assert_eq!(prefix, "define i32 @add(i32");
    }

    #[test]
    fn declares_print_as_variadic() {
        let ir = emit_src("func main() -> int { print(1) }");
        let decl = line_containing(&ir, "@print");
        assert_eq!(decl.trim(), "declare void @print(ptr, ...)");
    }

    #[test]
    fn appends_default_return_when_body_has_none() {
        let ir = emit_src("func main() -> int { s: int = 1 }");
        assert!(ir.contains("ret i32 0"));
    }

    #[test]
    fn for_loop_emits_three_blocks() {
        let ir = emit_src("func main() -> int { for i in range(5) { print(i) } }");
        assert!(ir.contains("loop_cond"));
        assert!(ir.contains("loop_body"));
        assert!(ir.contains("loop_end"));
    }

    #[test]
    fn unknown_callee_is_an_ir_error() {
        let tokens = tokenize("func main() -> int { missing(1) }").unwrap();
        let program = parse(&tokens).unwrap();
        let context = Context::create();
        let err = emit(&context, &program).unwrap_err();
        assert!(err.0.contains("missing"));
    }
}

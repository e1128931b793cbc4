// ABOUTME: Thin CLI entry point wiring the lexer, parser, and a chosen back end

use clap::Parser as ClapParser;
use inkwell::context::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use up_lang::error::UpError;
use up_lang::{eval, irgen, lexer, parser};

/// Runs a `.up` source file through either the evaluator or the IR emitter.
#[derive(ClapParser, Debug)]
#[command(name = "up")]
#[command(about = "Tree-walking interpreter and LLVM IR generator for UP")]
struct CliArgs {
    /// Path to a `.up` source file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print tokens/AST dumps before execution
    #[arg(long, default_value_t = true)]
    debug: bool,

    /// Emit LLVM IR instead of evaluating
    #[arg(long, default_value_t = false)]
    compile: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error reading {}: {e}", args.file.display());
            return ExitCode::FAILURE;
        }
    };

    match run(&source, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(source: &str, args: &CliArgs) -> Result<(), UpError> {
    let tokens = lexer::tokenize(source)?;
    if args.debug {
        eprintln!("tokens: {tokens:?}");
    }

    let program = parser::parse(&tokens)?;
    if args.debug {
        eprintln!("ast:\n{program}");
    }

    if args.compile {
        let context = Context::create();
        let module = irgen::emit(&context, &program)?;
        println!("{}", module.print_to_string().to_string());
    } else {
        eval::run(&program)?;
    }

    Ok(())
}

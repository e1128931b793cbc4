// ABOUTME: End-to-end tests covering the lexer -> parser -> evaluator pipeline

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use up_lang::error::{EvalError, UpError};
use up_lang::{eval, lexer, parser};

fn run(src: &str) -> Result<up_lang::value::Value, UpError> {
    let tokens = lexer::tokenize(src)?;
    let program = parser::parse(&tokens)?;
    Ok(eval::run(&program)?)
}

/// Output of running a `.up` source file through the compiled `up` binary:
/// the only way to observe exactly what `print` wrote to standard output,
/// since the built-in writes directly to the process's stdout.
struct RunOutput {
    stdout: String,
    success: bool,
}

static TEMP_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn run_bin(src: &str) -> RunOutput {
    let n = TEMP_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut path: PathBuf = std::env::temp_dir();
    path.push(format!("up_integration_test_{}_{n}.up", std::process::id()));
    std::fs::write(&path, src).expect("failed to write temp source file");

    let output = Command::new(env!("CARGO_BIN_EXE_up"))
        .arg(&path)
        .arg("--debug=false")
        .output()
        .expect("failed to run the up binary");

    let _ = std::fs::remove_file(&path);

    RunOutput {
        stdout: String::from_utf8(output.stdout).expect("stdout should be valid UTF-8"),
        success: output.status.success(),
    }
}

#[test]
fn hello_world() {
    let src = r#"func main() -> int { print("hello") }"#;
    let out = run_bin(src);
    assert!(out.success);
    assert_eq!(out.stdout, "hello\n");
}

#[test]
fn add_two_and_three() {
    let src = "func add(a: int, b: int) -> int { return a + b } \
               func main() -> int { print(add(2, 3)) }";
    let out = run_bin(src);
    assert!(out.success);
    assert_eq!(out.stdout, "5\n");
}

#[test]
fn for_loop_accumulates_to_ten() {
    let src = "func main() -> int { \
                   s: int = 0 \
                   for i in range(5) { s += i } \
                   print(s) \
               }";
    let out = run_bin(src);
    assert!(out.success);
    assert_eq!(out.stdout, "10\n");
}

#[test]
fn precedence_multiplies_before_adding() {
    let src = "func main() -> int { print(1 + 2 * 3) }";
    let out = run_bin(src);
    assert!(out.success);
    assert_eq!(out.stdout, "7\n");
}

#[test]
fn string_concatenation_via_plus() {
    let src = r#"func main() -> int { print("ab" + "cd") }"#;
    let out = run_bin(src);
    assert!(out.success);
    assert_eq!(out.stdout, "abcd\n");
}

#[test]
fn division_by_zero_halts_with_an_error() {
    let src = "func main() -> int { print(10 / 0) }";
    match run(src) {
        Err(UpError::Eval(EvalError::DivisionByZero)) => {}
        other => panic!("expected DivisionByZero, got {other:?}"),
    }
    assert!(!run_bin(src).success);
}

#[test]
fn undefined_name_halts_with_a_name_error() {
    let src = "func main() -> int { print(x) }";
    match run(src) {
        Err(UpError::Eval(EvalError::NameError(name))) => assert_eq!(name, "x"),
        other => panic!("expected NameError, got {other:?}"),
    }
    assert!(!run_bin(src).success);
}

#[test]
fn wrong_argument_count_halts_with_an_arity_error() {
    let src = "func f(a: int) -> int { return a } \
               func main() -> int { print(f(1, 2)) }";
    match run(src) {
        Err(UpError::Eval(EvalError::ArityError { function, expected, actual })) => {
            assert_eq!(function, "f");
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ArityError, got {other:?}"),
    }
    assert!(!run_bin(src).success);
}

#[test]
fn a_program_without_main_fails_at_evaluation() {
    let src = "func helper() -> int { return 1 }";
    match run(src) {
        Err(UpError::Eval(EvalError::NameError(name))) => assert_eq!(name, "main"),
        other => panic!("expected NameError(\"main\"), got {other:?}"),
    }
}

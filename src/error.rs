// ABOUTME: Error types for every phase of the UP pipeline (lex, parse, eval, codegen)

use thiserror::Error;

/// A 1-based (row, col) location in the source text.
///
/// Row increments on `\n`, col resets to 1 immediately after. Shared by
/// every phase so a diagnostic can always be traced back to source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unexpected character '{character}' at {position}")]
pub struct LexError {
    pub character: char,
    pub position: Position,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected {expected}, got {actual} at {position}")]
pub struct ParseError {
    pub expected: String,
    pub actual: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>, position: Position) -> Self {
        ParseError {
            expected: expected.into(),
            actual: actual.into(),
            position,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined name: {0}")]
    NameError(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *expected == 1 { "" } else { "s" })]
    ArityError {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("type error: {operator} not defined for {operands}")]
    TypeError { operator: String, operands: String },

    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct IrError(pub String);

impl IrError {
    pub fn undefined_identifier(name: &str) -> Self {
        IrError(format!("undefined identifier '{name}' in IR scope"))
    }

    pub fn missing_function(name: &str) -> Self {
        IrError(format!("function '{name}' not found in module"))
    }
}

/// Unifies every phase error so the pipeline can halt at the first failure
/// and surface a single diagnostic to the caller: no recovery, no partial
/// results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("eval error: {0}")]
    Eval(#[from] EvalError),

    #[error("codegen error: {0}")]
    Ir(#[from] IrError),
}

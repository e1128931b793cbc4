// ABOUTME: Lexer module turning UP source text into a flat token stream

use crate::error::{LexError, Position};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, satisfy};
use nom::combinator::recognize;
use nom::multi::many0_count;
use nom::sequence::pair;
use nom::{IResult, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Func,
    Return,
    For,
    In,
    Range,
    Main,
    Identifier,
    Int,
    Float,
    Str,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Comma,
    Arrow,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Eof,
}

impl TokenKind {
    /// Whether this kind is one of the four compound-assignment operators.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::AddAssign
                | TokenKind::SubAssign
                | TokenKind::MulAssign
                | TokenKind::DivAssign
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

fn keyword_or_identifier(word: &str) -> TokenKind {
    match word {
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "range" => TokenKind::Range,
        "main" => TokenKind::Main,
        _ => TokenKind::Identifier,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_ident_start),
        many0_count(satisfy(is_ident_continue)),
    ))
    .parse(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

/// Parses a string literal body between (and including) the surrounding
/// quotes; no escape handling, matching the reference lexer.
fn string_literal(input: &str) -> IResult<&str, &str> {
    let (rest, _) = char('"')(input)?;
    let end = rest.find('"').unwrap_or(rest.len());
    let (body, rest) = rest.split_at(end);
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    Ok((rest, body))
}

/// Two-character operators, tried before their one-character prefixes.
fn two_char_operator(input: &str) -> IResult<&str, (&str, TokenKind)> {
    alt((
        tag("->").map(|s| (s, TokenKind::Arrow)),
        tag("+=").map(|s| (s, TokenKind::AddAssign)),
        tag("-=").map(|s| (s, TokenKind::SubAssign)),
        tag("*=").map(|s| (s, TokenKind::MulAssign)),
        tag("/=").map(|s| (s, TokenKind::DivAssign)),
    ))
    .parse(input)
}

fn one_char_operator(input: &str) -> IResult<&str, (&str, TokenKind)> {
    alt((
        tag("{").map(|s| (s, TokenKind::LBrace)),
        tag("}").map(|s| (s, TokenKind::RBrace)),
        tag("(").map(|s| (s, TokenKind::LParen)),
        tag(")").map(|s| (s, TokenKind::RParen)),
        tag(":").map(|s| (s, TokenKind::Colon)),
        tag(",").map(|s| (s, TokenKind::Comma)),
        tag("=").map(|s| (s, TokenKind::Assign)),
        tag("+").map(|s| (s, TokenKind::Add)),
        tag("-").map(|s| (s, TokenKind::Sub)),
        tag("*").map(|s| (s, TokenKind::Mul)),
        tag("/").map(|s| (s, TokenKind::Div)),
    ))
    .parse(input)
}

/// Scans `input` into an ordered token sequence terminated by a synthetic
/// `Eof`. Row is 1-based, column is 1-based and resets to 1 after `\n`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut row = 1usize;
    let mut col = 1usize;

    while !rest.is_empty() {
        let bytes = rest.as_bytes();

        // Whitespace (not newline).
        if bytes[0] == b' ' || bytes[0] == b'\t' {
            rest = &rest[1..];
            col += 1;
            continue;
        }

        // Newline.
        if bytes[0] == b'\n' {
            rest = &rest[1..];
            row += 1;
            col = 1;
            continue;
        }

        // Line comment.
        if rest.starts_with("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            col += end;
            rest = &rest[end..];
            continue;
        }

        let position = Position::new(row, col);

        // Identifier / keyword.
        if let Ok((remaining, word)) = identifier(rest) {
            tokens.push(Token::new(keyword_or_identifier(word), word, position));
            col += word.len();
            rest = remaining;
            continue;
        }

        // Two-character operators take priority over their one-character prefixes.
        if let Ok((remaining, (lexeme, kind))) = two_char_operator(rest) {
            tokens.push(Token::new(kind, lexeme, position));
            col += lexeme.len();
            rest = remaining;
            continue;
        }

        if let Ok((remaining, (lexeme, kind))) = one_char_operator(rest) {
            tokens.push(Token::new(kind, lexeme, position));
            col += lexeme.len();
            rest = remaining;
            continue;
        }

        // Integer literal.
        if let Ok((remaining, digits)) = integer(rest) {
            tokens.push(Token::new(TokenKind::Int, digits, position));
            col += digits.len();
            rest = remaining;
            continue;
        }

        // String literal. No escape handling; an unterminated string runs
        // to EOF rather than erroring here (the parser fails on missing
        // structure instead).
        if bytes[0] == b'"' {
            let (remaining, body) = string_literal(rest).expect("string_literal never fails");
            col += rest.len() - remaining.len();
            tokens.push(Token::new(TokenKind::Str, body, position));
            rest = remaining;
            continue;
        }

        return Err(LexError {
            character: rest.chars().next().unwrap_or('\u{0}'),
            position,
        });
    }

    tokens.push(Token::new(TokenKind::Eof, "", Position::new(row, col)));
    Ok(tokens)
}

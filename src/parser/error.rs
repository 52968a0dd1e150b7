use std::fmt;

use thiserror::Error;

use crate::token::{TokenInfo, TokenKind};

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Statement,
    Relop,
    Fact,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{kind}"),
            Expected::Statement => f.write_str("statement"),
            Expected::Relop => f.write_str("relop"),
            Expected::Fact => f.write_str("fact"),
        }
    }
}

/// The token stream did not match the grammar. Parsing stops at the first
/// mismatch; the whole fragment is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("syntax error, pos={pos}, expected={expected}, found={found}")]
pub struct SyntaxError {
    pub pos: usize,
    pub expected: Expected,
    pub found: TokenInfo,
}

pub type ParseResult<T> = Result<T, SyntaxError>;

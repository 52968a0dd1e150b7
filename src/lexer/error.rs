use thiserror::Error;

/// Lexical diagnostics. None of these abort scanning: the offending input is
/// skipped and the lexer carries on with the next character.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("illegal character '{character}' at position {position}")]
    IllegalCharacter { character: char, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::IllegalCharacter { position, .. } => *position,
        }
    }
}

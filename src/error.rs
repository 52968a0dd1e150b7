use thiserror::Error;

use crate::backend::interpreter::EvalError;
use crate::parser::error::SyntaxError;

/// Why a fragment failed. The message is the phase error's own message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] EvalError),
}

impl TranslateError {
    pub fn pos(&self) -> usize {
        match self {
            TranslateError::Syntax(err) => err.pos,
            TranslateError::Semantic(err) => err.pos(),
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

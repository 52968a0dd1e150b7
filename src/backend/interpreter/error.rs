use thiserror::Error;

/// Semantic failures raised while evaluating a fragment. Effects committed
/// before the failure (assignments, printed lines) are kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("eval error, pos={pos}, undefined variable: {name}")]
    UndefinedVariable { pos: usize, name: String },
    #[error("eval error, pos={pos}, bogus operator: {symbol}")]
    UnknownOperator { pos: usize, symbol: String },
    #[error("eval error, pos={pos}, input exhausted")]
    InputExhausted { pos: usize },
    #[error("eval error, pos={pos}, invalid number in input: '{text}'")]
    InvalidInput { pos: usize, text: String },
    #[error("eval error, pos={pos}, i/o failure: {message}")]
    Io { pos: usize, message: String },
}

impl EvalError {
    pub fn pos(&self) -> usize {
        match self {
            EvalError::UndefinedVariable { pos, .. }
            | EvalError::UnknownOperator { pos, .. }
            | EvalError::InputExhausted { pos }
            | EvalError::InvalidInput { pos, .. }
            | EvalError::Io { pos, .. } => *pos,
        }
    }

    /// Same error, re-anchored at `at`.
    pub fn at(mut self, at: usize) -> Self {
        match &mut self {
            EvalError::UndefinedVariable { pos, .. }
            | EvalError::UnknownOperator { pos, .. }
            | EvalError::InputExhausted { pos }
            | EvalError::InvalidInput { pos, .. }
            | EvalError::Io { pos, .. } => *pos = at,
        }
        self
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

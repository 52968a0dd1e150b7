//! Syntax tree shared by both backends.
//!
//! The parser builds these nodes once per fragment; the interpreter evaluates
//! them in place and the transpiler serializes the same structure to C.
//! Positions are byte offsets into the fragment the node was parsed from.

use std::str::FromStr;

use crate::backend::interpreter::EvalError;

/// Root of a parsed fragment. Unlike a nested [`Block`], the root is emitted
/// without scope delimiters because it lands inside a caller-provided scope.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub block: Block,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Assign(Assign),
    Read(Read),
    Write(Write),
    If(If),
    While(While),
    Block(Block),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Assign {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Read {
    pub pos: usize,
    pub name: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Write {
    pub pos: usize,
    pub value: Expr,
}

#[derive(Debug, PartialEq, Clone)]
pub struct If {
    pub condition: BoolExpr,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct While {
    pub condition: BoolExpr,
    pub body: Box<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BoolExpr {
    pub left: Expr,
    pub relop: Relop,
    pub right: Expr,
}

/// Left-associative chain `term { addop term }`, folded left to right.
#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub head: Term,
    pub tail: Vec<(Addop, Term)>,
}

/// Left-associative chain `fact { mulop fact }`, folded left to right.
#[derive(Debug, PartialEq, Clone)]
pub struct Term {
    pub head: Fact,
    pub tail: Vec<(Mulop, Fact)>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Fact {
    Number(Number),
    Identifier { pos: usize, name: String },
    Paren(Box<Expr>),
    Negate { pos: usize, operand: Box<Fact> },
}

/// Numeric literal. The lexeme is kept so generation can reproduce the
/// source digits.
#[derive(Debug, PartialEq, Clone)]
pub struct Number {
    pub value: f64,
    pub lexeme: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Addop {
    pub pos: usize,
    pub kind: AddopKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AddopKind {
    Add,
    Sub,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Mulop {
    pub pos: usize,
    pub kind: MulopKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MulopKind {
    Mul,
    Div,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Relop {
    pub pos: usize,
    pub kind: RelopKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RelopKind {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NotEqual,
    Equal,
}

impl AddopKind {
    pub fn symbol(self) -> &'static str {
        match self {
            AddopKind::Add => "+",
            AddopKind::Sub => "-",
        }
    }
}

impl MulopKind {
    pub fn symbol(self) -> &'static str {
        match self {
            MulopKind::Mul => "*",
            MulopKind::Div => "/",
        }
    }
}

impl RelopKind {
    /// Source-language spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            RelopKind::Less => "<",
            RelopKind::LessEqual => "<=",
            RelopKind::Greater => ">",
            RelopKind::GreaterEqual => ">=",
            RelopKind::NotEqual => "<>",
            RelopKind::Equal => "==",
        }
    }
}

macro_rules! operator_from_str {
    ($kind:ty, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $kind {
            type Err = EvalError;

            /// Operator symbols outside the grammar are a semantic failure,
            /// reported at position 0 since no source location is known.
            fn from_str(symbol: &str) -> Result<Self, Self::Err> {
                $(
                    if symbol == <$kind>::$variant.symbol() {
                        return Ok(<$kind>::$variant);
                    }
                )+
                Err(EvalError::UnknownOperator {
                    pos: 0,
                    symbol: symbol.to_string(),
                })
            }
        }
    };
}

operator_from_str!(AddopKind, [Add, Sub]);
operator_from_str!(MulopKind, [Mul, Div]);
operator_from_str!(RelopKind, [Less, LessEqual, Greater, GreaterEqual, NotEqual, Equal]);

impl Addop {
    /// Builds an operator from its spelling, for callers assembling trees by
    /// hand rather than through the parser.
    pub fn from_symbol(pos: usize, symbol: &str) -> Result<Self, EvalError> {
        let kind = symbol.parse::<AddopKind>().map_err(|err| err.at(pos))?;
        Ok(Self { pos, kind })
    }
}

impl Mulop {
    pub fn from_symbol(pos: usize, symbol: &str) -> Result<Self, EvalError> {
        let kind = symbol.parse::<MulopKind>().map_err(|err| err.at(pos))?;
        Ok(Self { pos, kind })
    }
}

impl Relop {
    pub fn from_symbol(pos: usize, symbol: &str) -> Result<Self, EvalError> {
        let kind = symbol.parse::<RelopKind>().map_err(|err| err.at(pos))?;
        Ok(Self { pos, kind })
    }
}

impl Expr {
    pub fn single(head: Term) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }
}

impl Term {
    pub fn single(head: Fact) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }
}

impl Number {
    pub fn new(lexeme: impl Into<String>, value: f64) -> Self {
        Self {
            value,
            lexeme: lexeme.into(),
        }
    }
}

impl From<Fact> for Expr {
    fn from(fact: Fact) -> Self {
        Expr::single(Term::single(fact))
    }
}

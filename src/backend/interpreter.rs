use anyhow::{Context, Result};
use log::debug;
use std::io::Write as _;

use crate::ast::{
    Addop, AddopKind, Assign, Block, BoolExpr, Expr, Fact, If, Mulop, MulopKind, Program, Read,
    Relop, RelopKind, Statement, Term, While, Write,
};
use crate::backend::{Backend, PreparedBackend};
use crate::environment::Environment;

mod error;
mod input;

pub use error::{EvalError, EvalResult};
pub use input::{InputSource, WordReader};

/// Absolute tolerance used by `==` and `<>`.
pub const EPSILON: f64 = 1e-9;

const TRUE: f64 = 1.0;
const FALSE: f64 = 0.0;

/// Input and output handles lent to an evaluation.
pub struct Io<'a> {
    input: &'a mut dyn InputSource,
    output: &'a mut dyn std::io::Write,
}

impl<'a> Io<'a> {
    pub fn new(input: &'a mut dyn InputSource, output: &'a mut dyn std::io::Write) -> Self {
        Self { input, output }
    }

    fn read_number(&mut self, pos: usize) -> EvalResult<f64> {
        let word = self
            .input
            .next_word()
            .map_err(|err| EvalError::Io {
                pos,
                message: err.to_string(),
            })?
            .ok_or(EvalError::InputExhausted { pos })?;
        word.parse::<f64>()
            .map_err(|_| EvalError::InvalidInput { pos, text: word })
    }

    fn write_line(&mut self, pos: usize, line: &str) -> EvalResult<()> {
        writeln!(self.output, "{line}").map_err(|err| EvalError::Io {
            pos,
            message: err.to_string(),
        })
    }
}

/// Tree-walking evaluation. Every node yields a number; statements that have
/// no natural value yield `0`, comparisons yield `1` or `0`.
pub trait Evaluate {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64>;
}

/// Largest magnitude printed through the integer path (2^63).
const WHOLE_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Significant digits that always round-trip an `f64`.
const MAX_PRECISION: usize = 17;

/// Text printed by `wr`. Whole values below 2^63 print as integers. Anything
/// else uses the fewest `%g` significant digits that read back as the same
/// value. The generated C prints through the same rule.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < WHOLE_LIMIT {
        return (value as i64).to_string();
    }
    for precision in 1..MAX_PRECISION {
        let text = format_general(value, precision);
        if text.parse::<f64>() == Ok(value) {
            return text;
        }
    }
    format_general(value, MAX_PRECISION)
}

/// C's `%.{precision}g` for a finite value.
fn format_general(value: f64, precision: usize) -> String {
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)))
        .unwrap_or((scientific.as_str(), 0));
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn holds(condition: f64) -> bool {
    condition == TRUE
}

fn truth(value: bool) -> f64 {
    if value { TRUE } else { FALSE }
}

impl Evaluate for Program {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        self.block.evaluate(env, io)
    }
}

impl Evaluate for Block {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let mut last = 0.0;
        for statement in &self.statements {
            last = statement.evaluate(env, io)?;
        }
        Ok(last)
    }
}

impl Evaluate for Statement {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        match self {
            Statement::Assign(assign) => assign.evaluate(env, io),
            Statement::Read(read) => read.evaluate(env, io),
            Statement::Write(write) => write.evaluate(env, io),
            Statement::If(if_stmt) => if_stmt.evaluate(env, io),
            Statement::While(while_stmt) => while_stmt.evaluate(env, io),
            Statement::Block(block) => block.evaluate(env, io),
        }
    }
}

impl Evaluate for Assign {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let value = self.value.evaluate(env, io)?;
        Ok(env.define(&self.name, value))
    }
}

impl Evaluate for Read {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let value = io.read_number(self.pos)?;
        Ok(env.define(&self.name, value))
    }
}

impl Evaluate for Write {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let value = self.value.evaluate(env, io)?;
        io.write_line(self.pos, &format_number(value))?;
        Ok(value)
    }
}

impl Evaluate for If {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        if holds(self.condition.evaluate(env, io)?) {
            self.then_branch.evaluate(env, io)
        } else if let Some(else_branch) = &self.else_branch {
            else_branch.evaluate(env, io)
        } else {
            Ok(0.0)
        }
    }
}

impl Evaluate for While {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        while holds(self.condition.evaluate(env, io)?) {
            self.body.evaluate(env, io)?;
        }
        Ok(0.0)
    }
}

impl Evaluate for BoolExpr {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let left = self.left.evaluate(env, io)?;
        let right = self.right.evaluate(env, io)?;
        Ok(self.relop.apply(left, right))
    }
}

impl Evaluate for Expr {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let mut acc = self.head.evaluate(env, io)?;
        for (op, term) in &self.tail {
            acc = op.apply(acc, term.evaluate(env, io)?);
        }
        Ok(acc)
    }
}

impl Evaluate for Term {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        let mut acc = self.head.evaluate(env, io)?;
        for (op, fact) in &self.tail {
            acc = op.apply(acc, fact.evaluate(env, io)?);
        }
        Ok(acc)
    }
}

impl Evaluate for Fact {
    fn evaluate(&self, env: &mut Environment, io: &mut Io<'_>) -> EvalResult<f64> {
        match self {
            Fact::Number(number) => Ok(number.value),
            Fact::Identifier { pos, name } => env.lookup(*pos, name),
            Fact::Paren(expr) => expr.evaluate(env, io),
            Fact::Negate { operand, .. } => Ok(-operand.evaluate(env, io)?),
        }
    }
}

impl Addop {
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self.kind {
            AddopKind::Add => left + right,
            AddopKind::Sub => left - right,
        }
    }
}

impl Mulop {
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self.kind {
            MulopKind::Mul => left * right,
            MulopKind::Div => left / right,
        }
    }
}

impl Relop {
    /// Ordering is exact; equality is within [`EPSILON`].
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        let result = match self.kind {
            RelopKind::Less => left < right,
            RelopKind::LessEqual => left <= right,
            RelopKind::Greater => left > right,
            RelopKind::GreaterEqual => left >= right,
            RelopKind::NotEqual => (left - right).abs() > EPSILON,
            RelopKind::Equal => (left - right).abs() < EPSILON,
        };
        truth(result)
    }
}

/// AST-walking backend that executes programs directly.
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed program ready to be evaluated against a fresh environment.
pub struct PreparedInterpreter {
    program: Program,
}

impl PreparedBackend for PreparedInterpreter {
    fn run(&self, input: &str) -> Result<String> {
        let mut env = Environment::new();
        let mut reader = WordReader::new(input.as_bytes());
        let mut output = Vec::new();
        let mut io = Io::new(&mut reader, &mut output);
        self.program.evaluate(&mut env, &mut io)?;
        debug!("interpreter defined {} variables", env.len());
        String::from_utf8(output).context("Interpreter output is not UTF-8")
    }
}

impl Backend for Interpreter {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn prepare(&self, program: &Program) -> Result<Box<dyn PreparedBackend>> {
        Ok(Box::new(PreparedInterpreter {
            program: program.clone(),
        }))
    }
}

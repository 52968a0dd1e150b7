use anyhow::Result;
use log::debug;
use std::fs;
use std::path::PathBuf;

use self::c_runtime::{compile_source, run_compiled_binary};
use crate::ast::{
    Assign, Block, BoolExpr, Expr, Fact, If, Number, Program, Read, RelopKind, Statement, Term,
    While, Write,
};
use crate::backend::interpreter::EPSILON;
use crate::backend::{Backend, PreparedBackend};
use crate::emitter;
use crate::environment::Environment;

pub mod c_runtime;

const INDENT: &str = "    ";

/// Prefix for every variable in generated C, keeping toy names clear of C
/// keywords and of the functions the program calls.
const VARIABLE_PREFIX: &str = "v_";

/// C spelling of a toy variable.
pub fn c_identifier(name: &str) -> String {
    format!("{VARIABLE_PREFIX}{name}")
}

/// Serialization to C. Generation never fails: any tree the parser accepts
/// has a C rendering.
pub trait Generate {
    fn generate(&self) -> String;
}

/// Prefixes every non-empty line of `code` with one indentation level.
pub fn indent(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str(INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Records every variable the program can assign, so a program that was
/// never evaluated still gets a complete declaration line.
pub fn declare_assigned(block: &Block, env: &mut Environment) {
    for statement in &block.statements {
        declare_in_statement(statement, env);
    }
}

fn declare_in_statement(statement: &Statement, env: &mut Environment) {
    match statement {
        Statement::Assign(Assign { name, .. }) | Statement::Read(Read { name, .. }) => {
            env.declare(name);
        }
        Statement::Write(_) => {}
        Statement::If(If {
            then_branch,
            else_branch,
            ..
        }) => {
            declare_in_statement(then_branch, env);
            if let Some(else_branch) = else_branch {
                declare_in_statement(else_branch, env);
            }
        }
        Statement::While(While { body, .. }) => declare_in_statement(body, env),
        Statement::Block(block) => declare_assigned(block, env),
    }
}

/// `if`/`while` bodies are always braced. A nested block already carries its
/// own braces, so it is used as the body directly.
fn braced(statement: &Statement) -> String {
    match statement {
        Statement::Block(block) => block.generate(),
        other => format!("{{\n{}}}\n", indent(&other.generate())),
    }
}

impl Generate for Program {
    /// The root is emitted bare: it is spliced into the emitter's `main`.
    fn generate(&self) -> String {
        self.block
            .statements
            .iter()
            .map(Generate::generate)
            .collect()
    }
}

impl Generate for Block {
    fn generate(&self) -> String {
        let body: String = self.statements.iter().map(Generate::generate).collect();
        format!("{{\n{}}}\n", indent(&body))
    }
}

impl Generate for Statement {
    fn generate(&self) -> String {
        match self {
            Statement::Assign(assign) => assign.generate(),
            Statement::Read(read) => read.generate(),
            Statement::Write(write) => write.generate(),
            Statement::If(if_stmt) => if_stmt.generate(),
            Statement::While(while_stmt) => while_stmt.generate(),
            Statement::Block(block) => block.generate(),
        }
    }
}

impl Generate for Assign {
    fn generate(&self) -> String {
        format!("{} = {};\n", c_identifier(&self.name), self.value.generate())
    }
}

impl Generate for Read {
    fn generate(&self) -> String {
        format!("scanf(\"%lf\", &{});\n", c_identifier(&self.name))
    }
}

impl Generate for Write {
    fn generate(&self) -> String {
        format!("{}({});\n", emitter::WRITE_FUNCTION, self.value.generate())
    }
}

impl Generate for If {
    fn generate(&self) -> String {
        let mut code = format!(
            "if {} {}",
            self.condition.generate(),
            braced(&self.then_branch)
        );
        if let Some(else_branch) = &self.else_branch {
            code.push_str("else ");
            code.push_str(&braced(else_branch));
        }
        code
    }
}

impl Generate for While {
    fn generate(&self) -> String {
        format!("while {} {}", self.condition.generate(), braced(&self.body))
    }
}

impl Generate for BoolExpr {
    fn generate(&self) -> String {
        let left = self.left.generate();
        let right = self.right.generate();
        match self.relop.kind {
            RelopKind::Equal => format!("(fabs(({left}) - ({right})) < {EPSILON:e})"),
            RelopKind::NotEqual => format!("(fabs(({left}) - ({right})) > {EPSILON:e})"),
            kind => format!("({left} {} {right})", kind.symbol()),
        }
    }
}

impl Generate for Expr {
    fn generate(&self) -> String {
        let mut code = self.head.generate();
        for (op, term) in &self.tail {
            code.push_str(&format!(" {} {}", op.kind.symbol(), term.generate()));
        }
        code
    }
}

impl Generate for Term {
    fn generate(&self) -> String {
        let mut code = self.head.generate();
        for (op, fact) in &self.tail {
            code.push_str(&format!(" {} {}", op.kind.symbol(), fact.generate()));
        }
        code
    }
}

impl Generate for Fact {
    fn generate(&self) -> String {
        match self {
            Fact::Number(number) => number.generate(),
            Fact::Identifier { name, .. } => c_identifier(name),
            Fact::Paren(expr) => format!("({})", expr.generate()),
            Fact::Negate { operand, .. } => format!("(-{})", operand.generate()),
        }
    }
}

impl Generate for Number {
    /// Always carries a fractional part so C never sees an `int` literal.
    fn generate(&self) -> String {
        if self.lexeme.ends_with('.') {
            format!("{}0", self.lexeme)
        } else if self.lexeme.contains('.') {
            self.lexeme.clone()
        } else {
            format!("{}.0", self.lexeme)
        }
    }
}

/// Backend that translates to C, compiles with the system compiler and runs
/// the resulting binary.
pub struct Transpiler;

pub struct PreparedTranspiler {
    source_path: PathBuf,
    binary_path: PathBuf,
}

impl Transpiler {
    pub fn new() -> Self {
        Self
    }

    /// Complete, standalone C translation of a single program.
    pub fn transpile(&self, program: &Program) -> String {
        let mut declared = Environment::new();
        declare_assigned(&program.block, &mut declared);
        emitter::emit_program(&program.generate(), &declared)
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Transpiler {
    fn name(&self) -> &'static str {
        "transpiler"
    }

    fn prepare(&self, program: &Program) -> Result<Box<dyn PreparedBackend>> {
        let source = self.transpile(program);
        let (source_path, binary_path) = compile_source(&source)?;
        debug!("compiled {}", binary_path.display());
        Ok(Box::new(PreparedTranspiler {
            source_path,
            binary_path,
        }))
    }
}

impl PreparedBackend for PreparedTranspiler {
    fn run(&self, input: &str) -> Result<String> {
        run_compiled_binary(&self.binary_path, input)
    }
}

impl Drop for PreparedTranspiler {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.source_path);
        let _ = fs::remove_file(&self.binary_path);
    }
}

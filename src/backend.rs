use anyhow::Result;

use crate::ast::Program;

pub mod interpreter;
pub mod transpiler;

/// Executable artifact produced by a backend `prepare` step.
///
/// This keeps translation and execution separated so the transpiler can
/// compile once and run the same binary against several inputs.
pub trait PreparedBackend {
    /// Runs the program with `input` as the source for `rd` statements and
    /// returns everything `wr` printed.
    fn run(&self, input: &str) -> Result<String>;
}

/// Common interface implemented by each execution backend.
pub trait Backend {
    fn name(&self) -> &'static str;
    fn prepare(&self, program: &Program) -> Result<Box<dyn PreparedBackend>>;

    fn run(&self, program: &Program, input: &str) -> Result<String> {
        self.prepare(program)?.run(input)
    }
}

pub fn backends() -> Vec<Box<dyn Backend>> {
    vec![
        Box::new(interpreter::Interpreter::new()),
        Box::new(transpiler::Transpiler::new()),
    ]
}

use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use std::path::{Path, PathBuf};

use crate::backend::interpreter::{Evaluate, Io};
use crate::backend::transpiler::{Generate, declare_assigned};
use crate::emitter;
use crate::environment::Environment;
use crate::error::TranslateResult;
use crate::lexer::LexError;
use crate::parser::Parser;

/// What to do with each parsed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    Evaluate,
    Generate,
    #[default]
    Both,
}

impl Mode {
    fn evaluates(self) -> bool {
        matches!(self, Mode::Evaluate | Mode::Both)
    }

    fn generates(self) -> bool {
        matches!(self, Mode::Generate | Mode::Both)
    }
}

/// Outcome of one successfully translated fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    /// Value of the last top-level statement, when evaluated.
    pub value: Option<f64>,
    /// Generated C statements, when generated.
    pub code: Option<String>,
    pub diagnostics: Vec<LexError>,
}

/// A sequence of fragments sharing one environment and one output program.
///
/// A failing fragment leaves behind whatever it committed before failing;
/// the session stays usable for the next fragment.
#[derive(Debug, Default)]
pub struct Session {
    env: Environment,
    code: String,
    diagnostics: Vec<LexError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(
        &mut self,
        source: &str,
        mode: Mode,
        io: &mut Io<'_>,
    ) -> TranslateResult<Fragment> {
        let mut parser = Parser::new(source);
        let parsed = parser.parse_program();
        self.diagnostics = parser.into_diagnostics();
        let program = parsed?;

        let value = if mode.evaluates() {
            Some(program.evaluate(&mut self.env, io)?)
        } else {
            None
        };

        let code = if mode.generates() {
            declare_assigned(&program.block, &mut self.env);
            let code = program.generate();
            self.code.push_str(&code);
            debug!("generated {} bytes of C", code.len());
            Some(code)
        } else {
            None
        };

        Ok(Fragment {
            value,
            code,
            diagnostics: self.diagnostics.clone(),
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Statement text generated so far, without prologue or declarations.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Lexer diagnostics of the most recent fragment, including one that
    /// failed to parse.
    pub fn last_diagnostics(&self) -> &[LexError] {
        &self.diagnostics
    }

    /// The complete C program for everything generated so far.
    pub fn emit(&self) -> String {
        emitter::emit_program(&self.code, &self.env)
    }

    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        emitter::write_program(path, &self.code, &self.env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::interpreter::{EvalError, WordReader};
    use crate::error::TranslateError;
    use indoc::indoc;

    struct Harness {
        session: Session,
        output: Vec<u8>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                session: Session::new(),
                output: Vec::new(),
            }
        }

        fn translate(&mut self, source: &str, mode: Mode) -> TranslateResult<Fragment> {
            self.translate_with_input(source, mode, "")
        }

        fn translate_with_input(
            &mut self,
            source: &str,
            mode: Mode,
            input: &str,
        ) -> TranslateResult<Fragment> {
            let mut reader = WordReader::new(input.as_bytes());
            let mut io = Io::new(&mut reader, &mut self.output);
            self.session.translate(source, mode, &mut io)
        }

        fn output(&self) -> &str {
            std::str::from_utf8(&self.output).expect("utf-8 output")
        }
    }

    #[test]
    fn fragments_share_one_environment() {
        let mut harness = Harness::new();
        harness.translate("x = 2;", Mode::Both).expect("first");
        let fragment = harness.translate("wr x * 3;", Mode::Both).expect("second");
        assert_eq!(fragment.value, Some(6.0));
        assert_eq!(harness.output(), "6\n");
        assert_eq!(
            harness.session.code(),
            "v_x = 2.0;\ntoyc_write(v_x * 3.0);\n"
        );
    }

    #[test]
    fn syntax_error_rejects_whole_fragment() {
        let mut harness = Harness::new();
        let err = harness
            .translate("x = 1; y = ;", Mode::Both)
            .expect_err("missing operand");
        assert!(matches!(err, TranslateError::Syntax(_)));
        assert_eq!(err.pos(), 11);
        assert!(harness.session.environment().get("x").is_none());
        assert_eq!(harness.session.code(), "");
    }

    #[test]
    fn semantic_error_keeps_committed_assignments() {
        let mut harness = Harness::new();
        let err = harness
            .translate("a = 1; b = c; a = 5;", Mode::Both)
            .expect_err("c is undefined");
        assert_eq!(
            err,
            TranslateError::Semantic(EvalError::UndefinedVariable {
                pos: 11,
                name: "c".to_string(),
            })
        );
        assert_eq!(err.to_string(), "eval error, pos=11, undefined variable: c");
        assert_eq!(harness.session.environment().get("a"), Some(1.0));
        assert_eq!(harness.session.code(), "");

        let fragment = harness.translate("wr a;", Mode::Both).expect("session continues");
        assert_eq!(fragment.value, Some(1.0));
    }

    #[test]
    fn generate_only_never_evaluates() {
        let mut harness = Harness::new();
        let fragment = harness
            .translate("rd n; wr n;", Mode::Generate)
            .expect("generation cannot fail");
        assert_eq!(fragment.value, None);
        assert!(fragment.code.is_some());
        assert_eq!(harness.output(), "");
        assert_eq!(harness.session.environment().get("n"), None);
        assert!(harness.session.emit().contains("    double v_n;\n"));
    }

    #[test]
    fn evaluate_only_produces_no_code() {
        let mut harness = Harness::new();
        let fragment = harness
            .translate_with_input("rd n; wr n + 1;", Mode::Evaluate, "41")
            .expect("evaluation");
        assert_eq!(fragment.code, None);
        assert_eq!(harness.output(), "42\n");
        assert_eq!(harness.session.code(), "");
    }

    #[test]
    fn untaken_branches_are_still_declared() {
        let mut harness = Harness::new();
        harness
            .translate("if 1 == 2 then y = 1;", Mode::Both)
            .expect("translate");
        assert_eq!(harness.session.environment().get("y"), None);
        assert_eq!(harness.session.environment().declarations(), "double v_y;\n");
    }

    #[test]
    fn lexer_diagnostics_are_reported() {
        let mut harness = Harness::new();
        let fragment = harness.translate("x = 1 @;", Mode::Both).expect("translate");
        assert_eq!(fragment.diagnostics.len(), 1);
        assert_eq!(fragment.diagnostics[0].position(), 6);
        assert_eq!(harness.session.last_diagnostics().len(), 1);
    }

    #[test]
    fn emitted_program_is_complete() {
        let mut harness = Harness::new();
        harness
            .translate(
                indoc! {"
                    i = 0;
                    while i < 2 do i = i + 1;
                "},
                Mode::Both,
            )
            .expect("translate");
        let program = harness.session.emit();
        assert!(program.starts_with(emitter::PROLOGUE));
        assert_eq!(
            &program[emitter::PROLOGUE.len()..],
            indoc! {"
                    double v_i;

                    v_i = 0.0;
                    while (v_i < 2.0) {
                        v_i = v_i + 1.0;
                    }
                    return 0;
                }
            "}
        );
    }
}

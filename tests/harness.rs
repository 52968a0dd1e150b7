use anyhow::{Context, Result, bail, ensure};
use std::path::Path;

use test_support::{
    Case, CaseClass, is_backend_unsupported, load_cases, normalize_output,
    validate_unsupported_backends,
};
use toyc::backend::Backend;
use toyc::backend::interpreter::Interpreter;
use toyc::backend::transpiler::{Generate, Transpiler, c_runtime};
use toyc::parser;

const KNOWN_BACKENDS: [&str; 2] = ["interpreter", "transpiler"];

fn compiler_required() -> bool {
    std::env::var("TOYC_CC_REQUIRED")
        .map(|value| value == "1")
        .unwrap_or(false)
}

fn ensure_error_contains(case: &Case, actual: &str) -> Result<()> {
    let expected_error = case.expected_error()?;
    ensure!(
        actual.contains(&expected_error),
        "Expected error containing '{expected_error}' in {}, got '{actual}'",
        case.name
    );
    Ok(())
}

fn run_programs_for_backend(backend: &dyn Backend) -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;

    for case in cases {
        validate_unsupported_backends(&case, &KNOWN_BACKENDS)?;
        if is_backend_unsupported(&case, backend.name()) {
            continue;
        }
        let source = case.source()?;
        let parsed = parser::parse(&source);
        match case.spec.class {
            CaseClass::RuntimeSuccess => {
                let program = parsed.with_context(|| format!("Parsing {}", case.name))?;
                let output = backend.run(&program, &case.spec.input).with_context(|| {
                    format!("Backend {} failed for {}", backend.name(), case.name)
                })?;
                assert_eq!(
                    normalize_output(&output),
                    normalize_output(&case.expected_stdout()?),
                    "Backend {} mismatch for {}",
                    backend.name(),
                    case.name
                );
            }
            CaseClass::SyntaxError => {
                let Err(error) = parsed else {
                    bail!("Expected syntax error in {}, but parsing succeeded", case.name);
                };
                ensure_error_contains(&case, &error.to_string())?;
            }
            CaseClass::SemanticError => {
                let program = parsed.with_context(|| format!("Parsing {}", case.name))?;
                let result = backend.run(&program, &case.spec.input);
                let Err(error) = result else {
                    bail!(
                        "Expected semantic error for backend {} in {}",
                        backend.name(),
                        case.name
                    );
                };
                ensure_error_contains(&case, &format!("{error:#}"))?;
            }
        }
    }

    Ok(())
}

#[test]
fn runs_programs_interpreter_backend() -> Result<()> {
    run_programs_for_backend(&Interpreter::new())
}

#[test]
fn runs_programs_transpiler_backend() -> Result<()> {
    if !c_runtime::compiler_available() {
        if compiler_required() {
            bail!("Transpiler parity required but no C compiler found. Install cc.");
        }
        eprintln!("Skipping transpiler backend test: no C compiler found.");
        return Ok(());
    }
    run_programs_for_backend(&Transpiler::new())
}

#[test]
fn generated_code_matches_fixtures() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;

    for case in cases {
        let Some(code_file) = case.spec.expected.code_file.as_deref() else {
            continue;
        };
        let program = parser::parse(&case.source()?)
            .with_context(|| format!("Parsing {}", case.name))?;
        assert_eq!(
            normalize_output(&program.generate()),
            normalize_output(&case.read_text(code_file)?),
            "Generated code mismatch for {}",
            case.name
        );
    }

    Ok(())
}

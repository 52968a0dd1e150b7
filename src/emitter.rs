//! Wraps generated statement text into a standalone C translation unit.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::transpiler::indent;
use crate::environment::Environment;

/// Name of the C function every `wr` statement calls.
pub const WRITE_FUNCTION: &str = "toyc_write";

/// Headers, the `wr` printer and the opening of `main`. The printer applies
/// the interpreter's number formatting: whole values below 2^63 as integers,
/// otherwise the fewest `%g` digits that read back as the same value.
pub const PROLOGUE: &str = "\
#include <math.h>
#include <stdio.h>
#include <stdlib.h>

static void toyc_write(double value) {
    char text[32];
    if (isnan(value)) {
        puts(\"nan\");
        return;
    }
    if (isinf(value)) {
        puts(value > 0 ? \"inf\" : \"-inf\");
        return;
    }
    if (value == trunc(value) && fabs(value) < 9223372036854775808.0) {
        printf(\"%lld\\n\", (long long)value);
        return;
    }
    for (int precision = 1; precision <= 17; precision++) {
        snprintf(text, sizeof text, \"%.*g\", precision, value);
        if (strtod(text, NULL) == value) {
            break;
        }
    }
    puts(text);
}

int main() {
";
pub const EPILOGUE: &str = "    return 0;\n}\n";

/// Prologue, one declaration line for every variable in `env`, the statement
/// text and the epilogue.
pub fn emit_program(code: &str, env: &Environment) -> String {
    let declarations = env.declarations();
    let mut out = String::with_capacity(PROLOGUE.len() + code.len() + EPILOGUE.len() + 64);
    out.push_str(PROLOGUE);
    out.push_str(&indent(&declarations));
    if !declarations.is_empty() && !code.is_empty() {
        out.push('\n');
    }
    out.push_str(&indent(code));
    out.push_str(EPILOGUE);
    out
}

/// `path` with a `.c` extension appended unless it already has one.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".c");
    PathBuf::from(name)
}

pub fn write_program(path: &Path, code: &str, env: &Environment) -> Result<PathBuf> {
    let target = output_path(path);
    fs::write(&target, emit_program(code, env))
        .with_context(|| format!("Writing C program to {}", target.display()))?;
    debug!("wrote {}", target.display());
    Ok(target)
}

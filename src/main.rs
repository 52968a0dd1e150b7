use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};

use toyc::backend::interpreter::{Io, WordReader, format_number};
use toyc::error::TranslateError;
use toyc::lexer::LexError;
use toyc::session::{Mode, Session};

/// Evaluates toy-language fragments and translates them to C.
#[derive(Debug, Parser)]
#[command(name = "toyc", version)]
struct Args {
    /// Program fragments, translated in order against one shared environment.
    fragments: Vec<String>,

    /// Read further fragments from files.
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Write the generated C program to NAME.c.
    #[arg(long, env = "Code", value_name = "NAME")]
    code: Option<PathBuf>,

    /// Print the generated C program after all fragments ran.
    #[arg(long)]
    print_code: bool,
}

fn collect_sources(args: &Args) -> Result<Vec<String>> {
    let mut sources = args.fragments.clone();
    for path in &args.files {
        let source =
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        sources.push(source);
    }
    if sources.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        sources.push(buffer);
    }
    Ok(sources)
}

/// Writes the lexer diagnostics of one fragment, then its error if it failed.
fn report(
    diagnostics: &[LexError],
    error: Option<&TranslateError>,
    errors: &mut impl Write,
) -> io::Result<()> {
    for diag in diagnostics {
        writeln!(errors, "{diag}")?;
    }
    if let Some(err) = error {
        writeln!(errors, "{err}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let sources = collect_sources(&args)?;

    if args.mode == Mode::Evaluate && (args.print_code || args.code.is_some()) {
        warn!("code generation is disabled in evaluate mode; the C program will be empty");
    }

    let mut input = WordReader::new(io::stdin().lock());
    let mut output = io::stdout().lock();
    let mut session = Session::new();
    let mut failures = 0usize;

    for (index, source) in sources.iter().enumerate() {
        let result = {
            let mut io = Io::new(&mut input, &mut output);
            session.translate(source, args.mode, &mut io)
        };
        if result.is_err() || !session.last_diagnostics().is_empty() {
            output.flush().context("Flushing stdout")?;
        }
        report(
            session.last_diagnostics(),
            result.as_ref().err(),
            &mut io::stderr().lock(),
        )
        .context("Writing diagnostics")?;
        match result {
            Ok(fragment) => {
                if let Some(value) = fragment.value {
                    debug!("fragment {} evaluated to {}", index + 1, format_number(value));
                }
            }
            Err(_) => failures += 1,
        }
    }

    if args.print_code {
        write!(output, "{}", session.emit()).context("Writing C program to stdout")?;
    }
    output.flush().context("Flushing stdout")?;

    if let Some(name) = &args.code {
        let path = session.write(name)?;
        info!("wrote {}", path.display());
    }

    if failures > 0 {
        bail!("{failures} of {} fragments failed", sources.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_and_files_parse() {
        let args = Args::try_parse_from([
            "toyc", "x = 1;", "wr x;", "-f", "a.toy", "--file", "b.toy", "--print-code",
        ])
        .expect("valid arguments");
        assert_eq!(args.fragments, vec!["x = 1;", "wr x;"]);
        assert_eq!(args.files, vec![PathBuf::from("a.toy"), PathBuf::from("b.toy")]);
        assert_eq!(args.mode, Mode::Both);
        assert!(args.print_code);
    }

    #[test]
    fn illegal_characters_are_reported_with_the_error() {
        let mut session = Session::new();
        let mut reader = WordReader::new("".as_bytes());
        let mut output = Vec::new();
        let result = {
            let mut io = Io::new(&mut reader, &mut output);
            session.translate("x = 1 @; y = ;", Mode::Both, &mut io)
        };
        let mut errors = Vec::new();
        report(session.last_diagnostics(), result.as_ref().err(), &mut errors)
            .expect("write to vec");
        let errors = String::from_utf8(errors).expect("utf-8");
        let lines: Vec<&str> = errors.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "illegal character '@' at position 6");
        assert!(lines[1].contains("pos=13"), "{}", lines[1]);
    }

    #[test]
    fn diagnostics_of_a_successful_fragment_are_reported() {
        let diagnostics = [LexError::IllegalCharacter {
            character: '$',
            position: 2,
        }];
        let mut errors = Vec::new();
        report(&diagnostics, None, &mut errors).expect("write to vec");
        assert_eq!(errors, b"illegal character '$' at position 2\n");
    }

    #[test]
    fn mode_and_code_name() {
        let args = Args::try_parse_from(["toyc", "--mode", "generate", "--code", "out"])
            .expect("valid arguments");
        assert_eq!(args.mode, Mode::Generate);
        assert_eq!(args.code, Some(PathBuf::from("out")));
        assert!(Args::try_parse_from(["toyc", "--mode", "compile"]).is_err());
    }
}

use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

const COMPILER: &str = "cc";

static ARTIFACT_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn compiler_available() -> bool {
    Command::new(COMPILER)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn write_temp_file(contents: &str) -> Result<(PathBuf, PathBuf)> {
    let mut dir = std::env::temp_dir();
    dir.push("toyc");
    fs::create_dir_all(&dir).context("Creating temp directory")?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let serial = ARTIFACT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_stem = format!("transpile_{}_{nanos}_{serial}", std::process::id());
    let source_path = dir.join(format!("{file_stem}.c"));
    let binary_path = dir.join(format!("{file_stem}.bin"));

    fs::write(&source_path, contents).context("Writing C source")?;
    Ok((source_path, binary_path))
}

pub fn compile_source(source: &str) -> Result<(PathBuf, PathBuf)> {
    let (source_path, binary_path) = write_temp_file(source)?;
    let compile = Command::new(COMPILER)
        .arg(&source_path)
        .arg("-std=c99")
        .arg("-O2")
        .arg("-o")
        .arg(&binary_path)
        .arg("-lm")
        .output()
        .context("Running C compiler")?;
    if !compile.status.success() {
        let _ = fs::remove_file(&source_path);
        let stderr = String::from_utf8_lossy(&compile.stderr);
        bail!("C compilation failed: {stderr}");
    }
    Ok((source_path, binary_path))
}

pub fn run_compiled_binary(binary_path: &Path, input: &str) -> Result<String> {
    let mut child = Command::new(binary_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Running compiled program")?;
    // The child may fill its stdout pipe before it drains stdin.
    let feeder = child.stdin.take().map(|mut stdin| {
        let input = input.to_string();
        thread::spawn(move || match stdin.write_all(input.as_bytes()) {
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other,
        })
    });
    let output = child
        .wait_with_output()
        .context("Waiting for compiled program")?;
    if let Some(feeder) = feeder {
        feeder
            .join()
            .map_err(|_| anyhow!("stdin writer thread panicked"))?
            .context("Feeding compiled program stdin")?;
    }
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("Transpiled program failed: {stderr}");
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

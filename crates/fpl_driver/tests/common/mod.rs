#![allow(dead_code)]

use fpl_config::StopAt;
use fpl_driver::{CompileError, CompileOutput, compile};

pub fn run(
  src: &str,
  stop_at: StopAt,
) -> Result<CompileOutput, CompileError> {
  compile(&[("test.fpl", src)], stop_at)
}

/// Output text of `stop_at`. Panics when compilation fails.
pub fn phase(
  src: &str,
  stop_at: StopAt,
) -> String {
  match run(src, stop_at) {
    Ok(output) => output.text,
    Err(err) => panic!("compilation failed:\n{}", err),
  }
}

/// The diagnostics that stopped compilation, one per line.
pub fn diagnostics(src: &str) -> String {
  match run(src, StopAt::Assembly) {
    Err(CompileError::Diagnostics(text)) => text,
    Err(err) => panic!("expected diagnostics, got: {}", err),
    Ok(_) => panic!("expected diagnostics, compilation succeeded"),
  }
}

/// Warnings of a program that type checks.
pub fn warnings(src: &str) -> Vec<String> {
  match run(src, StopAt::Typecheck) {
    Ok(output) => output.warnings,
    Err(err) => panic!("compilation failed:\n{}", err),
  }
}

//! Side-effect free compilation API.
//!
//! `compile` never prints, never renders diagnostics and never writes files:
//! it returns the text of the last phase run, or the diagnostics that
//! stopped it, as data.

use std::fmt;

use fpl_backend::BackendError;
use fpl_config::{DumpKind, FplConfig, StopAt};

use crate::session::CompilationSession;
use crate::symbol_map::SymbolEntry;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct CompileOutput {
  pub stop_at: StopAt,

  /// Output of the last phase: AST dump, typed tree dump, IR dump before or
  /// after the backend, or assembly text.
  pub text: String,

  /// Warnings in `file:l.c-l.c: message` form.
  pub warnings: Vec<String>,

  /// Intermediate dumps requested through `FplBuildConfig::dump`.
  pub dumps: Vec<(DumpKind, String)>,

  /// Symbols declared in source. Empty when stopping after parsing.
  pub symbols: Vec<SymbolEntry>,
}

#[derive(Debug)]
pub enum CompileError {
  /// Error diagnostics (and any warnings found with them), one per line.
  Diagnostics(String),
  /// The backend could not process code the front end accepted.
  Internal(BackendError),
}

impl fmt::Display for CompileError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      CompileError::Diagnostics(text) => write!(f, "{}", text),
      CompileError::Internal(err) => write!(f, "internal error in '{}': {}", err.function(), err),
    }
  }
}

impl std::error::Error for CompileError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      CompileError::Internal(err) => Some(err),
      CompileError::Diagnostics(_) => None,
    }
  }
}

impl From<BackendError> for CompileError {
  fn from(err: BackendError) -> Self {
    CompileError::Internal(err)
  }
}

/// Compiles in-memory sources given as `(file name, text)` pairs, in order.
pub fn compile(
  sources: &[(&str, &str)],
  stop_at: StopAt,
) -> Result<CompileOutput, CompileError> {
  let mut session = CompilationSession::new(FplConfig::silent());
  for (name, text) in sources {
    session.add_source(name, text.to_string());
  }
  session.run(stop_at)
}

use std::path::Path;

use fpl_analyzer::Analyzer;
use fpl_ast::display::format_program;
use fpl_backend::run_backend;
use fpl_config::{DebugTrace, DumpKind, FplConfig, StopAt};
use fpl_diagnostics::diagnostic_report::Diagnostic;
use fpl_ir::{LoweringInput, lower_program};
use fpl_log::{log_dbg, phase_log, trace_dbg};
use fpl_tst::display::TstPrinter;
use fpl_type::file::{FileId, SourceMap};

use crate::api::{CompileError, CompileOutput};
use crate::symbol_map::{SymbolEntry, collect_symbols, format_symbol_table};

/// Everything one compilation owns: the configuration, the sources and the
/// diagnostics of the last run. Every `run` builds fresh type, symbol and
/// function registries, so a session can be reused.
pub struct CompilationSession {
  config: FplConfig,
  source_map: SourceMap,
  files: Vec<FileId>,
  diagnostics: Vec<Diagnostic>,
}

impl CompilationSession {
  pub fn new(config: FplConfig) -> Self {
    Self {
      config,
      source_map: SourceMap::new(),
      files: Vec::new(),
      diagnostics: Vec::new(),
    }
  }

  pub fn config(&self) -> &FplConfig {
    &self.config
  }

  pub fn source_map(&self) -> &SourceMap {
    &self.source_map
  }

  /// Diagnostics from the last `run`, errors and warnings, in discovery order.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn add_source(
    &mut self,
    name: &str,
    text: String,
  ) -> FileId {
    let id = self.source_map.add_file(name, text);
    if !self.files.contains(&id) {
      self.files.push(id);
    }
    id
  }

  pub fn add_file(
    &mut self,
    path: &Path,
  ) -> std::io::Result<FileId> {
    let text = std::fs::read_to_string(path)?;
    let id = self.source_map.add_file(path, text);
    if !self.files.contains(&id) {
      self.files.push(id);
    }
    Ok(id)
  }

  /// Runs every phase up to and including `stop_at`. Stops early after
  /// parsing or type checking when an error was reported.
  pub fn run(
    &mut self,
    stop_at: StopAt,
  ) -> Result<CompileOutput, CompileError> {
    self.diagnostics.clear();
    let config = &self.config;
    let mut dumps = Vec::new();

    // #region Parse
    for file in &self.files {
      phase_log!(config, "Parsing... {}", self.source_map.get(file).name);
    }
    let (ast, parse_errors) = fpl_parser::parse_files(config, &self.source_map, &self.files);
    trace_dbg!(
      config,
      DebugTrace::Parser,
      "parser produced {} statements and {} expressions",
      ast.statements.len(),
      ast.expressions.len()
    );
    self.diagnostics.extend(parse_errors.iter().map(|d| d.report()));
    if self.diagnostics.iter().any(|d| d.is_error()) {
      return Err(self.diagnostics_error());
    }

    if stop_at == StopAt::Parse || config.dump_requested(DumpKind::Ast) {
      let text = format_program(&ast);
      if stop_at == StopAt::Parse {
        return Ok(self.output(stop_at, text, dumps, Vec::new()));
      }
      dumps.push((DumpKind::Ast, text));
    }
    // #endregion Parse

    // #region Typecheck
    phase_log!(config, "Type checking...");
    let analyzed = Analyzer::analyze(config, &self.source_map, &ast);
    trace_dbg!(
      config,
      DebugTrace::Analyzer,
      "analyzer emitted {} diagnostics",
      analyzed.diagnostics.len()
    );
    self.diagnostics.extend(analyzed.diagnostics.iter().cloned());
    if analyzed.has_errors() {
      return Err(self.diagnostics_error());
    }

    let symbols = collect_symbols(&self.source_map, &analyzed.symbols, &analyzed.types);
    if config.dump_requested(DumpKind::Symbols) {
      dumps.push((DumpKind::Symbols, format_symbol_table(&symbols)));
    }

    if stop_at == StopAt::Typecheck || config.dump_requested(DumpKind::Tst) {
      let text = TstPrinter::new(&analyzed.tst, &analyzed.types, &analyzed.symbols, &analyzed.functions).print();
      if stop_at == StopAt::Typecheck {
        return Ok(self.output(stop_at, text, dumps, symbols));
      }
      dumps.push((DumpKind::Tst, text));
    }
    // #endregion Typecheck

    // #region Codegen
    phase_log!(config, "Generating code...");
    let input = LoweringInput {
      tst: &analyzed.tst,
      types: &analyzed.types,
      symbols: &analyzed.symbols,
      functions: &analyzed.functions,
      top_function: analyzed.top_function,
      globals_size: analyzed.globals_size,
    };
    let mut program = lower_program(config, input);
    trace_dbg!(config, DebugTrace::Codegen, "lowered {} functions", program.functions.len());

    if stop_at == StopAt::Codegen || config.dump_requested(DumpKind::Ir) {
      let text = program.dump();
      if stop_at == StopAt::Codegen {
        return Ok(self.output(stop_at, text, dumps, symbols));
      }
      dumps.push((DumpKind::Ir, text));
    }
    // #endregion Codegen

    // #region Backend
    phase_log!(config, "Allocating registers...");
    run_backend(config, &mut program)?;

    if stop_at == StopAt::RegAlloc || config.dump_requested(DumpKind::RegAlloc) {
      let text = program.dump();
      if stop_at == StopAt::RegAlloc {
        return Ok(self.output(stop_at, text, dumps, symbols));
      }
      dumps.push((DumpKind::RegAlloc, text));
    }

    phase_log!(config, "Emitting assembly...");
    let text = fpl_backend::emit_assembly(&program);
    log_dbg!(config, "assembly is {} lines", text.lines().count());
    // #endregion Backend

    Ok(self.output(stop_at, text, dumps, symbols))
  }

  fn diagnostics_error(&self) -> CompileError {
    CompileError::Diagnostics(fpl_diagnostics::format_batch(&self.diagnostics, &self.source_map))
  }

  fn output(
    &self,
    stop_at: StopAt,
    text: String,
    dumps: Vec<(DumpKind, String)>,
    symbols: Vec<SymbolEntry>,
  ) -> CompileOutput {
    let warnings = self
      .diagnostics
      .iter()
      .filter(|d| !d.is_error())
      .map(|d| fpl_diagnostics::format_plain(d, &self.source_map))
      .collect();

    CompileOutput {
      stop_at,
      text,
      warnings,
      dumps,
      symbols,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn adding_the_same_source_twice_keeps_one_file() {
    let mut session = CompilationSession::new(FplConfig::silent());
    let a = session.add_source("test.fpl", "val x = 1\n".to_string());
    let b = session.add_source("test.fpl", "val x = 1\n".to_string());
    assert_eq!(a, b);
    assert_eq!(session.source_map().len(), 1);
  }

  #[test]
  fn rerunning_starts_from_fresh_diagnostics() {
    let mut session = CompilationSession::new(FplConfig::silent());
    session.add_source("test.fpl", "fun f() -> Int\n    return y\n".to_string());

    assert!(session.run(StopAt::Typecheck).is_err());
    let first = session.diagnostics().len();
    assert!(session.run(StopAt::Typecheck).is_err());
    assert_eq!(session.diagnostics().len(), first);
  }
}

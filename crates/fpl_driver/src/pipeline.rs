use std::path::{Path, PathBuf};

use colored::*;
use fpl_config::{DumpKind, FplBuildConfig, FplConfig, StopAt};
use fpl_diagnostics::diagnostic_report::Diagnostic;
use fpl_log::{log_dbg, phase_ok, phase_warn};

use crate::api::{CompileError, CompileOutput};
use crate::session::CompilationSession;
use crate::symbol_map::symbol_map_json;

fn dump_file_name(kind: DumpKind) -> &'static str {
  match kind {
    DumpKind::Ast => "dump-ast.txt",
    DumpKind::Tst => "dump-tst.txt",
    DumpKind::Ir => "dump-ir.txt",
    DumpKind::RegAlloc => "dump-regalloc.txt",
    DumpKind::Symbols => "dump-symbols.txt",
  }
}

fn write_file(
  path: &Path,
  content: &str,
) -> Result<(), ()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    if let Err(e) = std::fs::create_dir_all(parent) {
      eprintln!(
        "{} Failed to create directory '{}': {}",
        "Error:".red().bold(),
        parent.display(),
        e
      );
      return Err(());
    }
  }

  if let Err(e) = std::fs::write(path, content) {
    eprintln!("{} Failed to write '{}': {}", "Error:".red().bold(), path.display(), e);
    return Err(());
  }
  Ok(())
}

/// Into `--dump-dir` when given, otherwise to stdout.
fn write_dump_output(
  build: &FplBuildConfig,
  file_name: &str,
  content: &str,
) -> Result<(), ()> {
  match &build.dump_dir {
    Some(dir) => write_file(&Path::new(dir).join(file_name), content),
    None => {
      println!("\n{}", content);
      Ok(())
    },
  }
}

/// `-o` when given. Without it assembly goes next to the first source as
/// `<name>.f32` and the dumps of earlier stop phases go to stdout.
fn output_path(
  build: &FplBuildConfig,
  stop_at: StopAt,
) -> Option<PathBuf> {
  if let Some(output) = &build.output {
    return Some(PathBuf::from(output));
  }
  if stop_at != StopAt::Assembly {
    return None;
  }
  build.files.first().map(|f| Path::new(f).with_extension("f32"))
}

fn render_diagnostics(
  config: &FplConfig,
  session: &CompilationSession,
) {
  let shown: Vec<Diagnostic> = session
    .diagnostics()
    .iter()
    .filter(|d| d.is_error() || !config.quiet)
    .cloned()
    .collect();
  fpl_diagnostics::render_batch(&shown, session.source_map());
}

/// Compiles the files of `config.build_config`, rendering diagnostics and
/// writing the output, requested dumps and symbol map.
pub fn build_files(config: &FplConfig) -> Result<(), ()> {
  let Some(build) = config.build_config.as_ref() else {
    eprintln!("{} No build configuration given", "Error:".red().bold());
    return Err(());
  };

  if build.files.is_empty() {
    eprintln!("{} No input files", "Error:".red().bold());
    return Err(());
  }

  let mut session = CompilationSession::new(config.clone());
  for file in &build.files {
    if let Err(e) = session.add_file(Path::new(file)) {
      eprintln!("{} Failed to read file '{}': {}", "Error:".red().bold(), file, e);
      return Err(());
    }
  }

  let stop_at = if build.check_mode { StopAt::Typecheck } else { build.stop_at };
  log_dbg!(config, "compiling {} files, stopping at {:?}", build.files.len(), stop_at);

  let result = session.run(stop_at);
  render_diagnostics(config, &session);

  match result {
    Ok(output) => finish(config, build, &output),
    Err(CompileError::Diagnostics(_)) => {
      let errors = session.diagnostics().iter().filter(|d| d.is_error()).count();
      eprintln!(
        "{} Compilation failed with {} error{}",
        "Error:".red().bold(),
        errors,
        if errors == 1 { "" } else { "s" }
      );
      Err(())
    },
    Err(err @ CompileError::Internal(_)) => {
      eprintln!("{} {}", "Error:".red().bold(), err);
      Err(())
    },
  }
}

/// Type checks the files of `config.build_config` and writes nothing but
/// the symbol map, when one was requested.
pub fn check_files(config: &FplConfig) -> Result<(), ()> {
  let mut config = config.clone();
  if let Some(build) = config.build_config.as_mut() {
    build.check_mode = true;
  }
  build_files(&config)
}

fn finish(
  config: &FplConfig,
  build: &FplBuildConfig,
  output: &CompileOutput,
) -> Result<(), ()> {
  for (kind, text) in &output.dumps {
    write_dump_output(build, dump_file_name(*kind), text)?;
  }

  if let Some(path) = &build.symbol_map {
    match symbol_map_json(&output.symbols) {
      Ok(json) => write_file(Path::new(path), &json)?,
      Err(e) => {
        eprintln!("{} Failed to encode symbol map: {}", "Error:".red().bold(), e);
        return Err(());
      },
    }
  }

  if !output.warnings.is_empty() {
    phase_warn!(config, "{} warning(s)", output.warnings.len());
  }

  if build.check_mode {
    phase_ok!(config, "No errors found");
    return Ok(());
  }

  match output_path(build, output.stop_at) {
    Some(path) => {
      write_file(&path, &output.text)?;
      phase_ok!(config, "Wrote {}", path.display());
    },
    None => println!("{}", output.text),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn assembly_defaults_next_to_the_first_source() {
    let build = FplBuildConfig {
      files: vec!["src/main.fpl".to_string(), "src/list.fpl".to_string()],
      ..FplBuildConfig::default()
    };
    assert_eq!(output_path(&build, StopAt::Assembly), Some(PathBuf::from("src/main.f32")));
    assert_eq!(output_path(&build, StopAt::Typecheck), None);
  }

  #[test]
  fn explicit_output_wins_for_every_phase() {
    let build = FplBuildConfig {
      files: vec!["main.fpl".to_string()],
      output: Some("out.txt".to_string()),
      ..FplBuildConfig::default()
    };
    assert_eq!(output_path(&build, StopAt::Parse), Some(PathBuf::from("out.txt")));
  }
}

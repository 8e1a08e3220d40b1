use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DumpKind {
  Ast,
  Tst,
  Ir,
  RegAlloc,
  Symbols,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugTrace {
  Lexer,
  Parser,
  Analyzer,
  Codegen,
  Backend,
  RegAlloc,
}

/// Last phase to run. Each phase's textual output is what `compile` returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopAt {
  Parse,
  Typecheck,
  Codegen,
  RegAlloc,
  #[default]
  Assembly,
}

/// - `Quiet`: No output except errors
/// - `Detailed`: Structured progress output (default)
/// - `Verbose`: Detailed output with internal phases
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputLevel {
  Quiet,
  #[default]
  Detailed,
  Verbose,
}

/// `fpl.toml`:
///
/// ```toml
/// name = "demo"
/// sources = ["src/main.fpl", "src/list.fpl"]
///
/// [build]
/// output = "demo.f32"
/// stdlib = ["stdlib/strings.fpl"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FplProjectConfig {
  pub name: String,
  #[serde(default)]
  pub sources: Vec<String>,
  #[serde(default)]
  pub build: FplProjectBuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FplProjectBuildConfig {
  pub output: Option<String>,
  #[serde(default)]
  pub stdlib: Vec<String>,
  pub stop_at: Option<StopAt>,
}

impl FplProjectConfig {
  pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(text)
  }
}

#[derive(Debug, Clone, Default)]
pub struct FplBuildConfig {
  pub files: Vec<String>,
  pub output: Option<String>,
  pub stop_at: StopAt,
  pub dump: Vec<DumpKind>,
  pub dump_dir: Option<String>,
  pub symbol_map: Option<String>,
  pub check_mode: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FplConfig {
  pub project_config: Option<FplProjectConfig>,
  pub build_config: Option<FplBuildConfig>,
  pub debug: bool,
  pub debug_trace: Vec<DebugTrace>,
  pub quiet: bool,
  pub verbose: u8,
  pub output_level: OutputLevel,
}

impl FplConfig {
  pub fn new_basic(
    debug: bool,
    debug_trace: Vec<DebugTrace>,
    quiet: bool,
    verbose: u8,
  ) -> Self {
    let output_level = if quiet {
      OutputLevel::Quiet
    } else if verbose > 0 {
      OutputLevel::Verbose
    } else {
      OutputLevel::Detailed
    };

    Self {
      debug,
      debug_trace,
      quiet,
      verbose,
      output_level,
      ..Self::default()
    }
  }

  /// A config that logs nothing; used by tests and library callers.
  pub fn silent() -> Self {
    Self::new_basic(false, Vec::new(), true, 0)
  }

  pub fn dump_requested(
    &self,
    kind: DumpKind,
  ) -> bool {
    self
      .build_config
      .as_ref()
      .map(|b| b.dump.contains(&kind))
      .unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn project_file_parses() {
    let text = r#"
name = "demo"
sources = ["main.fpl"]

[build]
output = "demo.f32"
stop_at = "regalloc"
"#;
    let cfg = FplProjectConfig::from_toml(text).unwrap();
    assert_eq!(cfg.name, "demo");
    assert_eq!(cfg.sources, vec!["main.fpl".to_string()]);
    assert_eq!(cfg.build.stop_at, Some(StopAt::RegAlloc));
    assert!(cfg.build.stdlib.is_empty());
  }

  #[test]
  fn quiet_overrides_verbose() {
    let cfg = FplConfig::new_basic(false, Vec::new(), true, 3);
    assert_eq!(cfg.output_level, OutputLevel::Quiet);
  }
}

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use fpl_config::{DebugTrace, DumpKind, StopAt};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DumpKindCli {
  /// Dump the AST
  Ast,
  /// Dump the typed tree
  Tst,
  /// Dump the IR before optimisation
  Ir,
  /// Dump the IR after register allocation
  Regalloc,
  /// Dump the symbol table
  Symbols,
}

impl From<DumpKindCli> for DumpKind {
  fn from(value: DumpKindCli) -> DumpKind {
    match value {
      DumpKindCli::Ast => DumpKind::Ast,
      DumpKindCli::Tst => DumpKind::Tst,
      DumpKindCli::Ir => DumpKind::Ir,
      DumpKindCli::Regalloc => DumpKind::RegAlloc,
      DumpKindCli::Symbols => DumpKind::Symbols,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DebugTraceCli {
  Lexer,
  Parser,
  Analyzer,
  Codegen,
  Backend,
  Regalloc,
}

impl From<DebugTraceCli> for DebugTrace {
  fn from(value: DebugTraceCli) -> DebugTrace {
    match value {
      DebugTraceCli::Lexer => DebugTrace::Lexer,
      DebugTraceCli::Parser => DebugTrace::Parser,
      DebugTraceCli::Analyzer => DebugTrace::Analyzer,
      DebugTraceCli::Codegen => DebugTrace::Codegen,
      DebugTraceCli::Backend => DebugTrace::Backend,
      DebugTraceCli::Regalloc => DebugTrace::RegAlloc,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StopAtCli {
  Parse,
  Typecheck,
  Codegen,
  Regalloc,
  Assembly,
}

impl From<StopAtCli> for StopAt {
  fn from(value: StopAtCli) -> StopAt {
    match value {
      StopAtCli::Parse => StopAt::Parse,
      StopAtCli::Typecheck => StopAt::Typecheck,
      StopAtCli::Codegen => StopAt::Codegen,
      StopAtCli::Regalloc => StopAt::RegAlloc,
      StopAtCli::Assembly => StopAt::Assembly,
    }
  }
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct BuildCommand {
  /// Source files, compiled in order. Taken from fpl.toml when omitted
  pub files: Vec<String>,

  /// Output file (defaults to the first source with a .f32 extension)
  #[arg(short = 'o', long)]
  pub output: Option<String>,

  /// Last phase to run; its output is written instead of assembly
  #[arg(long, value_enum)]
  pub stop_at: Option<StopAtCli>,

  /// Write a JSON map of every declared symbol to this file
  #[arg(long)]
  pub symbol_map: Option<String>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CheckCommand {
  /// Source files to type check. Taken from fpl.toml when omitted
  pub files: Vec<String>,

  /// Write a JSON map of every declared symbol to this file
  #[arg(long)]
  pub symbol_map: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SubCommand {
  /// Compile FPL sources to F32 assembly
  Build(BuildCommand),
  /// Parse and type check without generating code
  Check(CheckCommand),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "The FPL compiler", long_about = None)]
#[command(propagate_version = true)]
#[command(color = ColorChoice::Always)]
pub struct Cli {
  #[command(subcommand)]
  pub subcommand: SubCommand,

  /// Dump internal compiler representations
  #[arg(long, value_enum, action = clap::ArgAction::Append, global = true)]
  pub dump: Vec<DumpKindCli>,

  /// Write dumps to this directory (otherwise stdout)
  #[arg(long, global = true)]
  pub dump_dir: Option<String>,

  /// Enable internal debug mode
  #[arg(long, default_value = "false", global = true)]
  pub debug: bool,

  /// Enable debug tracing for subsystems
  #[arg(long, value_enum, action = clap::ArgAction::Append, global = true)]
  pub debug_trace: Vec<DebugTraceCli>,

  /// Don't print any output
  #[arg(long, short = 'q', default_value = "false", global = true)]
  pub quiet: bool,

  /// Use verbose output
  #[arg(long, short, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn build_flags_parse() {
    let cli = Cli::parse_from([
      "fplc",
      "build",
      "a.fpl",
      "b.fpl",
      "-o",
      "out.f32",
      "--stop-at",
      "regalloc",
      "--dump",
      "ir",
      "--dump",
      "symbols",
      "-vv",
    ]);

    let SubCommand::Build(build) = cli.subcommand else {
      panic!("expected build");
    };
    assert_eq!(build.files, vec!["a.fpl".to_string(), "b.fpl".to_string()]);
    assert_eq!(build.output.as_deref(), Some("out.f32"));
    assert_eq!(build.stop_at, Some(StopAtCli::Regalloc));
    assert_eq!(cli.dump, vec![DumpKindCli::Ir, DumpKindCli::Symbols]);
    assert_eq!(cli.verbose, 2);
  }

  #[test]
  fn global_flags_after_check() {
    let cli = Cli::parse_from(["fplc", "check", "main.fpl", "--debug-trace", "analyzer", "-q"]);
    assert!(cli.quiet);
    assert_eq!(cli.debug_trace, vec![DebugTraceCli::Analyzer]);
    assert!(matches!(cli.subcommand, SubCommand::Check(_)));
  }
}

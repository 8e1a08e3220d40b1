//! Logging utilities for the FPL compiler.
//!
//! Provides macros for:
//! - Phase logging (`phase_log!`, `phase_ok!`, `phase_warn!`)
//! - Debug traces by category (`trace_dbg!`)
//! - Verbose logging (`log_dbg!`, `log_trc!`)
//!
//! All output goes to stderr so it never mixes with dumps on stdout.

use fpl_config::{DebugTrace, FplConfig};

pub fn effective_verbose(config: &FplConfig) -> u8 {
  if config.quiet {
    return 0;
  }

  if config.debug && config.verbose < 2 {
    return 2;
  }

  config.verbose
}

pub fn log_phase(config: &FplConfig) -> bool {
  !config.quiet
}

pub fn log_info(config: &FplConfig) -> bool {
  effective_verbose(config) >= 1
}

pub fn log_debug(config: &FplConfig) -> bool {
  effective_verbose(config) >= 2
}

pub fn log_trace(config: &FplConfig) -> bool {
  effective_verbose(config) >= 3
}

pub fn debug_trace_enabled(
  config: &FplConfig,
  trace: DebugTrace,
) -> bool {
  !config.quiet && (config.debug || config.debug_trace.contains(&trace))
}

pub fn trace_name(trace: DebugTrace) -> &'static str {
  match trace {
    DebugTrace::Lexer => "lexer",
    DebugTrace::Parser => "parser",
    DebugTrace::Analyzer => "analyzer",
    DebugTrace::Codegen => "codegen",
    DebugTrace::Backend => "backend",
    DebugTrace::RegAlloc => "regalloc",
  }
}

/// Log a compiler phase message with an arrow prefix.
///
/// ```ignore
/// phase_log!(&config, "Parsing {}", file);
/// phase_log!(&config, indent = 8, "Function {}", name);
/// ```
#[macro_export]
macro_rules! phase_log {
  ($config:expr, indent = $indent:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use colored::Colorize;
      eprintln!(
        "{:indent$}{} {}",
        "",
        "-->".bright_green().bold(),
        format!($fmt $(, $arg)*),
        indent = $indent
      );
    }
  }};

  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    $crate::phase_log!($config, indent = 4, $fmt $(, $arg)*);
  }};
}

/// Log a successful phase completion (green arrow, no indent).
#[macro_export]
macro_rules! phase_ok {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use colored::Colorize;
      eprintln!("{} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a warning during a phase (yellow arrow, no indent).
#[macro_export]
macro_rules! phase_warn {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use colored::Colorize;
      eprintln!("{} {}", "-->".bright_yellow().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// `debug[component]: message`, shown with `--debug` or `--debug-trace component`.
///
/// ```ignore
/// trace_dbg!(&config, DebugTrace::RegAlloc, "T3 -> R4");
/// ```
#[macro_export]
macro_rules! trace_dbg {
  ($config:expr, $trace:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::debug_trace_enabled($config, $trace) {
      eprintln!(
        "debug[{}]: {}",
        $crate::trace_name($trace),
        format!($fmt $(, $arg)*)
      );
    }
  }};
}

/// Verbose debug message (verbosity >= 2).
#[macro_export]
macro_rules! log_dbg {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_debug($config) {
      eprintln!("debug: {}", format!($fmt $(, $arg)*));
    }
  }};
}

/// Trace message (verbosity >= 3).
#[macro_export]
macro_rules! log_trc {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_trace($config) {
      eprintln!("trace: {}", format!($fmt $(, $arg)*));
    }
  }};
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_raises_verbosity() {
    let cfg = FplConfig::new_basic(true, Vec::new(), false, 0);
    assert_eq!(effective_verbose(&cfg), 2);
    assert!(log_debug(&cfg));
    assert!(!log_trace(&cfg));
  }

  #[test]
  fn trace_categories_filter() {
    let cfg = FplConfig::new_basic(false, vec![DebugTrace::RegAlloc], false, 0);
    assert!(debug_trace_enabled(&cfg, DebugTrace::RegAlloc));
    assert!(!debug_trace_enabled(&cfg, DebugTrace::Parser));
    assert!(!debug_trace_enabled(&FplConfig::silent(), DebugTrace::RegAlloc));
  }
}

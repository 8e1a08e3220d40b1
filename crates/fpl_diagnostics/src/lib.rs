pub mod diagnostic_report;
pub mod message;

use colored::*;
use diagnostic_report::{Diagnostic, Severity};
use fpl_type::file::SourceMap;

/// `file:l.c-l.c: message`, the form editors and tests consume.
pub fn format_plain(
  diag: &Diagnostic,
  sm: &SourceMap,
) -> String {
  format!("{}: {}", sm.location(&diag.primary_span), diag.message)
}

/// One `format_plain` line per diagnostic, in discovery order.
pub fn format_batch(
  diagnostics: &[Diagnostic],
  sm: &SourceMap,
) -> String {
  diagnostics
    .iter()
    .map(|d| format_plain(d, sm))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn render(
  diag: &Diagnostic,
  sm: &SourceMap,
) {
  print_header(diag);
  print_body(diag, sm);

  for note in &diag.notes {
    eprintln!("  {} {}", "note:".cyan().bold(), note);
  }

  eprintln!();
}

pub fn render_batch(
  diagnostics: &[Diagnostic],
  sm: &SourceMap,
) {
  for diag in diagnostics {
    render(diag, sm);
  }
}

fn print_header(diag: &Diagnostic) {
  let message = diag.message.bold();
  let code = diag.error_code.bold();

  match diag.severity {
    Severity::Info => eprintln!("{}[{}]: {}", "Info".blue().bold(), code.blue(), message),
    Severity::Warning => eprintln!("{}[{}]: {}", "Warning".yellow().bold(), code.yellow(), message),
    Severity::Error => eprintln!("{}[{}]: {}", "Error".red().bold(), code.red().bold(), message),
    Severity::Hint => eprintln!("{}[{}]: {}", "Hint".cyan().bold(), code.cyan(), message),
  }
}

fn print_body(
  diag: &Diagnostic,
  sm: &SourceMap,
) {
  let file = sm.get(&diag.primary_span.file);
  let (line, col) = sm.line_col(&diag.primary_span.file, diag.primary_span.start);

  eprintln!(
    "{:2}{} {}",
    "",
    "-->".blue().bold(),
    sm.location(&diag.primary_span).bold(),
  );

  let pipe = "|".blue().bold();
  let lines: Vec<&str> = file.text.lines().collect();
  let line_idx = (line as usize).saturating_sub(1);

  eprintln!("{:3}{:3}", "", pipe);
  if let Some(error_line) = lines.get(line_idx) {
    eprintln!("{:3}{:3}{}", line.to_string().blue().bold(), pipe, error_line);

    let remaining = error_line.chars().count().saturating_sub(col as usize - 1);
    let span_len = diag.primary_span.len().clamp(1, remaining.max(1));
    let caret = "^".repeat(span_len).red().bold();
    eprintln!("{:3}{:3}{}{}", "", pipe, " ".repeat(col as usize - 1), caret);
  }

  for label in &diag.labels {
    eprintln!("  {} {} ({})", "label:".yellow().bold(), label.message, sm.location(&label.span));
  }
}

#[cfg(test)]
mod tests {
  use fpl_type::{BytePosition, span::Span};

  use super::*;
  use crate::message::DiagnosticMessage;

  #[test]
  fn plain_format_has_location_prefix() {
    let mut sm = SourceMap::new();
    let file = sm.add_file("test.fpl", "fun main()\n    return x\n".to_string());
    let span = Span::new(file, BytePosition(22), BytePosition(23));
    let diag = DiagnosticMessage::UndeclaredIdentifier {
      name: "x".to_string(),
      span,
    }
    .report();

    assert_eq!(format_plain(&diag, &sm), "test.fpl:2.12-2.12: Undeclared identifier 'x'");
    assert_eq!(diag.error_code, "A0001");
  }

  #[test]
  fn free_warnings_are_not_errors() {
    let diag = DiagnosticMessage::PossibleDoubleFree(Span::default()).report();
    assert_eq!(diag.severity, Severity::Warning);
    assert_eq!(diag.message, "Possible double free");
  }
}

mod lexer;
mod parser;

pub use lexer::FplLexer;
pub use parser::{FplParser, ParserResult};

use fpl_ast::ASTProgram;
use fpl_config::FplConfig;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::log_dbg;
use fpl_type::file::{FileId, SourceMap};

/// Lexes and parses every file into one program, one `ASTFile` per source in
/// the order given. Diagnostics of each file are ordered by position.
pub fn parse_files(
  config: &FplConfig,
  sm: &SourceMap,
  files: &[FileId],
) -> (ASTProgram, Vec<DiagnosticMessage>) {
  let mut program = ASTProgram::new();
  let mut diagnostics = Vec::new();

  for file in files {
    let source = sm.get(file);
    log_dbg!(config, "parsing {}", source.name);

    let mut lexer = FplLexer::new(config, *file, &source.text);
    lexer.scan_tokens();

    let mut parser = FplParser::new(config, &mut program, lexer.tokens);
    let ast_file = parser.parse_file(source.module_name(), *file);

    let mut file_diagnostics = lexer.diagnostics;
    file_diagnostics.append(&mut parser.diagnostics);
    file_diagnostics.sort_by_key(|d| d.primary_span().start.0);

    diagnostics.extend(file_diagnostics);
    program.files.push(ast_file);
  }

  (program, diagnostics)
}

use fpl_ast::display::format_program;
use fpl_config::FplConfig;
use fpl_diagnostics::format_batch;
use fpl_type::file::SourceMap;

/// Parse `src` as `test.fpl`: the AST dump when it parses cleanly, otherwise
/// the diagnostics, one per line.
pub fn parse(src: &str) -> String {
  let config = FplConfig::silent();
  let mut sm = SourceMap::new();
  let file = sm.add_file("test.fpl", src.to_string());

  let (program, diagnostics) = fpl_parser::parse_files(&config, &sm, &[file]);
  if diagnostics.is_empty() {
    return format_program(&program);
  }

  let reports: Vec<_> = diagnostics.iter().map(|d| d.report()).collect();
  format_batch(&reports, &sm)
}

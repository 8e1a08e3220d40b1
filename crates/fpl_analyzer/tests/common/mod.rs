use fpl_analyzer::Analyzer;
use fpl_config::FplConfig;
use fpl_diagnostics::format_batch;
use fpl_tst::display::TstPrinter;
use fpl_type::file::SourceMap;

/// Parse and check `src` as `test.fpl`: the typed tree dump when there is
/// nothing to report, otherwise the diagnostics, one per line.
pub fn check(src: &str) -> String {
  let config = FplConfig::silent();
  let mut sm = SourceMap::new();
  let file = sm.add_file("test.fpl", src.to_string());

  let (program, parse_errors) = fpl_parser::parse_files(&config, &sm, &[file]);
  if !parse_errors.is_empty() {
    let reports: Vec<_> = parse_errors.iter().map(|d| d.report()).collect();
    return format_batch(&reports, &sm);
  }

  let output = Analyzer::analyze(&config, &sm, &program);
  if !output.diagnostics.is_empty() {
    return format_batch(&output.diagnostics, &sm);
  }
  TstPrinter::new(&output.tst, &output.types, &output.symbols, &output.functions).print()
}

use fpl_analyzer::Analyzer;
use fpl_config::FplConfig;
use fpl_diagnostics::format_batch;
use fpl_ir::{IrProgram, LoweringInput, lower_program};
use fpl_type::file::SourceMap;

/// Parse, check and lower `src` as `test.fpl`. Diagnostics come back as the error.
pub fn lower(src: &str) -> Result<IrProgram, String> {
  let config = FplConfig::silent();
  let mut sm = SourceMap::new();
  let file = sm.add_file("test.fpl", src.to_string());

  let (program, parse_errors) = fpl_parser::parse_files(&config, &sm, &[file]);
  if !parse_errors.is_empty() {
    let reports: Vec<_> = parse_errors.iter().map(|d| d.report()).collect();
    return Err(format_batch(&reports, &sm));
  }

  let output = Analyzer::analyze(&config, &sm, &program);
  if output.has_errors() {
    return Err(format_batch(&output.diagnostics, &sm));
  }

  let input = LoweringInput {
    tst: &output.tst,
    types: &output.types,
    symbols: &output.symbols,
    functions: &output.functions,
    top_function: output.top_function,
    globals_size: output.globals_size,
  };
  Ok(lower_program(&config, input))
}

/// The IR dump of `src`, or its diagnostics.
pub fn dump(src: &str) -> String {
  match lower(src) {
    Ok(program) => program.dump(),
    Err(diagnostics) => diagnostics,
  }
}

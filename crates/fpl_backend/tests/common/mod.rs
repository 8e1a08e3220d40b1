use fpl_analyzer::Analyzer;
use fpl_backend::{BackendError, emit_assembly, run_backend};
use fpl_config::FplConfig;
use fpl_ir::{IrProgram, LoweringInput, lower_program};
use fpl_type::file::SourceMap;

/// `src` as `test.fpl`, checked and lowered. Panics on diagnostics.
pub fn lower(src: &str) -> IrProgram {
  let config = FplConfig::silent();
  let mut sm = SourceMap::new();
  let file = sm.add_file("test.fpl", src.to_string());

  let (program, parse_errors) = fpl_parser::parse_files(&config, &sm, &[file]);
  assert!(parse_errors.is_empty(), "parse errors in test source");

  let output = Analyzer::analyze(&config, &sm, &program);
  if output.has_errors() {
    panic!("{}", fpl_diagnostics::format_batch(&output.diagnostics, &sm));
  }

  let input = LoweringInput {
    tst: &output.tst,
    types: &output.types,
    symbols: &output.symbols,
    functions: &output.functions,
    top_function: output.top_function,
    globals_size: output.globals_size,
  };
  lower_program(&config, input)
}

/// The IR dump after optimisation and register allocation.
pub fn allocated(src: &str) -> Result<String, BackendError> {
  let mut program = lower(src);
  run_backend(&FplConfig::silent(), &mut program)?;
  Ok(program.dump())
}

pub fn assembly(src: &str) -> Result<String, BackendError> {
  let mut program = lower(src);
  run_backend(&FplConfig::silent(), &mut program)?;
  Ok(emit_assembly(&program))
}

mod common;

use fpl_config::{DumpKind, FplBuildConfig, FplConfig, StopAt};
use fpl_driver::CompilationSession;
use insta::assert_snapshot;

const SUM: &str = "fun main() -> Int
    val x = 1
    val y = 2
    return x + y
";

#[test]
fn e2e_parse_phase_returns_the_ast() {
  assert_snapshot!(common::phase("val x = 1\nvar y = \"hello world\"", StopAt::Parse), @r"
  File test
   Decl VAL x
    Intlit 1
   Decl VAR y
    Stringlit hello world
  ");
}

#[test]
fn e2e_typecheck_phase_returns_the_typed_tree() {
  let src = "val x = 5
print(x + 1)
";

  let expected = "top
  file: test
    decl: GLOBAL:x:Int
      int: 5 (Int)
    print
      ADD_I (Int)
        global: x (Int)
        int: 1 (Int)
";
  assert_eq!(common::phase(src, StopAt::Typecheck), expected);
}

#[test]
fn e2e_codegen_phase_is_the_unoptimised_ir() {
  let expected = "Function /main()
start
ld T0, 1
ld x, T0
ld T1, 2
ld y, T1
ADD_I T2, x, y
ld R8, T2
jmp L0
L0:
ret

";
  assert_eq!(common::phase(SUM, StopAt::Codegen), expected);
}

#[test]
fn e2e_constant_body_folds_to_one_load() {
  assert_eq!(common::phase(SUM, StopAt::RegAlloc), "Function /main()\nstart\nld R8, 3\nret\n\n");
}

#[test]
fn e2e_assembly_of_a_leaf_function() {
  assert_eq!(
    common::phase(SUM, StopAt::Assembly),
    "# Generated by fplc\n/main():\nld R8, 3\nret\n\n"
  );
}

#[test]
fn e2e_symbols_have_source_locations() {
  let output = common::run("val total = 5\n", StopAt::Typecheck).unwrap();

  let total = output
    .symbols
    .iter()
    .find(|s| s.name == "total")
    .expect("symbol for 'total'");
  assert_eq!(total.kind, "global");
  assert_eq!(total.ty, "Int");
  assert_eq!(total.definition.filename, "test.fpl");
  assert_eq!(total.definition.line, 1);
  assert!(!total.mutable);
  assert!(output.symbols.iter().all(|s| s.name != "Int" && s.name != "true"));
}

#[test]
fn e2e_requested_dumps_come_back_in_phase_order() {
  let mut config = FplConfig::silent();
  config.build_config = Some(FplBuildConfig {
    dump: vec![DumpKind::RegAlloc, DumpKind::Ast, DumpKind::Ir],
    ..FplBuildConfig::default()
  });

  let mut session = CompilationSession::new(config);
  session.add_source("test.fpl", SUM.to_string());
  let output = session.run(StopAt::Assembly).unwrap();

  let kinds: Vec<DumpKind> = output.dumps.iter().map(|(k, _)| *k).collect();
  assert_eq!(kinds, vec![DumpKind::Ast, DumpKind::Ir, DumpKind::RegAlloc]);
  assert_eq!(output.dumps[2].1, "Function /main()\nstart\nld R8, 3\nret\n\n");
}

#[test]
fn e2e_stop_phase_is_not_repeated_as_a_dump() {
  let mut config = FplConfig::silent();
  config.build_config = Some(FplBuildConfig {
    dump: vec![DumpKind::Tst],
    ..FplBuildConfig::default()
  });

  let mut session = CompilationSession::new(config);
  session.add_source("test.fpl", SUM.to_string());
  let output = session.run(StopAt::Typecheck).unwrap();

  assert!(output.dumps.is_empty());
  assert!(output.text.starts_with("top\n"));
}

#[test]
fn e2e_first_file_keeps_a_clashing_global_name() {
  let first = "val limit = 1\n";
  let second = "val limit = 2\n";
  let reader = "val seen = limit\n";
  let output = fpl_driver::compile(
    &[("first.fpl", first), ("second.fpl", second), ("reader.fpl", reader)],
    StopAt::Codegen,
  )
  .unwrap();

  let loads: Vec<&str> = output.text.lines().filter(|l| l.starts_with("ldw ")).collect();
  assert_eq!(loads.len(), 1, "{}", output.text);
  assert!(loads[0].ends_with(", R29[0]"), "{}", output.text);
}

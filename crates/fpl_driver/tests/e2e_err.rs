mod common;

use fpl_config::StopAt;
use fpl_driver::{CompileError, compile};
use insta::assert_snapshot;

#[test]
fn e2e_err_read_before_assignment() {
  let src = "fun fred() -> Int
    var x:Int
    return x
";
  assert_snapshot!(common::diagnostics(src), @"test.fpl:3.12-3.12: Symbol 'x' is uninitialized");
}

#[test]
fn e2e_err_val_assigned_twice_on_some_paths() {
  let src = "fun fred(a:Int) -> Int
    val x:Int
    if (a=1)
        x = 1
    x = 2
    return x
";
  assert_snapshot!(common::diagnostics(src), @"test.fpl:5.5-5.5: 'x' may already be initialised");
}

#[test]
fn e2e_err_duplicate_when_value() {
  let src = "fun f(x:Int)
    when x
        2 -> print(1)
        2 -> print(2)
";
  assert_snapshot!(common::diagnostics(src), @"test.fpl:4.9-4.9: Duplicate value '2'");
}

#[test]
fn e2e_err_ambiguous_overload() {
  let src = "fun f(a:String?)
    print(\"maybe\")

fun f(a:Any)
    print(\"any\")

fun main()
    f(\"x\")
";
  assert_snapshot!(
    common::diagnostics(src),
    @"test.fpl:8.5-8.5: Ambiguous call to 'f(String)'. Candidates are: f(String?), f(Any)"
  );
}

#[test]
fn e2e_err_vararg_call_without_arguments() {
  let src = "fun fred(a:Int, b:Int...)
    print(a)

fun main()
    fred()
";
  assert_snapshot!(
    common::diagnostics(src),
    @"test.fpl:5.5-5.8: No functions match 'fred()'. Candidates are: fred(Int,Int...)"
  );
}

#[test]
fn e2e_err_parse_errors_stop_before_type_checking() {
  let src = "val x = 123a
fun f() -> Int
    return y
";
  assert_snapshot!(common::diagnostics(src), @"test.fpl:1.9-1.12: Malformed integer literal '123a'");
}

#[test]
fn e2e_err_names_the_file_the_error_is_in() {
  let ok = "fun f() -> Int
    return 1
";
  let bad = "fun g() -> Int
    return y
";
  let result = compile(&[("good.fpl", ok), ("bad.fpl", bad)], StopAt::Typecheck);

  match result {
    Err(CompileError::Diagnostics(text)) => {
      assert_snapshot!(text, @"bad.fpl:2.12-2.12: Undeclared identifier 'y'");
    },
    other => panic!("expected diagnostics, got {:?}", other.map(|o| o.text)),
  }
}

mod common;

use insta::assert_snapshot;

#[test]
fn e2e_warn_double_free() {
  let src = "class Cat(val name:String)

fun main()
    val c = new Cat(\"Tom\")
    free c
    free c
";
  let warnings = common::warnings(src);
  assert_eq!(warnings.len(), 1);
  assert_snapshot!(warnings.join("\n"), @"test.fpl:6.10-6.10: Possible double free");
}

#[test]
fn e2e_warn_single_free_is_quiet() {
  let src = "class Cat(val name:String)

fun main()
    val c = new Cat(\"Tom\")
    free c
";
  assert!(common::warnings(src).is_empty());
}

#[test]
fn e2e_warn_use_after_free() {
  let src = "class Cat(val name:String)

fun main()
    val c = new Cat(\"Tom\")
    free c
    print(c.name)
";
  let warnings = common::warnings(src);
  assert_snapshot!(warnings.join("\n"), @"test.fpl:6.11-6.11: possible use of freed object");
}

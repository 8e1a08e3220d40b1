mod common;

#[test]
fn malformed_integer() {
  assert_eq!(common::parse("val x = 123a"), "test.fpl:1.9-1.12: Malformed integer literal '123a'");
}

#[test]
fn malformed_real() {
  assert_eq!(common::parse("val x = 123.c"), "test.fpl:1.9-1.13: Malformed real literal '123.c'");
}

#[test]
fn malformed_char() {
  assert_eq!(common::parse("val x = 'xs'"), "test.fpl:1.9-1.12: Malformed character literal 'xs'");
}

#[test]
fn unexpected_primary() {
  assert_eq!(
    common::parse("val x = and 4"),
    "test.fpl:1.9-1.11: Got 'and' when expecting primary expression"
  );
}

#[test]
fn unexpected_type() {
  assert_eq!(
    common::parse("val x : Int = -5\nval y : and"),
    "test.fpl:2.9-2.11: Got 'and' when expecting type expression"
  );
}

#[test]
fn mismatched_end() {
  let src = "fun fred(a:Int, b:Int) -> Int\n    b = b + 1\n    return a + b\nend if    # should be end fun\n";

  assert_eq!(common::parse(src), "test.fpl:4.1-4.3: Got 'end if' when expecting 'end fun'");
}

#[test]
fn matching_end_is_accepted() {
  let src = "fun fred(a:Int) -> Int\n    return a\nend fun\nval x = 1\n";

  assert!(common::parse(src).starts_with("File test\n Function fred"));
}

#[test]
fn missing_body() {
  let src = "fun fred(a:Int, b:Int) -> Int\n\nval a = 1\n";

  assert_eq!(common::parse(src), "test.fpl:3.1-3.3: Missing indented block");
}

#[test]
fn errors_on_several_lines_are_all_reported() {
  let src = "val x = and 4\nval y = 5 6\nval z = 1\n";

  assert_eq!(
    common::parse(src),
    "test.fpl:1.9-1.11: Got 'and' when expecting primary expression\n\
     test.fpl:2.11-2.11: Got '6' when expecting end of line"
  );
}

#[test]
fn parameter_keywords_need_a_constructor() {
  let src = "fun f(val a:Int)\n    return\n";

  assert_eq!(common::parse(src), "test.fpl:1.7-1.9: 'val' only allowed in constructors");
}

#[test]
fn varargs_need_a_parameter() {
  let src = "fun f(...)\n    return\n";

  assert_eq!(
    common::parse(src),
    "test.fpl:1.11-1.11: Cannot have varargs with an empty parameter list"
  );
}

#[test]
fn class_bodies_hold_only_members() {
  let src = "class Cat\n    print(1)\n    val age = 3\n";

  assert_eq!(common::parse(src), "test.fpl:2.5-2.9: print not allowed in Class body");
}

#[test]
fn while_needs_then_or_block() {
  let src = "fun f(x:Int)\n    while x > 0 x = 1\n";

  assert_eq!(common::parse(src), "test.fpl:2.17-2.17: Expected 'then' or 'end of line'");
}

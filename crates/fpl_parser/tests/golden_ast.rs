mod common;

use insta::assert_snapshot;

#[test]
fn simple_declarations() {
  let src = "val x = 1\nvar y = \"hello world\"";

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Intlit 1
   Decl VAR y
    Stringlit hello world
  ");
}

#[test]
fn operator_precedence() {
  let src = r#"val x = 1 + 2
var y = x * 3 - 4   # tests precedence
var z = (x + 2) * 3
val a = (y=2) or (z>=3)
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Binop PLUS
     Intlit 1
     Intlit 2
   Decl VAR y
    Binop MINUS
     Binop STAR
      Id x
      Intlit 3
     Intlit 4
   Decl VAR z
    Binop STAR
     Binop PLUS
      Id x
      Intlit 2
     Intlit 3
   Decl VAL a
    Binop OR
     Binop EQ
      Id y
      Intlit 2
     Binop GTE
      Id z
      Intlit 3
  ");
}

#[test]
fn literals() {
  let src = "val x = 123.4\nval y = 'x'\nval z = 0x1F\n";

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Reallit 123.4
   Decl VAL y
    Charlit x
   Decl VAL z
    Intlit 31
  ");
}

#[test]
fn postfix_expressions() {
  let src = "val x = a[4]\nval y = fred.age\nval z = fred(1,2,3)\n";

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Index
     Id a
     Intlit 4
   Decl VAL y
    Member age
     Id fred
   Decl VAL z
    Call
     Id fred
     Intlit 1
     Intlit 2
     Intlit 3
  ");
}

#[test]
fn unary_operators() {
  let src = "val x = -5\nval y = not x\n";

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Minus
     Intlit 5
   Decl VAL y
    Not
     Id x
  ");
}

#[test]
fn declaration_with_type() {
  let src = "val x : Int = -5\nval y : Array<String?>\n";

  assert_snapshot!(common::parse(src), @r"
  File test
   Decl VAL x
    Type Int
    Minus
     Intlit 5
   Decl VAL y
    TypeArray
     TypeNullable
      Type String
  ");
}

#[test]
fn function_definition() {
  let src = r#"fun fred(a:Int, b:Int) -> Int
    b = b + 1
    return a + b
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Function fred
    Parameter a
     Type Int
    Parameter b
     Type Int
    Type Int
    Assign
     Id b
     Binop PLUS
      Id b
      Intlit 1
    ExprStmt
     Return
      Binop PLUS
       Id a
       Id b
  ");
}

const IF_TREE: &str = "File test
 Function fred
  Parameter a
   Type Int
  Type String
  If
   IfClause
    Binop GT
     Id a
     Intlit 0
    ExprStmt
     Return
      Stringlit positive
   IfClause
    Binop LT
     Id a
     Intlit 0
    ExprStmt
     Return
      Stringlit negative
   IfClause
    ExprStmt
     Return
      Stringlit zero
";

#[test]
fn if_blocks_and_then_forms_agree() {
  let blocks = r#"fun fred(a:Int) -> String
    if a > 0
        return "positive"
    elsif a < 0
        return "negative"
    else
        return "zero"
"#;

  let mixed = r#"fun fred(a:Int) -> String
    if a > 0 then return "positive"
    elsif a < 0
        return "negative"
    else
        return "zero"
"#;

  let one_line = r#"fun fred(a:Int) -> String
    if a > 0 then return "positive"
    elsif a < 0 then return "negative"
    else return "zero"
"#;

  assert_eq!(common::parse(blocks), IF_TREE);
  assert_eq!(common::parse(mixed), IF_TREE);
  assert_eq!(common::parse(one_line), IF_TREE);
}

#[test]
fn if_with_and_or() {
  let src = r#"fun fred(a:Int, b:Int) -> String
    if a > 0 and b > 0
        return "both positive"
    elsif a < 0 or b < 0
        return "one negative"
    else
        return "mixed"
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Function fred
    Parameter a
     Type Int
    Parameter b
     Type Int
    Type String
    If
     IfClause
      Binop AND
       Binop GT
        Id a
        Intlit 0
       Binop GT
        Id b
        Intlit 0
      ExprStmt
       Return
        Stringlit both positive
     IfClause
      Binop OR
       Binop LT
        Id a
        Intlit 0
       Binop LT
        Id b
        Intlit 0
      ExprStmt
       Return
        Stringlit one negative
     IfClause
      ExprStmt
       Return
        Stringlit mixed
  ");
}

#[test]
fn while_and_repeat_loops() {
  let src = r#"fun fred(a:Int)
    var x = 0
    while x < a
        x = x + 1
    repeat
        x += 1
    until x >= a
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Function fred
    Parameter a
     Type Int
    Decl VAR x
     Intlit 0
    While
     Binop LT
      Id x
      Id a
     Assign
      Id x
      Binop PLUS
       Id x
       Intlit 1
    Repeat
     Binop GTE
      Id x
      Id a
     Assign PLUSEQ
      Id x
      Intlit 1
  ");
}

#[test]
fn for_over_exclusive_range() {
  let src = "fun main()\n    for i in 0..<10\n        print(i)\n";

  assert_snapshot!(common::parse(src), @r"
  File test
   Function main
    For i
     Range LT
      Intlit 0
      Intlit 10
     Print
      Id i
  ");
}

#[test]
fn when_clauses() {
  let src = r#"fun f(x:Int)
    when x
        1, 2 -> print("small")
        3 ->
            print("three")
        else -> print("big")
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Function f
    Parameter x
     Type Int
    When
     Id x
     WhenClause
      Intlit 1
      Intlit 2
      Print
       Stringlit small
     WhenClause
      Intlit 3
      Print
       Stringlit three
     WhenClause else
      Print
       Stringlit big
  ");
}

#[test]
fn classes_enums_and_allocation() {
  let src = r#"class Cat(val name:String, var age:Int)
    var lives = 9
    fun meow() -> String
        return name

enum Planet(val mass:Int) [MERCURY(3), VENUS(5)]
val a = new Array<Int>(10){it*2}
val b = local Array<Int>[1, 2]
val c = x as Int
val d = y is Cat
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Class Cat
    Parameter VAL name
     Type String
    Parameter VAR age
     Type Int
    Decl VAR lives
     Intlit 9
    Function meow
     Type String
     ExprStmt
      Return
       Id name
   Enum Planet
    Parameter VAL mass
     Type Int
    EnumValue MERCURY
     Intlit 3
    EnumValue VENUS
     Intlit 5
   Decl VAL a
    New
     TypeArray
      Type Int
     Intlit 10
     Lambda
      Binop STAR
       Id it
       Intlit 2
   Decl VAL b
    LocalInitialiser
     TypeArray
      Type Int
     Intlit 1
     Intlit 2
   Decl VAL c
    Cast
     Id x
     Type Int
   Decl VAL d
    Is
     Id y
     Type Cat
  ");
}

#[test]
fn consts_free_and_fixed_arrays() {
  let src = r#"const N = 4
fun f(a:FixedArray<Int>(N), b:Cat!)
    free b
"#;

  assert_snapshot!(common::parse(src), @r"
  File test
   Const N
    Intlit 4
   Function f
    Parameter a
     TypeFixedArray
      Type Int
      Id N
    Parameter b
     TypeErrorUnion
      Type Cat
    Free
     Id b
  ");
}

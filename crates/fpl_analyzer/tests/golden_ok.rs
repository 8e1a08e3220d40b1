mod common;

#[test]
fn val_assigned_once_while_uninitialized() {
  let src = "fun fred() -> Int
    val x:Int
    x = 1           # a val, but provably still unset here
    return x
";

  let expected = "top
  file: test
    function: fred()
      decl: VAR:x:Int
      assign EQ_I
        var: x (Int)
        int: 1 (Int)
      expr-stmt
        return (Nothing)
          var: x (Int)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn returning_branch_does_not_reach_the_merge() {
  let src = "fun fred(a:Int) -> Int
    val x:Int
    if (a=1)
        x = 1
        return 0
    x = 2
    return x
";

  let expected = "top
  file: test
    function: fred(Int)
      decl: VAR:x:Int
      if
        if-clause
          EQ_I (Bool)
            var: a (Int)
            int: 1 (Int)
          assign EQ_I
            var: x (Int)
            int: 1 (Int)
          expr-stmt
            return (Nothing)
              int: 0 (Int)
      assign EQ_I
        var: x (Int)
        int: 2 (Int)
      expr-stmt
        return (Nothing)
          var: x (Int)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn null_test_narrows_then_branch() {
  let src = "class Cat(val name:String, val age:Int)

fun fred(c:Cat?)
    if (c!=null)
        print(c.name)
    else
        print(\"No cat\")
";

  let expected = "top
  file: test
    class: Cat
      assign EQ_I
        member: name (String)
          var: this (Cat)
        var: name (String)
      assign EQ_I
        member: age (Int)
          var: this (Cat)
        var: age (Int)
    function: fred(Cat?)
      if
        if-clause
          NEQ_I (Bool)
            var: c (Cat?)
            int: 0 (Null)
          print
            member: name (String)
              var: c (Cat)
        if-clause
          print
            string: \"No cat\" (String)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn narrowing_survives_loop_that_never_reassigns() {
  let src = "class Box(val contents: Int)

fun main()
    var b : Box? = new Box(10)
    var count = 0
    while count<5
        print(b.contents)     # b is never reassigned in the loop
        count = count + 1
    print(\"finished: \",b.contents)
";

  let expected = "top
  file: test
    class: Box
      assign EQ_I
        member: contents (Int)
          var: this (Box)
        var: contents (Int)
    function: main()
      decl: VAR:b:Box?
        new-object (Box)
          int: 10 (Int)
      decl: VAR:count:Int
        int: 0 (Int)
      while
        LT_I (Bool)
          var: count (Int)
          int: 5 (Int)
        print
          member: contents (Int)
            var: b (Box)
        assign EQ_I
          var: count (Int)
          ADD_I (Int)
            var: count (Int)
            int: 1 (Int)
      print
        string: \"finished: \" (String)
        member: contents (Int)
          var: b (Box)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn top_level_declarations_are_globals() {
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
  assert_eq!(common::check(src), expected);
}

#[test]
fn vararg_arguments_are_packed_into_one_array() {
  let src = "fun sum(xs:Int...) -> Int
    var total = 0
    for x in xs
        total += x
    return total

fun main()
    print(sum(1, 2))
";

  let expected = "top
  file: test
    function: sum(Int...)
      decl: VAR:total:Int
        int: 0 (Int)
      for: x
        var: xs (Array<Int>)
        assign ADD_I
          var: total (Int)
          var: x (Int)
      expr-stmt
        return (Nothing)
          var: total (Int)
    function: main()
      print
        call (Int)
          function: sum ((Int...)->Int)
          local-array-literal (Array<Int>)
            int: 1 (Int)
            int: 2 (Int)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn fields_read_through_this_inside_methods() {
  let src = "class Cat(val name:String)
    fun meow()
        print(name)

fun main(c:Cat)
    c.meow()
";

  let expected = "top
  file: test
    class: Cat
      assign EQ_I
        member: name (String)
          var: this (Cat)
        var: name (String)
      function: meow()
        print
          member: name (String)
            var: this (Cat)
    function: main(Cat)
      expr-stmt
        method-call: meow (Unit)
          var: c (Cat)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn enum_values_are_typed_constants() {
  let src = "enum Color [RED, GREEN, BLUE]

fun f(c:Color) -> Int
    when c
        Color.RED -> return 1
        else -> return 2
";

  let expected = "top
  file: test
    function: f(Color)
      when
        var: c (Color)
        when-clause
          int: 0 (Color)
          expr-stmt
            return (Nothing)
              int: 1 (Int)
        when-else
          expr-stmt
            return (Nothing)
              int: 2 (Int)
";
  assert_eq!(common::check(src), expected);
}

#[test]
fn is_test_narrows_both_branches_of_an_error_union() {
  let src = "enum Failure [MISSING]

class Cat(val name:String, val age:Int)

fun find() -> Cat!
    return Failure.MISSING

fun f() -> Int
    val c = find()
    if c is Failure
        return 0
    return c.age

fun g() -> Int
    val c = find()
    if c is Cat
        return c.age
    return 1
";

  let out = common::check(src);
  assert!(!out.contains("test.fpl:"), "{}", out);
  assert!(out.contains("is: Failure (Bool)"), "{}", out);
  assert!(out.contains("is: Cat (Bool)"), "{}", out);
  assert_eq!(out.matches("unwrap (Cat)").count(), 2, "{}", out);
}

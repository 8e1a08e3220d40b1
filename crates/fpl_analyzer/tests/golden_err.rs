mod common;

#[test]
fn read_before_assignment() {
  let src = "fun fred() -> Int
    var x:Int
    return x        # x is uninitialized
";
  assert_eq!(common::check(src), "test.fpl:3.12-3.12: Symbol 'x' is uninitialized");
}

#[test]
fn val_assigned_on_some_paths_then_again() {
  let src = "fun fred(a:Int) -> Int
    val x:Int
    if (a=1)
        x = 1
    x = 2
    return x
";
  assert_eq!(common::check(src), "test.fpl:5.5-5.5: 'x' may already be initialised");
}

#[test]
fn val_reassigned() {
  let src = "fun f()
    val x = 1
    x = 2
";
  assert_eq!(common::check(src), "test.fpl:3.5-3.5: Symbol 'x' is not mutable");
}

#[test]
fn field_access_after_assigning_null() {
  let src = "class Cat(val name:String, val age:Int)

fun fred()
    var c : Cat? = new Cat(\"Fred\", 10)
    print(c.name)
    c = null
    print(c.name)
";
  assert_eq!(
    common::check(src),
    "test.fpl:7.11-7.11: Cannot access field 'name' of expression of type Null"
  );
}

#[test]
fn and_narrows_only_the_true_branch() {
  let src = r#"# Define a simple class for testing
class Cat(val name: String, val age: Int)
    fun meow()
        print(name," says meow!\n")

# Main test function
fun testComplexSmartCasting(myCat: Cat?, otherCat: Cat?, someBoolean: Bool)
    # --- Initial State ---
    # At this point, 'myCat', 'otherCat' are Cat? (MAYBE_NULL)

    print("--- Starting testComplexSmartCasting ---")

    # --- Test Case 1: AND for refining a single variable ---
    # Condition: myCat is not null AND its age is greater than 5
    if (myCat != null and myCat.age > 5)
        # Inside 'if' block: myCat is a Cat
        myCat.meow()
        print("Inside AND block: myCat is a non-null, older cat.")
    else
        # Inside 'else' block: myCat may be null
        # (either the null test failed or the age test did)
        # so this call must be rejected
        #
        myCat.meow()
        print("Inside AND block else: myCat is either null or a young cat.")

    # After 'if/else' block: the two branches merge
    # and myCat is back to Cat?
    myCat.meow()
    print("--- After AND block ---")
"#;

  let expected = "test.fpl:24.9-24.13: Cannot access 'meow' as expression may be null
test.fpl:29.5-29.9: Cannot access 'meow' as expression may be null";
  assert_eq!(common::check(src), expected);
}

#[test]
fn reassignment_inside_loop_forgets_narrowing() {
  let src = "class Box(val contents: Int)

fun main()
    var b : Box? = new Box(10)
    var count = 0
    while count<5
        print(b.contents)     # b could be null on the second iteration
        b = null
        count = count + 1
    print(\"finished: \",b.contents)
";

  let expected = "test.fpl:7.15-7.15: Cannot access 'contents' as expression may be null
test.fpl:10.24-10.24: Cannot access 'contents' as expression may be null";
  assert_eq!(common::check(src), expected);
}

#[test]
fn duplicate_when_value() {
  let src = "fun f(x:Int)
    when x
        2 -> print(1)
        2 -> print(2)
";
  assert_eq!(common::check(src), "test.fpl:4.9-4.9: Duplicate value '2'");
}

#[test]
fn else_before_other_when_clauses() {
  let src = "fun f(x:Int)
    when x
        else -> print(0)
        1 -> print(1)
";
  assert_eq!(common::check(src), "test.fpl:3.9-3.12: Else clause must be the last clause");
}

#[test]
fn vararg_call_missing_fixed_argument() {
  let src = "fun fred(a:Int, b:Int...)
    print(a)

fun main()
    fred()
";
  assert_eq!(
    common::check(src),
    "test.fpl:5.5-5.8: No functions match 'fred()'. Candidates are: fred(Int,Int...)"
  );
}

#[test]
fn freeing_twice_warns() {
  let src = "class Cat(val name:String)

fun main()
    val c = new Cat(\"Tom\")
    free c
    free c
";
  assert_eq!(common::check(src), "test.fpl:6.10-6.10: Possible double free");
}

#[test]
fn reading_a_freed_object_warns() {
  let src = "class Cat(val name:String)

fun main()
    val c = new Cat(\"Tom\")
    free c
    print(c.name)
";
  assert_eq!(common::check(src), "test.fpl:6.11-6.11: possible use of freed object");
}

#[test]
fn error_union_stays_unchecked_when_the_is_branch_falls_through() {
  let src = "enum Failure [MISSING]

class Cat(val name:String, val age:Int)

fun find() -> Cat!
    return Failure.MISSING

fun f() -> Int
    val c = find()
    if c is Failure
        print(\"missing\")
    return c.age
";
  assert_eq!(
    common::check(src),
    "test.fpl:12.12-12.12: Cannot access 'age' as expression may be an error"
  );
}

#[test]
fn failed_is_test_on_nullable_leaves_null() {
  let src = "class Cat(val name:String, val age:Int)

fun g(c:Cat?) -> Int
    if c is Cat
        return c.age
    print(c.name)
    return 0
";
  assert_eq!(
    common::check(src),
    "test.fpl:6.11-6.11: Cannot access field 'name' of expression of type Null"
  );
}

#[test]
fn for_over_int() {
  let src = "fun f(x:Int)
    for i in x
        print(i)
";
  assert_eq!(common::check(src), "test.fpl:2.14-2.14: Cannot iterate over type 'Int'");
}

#[test]
fn return_value_of_wrong_type() {
  let src = "fun f() -> String
    return 42
";
  assert_eq!(
    common::check(src),
    "test.fpl:2.12-2.13: Got type 'Int' when expecting 'String'"
  );
}

#[test]
fn undeclared_identifier() {
  let src = "fun f() -> Int
    return y
";
  assert_eq!(common::check(src), "test.fpl:2.12-2.12: Undeclared identifier 'y'");
}

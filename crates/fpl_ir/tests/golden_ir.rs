mod common;

#[test]
fn declarations_and_return() {
  let src = "fun main() -> Int
    val x = 1
    val y = 2
    return x + y
";

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
  assert_eq!(common::dump(src), expected);
}

#[test]
fn counted_loop_over_array_elements() {
  let src = "fun sum(a:Array<Int>) -> Int
    var total = 0
    for i in 0..10
        total = total + a[i]
    return total
";

  let expected = "Function /sum(Array<Int>)
start
ld a, R1
ld T0, 0
ld total, T0
ld T1, 0
ld i, T1
ld T2, 10
ld T3, T2
jmp L3
L1:
ldw T4, a[-4]
idx4 T5, i, T4
ADD_I T6, a, T5
ldw T7, T6[0]
ADD_I T8, total, T7
ld total, T8
ADD_I T9, i, 1
ld i, T9
L3:
ble i, T3, L1
jmp L2
L2:
ld R8, total
jmp L0
L0:
ret

";
  assert_eq!(common::dump(src), expected);
}

#[test]
fn heap_array_allocation_and_calls() {
  let src = "fun sum(a:Array<Int>) -> Int
    var total = 0
    for i in 0..10
        total = total + a[i]
    return total

fun main()
    val a = new Array<Int>(10)
    for i in 0..9
        a[i] = i
    print(sum(a))
";

  let dump = common::dump(src);
  let main = dump.split("Function /main()\n").nth(1).unwrap_or_default();
  let expected = "start
ld T0, 10
ld T1, 4
ld R1, T0
ld R2, T1
jsr mallocArray
ld T2, R8
ld a, T2
ld T3, 0
ld i, T3
ld T4, 9
ld T5, T4
jmp L3
L1:
ldw T6, a[-4]
idx4 T7, i, T6
ADD_I T8, a, T7
stw i, T8[0]
ADD_I T9, i, 1
ld i, T9
L3:
ble i, T5, L1
jmp L2
L2:
ld R1, a
jsr /sum(Array<Int>)
ld T10, R8
ld R1, T10
jsr printInt
L0:
ret

";
  assert_eq!(main, expected);
  assert!(dump.starts_with("Function /sum(Array<Int>)\n"));
}

#[test]
fn while_condition_branches_back_to_the_body() {
  let src = "fun count(n:Int) -> Int
    var i = 0
    while i < n
        i = i + 1
    return i
";

  let expected = "Function /count(Int)
start
ld n, R1
ld T0, 0
ld i, T0
jmp L3
L1:
ld T1, 1
ADD_I T2, i, T1
ld i, T2
L3:
blt i, n, L1
jmp L2
L2:
ld R8, i
jmp L0
L0:
ret

";
  assert_eq!(common::dump(src), expected);
}

#[test]
fn top_level_code_runs_from_top_and_uses_globals() {
  let src = "val x = 5
print(x)
";

  let expected = "Function <top>
start
ld T0, 5
stw T0, R29[0]
ldw T1, R29[0]
ld R1, T1
jsr printInt
L0:
ret

";
  assert_eq!(common::dump(src), expected);
}

#[test]
fn constructor_stores_fields_and_methods_take_this_first() {
  let src = "class Cat(val name:String, var age:Int)
    fun birthday()
        age = age + 1
";

  let expected = "Function Cat/new(String,Int)
start
ld this, R1
ld name, R2
ld age, R3
stw name, this[name]
stw age, this[age]
L0:
ret

Function Cat/birthday()
start
ld this, R1
ldw T0, this[age]
ld T1, 1
ADD_I T2, T0, T1
stw T2, this[age]
L0:
ret

";
  let program = common::lower(src).unwrap();
  assert_eq!(program.dump(), expected);
  assert_eq!(program.classes.len(), 1);
  assert_eq!(program.classes[0].name, "Cat");
  assert_eq!(program.classes[0].size, 8);
}

#[test]
fn string_literals_are_pooled() {
  let src = "fun main()
    print(\"hello\")
    print(\"hello\")
";

  let program = common::lower(src).unwrap();
  assert_eq!(program.strings.len(), 1);
  assert!(program.dump().contains("ld T0, OBJ0\nld R1, T0\njsr printString\n"));
}

#[test]
fn and_short_circuits_to_the_else_label() {
  let src = "fun both(a:Int, b:Int) -> Int
    if a > 0 and b > 0
        return 1
    return 0
";

  let dump = common::dump(src);
  assert!(dump.contains("ld T0, 0\nble a, T0, L2\nld T1, 0\nble b, T1, L2\n"), "{}", dump);
}

#[test]
fn top_is_absent_without_top_level_code() {
  let program = common::lower("fun f()\n    return\n").unwrap();
  assert_eq!(program.functions.len(), 1);
  assert_eq!(program.functions[0].name, "/f()");
}

mod common;

#[test]
fn constant_expression_folds_into_the_result_register() {
  let src = "fun main() -> Int
    val x = 1
    val y = 2
    return x + y
";

  assert_eq!(common::allocated(src).unwrap(), "Function /main()\nstart\nld R8, 3\nret\n\n");
}

#[test]
fn parameters_and_locals_share_argument_registers() {
  let src = "fun fred(a:Int, b:Int) -> Int
    val x = a+1
    val y = b-1
    return x * y

fun main() -> Int
    val x = fred(1,2)
    return x
";

  let expected = "# Generated by fplc
/fred(Int,Int):
# a = R1
# b = R2
# x = R1
# y = R2
add R1, R1, 1
sub R2, R2, 1
mul R8, R1, R2
ret

/main():
# x = R8
sub SP, SP, 4
stw R30, SP[0]
ld R1, 1
ld R2, 2
jsr /fred(Int,Int)
ldw R30, SP[0]
add SP, SP, 4
ret

";
  assert_eq!(common::assembly(src).unwrap(), expected);
}

#[test]
fn parameter_arithmetic_survives_a_constant_call_argument() {
  let src = "fun g(n:Int) -> Int
    return n

fun f(a:Int) -> Int
    val b = a * 3
    return g(7) + b
";

  let ir = common::allocated(src).unwrap();
  assert!(ir.contains("MUL_I "), "{}", ir);
  assert!(ir.contains(", 3\n"), "{}", ir);
  assert!(!ir.contains(", 21\n"), "{}", ir);
}

#[test]
fn string_literals_land_in_the_data_section() {
  let src = "fun main()
    print(\"hi\")
";

  let asm = common::assembly(src).unwrap();
  assert!(asm.contains("ld R1, OBJ0\njsr printString\n"), "{}", asm);
  assert!(asm.ends_with("dcw 2\nOBJ0: # \"hi\"\ndcw 0x00006968\n\n"), "{}", asm);
}

#[test]
fn loop_labels_are_unique_across_functions() {
  let src = "fun f(n:Int) -> Int
    var t = 0
    for i in 0..<n
        t = t + i
    return t

fun g(n:Int) -> Int
    var t = 0
    for i in 0..<n
        t = t + i
    return t
";

  let asm = common::assembly(src).unwrap();
  let labels: Vec<&str> = asm.lines().filter(|l| l.starts_with('L') && l.ends_with(':')).collect();
  let mut unique = labels.clone();
  unique.sort();
  unique.dedup();
  assert_eq!(labels.len(), unique.len(), "{}", asm);
  assert!(!labels.is_empty());
}

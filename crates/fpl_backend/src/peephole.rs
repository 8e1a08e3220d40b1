use fpl_config::{DebugTrace, FplConfig};
use fpl_ir::{Function, Instr, RegId};
use fpl_log::trace_dbg;

use crate::{BackendError, rebuild_index};

/// Constants that fit an instruction's immediate field.
const SMALL_INT: std::ops::RangeInclusive<i32> = -0xfff..=0xfff;

/// How many moves `small_int` follows before giving up.
const MAX_MOVE_CHAIN: u32 = 10;

/// Rebuilds the index and runs `peephole` until nothing changes.
pub fn peephole_fixpoint(
  config: &FplConfig,
  func: &mut Function,
) -> Result<(), BackendError> {
  loop {
    rebuild_index(func)?;
    if !peephole(config, func) {
      return Ok(());
    }
  }
}

/// One pass of local rewrites over an indexed function. Removed instructions
/// become `nop`; returns whether anything changed.
///
/// - dead moves, constants and ALU results (non-machine destination with no uses)
/// - `ld x, x`
/// - an ALU operand known to be a small constant becomes an immediate
/// - an ALU operation on two constants is folded
/// - a jump to the next instruction, and labels nothing jumps to
pub fn peephole(
  config: &FplConfig,
  func: &mut Function,
) -> bool {
  let mut changed = false;

  for index in 0..func.code.len() {
    let replacement = match &func.code[index] {
      Instr::Mov { dest, src } => (is_dead(func, *dest) || dest == src).then_some(Instr::Nop),
      Instr::MovImm { dest, .. } => is_dead(func, *dest).then_some(Instr::Nop),
      Instr::Alu { op, dest, lhs, rhs } => {
        if is_dead(func, *dest) {
          Some(Instr::Nop)
        } else if let Some(imm) = small_int(func, *rhs, 0) {
          Some(Instr::AluImm {
            op: *op,
            dest: *dest,
            lhs: *lhs,
            rhs: imm,
          })
        } else {
          match small_int(func, *lhs, 0) {
            Some(imm) if op.is_commutative() => Some(Instr::AluImm {
              op: *op,
              dest: *dest,
              lhs: *rhs,
              rhs: imm,
            }),
            _ => None,
          }
        }
      },
      Instr::AluImm { op, dest, lhs, rhs } => {
        if is_dead(func, *dest) {
          Some(Instr::Nop)
        } else {
          small_int(func, *lhs, 0)
            .and_then(|value| op.evaluate(value, *rhs))
            .map(|value| Instr::MovImm { dest: *dest, value })
        }
      },
      Instr::Jump(label) => (func.label(*label).index == Some(index + 1)).then_some(Instr::Nop),
      Instr::Label(label) => (func.label(*label).use_count == 0).then_some(Instr::Nop),
      _ => None,
    };

    if let Some(instr) = replacement {
      trace_dbg!(
        config,
        DebugTrace::Backend,
        "{}: {} -> {}",
        index,
        func.format_instr(&func.code[index]),
        func.format_instr(&instr)
      );
      func.code[index] = instr;
      changed = true;
    }
  }

  changed
}

fn is_dead(
  func: &Function,
  reg: RegId,
) -> bool {
  let reg = func.reg(reg);
  !reg.is_machine() && reg.use_count == 0
}

/// The value of `reg` when its only definition is a small constant, possibly
/// through a chain of moves. Machine registers are never followed: parameters
/// arrive in them and calls overwrite them without a recorded definition.
fn small_int(
  func: &Function,
  reg: RegId,
  depth: u32,
) -> Option<i32> {
  if depth > MAX_MOVE_CHAIN || func.reg(reg).is_machine() {
    return None;
  }
  let [def] = func.reg(reg).defs.as_slice() else {
    return None;
  };
  match func.code.get(*def)? {
    Instr::MovImm { value, .. } if SMALL_INT.contains(value) => Some(*value),
    Instr::Mov { src, .. } => small_int(func, *src, depth + 1),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use fpl_ir::reg::{REG_RESULT, arg_reg};
  use fpl_tst::AluOp;
  use fpl_type::symbol::SymbolId;

  use super::*;

  fn optimised(func: &mut Function) -> String {
    peephole_fixpoint(&FplConfig::silent(), func).unwrap();
    let mut out = String::new();
    func.dump(&mut out);
    out
  }

  #[test]
  fn constants_fold_through_variables() {
    let mut func = Function::new("/main()", true);
    func.add(Instr::Start);
    let x = func.new_scratch();
    let one = func.add_imm(1);
    func.add_mov(x, one);
    let two = func.add_imm(2);
    let sum = func.add_alu(AluOp::AddI, x, two);
    func.add_mov(REG_RESULT, sum);
    func.add(Instr::Ret { returns: true });

    assert_eq!(optimised(&mut func), "Function /main()\nstart\nld T2, 3\nld R8, T2\nret\n\n");
  }

  #[test]
  fn large_constants_stay_in_registers() {
    let mut func = Function::new("/f(Int)", true);
    func.add(Instr::Start);
    let big = func.add_imm(0x1000);
    let sum = func.add_alu(AluOp::AddI, arg_reg(0), big);
    func.add_mov(REG_RESULT, sum);
    func.add(Instr::Ret { returns: true });

    assert_eq!(
      optimised(&mut func),
      "Function /f(Int)\nstart\nld T0, 4096\nADD_I T1, R1, T0\nld R8, T1\nret\n\n"
    );
  }

  #[test]
  fn commutative_constant_moves_to_the_right() {
    let mut func = Function::new("/f(Int)", true);
    func.add(Instr::Start);
    let five = func.add_imm(5);
    let product = func.add_alu(AluOp::MulI, five, arg_reg(0));
    func.add_mov(REG_RESULT, product);
    func.add(Instr::Ret { returns: true });

    assert_eq!(
      optimised(&mut func),
      "Function /f(Int)\nstart\nMUL_I T1, R1, 5\nld R8, T1\nret\n\n"
    );
  }

  #[test]
  fn jumps_to_the_next_instruction_and_unused_labels_go() {
    let mut func = Function::new("/f()", false);
    func.add(Instr::Start);
    let ret = func.ret_label;
    func.add_jump(ret);
    func.add_label(ret);
    func.add(Instr::Ret { returns: false });

    assert_eq!(optimised(&mut func), "Function /f()\nstart\nret\n\n");
  }

  #[test]
  fn parameters_are_not_taken_from_later_argument_setup() {
    let mut func = Function::new("/f(Int)", true);
    func.add(Instr::Start);
    let a = func.var(SymbolId::new(0), "a");
    func.add_mov(a, arg_reg(0));
    let three = func.add_imm(3);
    let b = func.add_alu(AluOp::MulI, a, three);
    let seven = func.add_imm(7);
    func.add_mov(arg_reg(0), seven);
    let g = func.add_call("/g(Int)", 1, true).unwrap();
    let sum = func.add_alu(AluOp::AddI, g, b);
    func.add_mov(REG_RESULT, sum);
    func.add(Instr::Ret { returns: true });

    let out = optimised(&mut func);
    assert!(out.contains("MUL_I T1, a, 3\n"), "{}", out);
    assert!(!out.contains("21"), "{}", out);
  }

  #[test]
  fn division_by_zero_is_not_folded() {
    let mut func = Function::new("/f()", true);
    func.add(Instr::Start);
    let one = func.add_imm(1);
    let zero = func.add_imm(0);
    let quotient = func.add_alu(AluOp::DivI, one, zero);
    func.add_mov(REG_RESULT, quotient);
    func.add(Instr::Ret { returns: true });

    let out = optimised(&mut func);
    assert!(out.contains("DIV_I T2, T0, 0"), "{}", out);
  }
}

use fpl_ir::{Function, Instr, RegKind};

use crate::BackendError;

/// Drops `nop`s, then recomputes label positions, jump counts, register use
/// counts and definition sites. Fails when a temporary has two definitions.
pub fn rebuild_index(func: &mut Function) -> Result<(), BackendError> {
  func.code.retain(|instr| !matches!(instr, Instr::Nop));

  for label in &mut func.labels {
    label.index = None;
    label.use_count = 0;
  }
  for reg in &mut func.regs {
    reg.use_count = 0;
    reg.defs.clear();
  }

  for index in 0..func.code.len() {
    let (def, uses) = {
      let instr = &func.code[index];
      match instr {
        Instr::Label(label) => func.labels[label.index() as usize].index = Some(index),
        Instr::Jump(label) | Instr::Branch { label, .. } => func.labels[label.index() as usize].use_count += 1,
        _ => {},
      }
      (instr.def(), instr.uses())
    };

    if let Some(def) = def {
      let reg = &mut func.regs[def.index() as usize];
      if reg.kind == RegKind::Temp && !reg.defs.is_empty() {
        return Err(BackendError::NotSsa {
          function: func.name.clone(),
          reg: reg.name.clone(),
        });
      }
      reg.defs.push(index);
    }
    for used in uses {
      func.regs[used.index() as usize].use_count += 1;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use fpl_ir::reg::REG_RESULT;
  use fpl_tst::AluOp;

  use super::*;

  #[test]
  fn counts_uses_and_definitions() {
    let mut func = Function::new("/f()", true);
    let one = func.add_imm(1);
    let two = func.add_alu(AluOp::AddI, one, one);
    func.add_mov(REG_RESULT, two);
    func.add(Instr::Nop);
    func.add(Instr::Ret { returns: true });

    rebuild_index(&mut func).unwrap();
    assert_eq!(func.code.len(), 4);
    assert_eq!(func.reg(one).use_count, 2);
    assert_eq!(func.reg(one).defs, vec![0]);
    assert_eq!(func.reg(REG_RESULT).use_count, 1);
  }

  #[test]
  fn temporaries_must_be_single_assignment() {
    let mut func = Function::new("/f()", false);
    let t = func.add_imm(1);
    func.add(Instr::MovImm { dest: t, value: 2 });

    let err = rebuild_index(&mut func).unwrap_err();
    assert_eq!(err.to_string(), "Reg T0 is not SSA");
  }

  #[test]
  fn labels_record_position_and_jumps() {
    let mut func = Function::new("/f()", false);
    let label = func.new_label();
    func.add_jump(label);
    func.add_label(label);

    rebuild_index(&mut func).unwrap();
    assert_eq!(func.label(label).index, Some(1));
    assert_eq!(func.label(label).use_count, 1);
    assert_eq!(func.label(func.ret_label).use_count, 0);
  }
}

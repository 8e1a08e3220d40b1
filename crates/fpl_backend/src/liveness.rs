use std::collections::BTreeSet;

use fpl_ir::{Function, Instr, RegId, reg::REG_ZERO};

/// Registers live on entry to each instruction, from a backward dataflow
/// over the function's control flow. `live[code.len()]` is the empty set
/// after the last instruction.
#[derive(Debug, Clone)]
pub struct LiveMap {
  live: Vec<BTreeSet<RegId>>,
}

impl LiveMap {
  /// Labels must be indexed, as `rebuild_index` leaves them.
  pub fn build(func: &Function) -> Self {
    let count = func.code.len();
    let mut live = vec![BTreeSet::new(); count + 1];

    let mut changed = true;
    while changed {
      changed = false;
      for index in (0..count).rev() {
        let instr = &func.code[index];
        let mut set = BTreeSet::new();
        for succ in successors(func, index) {
          set.extend(live[succ].iter().copied());
        }
        if let Some(def) = instr.def() {
          set.remove(&def);
        }
        set.extend(instr.uses().into_iter().filter(|reg| *reg != REG_ZERO));

        if set != live[index] {
          live[index] = set;
          changed = true;
        }
      }
    }

    Self { live }
  }

  pub fn live_in(
    &self,
    index: usize,
  ) -> &BTreeSet<RegId> {
    &self.live[index]
  }

  /// Live after instruction `index` falls through. Only meaningful for
  /// instructions that do not jump, which is every instruction with a definition.
  pub fn live_after(
    &self,
    index: usize,
  ) -> &BTreeSet<RegId> {
    &self.live[index + 1]
  }

  pub fn dump(
    &self,
    func: &Function,
  ) -> String {
    let mut out = String::new();
    for (index, instr) in func.code.iter().enumerate() {
      let names: Vec<&str> = self.live[index].iter().map(|reg| func.reg(*reg).name.as_str()).collect();
      out.push_str(&format!("{:<24} {}\n", func.format_instr(instr), names.join(" ")));
    }
    out
  }
}

fn successors(
  func: &Function,
  index: usize,
) -> Vec<usize> {
  let target = |label| func.label(label).index;
  match &func.code[index] {
    Instr::Jump(label) => target(*label).into_iter().collect(),
    Instr::Branch { label, .. } => std::iter::once(index + 1).chain(target(*label)).collect(),
    Instr::Ret { .. } => Vec::new(),
    _ => vec![index + 1],
  }
}

#[cfg(test)]
mod tests {
  use fpl_ir::reg::{REG_RESULT, arg_reg};
  use fpl_tst::AluOp;

  use super::*;
  use crate::rebuild_index;

  #[test]
  fn values_are_live_between_definition_and_last_use() {
    let mut func = Function::new("/f(Int)", true);
    func.add(Instr::Start);
    let a = func.new_scratch();
    func.add_mov(a, arg_reg(0));
    let t = func.add_alu_imm(AluOp::AddI, a, 1);
    func.add_mov(REG_RESULT, t);
    func.add(Instr::Ret { returns: true });
    rebuild_index(&mut func).unwrap();

    let live = LiveMap::build(&func);
    assert!(live.live_in(1).contains(&arg_reg(0)));
    assert!(live.live_after(1).contains(&a));
    assert!(!live.live_after(2).contains(&a));
    assert!(live.live_after(3).contains(&REG_RESULT));
    assert!(live.live_after(4).is_empty());
  }

  #[test]
  fn loop_carried_values_stay_live_around_the_back_edge() {
    let mut func = Function::new("/f()", false);
    func.add(Instr::Start);
    let i = func.new_scratch();
    func.add(Instr::MovImm { dest: i, value: 0 });
    let top = func.new_label();
    func.add_label(top);
    let next = func.add_alu_imm(AluOp::AddI, i, 1);
    func.add_mov(i, next);
    let limit = func.add_imm(10);
    func.add_branch(AluOp::LtI, i, limit, top);
    func.add(Instr::Ret { returns: false });
    rebuild_index(&mut func).unwrap();

    let live = LiveMap::build(&func);
    // `i` is read at the top of the loop, so it is live across the branch.
    assert!(live.live_in(6).contains(&i));
    assert!(live.live_in(2).contains(&i));
    assert!(!live.live_in(7).contains(&i));
  }
}

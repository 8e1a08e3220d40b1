use std::{cmp::Reverse, collections::BTreeSet};

use fpl_config::{DebugTrace, FplConfig};
use fpl_ir::{
  Function, Instr, RegId, RegKind,
  reg::{MACHINE_REGS, REG_RESULT},
};
use fpl_log::{debug_trace_enabled, trace_dbg};

use crate::{BackendError, LiveMap};

/// R0 is zero, R29 globals, R30 the link register and R31 the stack pointer.
const ALLOCATABLE: std::ops::RangeInclusive<usize> = 1..=28;

/// Arguments and the result; any call may overwrite them.
const CALLER_SAVED: std::ops::RangeInclusive<usize> = 1..=REG_RESULT.0 as usize;

/// Binds every non-machine register of `func` to a machine register and
/// rewrites the code with them.
///
/// Registers interfere when one is written while the other is live, except
/// for the two sides of a move. Values live across a call interfere with
/// R1-R8. Moves are coalesced whenever one side already has a register;
/// the rest are coloured greedily, most constrained first.
pub fn allocate_registers(
  config: &FplConfig,
  func: &mut Function,
  live: &LiveMap,
) -> Result<(), BackendError> {
  let mut allocator = Allocator::new(func, live);
  if debug_trace_enabled(config, DebugTrace::RegAlloc) {
    eprintln!("{}", live.dump(func));
    eprintln!("{}", allocator.dump_interference(func));
  }

  // Registers the optimiser emptied of all uses and definitions need no home.
  let mut order: Vec<usize> = (MACHINE_REGS as usize..func.regs.len())
    .filter(|reg| func.regs[*reg].use_count > 0 || !func.regs[*reg].defs.is_empty())
    .collect();
  order.sort_by_key(|reg| Reverse(allocator.interfere[*reg].len()));

  allocator.coalesce(config, func);
  for reg in order {
    if allocator.alloc[reg].is_some() {
      continue;
    }
    let Some(machine) = ALLOCATABLE.clone().find(|r| !allocator.interfere[*r].contains(&reg)) else {
      return Err(BackendError::NoRegister {
        function: func.name.clone(),
        reg: func.regs[reg].name.clone(),
      });
    };
    allocator.assign(config, func, reg, machine);
    allocator.coalesce(config, func);
  }

  let alloc = allocator.alloc;
  func.code = func
    .code
    .iter()
    .map(|instr| instr.map_regs(|reg| alloc[reg.index() as usize].map_or(reg, |r| RegId::new(r as u32))))
    .collect();
  Ok(())
}

struct Allocator {
  /// Machine register bound to each register; machine registers map to themselves.
  alloc: Vec<Option<usize>>,
  interfere: Vec<BTreeSet<usize>>,
  /// `(src, dest)` of every move.
  moves: Vec<(usize, usize)>,
}

impl Allocator {
  fn new(
    func: &Function,
    live: &LiveMap,
  ) -> Self {
    let count = func.regs.len();
    let mut interfere = vec![BTreeSet::new(); count];
    let mut add = |a: usize, b: usize| {
      interfere[a].insert(b);
      interfere[b].insert(a);
    };

    for (index, instr) in func.code.iter().enumerate() {
      let after = live.live_after(index);
      if let Some(dest) = instr.def() {
        let dest = dest.index() as usize;
        let src = match instr {
          Instr::Mov { src, .. } => Some(src.index() as usize),
          _ => None,
        };
        for reg in after {
          let reg = reg.index() as usize;
          if reg != dest && Some(reg) != src {
            add(dest, reg);
          }
        }
      }

      if instr.is_call() {
        for reg in after {
          let reg = reg.index() as usize;
          for clobbered in CALLER_SAVED {
            if reg != clobbered {
              add(clobbered, reg);
            }
          }
        }
      }
    }

    let moves = func
      .code
      .iter()
      .filter_map(|instr| match instr {
        Instr::Mov { dest, src } => Some((src.index() as usize, dest.index() as usize)),
        _ => None,
      })
      .collect();

    Self {
      alloc: (0..count).map(|reg| (reg < MACHINE_REGS as usize).then_some(reg)).collect(),
      interfere,
      moves,
    }
  }

  fn assign(
    &mut self,
    config: &FplConfig,
    func: &mut Function,
    reg: usize,
    machine: usize,
  ) {
    trace_dbg!(
      config,
      DebugTrace::RegAlloc,
      "{} -> {}",
      func.regs[reg].name,
      func.regs[machine].name
    );
    if func.regs[reg].kind != RegKind::Temp {
      let comment = format!("{} = {}", func.regs[reg].name, func.regs[machine].name);
      func.reg_comments.push(comment);
    }

    self.alloc[reg] = Some(machine);
    let neighbours = self.interfere[reg].clone();
    self.interfere[machine].extend(neighbours);
    if machine as u32 > func.max_register && ALLOCATABLE.contains(&machine) {
      func.max_register = machine as u32;
    }
  }

  /// Gives the unallocated side of a move the register of the other side
  /// when that does not interfere, until a pass over the moves assigns nothing.
  fn coalesce(
    &mut self,
    config: &FplConfig,
    func: &mut Function,
  ) {
    let mut changed = true;
    while changed {
      changed = false;
      for index in 0..self.moves.len() {
        let (src, dest) = self.moves[index];
        changed |= self.coalesce_into(config, func, src, dest);
        changed |= self.coalesce_into(config, func, dest, src);
      }
    }
  }

  /// Binds `reg` to the register of `other` when `reg` has none yet.
  fn coalesce_into(
    &mut self,
    config: &FplConfig,
    func: &mut Function,
    reg: usize,
    other: usize,
  ) -> bool {
    let (None, Some(machine)) = (self.alloc[reg], self.alloc[other]) else {
      return false;
    };
    if !ALLOCATABLE.contains(&machine) || self.interfere[machine].contains(&reg) {
      return false;
    }
    self.assign(config, func, reg, machine);
    true
  }

  fn dump_interference(
    &self,
    func: &Function,
  ) -> String {
    let mut out = String::from("Interference:\n");
    for (reg, others) in self.interfere.iter().enumerate() {
      if others.is_empty() {
        continue;
      }
      let names: Vec<&str> = others.iter().map(|r| func.regs[*r].name.as_str()).collect();
      out.push_str(&format!("{} = {}\n", func.regs[reg].name, names.join(", ")));
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use fpl_ir::reg::REG_RESULT;

  use super::*;
  use crate::rebuild_index;

  fn allocate(func: &mut Function) {
    rebuild_index(func).unwrap();
    let live = LiveMap::build(func);
    allocate_registers(&FplConfig::silent(), func, &live).unwrap();
  }

  #[test]
  fn chained_moves_coalesce_back_to_front() {
    // `ld V0, T0` comes before the move that gives V0 its register.
    let mut func = Function::new("/f()", true);
    func.add(Instr::Start);
    let t = func.add_imm(5);
    let v = func.new_scratch();
    func.add_mov(v, t);
    func.add_mov(REG_RESULT, v);
    func.add(Instr::Ret { returns: true });

    allocate(&mut func);
    assert_eq!(func.code[1], Instr::MovImm { dest: REG_RESULT, value: 5 });
    assert_eq!(func.code[2], Instr::Mov { dest: REG_RESULT, src: REG_RESULT });
  }

  #[test]
  fn values_live_across_a_call_avoid_argument_registers() {
    let mut func = Function::new("/f()", true);
    func.add(Instr::Start);
    let kept = func.add_imm(4);
    func.add_call("/g()", 0, false);
    func.add_mov(REG_RESULT, kept);
    func.add(Instr::Ret { returns: true });

    allocate(&mut func);
    let Instr::MovImm { dest, .. } = func.code[1] else {
      panic!("expected a constant, got {:?}", func.code[1]);
    };
    assert!(dest.index() > REG_RESULT.index(), "{}", func.reg(dest).name);
  }
}

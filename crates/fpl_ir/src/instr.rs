use fpl_tst::AluOp;
use fpl_type::value::StaticValue;

use crate::reg::{LabelId, REG_RESULT, RegId, arg_reg};

/// Width of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemSize {
  Byte,
  Half,
  Word,
}

impl MemSize {
  /// Access size for a value of `bytes` bytes. Zero-sized values use words.
  pub fn for_bytes(bytes: u32) -> Self {
    match bytes {
      1 => MemSize::Byte,
      2 => MemSize::Half,
      _ => MemSize::Word,
    }
  }

  pub fn bytes(&self) -> i32 {
    match self {
      MemSize::Byte => 1,
      MemSize::Half => 2,
      MemSize::Word => 4,
    }
  }

  pub fn load_op(&self) -> &'static str {
    match self {
      MemSize::Byte => "ldb",
      MemSize::Half => "ldh",
      MemSize::Word => "ldw",
    }
  }

  pub fn store_op(&self) -> &'static str {
    match self {
      MemSize::Byte => "stb",
      MemSize::Half => "sth",
      MemSize::Word => "stw",
    }
  }
}

/// A class field as addressed by `ldw d, obj[name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
  pub name: String,
  pub offset: i32,
}

/// One IR instruction.
///
/// Operands are register ids into the owning `Function`; printing goes
/// through `Function::format_instr` so that registers show their names.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
  /// Placeholder for a deleted instruction; dropped by `rebuild_index`.
  Nop,
  /// Function entry.
  Start,
  Label(LabelId),
  Jump(LabelId),
  /// Jump to `label` when `lhs op rhs` holds. `op` is an integer comparison.
  Branch {
    op: AluOp,
    lhs: RegId,
    rhs: RegId,
    label: LabelId,
  },
  Mov {
    dest: RegId,
    src: RegId,
  },
  MovImm {
    dest: RegId,
    value: i32,
  },
  Alu {
    op: AluOp,
    dest: RegId,
    lhs: RegId,
    rhs: RegId,
  },
  AluImm {
    op: AluOp,
    dest: RegId,
    lhs: RegId,
    rhs: i32,
  },
  Load {
    size: MemSize,
    dest: RegId,
    addr: RegId,
    offset: i32,
  },
  Store {
    size: MemSize,
    src: RegId,
    addr: RegId,
    offset: i32,
  },
  LoadField {
    size: MemSize,
    dest: RegId,
    addr: RegId,
    field: FieldRef,
  },
  StoreField {
    size: MemSize,
    src: RegId,
    addr: RegId,
    field: FieldRef,
  },
  /// Address of static data.
  Lea {
    dest: RegId,
    value: StaticValue,
  },
  /// `jsr target` with arguments already moved into `R1..=R<args>`.
  Call {
    target: String,
    args: usize,
    returns: bool,
  },
  CallIndirect {
    target: RegId,
    args: usize,
    returns: bool,
  },
  /// `returns` marks R8 as read, so the result stays live up to the return.
  Ret {
    returns: bool,
  },
}

impl Instr {
  /// The register this instruction writes.
  pub fn def(&self) -> Option<RegId> {
    match self {
      Instr::Mov { dest, .. }
      | Instr::MovImm { dest, .. }
      | Instr::Alu { dest, .. }
      | Instr::AluImm { dest, .. }
      | Instr::Load { dest, .. }
      | Instr::LoadField { dest, .. }
      | Instr::Lea { dest, .. } => Some(*dest),
      Instr::Call { returns: true, .. } | Instr::CallIndirect { returns: true, .. } => Some(REG_RESULT),
      Instr::Nop
      | Instr::Start
      | Instr::Label(_)
      | Instr::Jump(_)
      | Instr::Branch { .. }
      | Instr::Store { .. }
      | Instr::StoreField { .. }
      | Instr::Call { .. }
      | Instr::CallIndirect { .. }
      | Instr::Ret { .. } => None,
    }
  }

  /// The registers this instruction reads.
  pub fn uses(&self) -> Vec<RegId> {
    match self {
      Instr::Alu { lhs, rhs, .. } | Instr::Branch { lhs, rhs, .. } => vec![*lhs, *rhs],
      Instr::AluImm { lhs, .. } => vec![*lhs],
      Instr::Mov { src, .. } => vec![*src],
      Instr::Load { addr, .. } | Instr::LoadField { addr, .. } => vec![*addr],
      Instr::Store { src, addr, .. } | Instr::StoreField { src, addr, .. } => vec![*src, *addr],
      Instr::Call { args, .. } => (0..*args).map(arg_reg).collect(),
      Instr::CallIndirect { target, args, .. } => {
        let mut uses: Vec<RegId> = (0..*args).map(arg_reg).collect();
        uses.push(*target);
        uses
      },
      Instr::Ret { returns: true } => vec![REG_RESULT],
      Instr::Nop
      | Instr::Start
      | Instr::Label(_)
      | Instr::Jump(_)
      | Instr::MovImm { .. }
      | Instr::Lea { .. }
      | Instr::Ret { .. } => vec![],
    }
  }

  pub fn is_call(&self) -> bool {
    matches!(self, Instr::Call { .. } | Instr::CallIndirect { .. })
  }

  /// The same instruction with every register operand passed through `map`.
  pub fn map_regs(
    &self,
    map: impl Fn(RegId) -> RegId,
  ) -> Instr {
    match self.clone() {
      Instr::Branch { op, lhs, rhs, label } => Instr::Branch {
        op,
        lhs: map(lhs),
        rhs: map(rhs),
        label,
      },
      Instr::Mov { dest, src } => Instr::Mov {
        dest: map(dest),
        src: map(src),
      },
      Instr::MovImm { dest, value } => Instr::MovImm { dest: map(dest), value },
      Instr::Alu { op, dest, lhs, rhs } => Instr::Alu {
        op,
        dest: map(dest),
        lhs: map(lhs),
        rhs: map(rhs),
      },
      Instr::AluImm { op, dest, lhs, rhs } => Instr::AluImm {
        op,
        dest: map(dest),
        lhs: map(lhs),
        rhs,
      },
      Instr::Load {
        size,
        dest,
        addr,
        offset,
      } => Instr::Load {
        size,
        dest: map(dest),
        addr: map(addr),
        offset,
      },
      Instr::Store {
        size,
        src,
        addr,
        offset,
      } => Instr::Store {
        size,
        src: map(src),
        addr: map(addr),
        offset,
      },
      Instr::LoadField {
        size,
        dest,
        addr,
        field,
      } => Instr::LoadField {
        size,
        dest: map(dest),
        addr: map(addr),
        field,
      },
      Instr::StoreField {
        size,
        src,
        addr,
        field,
      } => Instr::StoreField {
        size,
        src: map(src),
        addr: map(addr),
        field,
      },
      Instr::Lea { dest, value } => Instr::Lea { dest: map(dest), value },
      Instr::CallIndirect { target, args, returns } => Instr::CallIndirect {
        target: map(target),
        args,
        returns,
      },
      other @ (Instr::Nop
      | Instr::Start
      | Instr::Label(_)
      | Instr::Jump(_)
      | Instr::Call { .. }
      | Instr::Ret { .. }) => other,
    }
  }
}

/// Mnemonic of a conditional branch on `op`.
pub fn branch_name(op: AluOp) -> &'static str {
  match op {
    AluOp::EqI => "beq",
    AluOp::NeqI => "bne",
    AluOp::LtI => "blt",
    AluOp::LteI => "ble",
    AluOp::GtI => "bgt",
    AluOp::GteI => "bge",
    _ => "b?",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn calls_read_argument_registers_and_write_the_result() {
    let call = Instr::Call {
      target: "printInt".to_string(),
      args: 2,
      returns: true,
    };
    assert_eq!(call.uses(), vec![RegId::new(1), RegId::new(2)]);
    assert_eq!(call.def(), Some(REG_RESULT));

    let void = Instr::Call {
      target: "free".to_string(),
      args: 1,
      returns: false,
    };
    assert_eq!(void.def(), None);
  }

  #[test]
  fn map_regs_leaves_immediates_alone() {
    let instr = Instr::AluImm {
      op: AluOp::AddI,
      dest: RegId::new(40),
      lhs: RegId::new(41),
      rhs: 7,
    };
    let mapped = instr.map_regs(|r| RegId::new(r.index() - 30));
    assert_eq!(
      mapped,
      Instr::AluImm {
        op: AluOp::AddI,
        dest: RegId::new(10),
        lhs: RegId::new(11),
        rhs: 7,
      }
    );
  }
}

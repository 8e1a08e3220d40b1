use std::collections::HashMap;

use fpl_tst::AluOp;
use fpl_type::{symbol::SymbolId, value::StaticValue};

use crate::{
  instr::{FieldRef, Instr, MemSize, branch_name},
  reg::{Label, LabelId, MACHINE_REGS, REG_RESULT, Reg, RegId, RegKind},
};

/// The code of one function, method or constructor, with its registers and labels.
#[derive(Debug, Clone)]
pub struct Function {
  /// Assembly label, e.g. `/fred(Int,Int)`.
  pub name: String,
  pub code: Vec<Instr>,
  /// Machine registers first, so a register id below 32 is its own physical register.
  pub regs: Vec<Reg>,
  pub labels: Vec<Label>,
  pub vars: HashMap<SymbolId, RegId>,
  /// `L0`, placed just before `ret`.
  pub ret_label: LabelId,
  pub returns_value: bool,
  /// Bytes of stack used by `local` allocations.
  pub stack_size: u32,
  /// `x = R1` lines, one per allocated variable register.
  pub reg_comments: Vec<String>,
  /// Highest general purpose register used after allocation.
  pub max_register: u32,
  temp_count: u32,
  scratch_count: u32,
}

impl Function {
  pub fn new(
    name: impl Into<String>,
    returns_value: bool,
  ) -> Self {
    let mut func = Self {
      name: name.into(),
      code: Vec::new(),
      regs: (0..MACHINE_REGS).map(Reg::machine).collect(),
      labels: Vec::new(),
      vars: HashMap::new(),
      ret_label: LabelId::new(0),
      returns_value,
      stack_size: 0,
      reg_comments: Vec::new(),
      max_register: 0,
      temp_count: 0,
      scratch_count: 0,
    };
    func.ret_label = func.new_label();
    func
  }

  // #region Registers and labels

  pub fn reg(
    &self,
    id: RegId,
  ) -> &Reg {
    &self.regs[id.index() as usize]
  }

  pub fn reg_mut(
    &mut self,
    id: RegId,
  ) -> &mut Reg {
    &mut self.regs[id.index() as usize]
  }

  pub fn label(
    &self,
    id: LabelId,
  ) -> &Label {
    &self.labels[id.index() as usize]
  }

  pub fn label_mut(
    &mut self,
    id: LabelId,
  ) -> &mut Label {
    &mut self.labels[id.index() as usize]
  }

  fn add_reg(
    &mut self,
    reg: Reg,
  ) -> RegId {
    let id = RegId::new(self.regs.len() as u32);
    self.regs.push(reg);
    id
  }

  pub fn new_temp(&mut self) -> RegId {
    let name = format!("T{}", self.temp_count);
    self.temp_count += 1;
    self.add_reg(Reg::new(name, RegKind::Temp))
  }

  /// The register holding the variable `symbol`, created on first use.
  pub fn var(
    &mut self,
    symbol: SymbolId,
    name: &str,
  ) -> RegId {
    if let Some(&reg) = self.vars.get(&symbol) {
      return reg;
    }
    let reg = self.add_reg(Reg::new(name, RegKind::Var));
    self.vars.insert(symbol, reg);
    reg
  }

  /// A variable register with no source name, for values written on more
  /// than one path such as the result of `a and b`.
  pub fn new_scratch(&mut self) -> RegId {
    let name = format!("V{}", self.scratch_count);
    self.scratch_count += 1;
    self.add_reg(Reg::new(name, RegKind::Var))
  }

  pub fn new_label(&mut self) -> LabelId {
    let id = LabelId::new(self.labels.len() as u32);
    self.labels.push(Label::new(format!("L{}", self.labels.len())));
    id
  }

  /// Reserves `bytes` of stack frame and returns the offset from SP.
  pub fn alloc_stack(
    &mut self,
    bytes: u32,
  ) -> i32 {
    let offset = self.stack_size;
    self.stack_size += (bytes + 3) & !3;
    offset as i32
  }

  // #endregion Registers and labels

  // #region Emission

  pub fn add(
    &mut self,
    instr: Instr,
  ) {
    self.code.push(instr);
  }

  pub fn add_alu(
    &mut self,
    op: AluOp,
    lhs: RegId,
    rhs: RegId,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::Alu { op, dest, lhs, rhs });
    dest
  }

  pub fn add_alu_imm(
    &mut self,
    op: AluOp,
    lhs: RegId,
    rhs: i32,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::AluImm { op, dest, lhs, rhs });
    dest
  }

  pub fn add_mov(
    &mut self,
    dest: RegId,
    src: RegId,
  ) {
    self.add(Instr::Mov { dest, src });
  }

  /// Copies `src` into a fresh temporary.
  pub fn add_copy(
    &mut self,
    src: RegId,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::Mov { dest, src });
    dest
  }

  pub fn add_imm(
    &mut self,
    value: i32,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::MovImm { dest, value });
    dest
  }

  pub fn add_lea(
    &mut self,
    value: StaticValue,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::Lea { dest, value });
    dest
  }

  pub fn add_load(
    &mut self,
    size: MemSize,
    addr: RegId,
    offset: i32,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::Load {
      size,
      dest,
      addr,
      offset,
    });
    dest
  }

  pub fn add_store(
    &mut self,
    size: MemSize,
    src: RegId,
    addr: RegId,
    offset: i32,
  ) {
    self.add(Instr::Store {
      size,
      src,
      addr,
      offset,
    });
  }

  pub fn add_load_field(
    &mut self,
    size: MemSize,
    addr: RegId,
    field: FieldRef,
  ) -> RegId {
    let dest = self.new_temp();
    self.add(Instr::LoadField {
      size,
      dest,
      addr,
      field,
    });
    dest
  }

  pub fn add_label(
    &mut self,
    label: LabelId,
  ) {
    self.add(Instr::Label(label));
  }

  pub fn add_jump(
    &mut self,
    label: LabelId,
  ) {
    self.add(Instr::Jump(label));
  }

  pub fn add_branch(
    &mut self,
    op: AluOp,
    lhs: RegId,
    rhs: RegId,
    label: LabelId,
  ) {
    self.add(Instr::Branch { op, lhs, rhs, label });
  }

  /// Calls `target` and copies its result out of R8, if it has one.
  pub fn add_call(
    &mut self,
    target: impl Into<String>,
    args: usize,
    returns: bool,
  ) -> Option<RegId> {
    self.add(Instr::Call {
      target: target.into(),
      args,
      returns,
    });
    returns.then(|| self.add_copy(REG_RESULT))
  }

  // #endregion Emission

  // #region Dump

  fn reg_name(
    &self,
    id: RegId,
  ) -> &str {
    &self.reg(id).name
  }

  fn label_name(
    &self,
    id: LabelId,
  ) -> &str {
    &self.label(id).name
  }

  pub fn format_instr(
    &self,
    instr: &Instr,
  ) -> String {
    match instr {
      Instr::Nop => "nop".to_string(),
      Instr::Start => "start".to_string(),
      Instr::Label(label) => format!("{}:", self.label_name(*label)),
      Instr::Jump(label) => format!("jmp {}", self.label_name(*label)),
      Instr::Branch { op, lhs, rhs, label } => format!(
        "{} {}, {}, {}",
        branch_name(*op),
        self.reg_name(*lhs),
        self.reg_name(*rhs),
        self.label_name(*label)
      ),
      Instr::Mov { dest, src } => format!("ld {}, {}", self.reg_name(*dest), self.reg_name(*src)),
      Instr::MovImm { dest, value } => format!("ld {}, {}", self.reg_name(*dest), value),
      Instr::Alu { op, dest, lhs, rhs } => format!(
        "{} {}, {}, {}",
        op,
        self.reg_name(*dest),
        self.reg_name(*lhs),
        self.reg_name(*rhs)
      ),
      Instr::AluImm { op, dest, lhs, rhs } => {
        format!("{} {}, {}, {}", op, self.reg_name(*dest), self.reg_name(*lhs), rhs)
      },
      Instr::Load {
        size,
        dest,
        addr,
        offset,
      } => format!(
        "{} {}, {}[{}]",
        size.load_op(),
        self.reg_name(*dest),
        self.reg_name(*addr),
        offset
      ),
      Instr::Store {
        size,
        src,
        addr,
        offset,
      } => format!(
        "{} {}, {}[{}]",
        size.store_op(),
        self.reg_name(*src),
        self.reg_name(*addr),
        offset
      ),
      Instr::LoadField {
        size,
        dest,
        addr,
        field,
      } => format!(
        "{} {}, {}[{}]",
        size.load_op(),
        self.reg_name(*dest),
        self.reg_name(*addr),
        field.name
      ),
      Instr::StoreField {
        size,
        src,
        addr,
        field,
      } => format!(
        "{} {}, {}[{}]",
        size.store_op(),
        self.reg_name(*src),
        self.reg_name(*addr),
        field.name
      ),
      Instr::Lea { dest, value } => format!("ld {}, {}", self.reg_name(*dest), value),
      Instr::Call { target, .. } => format!("jsr {}", target),
      Instr::CallIndirect { target, .. } => format!("jsr {}", self.reg_name(*target)),
      Instr::Ret { .. } => "ret".to_string(),
    }
  }

  /// `Function <name>`, one line per instruction, then a blank line.
  pub fn dump(
    &self,
    out: &mut String,
  ) {
    out.push_str("Function ");
    out.push_str(&self.name);
    out.push('\n');
    for instr in &self.code {
      out.push_str(&self.format_instr(instr));
      out.push('\n');
    }
    out.push('\n');
  }

  // #endregion Dump
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reg::arg_reg;

  #[test]
  fn machine_registers_come_first() {
    let mut func = Function::new("/f()", false);
    assert_eq!(func.reg(RegId::new(31)).name, "SP");
    assert_eq!(func.reg(RegId::new(0)).name, "0");

    let t = func.new_temp();
    assert_eq!(t.index(), 32);
    assert_eq!(func.reg(t).name, "T0");
    assert_eq!(func.label(func.ret_label).name, "L0");
  }

  #[test]
  fn dump_names_registers() {
    let mut func = Function::new("/f(Int)", true);
    func.add(Instr::Start);
    let a = func.var(SymbolId::new(3), "a");
    func.add_mov(a, arg_reg(0));
    let t = func.add_alu_imm(AluOp::AddI, a, 1);
    func.add_mov(REG_RESULT, t);
    let ret = func.ret_label;
    func.add_label(ret);
    func.add(Instr::Ret { returns: true });

    let mut out = String::new();
    func.dump(&mut out);
    assert_eq!(
      out,
      "Function /f(Int)\nstart\nld a, R1\nADD_I T0, a, 1\nld R8, T0\nL0:\nret\n\n"
    );
  }

  #[test]
  fn stack_slots_are_word_aligned() {
    let mut func = Function::new("/f()", false);
    assert_eq!(func.alloc_stack(5), 0);
    assert_eq!(func.alloc_stack(4), 8);
    assert_eq!(func.stack_size, 12);
  }
}

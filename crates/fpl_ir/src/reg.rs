use fpl_type::Id;

pub type RegId = Id<Reg>;
pub type LabelId = Id<Label>;

/// Number of physical registers. Register ids below this are bound to themselves.
pub const MACHINE_REGS: u32 = 32;

pub const REG_ZERO: RegId = RegId::new(0);
/// Return value, and the last argument register.
pub const REG_RESULT: RegId = RegId::new(8);
/// Base address of the globals area.
pub const REG_GLOBALS: RegId = RegId::new(29);
/// Return address, written by `jsr`.
pub const REG_LINK: RegId = RegId::new(30);
pub const REG_SP: RegId = RegId::new(31);

/// Argument `index` (0-based) is passed in `R(index+1)`.
pub fn arg_reg(index: usize) -> RegId {
  RegId::new(index as u32 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegKind {
  /// A physical register.
  Machine,
  /// Compiler temporary. Defined by exactly one instruction.
  Temp,
  /// One per source variable; may be assigned any number of times.
  Var,
}

#[derive(Debug, Clone)]
pub struct Reg {
  pub name: String,
  pub kind: RegKind,
  /// Recomputed by `Function::rebuild_index`.
  pub use_count: u32,
  /// Positions of the instructions writing this register, recomputed with `use_count`.
  pub defs: Vec<usize>,
}

impl Reg {
  pub fn new(
    name: impl Into<String>,
    kind: RegKind,
  ) -> Self {
    Self {
      name: name.into(),
      kind,
      use_count: 0,
      defs: Vec::new(),
    }
  }

  pub fn machine(index: u32) -> Self {
    let name = match index {
      0 => "0".to_string(),
      31 => "SP".to_string(),
      n => format!("R{}", n),
    };
    Self::new(name, RegKind::Machine)
  }

  pub fn is_machine(&self) -> bool {
    self.kind == RegKind::Machine
  }
}

#[derive(Debug, Clone)]
pub struct Label {
  pub name: String,
  /// Position of the label's own instruction after `rebuild_index`.
  pub index: Option<usize>,
  /// Number of jumps and branches targeting the label.
  pub use_count: u32,
}

impl Label {
  pub fn new(name: String) -> Self {
    Self {
      name,
      index: None,
      use_count: 0,
    }
  }
}

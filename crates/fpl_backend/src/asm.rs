use fpl_ir::{Function, Instr, IrProgram, TableEntry, instr::branch_name};
use fpl_tst::AluOp;

/// F32 assembly for an allocated program: one block per function followed
/// by the static data it references.
pub fn emit_assembly(program: &IrProgram) -> String {
  AsmEmitter::new(program).emit()
}

/// Stack frame of a function that calls others, uses callee-saved registers
/// or allocates locals. Locals sit at `SP[0..locals)`, then the link
/// register, then R9 upwards.
struct Frame {
  size: u32,
  locals: u32,
  saved: Vec<u32>,
}

impl Frame {
  fn for_function(func: &Function) -> Option<Self> {
    let saved: Vec<u32> = (9..=func.max_register).collect();
    let calls = func.code.iter().any(Instr::is_call);
    if !calls && func.stack_size == 0 && saved.is_empty() {
      return None;
    }
    Some(Self {
      size: func.stack_size + 4 + 4 * saved.len() as u32,
      locals: func.stack_size,
      saved,
    })
  }

  fn slot(
    &self,
    index: usize,
  ) -> u32 {
    self.locals + 4 + 4 * index as u32
  }
}

struct AsmEmitter<'a> {
  program: &'a IrProgram,
  output: String,
  /// Labels are numbered per function in the IR; this keeps them unique in the output.
  label_base: usize,
}

impl<'a> AsmEmitter<'a> {
  fn new(program: &'a IrProgram) -> Self {
    Self {
      program,
      output: String::new(),
      label_base: 0,
    }
  }

  fn emit(mut self) -> String {
    self.line("# Generated by fplc");
    let program = self.program;
    for func in &program.functions {
      self.emit_function(func);
    }
    self.emit_data();
    self.output
  }

  fn line(
    &mut self,
    text: &str,
  ) {
    self.output.push_str(text);
    self.output.push('\n');
  }

  fn emit_function(
    &mut self,
    func: &Function,
  ) {
    self.line(&format!("{}:", func.name));
    for comment in &func.reg_comments {
      self.line(&format!("# {}", comment));
    }

    let frame = Frame::for_function(func);
    for instr in &func.code {
      match instr {
        Instr::Nop => {},
        Instr::Start => {
          if let Some(frame) = &frame {
            self.prologue(frame);
          }
        },
        Instr::Ret { .. } => {
          if let Some(frame) = &frame {
            self.epilogue(frame);
          }
          self.line("ret");
        },
        _ => {
          let text = self.format_instr(func, instr);
          self.line(&text);
        },
      }
    }
    self.line("");
    self.label_base += func.labels.len();
  }

  fn prologue(
    &mut self,
    frame: &Frame,
  ) {
    self.line(&format!("sub SP, SP, {}", frame.size));
    self.line(&format!("stw R30, SP[{}]", frame.locals));
    for (index, reg) in frame.saved.iter().enumerate() {
      self.line(&format!("stw R{}, SP[{}]", reg, frame.slot(index)));
    }
  }

  fn epilogue(
    &mut self,
    frame: &Frame,
  ) {
    for (index, reg) in frame.saved.iter().enumerate().rev() {
      self.line(&format!("ldw R{}, SP[{}]", reg, frame.slot(index)));
    }
    self.line(&format!("ldw R30, SP[{}]", frame.locals));
    self.line(&format!("add SP, SP, {}", frame.size));
  }

  fn label(
    &self,
    label: fpl_ir::LabelId,
  ) -> String {
    format!("L{}", self.label_base + label.index() as usize)
  }

  fn format_instr(
    &self,
    func: &Function,
    instr: &Instr,
  ) -> String {
    let reg = |r: &fpl_ir::RegId| func.reg(*r).name.as_str();
    match instr {
      Instr::Label(label) => format!("{}:", self.label(*label)),
      Instr::Jump(label) => format!("jmp {}", self.label(*label)),
      Instr::Branch { op, lhs, rhs, label } => {
        format!("{} {}, {}, {}", branch_name(*op), reg(lhs), reg(rhs), self.label(*label))
      },
      Instr::Mov { dest, src } => format!("ld {}, {}", reg(dest), reg(src)),
      Instr::MovImm { dest, value } => format!("ld {}, {}", reg(dest), value),
      Instr::Alu { op, dest, lhs, rhs } => format!("{} {}, {}, {}", mnemonic(*op), reg(dest), reg(lhs), reg(rhs)),
      Instr::AluImm { op, dest, lhs, rhs } => format!("{} {}, {}, {}", mnemonic(*op), reg(dest), reg(lhs), rhs),
      Instr::Load {
        size,
        dest,
        addr,
        offset,
      } => format!("{} {}, {}[{}]", size.load_op(), reg(dest), reg(addr), offset),
      Instr::Store {
        size,
        src,
        addr,
        offset,
      } => format!("{} {}, {}[{}]", size.store_op(), reg(src), reg(addr), offset),
      Instr::LoadField {
        size,
        dest,
        addr,
        field,
      } => format!("{} {}, {}[{}]", size.load_op(), reg(dest), reg(addr), field.offset),
      Instr::StoreField {
        size,
        src,
        addr,
        field,
      } => format!("{} {}, {}[{}]", size.store_op(), reg(src), reg(addr), field.offset),
      Instr::Lea { dest, value } => format!("ld {}, {}", reg(dest), value),
      Instr::Call { target, .. } => format!("jsr {}", target),
      Instr::CallIndirect { target, .. } => format!("jsr {}", reg(target)),
      Instr::Nop | Instr::Start | Instr::Ret { .. } => func.format_instr(instr),
    }
  }

  // #region Data

  fn emit_data(&mut self) {
    let program = self.program;
    for (index, text) in program.strings.iter() {
      self.line(&format!("dcw {}", text.len()));
      self.line(&format!("OBJ{}: # {:?}", index, text));
      for word in pack_words(text.as_bytes()) {
        self.line(&format!("dcw 0x{:08x}", word));
      }
      self.line("");
    }

    for class in &program.classes {
      self.line(&format!("{}/class:", class.name));
      self.line(&format!("dcw {}", class.size));
      self.line("");
    }

    for table in &program.enum_tables {
      self.line(&format!("{}:", table.label));
      for entry in &table.entries {
        match entry {
          TableEntry::Int(value) => self.line(&format!("dcw {}", value)),
          TableEntry::String(index) => self.line(&format!("dcw OBJ{}", index)),
        }
      }
      self.line("");
    }
  }

  // #endregion Data
}

/// Little-endian words, the last one zero padded.
fn pack_words(bytes: &[u8]) -> Vec<u32> {
  bytes
    .chunks(4)
    .map(|chunk| {
      chunk
        .iter()
        .enumerate()
        .fold(0u32, |word, (i, byte)| word | (u32::from(*byte) << (8 * i)))
    })
    .collect()
}

/// Assembly name of an ALU operation. Comparisons set the destination to 0 or 1.
fn mnemonic(op: AluOp) -> &'static str {
  match op {
    AluOp::AddI => "add",
    AluOp::SubI => "sub",
    AluOp::MulI => "mul",
    AluOp::DivI => "divs",
    AluOp::ModI => "mods",
    AluOp::AndI => "and",
    AluOp::OrI => "or",
    AluOp::XorI => "xor",
    AluOp::ShlI => "lsl",
    AluOp::ShrI => "asr",
    AluOp::EqI | AluOp::EqS => "ceq",
    AluOp::NeqI | AluOp::NeqS => "cne",
    AluOp::LtI | AluOp::LtS => "clt",
    AluOp::LteI | AluOp::LteS => "cle",
    AluOp::GtI | AluOp::GtS => "cgt",
    AluOp::GteI | AluOp::GteS => "cge",
    AluOp::AddR => "addf",
    AluOp::SubR => "subf",
    AluOp::MulR => "mulf",
    AluOp::DivR => "divf",
    AluOp::ModR => "modf",
    AluOp::EqR => "ceqf",
    AluOp::NeqR => "cnef",
    AluOp::LtR => "cltf",
    AluOp::LteR => "clef",
    AluOp::GtR => "cgtf",
    AluOp::GteR => "cgef",
    AluOp::Idx1 => "idx1",
    AluOp::Idx4 => "idx4",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strings_pack_little_endian() {
    assert_eq!(pack_words(b"hello"), vec![0x6c6c6568, 0x6f]);
    assert!(pack_words(b"").is_empty());
  }

  #[test]
  fn data_section_lists_strings_and_classes() {
    let mut program = IrProgram::new();
    program.strings.intern("hi");
    program.classes.push(fpl_ir::ClassDescriptor {
      name: "Cat".to_string(),
      size: 8,
    });

    assert_eq!(
      emit_assembly(&program),
      "# Generated by fplc\ndcw 2\nOBJ0: # \"hi\"\ndcw 0x00006968\n\nCat/class:\ndcw 8\n\n"
    );
  }
}

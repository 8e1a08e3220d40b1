//! Typed tree to IR.
//!
//! Every function, method and constructor becomes one `Function`; top-level
//! statements go into the `<top>` function. Expressions produce exactly one
//! register, temporaries are defined once, and control flow is spelled out
//! with labels, jumps and branches.

mod expr;
mod stmt;

use std::mem;

use fpl_config::{DebugTrace, FplConfig};
use fpl_log::{log_dbg, trace_dbg};
use fpl_tst::{Tst, TstId, TstKind};
use fpl_type::{
  function::{FunctionId, FunctionStore},
  symbol::{SymbolId, SymbolStore},
  types::{ClassId, EnumId, TypeStore},
};

use crate::{
  function::Function,
  instr::Instr,
  program::{ClassDescriptor, EnumTable, IrProgram, TableEntry},
  reg::{LabelId, RegId, arg_reg},
};

/// Entry points of the runtime library.
pub mod runtime {
  pub const PRINT_INT: &str = "printInt";
  pub const PRINT_CHAR: &str = "printChar";
  pub const PRINT_STRING: &str = "printString";
  pub const PRINT_BOOL: &str = "printBool";
  pub const MALLOC_ARRAY: &str = "mallocArray";
  pub const MALLOC_OBJECT: &str = "mallocObject";
  pub const FREE: &str = "free";
  pub const STRCMP: &str = "strcmp";
}

/// The checked program, as handed over by the analyzer.
#[derive(Clone, Copy)]
pub struct LoweringInput<'a> {
  pub tst: &'a Tst,
  pub types: &'a TypeStore,
  pub symbols: &'a SymbolStore,
  pub functions: &'a FunctionStore,
  pub top_function: Option<FunctionId>,
  pub globals_size: u32,
}

/// Jump targets of the innermost loop. The continue label of a counted loop
/// is only created when the body contains a `continue`.
#[derive(Debug, Clone)]
struct LoopLabels {
  break_label: LabelId,
  continue_label: Option<LabelId>,
}

pub fn lower_program(
  config: &FplConfig,
  input: LoweringInput<'_>,
) -> IrProgram {
  let mut ctx = LoweringContext::new(config, input);
  ctx.lower_root();
  log_dbg!(config, "generated {} functions", ctx.program.functions.len());
  ctx.program
}

struct LoweringContext<'a> {
  config: &'a FplConfig,
  tst: &'a Tst,
  types: &'a TypeStore,
  symbols: &'a SymbolStore,
  functions: &'a FunctionStore,
  top_function: Option<FunctionId>,

  program: IrProgram,
  func: Function,
  loops: Vec<LoopLabels>,
}

impl<'a> LoweringContext<'a> {
  fn new(
    config: &'a FplConfig,
    input: LoweringInput<'a>,
  ) -> Self {
    let mut program = IrProgram::new();
    program.globals_size = input.globals_size;

    Self {
      config,
      tst: input.tst,
      types: input.types,
      symbols: input.symbols,
      functions: input.functions,
      top_function: input.top_function,
      program,
      func: Function::new("<top>", false),
      loops: Vec::new(),
    }
  }

  /// Declarations are lowered as they are met; everything else in a file
  /// goes into `<top>`, which is placed first.
  fn lower_root(&mut self) {
    let Some(root) = self.tst.root else {
      return;
    };

    if let Some(top) = self.top_function {
      self.func = Function::new(self.functions.get(&top).qualified.clone(), false);
      self.func.add(Instr::Start);
    }

    self.lower_stmt(root);

    if self.top_function.is_some() {
      self.finish_current();
      let top = mem::replace(&mut self.func, Function::new("<top>", false));
      self.program.functions.insert(0, top);
    }
  }

  fn finish_current(&mut self) {
    let ret = self.func.ret_label;
    let returns = self.func.returns_value;
    self.func.add_label(ret);
    self.func.add(Instr::Ret { returns });
  }

  /// `start`, parameters out of the argument registers (`this` first), the
  /// body, then the shared return label.
  fn lower_function(
    &mut self,
    id: FunctionId,
    body: &[TstId],
  ) {
    let def = self.functions.get(&id);
    trace_dbg!(self.config, DebugTrace::Codegen, "lowering {}", def.qualified);

    let func = Function::new(def.qualified.clone(), def.returns_value(self.types));
    let outer = mem::replace(&mut self.func, func);
    let outer_loops = mem::take(&mut self.loops);

    self.func.add(Instr::Start);
    let params = def.this_symbol.into_iter().chain(def.params.iter().copied());
    for (index, param) in params.enumerate() {
      let reg = self.var_reg(param);
      self.func.add_mov(reg, arg_reg(index));
    }

    self.lower_block(body);
    self.finish_current();

    let done = mem::replace(&mut self.func, outer);
    self.loops = outer_loops;
    self.program.functions.push(done);
  }

  fn lower_class(
    &mut self,
    class: ClassId,
    constructor: FunctionId,
    body: &[TstId],
    methods: &[TstId],
  ) {
    self.class_descriptor(class);
    self.lower_function(constructor, body);
    for method in methods {
      if let TstKind::Function { function, body } = self.tst.kind(*method) {
        self.lower_function(*function, body);
      }
    }
  }

  fn var_reg(
    &mut self,
    symbol: SymbolId,
  ) -> RegId {
    let name = &self.symbols.get(&symbol).name;
    self.func.var(symbol, name)
  }

  // #region Static data

  /// Records `Name/class` and returns its name.
  fn class_descriptor(
    &mut self,
    class: ClassId,
  ) -> String {
    let def = self.types.class(&class);
    if !self.program.classes.iter().any(|c| c.name == def.name) {
      self.program.classes.push(ClassDescriptor {
        name: def.name.clone(),
        size: def.size,
      });
    }
    def.name.clone()
  }

  /// Records the `Enum/column` table and returns its enum and column names.
  fn enum_table(
    &mut self,
    enum_id: EnumId,
    column: usize,
  ) -> (String, String) {
    let def = self.types.enum_def(&enum_id);
    let Some(col) = def.columns.get(column) else {
      return (def.name.clone(), String::new());
    };

    let label = format!("{}/{}", def.name, col.name);
    if !self.program.enum_tables.iter().any(|t| t.label == label) {
      let entries = col
        .values
        .iter()
        .map(|value| match value {
          fpl_type::value::ConstValue::Int { value, .. } => TableEntry::Int(*value),
          fpl_type::value::ConstValue::Real(r) => TableEntry::Int(r.into_inner().to_bits() as i32),
          fpl_type::value::ConstValue::String(s) => TableEntry::String(self.program.strings.intern(s)),
        })
        .collect();
      self.program.enum_tables.push(EnumTable { label, entries });
    }
    (def.name.clone(), col.name.clone())
  }

  // #endregion Static data
}

use fpl_config::DebugTrace;
use fpl_log::trace_dbg;
use fpl_tst::{AluOp, TstId, TstKind};
use fpl_type::{
  symbol::{SIZE_FIELD_OFFSET, SymbolId, SymbolKind},
  types::Type,
};

use crate::{
  instr::{FieldRef, Instr, MemSize},
  lowering::{LoopLabels, LoweringContext, runtime},
  reg::{REG_RESULT, REG_ZERO, RegId, arg_reg},
};

impl<'a> LoweringContext<'a> {
  pub(super) fn lower_block(
    &mut self,
    body: &[TstId],
  ) {
    for stmt in body {
      self.lower_stmt(*stmt);
    }
  }

  pub(super) fn lower_stmt(
    &mut self,
    id: TstId,
  ) {
    let tst = self.tst;
    match tst.kind(id) {
      TstKind::Top(files) => self.lower_block(files),
      TstKind::File { name, body } => {
        trace_dbg!(self.config, DebugTrace::Codegen, "file {}", name);
        self.lower_block(body);
      },
      TstKind::Function { function, body } => self.lower_function(*function, body),
      TstKind::Class {
        class,
        constructor,
        body,
        methods,
      } => self.lower_class(*class, *constructor, body, methods),

      TstKind::ExpressionStatement(expr) => {
        self.rvalue(*expr);
      },
      TstKind::Null => {},
      TstKind::Declaration { symbol, value } => {
        if let Some(value) = value {
          let reg = self.rvalue(*value);
          self.write_symbol(*symbol, reg);
        }
      },
      TstKind::Assign { op, target, value } => self.lower_assign(*op, *target, *value),
      TstKind::Print(args) => self.lower_print(args),
      TstKind::Free(value) => {
        let reg = self.rvalue(*value);
        self.func.add_mov(arg_reg(0), reg);
        self.func.add_call(runtime::FREE, 1, false);
      },

      TstKind::Return(value) => {
        if let Some(value) = value {
          let reg = self.rvalue(*value);
          self.func.add_mov(REG_RESULT, reg);
        }
        let ret = self.func.ret_label;
        self.func.add_jump(ret);
      },
      TstKind::Break => {
        if let Some(target) = self.loops.last().map(|l| l.break_label) {
          self.func.add_jump(target);
        }
      },
      TstKind::Continue => {
        if let Some(target) = self.continue_label() {
          self.func.add_jump(target);
        }
      },

      TstKind::If(clauses) => self.lower_if(clauses),
      TstKind::While { condition, body } => self.lower_while(*condition, body),
      TstKind::Repeat { condition, body } => self.lower_repeat(*condition, body),
      TstKind::For {
        variable,
        iterable,
        body,
      } => self.lower_for(*variable, *iterable, body),
      TstKind::When { subject, clauses } => self.lower_when(*subject, clauses),

      _ => {
        self.rvalue(id);
      },
    }
  }

  /// Writes `value` to a variable or global.
  pub(super) fn write_symbol(
    &mut self,
    symbol: SymbolId,
    value: RegId,
  ) {
    let sym = self.symbols.get(&symbol);
    match sym.kind {
      SymbolKind::Global { offset } => {
        let size = MemSize::for_bytes(self.types.size_in_bytes(&sym.ty));
        self.func.add_store(size, value, crate::reg::REG_GLOBALS, offset as i32);
      },
      _ => {
        let reg = self.var_reg(symbol);
        self.func.add_mov(reg, value);
      },
    }
  }

  fn lower_assign(
    &mut self,
    op: AluOp,
    target: TstId,
    value: TstId,
  ) {
    if op == AluOp::EqI {
      let value = self.rvalue(value);
      let place = self.place(target);
      self.write_place(&place, value);
      return;
    }

    let place = self.place(target);
    let current = self.read_place(&place);
    let value = self.rvalue(value);
    let result = self.func.add_alu(op, current, value);
    self.write_place(&place, result);
  }

  fn lower_print(
    &mut self,
    args: &[TstId],
  ) {
    for arg in args {
      let routine = match self.types.get(&self.tst.ty(*arg)) {
        Type::Int | Type::Enum(_) => runtime::PRINT_INT,
        Type::Char => runtime::PRINT_CHAR,
        Type::String => runtime::PRINT_STRING,
        Type::Bool => runtime::PRINT_BOOL,
        _ => continue,
      };
      let reg = self.rvalue(*arg);
      self.func.add_mov(arg_reg(0), reg);
      self.func.add_call(routine, 1, false);
    }
  }

  // #region Control flow

  fn lower_if(
    &mut self,
    clauses: &[TstId],
  ) {
    let tst = self.tst;
    let end = self.func.new_label();

    for clause in clauses {
      let TstKind::IfClause { condition, body } = tst.kind(*clause) else {
        continue;
      };
      match condition {
        Some(condition) => {
          let next = self.func.new_label();
          self.branch(*condition, next, false);
          self.lower_block(body);
          self.func.add_jump(end);
          self.func.add_label(next);
        },
        None => self.lower_block(body),
      }
    }

    self.func.add_label(end);
  }

  fn lower_while(
    &mut self,
    condition: TstId,
    body: &[TstId],
  ) {
    let body_label = self.func.new_label();
    let end_label = self.func.new_label();
    let cond_label = self.func.new_label();

    self.func.add_jump(cond_label);
    self.func.add_label(body_label);
    self.with_loop(end_label, Some(cond_label), |ctx| ctx.lower_block(body));
    self.func.add_label(cond_label);
    self.branch(condition, body_label, true);
    self.func.add_jump(end_label);
    self.func.add_label(end_label);
  }

  fn lower_repeat(
    &mut self,
    condition: TstId,
    body: &[TstId],
  ) {
    let body_label = self.func.new_label();
    let end_label = self.func.new_label();
    let cond_label = self.func.new_label();

    self.func.add_label(body_label);
    self.with_loop(end_label, Some(cond_label), |ctx| ctx.lower_block(body));
    self.func.add_label(cond_label);
    self.branch(condition, body_label, false);
    self.func.add_label(end_label);
  }

  /// Runs `lower` with the given loop labels innermost and returns the
  /// continue label, which `continue` may have created on demand.
  fn with_loop(
    &mut self,
    break_label: crate::reg::LabelId,
    continue_label: Option<crate::reg::LabelId>,
    lower: impl FnOnce(&mut Self),
  ) -> Option<crate::reg::LabelId> {
    self.loops.push(LoopLabels {
      break_label,
      continue_label,
    });
    lower(self);
    self.loops.pop().and_then(|l| l.continue_label)
  }

  fn continue_label(&mut self) -> Option<crate::reg::LabelId> {
    let existing = self.loops.last()?.continue_label;
    if existing.is_some() {
      return existing;
    }
    let label = self.func.new_label();
    if let Some(frame) = self.loops.last_mut() {
      frame.continue_label = Some(label);
    }
    Some(label)
  }

  fn lower_for(
    &mut self,
    variable: SymbolId,
    iterable: TstId,
    body: &[TstId],
  ) {
    let tst = self.tst;
    if let TstKind::Range { start, end, op } = tst.kind(iterable) {
      self.lower_for_range(variable, *start, *end, *op, body);
      return;
    }

    let ty = tst.ty(iterable);
    match self.types.get(&ty) {
      Type::Class { class, .. } => self.lower_for_class(variable, iterable, *class, body),
      _ => self.lower_for_array(variable, iterable, body),
    }
  }

  /// `for i in a..b`: the bound is evaluated once and the variable stepped by one.
  fn lower_for_range(
    &mut self,
    variable: SymbolId,
    start: TstId,
    end: TstId,
    op: AluOp,
    body: &[TstId],
  ) {
    let var = self.var_reg(variable);
    let start = self.rvalue(start);
    self.func.add_mov(var, start);
    let end = self.rvalue(end);
    let limit = self.func.add_copy(end);

    let step = match op {
      AluOp::GtI | AluOp::GteI => -1,
      _ => 1,
    };
    self.counted_loop(var, limit, op, |ctx| ctx.lower_block(body), |ctx| {
      let next = ctx.func.add_alu_imm(AluOp::AddI, var, step);
      ctx.func.add_mov(var, next);
    });
  }

  /// Arrays, inline arrays and strings: a hidden index runs up to the size
  /// and the variable is loaded from the element at the top of each pass.
  fn lower_for_array(
    &mut self,
    variable: SymbolId,
    iterable: TstId,
    body: &[TstId],
  ) {
    let ty = self.tst.ty(iterable);
    let Some(element) = self.types.element_type(&ty) else {
      return;
    };
    let element_size = self.types.size_in_bytes(&element);

    let array = self.rvalue(iterable);
    let size = match self.types.get(&ty) {
      Type::InlineArray { count, .. } => self.func.add_imm(*count as i32),
      _ => self.func.add_load(MemSize::Word, array, SIZE_FIELD_OFFSET),
    };
    let index = self.func.new_scratch();
    self.func.add(Instr::MovImm { dest: index, value: 0 });
    let var = self.var_reg(variable);

    self.counted_loop(
      index,
      size,
      AluOp::LtI,
      |ctx| {
        let offset = ctx.func.add_alu(AluOp::index_for_size(element_size), index, size);
        let addr = ctx.func.add_alu(AluOp::AddI, array, offset);
        let value = ctx.func.add_load(MemSize::for_bytes(element_size), addr, 0);
        ctx.func.add_mov(var, value);
        ctx.lower_block(body);
      },
      |ctx| {
        let next = ctx.func.add_alu_imm(AluOp::AddI, index, 1);
        ctx.func.add_mov(index, next);
      },
    );
  }

  /// A class with an Int `size` field and a `get(Int)` method.
  fn lower_for_class(
    &mut self,
    variable: SymbolId,
    iterable: TstId,
    class: fpl_type::types::ClassId,
    body: &[TstId],
  ) {
    let def = self.types.class(&class);
    let size_field = def.members.get("size").map(|s| self.symbols.get(s));
    let getter = def.members.get("get").and_then(|s| match &self.symbols.get(s).kind {
      SymbolKind::Function { overloads } => overloads.first().map(|o| o.function),
      _ => None,
    });
    let (Some(size_field), Some(getter)) = (size_field, getter) else {
      return;
    };
    let SymbolKind::Field { offset, .. } = size_field.kind else {
      return;
    };
    let field = FieldRef {
      name: size_field.name.clone(),
      offset,
    };
    let get_name = self.functions.get(&getter).qualified.clone();

    let object = self.rvalue(iterable);
    let size = self.func.add_load_field(MemSize::Word, object, field);
    let index = self.func.new_scratch();
    self.func.add(Instr::MovImm { dest: index, value: 0 });
    let var = self.var_reg(variable);

    self.counted_loop(
      index,
      size,
      AluOp::LtI,
      |ctx| {
        let value = ctx.call_value(&get_name, &[object, index], true);
        ctx.func.add_mov(var, value);
        ctx.lower_block(body);
      },
      |ctx| {
        let next = ctx.func.add_alu_imm(AluOp::AddI, index, 1);
        ctx.func.add_mov(index, next);
      },
    );
  }

  /// `jmp cond`, `body:`, body, continue label if used, step, `cond:`,
  /// `b<op> counter, limit, body`, `jmp end`, `end:`.
  fn counted_loop(
    &mut self,
    counter: RegId,
    limit: RegId,
    op: AluOp,
    body: impl FnOnce(&mut Self),
    step: impl FnOnce(&mut Self),
  ) {
    let body_label = self.func.new_label();
    let end_label = self.func.new_label();
    let cond_label = self.func.new_label();

    self.func.add_jump(cond_label);
    self.func.add_label(body_label);
    if let Some(continue_label) = self.with_loop(end_label, None, body) {
      self.func.add_label(continue_label);
    }
    step(self);
    self.func.add_label(cond_label);
    self.func.add_branch(op, counter, limit, body_label);
    self.func.add_jump(end_label);
    self.func.add_label(end_label);
  }

  /// Each clause tests its values in order and falls through to the next
  /// clause when none match. The `else` clause runs unconditionally.
  fn lower_when(
    &mut self,
    subject: TstId,
    clauses: &[TstId],
  ) {
    let tst = self.tst;
    let is_string = matches!(self.types.get(&tst.ty(subject)), Type::String);
    let subject = self.rvalue(subject);
    let end = self.func.new_label();

    for clause in clauses {
      let TstKind::WhenClause { values, body } = tst.kind(*clause) else {
        continue;
      };
      if values.is_empty() {
        self.lower_block(body);
        self.func.add_jump(end);
        continue;
      }

      let body_label = self.func.new_label();
      let next = self.func.new_label();
      for value in values {
        let value = self.rvalue(*value);
        if is_string {
          let cmp = self.call_value(runtime::STRCMP, &[subject, value], true);
          self.func.add_branch(AluOp::EqI, cmp, REG_ZERO, body_label);
        } else {
          self.func.add_branch(AluOp::EqI, subject, value, body_label);
        }
      }
      self.func.add_jump(next);
      self.func.add_label(body_label);
      self.lower_block(body);
      self.func.add_jump(end);
      self.func.add_label(next);
    }

    self.func.add_label(end);
  }

  // #endregion Control flow
}

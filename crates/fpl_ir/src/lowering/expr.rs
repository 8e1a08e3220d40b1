use fpl_tst::{AluOp, TstId, TstKind, TstLambda};
use fpl_type::{
  symbol::SymbolKind,
  types::{ClassId, Type, TypeId},
  value::StaticValue,
};

use crate::{
  instr::{FieldRef, Instr, MemSize},
  lowering::{LoweringContext, runtime},
  reg::{LabelId, REG_GLOBALS, REG_RESULT, REG_SP, REG_ZERO, RegId, arg_reg},
};

/// Error values of a `T!` are the words below this.
const ERROR_LIMIT: i32 = 0x1000;

/// Where an lvalue lives.
#[derive(Debug, Clone)]
pub(super) enum Place {
  Reg(RegId),
  Memory { size: MemSize, addr: RegId, offset: i32 },
  Field { size: MemSize, addr: RegId, field: FieldRef },
}

impl<'a> LoweringContext<'a> {
  fn mem_size(
    &self,
    ty: TypeId,
  ) -> MemSize {
    MemSize::for_bytes(self.types.size_in_bytes(&ty))
  }

  /// Evaluates `id` into a register. Statements met in expression position
  /// are lowered for their effect and give R0.
  pub(super) fn rvalue(
    &mut self,
    id: TstId,
  ) -> RegId {
    let tst = self.tst;
    let ty = tst.ty(id);
    match tst.kind(id) {
      TstKind::IntLit(value) => self.func.add_imm(*value),
      TstKind::RealLit(value) => self.func.add_imm((*value as f32).to_bits() as i32),
      TstKind::StringLit(value) => {
        let index = self.program.strings.intern(value);
        self.func.add_lea(StaticValue::String(index))
      },
      TstKind::Variable(symbol) => self.var_reg(*symbol),
      TstKind::Global(_) | TstKind::Index { .. } | TstKind::Member { .. } => {
        let place = self.place(id);
        self.read_place(&place)
      },
      TstKind::FunctionName { function, .. } => {
        let name = self.functions.get(function).qualified.clone();
        self.func.add_lea(StaticValue::Function(name))
      },

      TstKind::Binary { op, left, right } => match op.string_to_int() {
        Some(int_op) => {
          let cmp = self.strcmp(*left, *right);
          self.func.add_alu(int_op, cmp, REG_ZERO)
        },
        None => {
          let left = self.rvalue(*left);
          let right = self.rvalue(*right);
          self.func.add_alu(*op, left, right)
        },
      },
      TstKind::And { .. } | TstKind::Or { .. } | TstKind::Is { .. } => self.bool_value(id),
      TstKind::Not(operand) => {
        let operand = self.rvalue(*operand);
        self.func.add_alu_imm(AluOp::XorI, operand, 1)
      },
      TstKind::Minus(operand) => {
        let op = match self.types.get(&ty) {
          Type::Real => AluOp::SubR,
          _ => AluOp::SubI,
        };
        let operand = self.rvalue(*operand);
        self.func.add_alu(op, REG_ZERO, operand)
      },
      TstKind::EnumData {
        value,
        enum_id,
        column,
      } => {
        let (enum_name, column) = self.enum_table(*enum_id, *column);
        let table = self.func.add_lea(StaticValue::EnumTable { enum_name, column });
        let value = self.rvalue(*value);
        let offset = self.func.add_alu_imm(AluOp::MulI, value, 4);
        let addr = self.func.add_alu(AluOp::AddI, table, offset);
        self.func.add_load(MemSize::Word, addr, 0)
      },
      TstKind::IfExpr {
        condition,
        then_branch,
        else_branch,
      } => {
        let result = self.func.new_scratch();
        let else_label = self.func.new_label();
        let end_label = self.func.new_label();
        self.branch(*condition, else_label, false);
        let value = self.rvalue(*then_branch);
        self.func.add_mov(result, value);
        self.func.add_jump(end_label);
        self.func.add_label(else_label);
        let value = self.rvalue(*else_branch);
        self.func.add_mov(result, value);
        self.func.add_label(end_label);
        result
      },

      TstKind::Call { callee, args } => match tst.kind(*callee) {
        TstKind::FunctionName { function, .. } => {
          let def = self.functions.get(function);
          let name = def.qualified.clone();
          let returns = def.returns_value(self.types);
          let args = self.rvalues(args);
          self.call_value(&name, &args, returns)
        },
        _ => self.call_indirect(*callee, args, ty),
      },
      TstKind::MethodCall {
        receiver,
        function,
        args,
      } => {
        let def = self.functions.get(function);
        let name = def.qualified.clone();
        let returns = def.returns_value(self.types);
        let mut regs = vec![self.rvalue(*receiver)];
        regs.extend(self.rvalues(args));
        self.call_value(&name, &regs, returns)
      },
      TstKind::CallIndirect { callee, args } => self.call_indirect(*callee, args, ty),

      TstKind::NewObject {
        class,
        constructor,
        args,
        local,
      } => self.new_object(*class, *constructor, args, *local),
      TstKind::NewArray { size, lambda, local } => self.new_array(ty, *size, lambda.as_ref(), *local),
      TstKind::ArrayLiteral { elements, local } => self.array_literal(ty, elements, *local),

      TstKind::Cast(inner) | TstKind::MakeUnion(inner) | TstKind::Unwrap(inner) => self.rvalue(*inner),
      TstKind::Range { .. } | TstKind::Error(_) => REG_ZERO,

      TstKind::Return(_)
      | TstKind::Break
      | TstKind::Continue
      | TstKind::ExpressionStatement(_)
      | TstKind::Assign { .. }
      | TstKind::Declaration { .. }
      | TstKind::Free(_)
      | TstKind::Print(_)
      | TstKind::Null
      | TstKind::If(_)
      | TstKind::IfClause { .. }
      | TstKind::While { .. }
      | TstKind::Repeat { .. }
      | TstKind::For { .. }
      | TstKind::When { .. }
      | TstKind::WhenClause { .. }
      | TstKind::Function { .. }
      | TstKind::Class { .. }
      | TstKind::File { .. }
      | TstKind::Top(_) => {
        self.lower_stmt(id);
        REG_ZERO
      },
    }
  }

  fn rvalues(
    &mut self,
    ids: &[TstId],
  ) -> Vec<RegId> {
    ids.iter().map(|id| self.rvalue(*id)).collect()
  }

  // #region Places

  pub(super) fn place(
    &mut self,
    id: TstId,
  ) -> Place {
    let tst = self.tst;
    let size = self.mem_size(tst.ty(id));
    match tst.kind(id) {
      TstKind::Variable(symbol) => Place::Reg(self.var_reg(*symbol)),
      TstKind::Global(symbol) => match self.symbols.get(symbol).kind {
        SymbolKind::Global { offset } => Place::Memory {
          size,
          addr: REG_GLOBALS,
          offset: offset as i32,
        },
        _ => Place::Reg(self.var_reg(*symbol)),
      },
      TstKind::Index { array, index } => {
        let addr = self.element_address(*array, *index);
        Place::Memory { size, addr, offset: 0 }
      },
      TstKind::Member { object, field } => {
        let sym = self.symbols.get(field);
        let name = sym.name.clone();
        let kind = sym.kind.clone();
        let addr = self.rvalue(*object);
        match kind {
          SymbolKind::Field { class: None, offset } => Place::Memory { size, addr, offset },
          SymbolKind::Field { offset, .. } => Place::Field {
            size,
            addr,
            field: FieldRef { name, offset },
          },
          SymbolKind::InlineField { offset, .. } => Place::Reg(self.func.add_alu_imm(AluOp::AddI, addr, offset)),
          _ => Place::Reg(REG_ZERO),
        }
      },
      _ => Place::Reg(self.rvalue(id)),
    }
  }

  pub(super) fn read_place(
    &mut self,
    place: &Place,
  ) -> RegId {
    match place {
      Place::Reg(reg) => *reg,
      Place::Memory { size, addr, offset } => self.func.add_load(*size, *addr, *offset),
      Place::Field { size, addr, field } => self.func.add_load_field(*size, *addr, field.clone()),
    }
  }

  pub(super) fn write_place(
    &mut self,
    place: &Place,
    value: RegId,
  ) {
    match place {
      Place::Reg(reg) => self.func.add_mov(*reg, value),
      Place::Memory { size, addr, offset } => self.func.add_store(*size, value, *addr, *offset),
      Place::Field { size, addr, field } => self.func.add(Instr::StoreField {
        size: *size,
        src: value,
        addr: *addr,
        field: field.clone(),
      }),
    }
  }

  /// Bounds-checked address of `array[index]`. The size is read from the
  /// word before the first element, or known for inline arrays.
  fn element_address(
    &mut self,
    array: TstId,
    index: TstId,
  ) -> RegId {
    let array_ty = self.tst.ty(array);
    let element_size = self
      .types
      .element_type(&array_ty)
      .map(|e| self.types.size_in_bytes(&e))
      .unwrap_or(4);

    let base = self.rvalue(array);
    let index = self.rvalue(index);
    let size = match self.types.get(&array_ty) {
      Type::InlineArray { count, .. } => self.func.add_imm(*count as i32),
      _ => self.func.add_load(MemSize::Word, base, fpl_type::symbol::SIZE_FIELD_OFFSET),
    };
    let offset = self.func.add_alu(AluOp::index_for_size(element_size), index, size);
    self.func.add_alu(AluOp::AddI, base, offset)
  }

  // #endregion Places

  // #region Calls

  /// Moves `args` into R1.. and calls `target`; the result, or R0.
  pub(super) fn call_value(
    &mut self,
    target: &str,
    args: &[RegId],
    returns: bool,
  ) -> RegId {
    for (index, arg) in args.iter().enumerate() {
      self.func.add_mov(arg_reg(index), *arg);
    }
    self.func.add_call(target, args.len(), returns).unwrap_or(REG_ZERO)
  }

  fn call_indirect(
    &mut self,
    callee: TstId,
    args: &[TstId],
    ty: TypeId,
  ) -> RegId {
    let returns = fpl_type::function::returns_value(self.types, &ty);
    let target = self.rvalue(callee);
    let args = self.rvalues(args);
    for (index, arg) in args.iter().enumerate() {
      self.func.add_mov(arg_reg(index), *arg);
    }
    self.func.add(Instr::CallIndirect {
      target,
      args: args.len(),
      returns,
    });
    if returns { self.func.add_copy(REG_RESULT) } else { REG_ZERO }
  }

  fn strcmp(
    &mut self,
    left: TstId,
    right: TstId,
  ) -> RegId {
    let left = self.rvalue(left);
    let right = self.rvalue(right);
    self.call_value(runtime::STRCMP, &[left, right], true)
  }

  // #endregion Calls

  // #region Allocation

  /// Reserves `bytes` plus a header word on the stack and returns the
  /// address just past the header.
  fn stack_block(
    &mut self,
    bytes: u32,
  ) -> RegId {
    let offset = self.func.alloc_stack(bytes + 4);
    self.func.add_alu_imm(AluOp::AddI, REG_SP, offset + 4)
  }

  fn new_object(
    &mut self,
    class: ClassId,
    constructor: Option<fpl_type::function::FunctionId>,
    args: &[TstId],
    local: bool,
  ) -> RegId {
    let args = self.rvalues(args);
    let name = self.class_descriptor(class);

    let object = if local {
      let size = self.types.class(&class).size;
      let object = self.stack_block(size);
      let descriptor = self.func.add_lea(StaticValue::ClassDescriptor(name));
      self.func.add_store(MemSize::Word, descriptor, object, -4);
      object
    } else {
      let descriptor = self.func.add_lea(StaticValue::ClassDescriptor(name));
      self.call_value(runtime::MALLOC_OBJECT, &[descriptor], true)
    };

    if let Some(constructor) = constructor {
      let target = self.functions.get(&constructor).qualified.clone();
      let mut regs = vec![object];
      regs.extend(args);
      self.call_value(&target, &regs, false);
    }
    object
  }

  fn element_size(
    &self,
    array_ty: TypeId,
  ) -> u32 {
    self
      .types
      .element_type(&array_ty)
      .map(|e| self.types.size_in_bytes(&e))
      .unwrap_or(4)
      .max(1)
  }

  /// Heap arrays come from `mallocArray(count, element size)`; local ones
  /// with a constant size live in the frame with the count in their header.
  fn allocate_array(
    &mut self,
    count: RegId,
    constant: Option<i32>,
    element_size: u32,
    local: bool,
  ) -> RegId {
    match constant {
      Some(n) if local && n >= 0 => {
        let array = self.stack_block(n as u32 * element_size);
        self.func.add_store(MemSize::Word, count, array, -4);
        array
      },
      _ => {
        let element_size = self.func.add_imm(element_size as i32);
        self.call_value(runtime::MALLOC_ARRAY, &[count, element_size], true)
      },
    }
  }

  fn new_array(
    &mut self,
    ty: TypeId,
    size: TstId,
    lambda: Option<&TstLambda>,
    local: bool,
  ) -> RegId {
    let element_size = self.element_size(ty);
    let constant = match self.tst.kind(size) {
      TstKind::IntLit(n) => Some(*n),
      _ => None,
    };
    let count = self.rvalue(size);
    let array = self.allocate_array(count, constant, element_size, local);

    if let Some(lambda) = lambda {
      self.fill_array(array, count, element_size, lambda);
    }
    array
  }

  /// `it` counts from 0 while each element is set to the lambda's value.
  fn fill_array(
    &mut self,
    array: RegId,
    count: RegId,
    element_size: u32,
    lambda: &TstLambda,
  ) {
    let it = self.var_reg(lambda.it);
    self.func.add(Instr::MovImm { dest: it, value: 0 });
    let body_label = self.func.new_label();
    let cond_label = self.func.new_label();

    self.func.add_jump(cond_label);
    self.func.add_label(body_label);
    let value = self.rvalue(lambda.body);
    let offset = self.func.add_alu_imm(AluOp::MulI, it, element_size as i32);
    let addr = self.func.add_alu(AluOp::AddI, array, offset);
    self.func.add_store(MemSize::for_bytes(element_size), value, addr, 0);
    let next = self.func.add_alu_imm(AluOp::AddI, it, 1);
    self.func.add_mov(it, next);
    self.func.add_label(cond_label);
    self.func.add_branch(AluOp::LtI, it, count, body_label);
  }

  fn array_literal(
    &mut self,
    ty: TypeId,
    elements: &[TstId],
    local: bool,
  ) -> RegId {
    let element_size = self.element_size(ty);
    let values = self.rvalues(elements);
    let count = self.func.add_imm(values.len() as i32);
    let array = self.allocate_array(count, Some(values.len() as i32), element_size, local);

    let size = MemSize::for_bytes(element_size);
    for (index, value) in values.into_iter().enumerate() {
      self.func.add_store(size, value, array, index as i32 * element_size as i32);
    }
    array
  }

  // #endregion Allocation

  // #region Conditions

  /// A Bool in a register, for conditions used as values.
  fn bool_value(
    &mut self,
    id: TstId,
  ) -> RegId {
    let result = self.func.new_scratch();
    let skip = self.func.new_label();
    self.func.add(Instr::MovImm { dest: result, value: 0 });
    self.branch(id, skip, false);
    self.func.add(Instr::MovImm { dest: result, value: 1 });
    self.func.add_label(skip);
    result
  }

  /// Jumps to `label` when `cond` evaluates to `when`, falls through otherwise.
  pub(super) fn branch(
    &mut self,
    cond: TstId,
    label: LabelId,
    when: bool,
  ) {
    let tst = self.tst;
    match tst.kind(cond) {
      TstKind::Binary { op, left, right } if op.inverse().is_some() => {
        let left = self.rvalue(*left);
        let right = self.rvalue(*right);
        self.branch_on(*op, left, right, label, when);
      },
      TstKind::Binary { op, left, right } => match op.string_to_int() {
        Some(int_op) => {
          let cmp = self.strcmp(*left, *right);
          self.branch_on(int_op, cmp, REG_ZERO, label, when);
        },
        None => self.branch_value(cond, label, when),
      },
      TstKind::And { left, right } => {
        if when {
          let skip = self.func.new_label();
          self.branch(*left, skip, false);
          self.branch(*right, label, true);
          self.func.add_label(skip);
        } else {
          self.branch(*left, label, false);
          self.branch(*right, label, false);
        }
      },
      TstKind::Or { left, right } => {
        if when {
          self.branch(*left, label, true);
          self.branch(*right, label, true);
        } else {
          let skip = self.func.new_label();
          self.branch(*left, skip, true);
          self.branch(*right, label, false);
          self.func.add_label(skip);
        }
      },
      TstKind::Not(operand) => self.branch(*operand, label, !when),
      TstKind::IntLit(value) => {
        if (*value != 0) == when {
          self.func.add_jump(label);
        }
      },
      TstKind::Is { expression, target } => self.branch_is(*expression, *target, label, when),
      _ => self.branch_value(cond, label, when),
    }
  }

  fn branch_value(
    &mut self,
    cond: TstId,
    label: LabelId,
    when: bool,
  ) {
    let value = self.rvalue(cond);
    self.branch_on(AluOp::NeqI, value, REG_ZERO, label, when);
  }

  fn branch_on(
    &mut self,
    op: AluOp,
    left: RegId,
    right: RegId,
    label: LabelId,
    when: bool,
  ) {
    let op = if when { op } else { op.inverse().unwrap_or(op) };
    self.func.add_branch(op, left, right, label);
  }

  /// `x is T` on an error union compares against the error range, on a
  /// nullable against null, and on `Any` checks the class descriptor.
  fn branch_is(
    &mut self,
    expression: TstId,
    target: TypeId,
    label: LabelId,
    when: bool,
  ) {
    let ty = self.tst.ty(expression);
    let value = self.rvalue(expression);

    match (self.types.get(&ty), self.types.get(&target)) {
      (Type::ErrorUnion(_), target_ty) => {
        let limit = self.func.add_imm(ERROR_LIMIT);
        let op = match target_ty {
          Type::Enum(_) => AluOp::LtI,
          _ => AluOp::GteI,
        };
        self.branch_on(op, value, limit, label, when);
      },
      (Type::Any, Type::Class { class, .. }) => {
        let name = self.class_descriptor(*class);
        let descriptor_of = |ctx: &mut Self| {
          let actual = ctx.func.add_load(MemSize::Word, value, -4);
          let expected = ctx.func.add_lea(StaticValue::ClassDescriptor(name));
          (actual, expected)
        };
        if when {
          let skip = self.func.new_label();
          self.func.add_branch(AluOp::EqI, value, REG_ZERO, skip);
          let (actual, expected) = descriptor_of(self);
          self.func.add_branch(AluOp::EqI, actual, expected, label);
          self.func.add_label(skip);
        } else {
          self.func.add_branch(AluOp::EqI, value, REG_ZERO, label);
          let (actual, expected) = descriptor_of(self);
          self.func.add_branch(AluOp::NeqI, actual, expected, label);
        }
      },
      _ => self.branch_on(AluOp::NeqI, value, REG_ZERO, label, when),
    }
  }

  // #endregion Conditions
}

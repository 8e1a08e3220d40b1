use fpl_ast::{
  ExprId,
  expressions::{
    ASTBinary, ASTBinaryOperator, ASTCall, ASTExpression, ASTLiteralValue, ASTMember, ASTNew, ASTNewInitialiser,
    ASTRangeOperator, ASTUnaryOperator,
  },
  type_::FplTypeSyntax,
};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_tst::{AluOp, TstId, TstKind, TstLambda};
use fpl_type::{
  function::{FunctionInstance, returns_value},
  span::Span,
  symbol::{Symbol, SymbolId, SymbolKind},
  types::{Substitution, Type, TypeId},
  value::ConstValue,
};

use crate::{
  Analyzer, ScopeKind,
  overload::{Resolution, call_description, infer_substitution, resolve_overload},
  path_context::merge,
  typeck::CheckContext,
};

impl<'a> Analyzer<'a> {
  pub(crate) fn check_expr(
    &mut self,
    id: ExprId,
    ctx: &mut CheckContext,
  ) -> TstId {
    let ast = self.ast;
    match ast.expr(&id) {
      ASTExpression::Literal { value, span } => self.check_literal(value, span),
      ASTExpression::Identifier { name, span } => self.check_identifier(name, span, false),
      ASTExpression::Binary(binary) => match binary.operator {
        ASTBinaryOperator::And | ASTBinaryOperator::Or => self.check_bool_value(id, ctx),
        _ => {
          let left = self.check_expr(binary.left, ctx);
          let right = self.check_expr(binary.right, ctx);
          self.binary_node(binary, left, right)
        },
      },
      ASTExpression::Unary {
        operator: ASTUnaryOperator::Not,
        ..
      }
      | ASTExpression::Is { .. } => self.check_bool_value(id, ctx),
      ASTExpression::Unary {
        operator: ASTUnaryOperator::Minus,
        operand,
        span,
      } => self.check_minus(*operand, span, ctx),
      ASTExpression::Index { object, index, span } => self.check_index(*object, *index, span, ctx),
      ASTExpression::Member(member) => self.check_member(member, ctx),
      ASTExpression::Call(call) => self.check_call(call, ctx),
      ASTExpression::Range { span, .. } => self.error_node(DiagnosticMessage::RangeOutsideFor(span.clone())),
      ASTExpression::Cast {
        expression,
        target,
        span,
      } => self.check_cast(*expression, target, span, ctx),
      ASTExpression::IfExpr {
        condition,
        then_branch,
        else_branch,
        span,
      } => self.check_if_expr(*condition, *then_branch, *else_branch, span, ctx),
      ASTExpression::New(new) => self.check_new(new, ctx),
      ASTExpression::NewInitialiser(new) => self.check_new_initialiser(new, ctx),
      ASTExpression::Lambda { body, .. } => self.check_expr(*body, ctx),
      ASTExpression::Return { value, span } => self.check_return(*value, span, ctx),
      ASTExpression::Break(span) => self.check_jump(span, true, ctx),
      ASTExpression::Continue(span) => self.check_jump(span, false, ctx),
    }
  }

  /// Conditions used as plain values: the true and false paths join again.
  fn check_bool_value(
    &mut self,
    id: ExprId,
    ctx: &mut CheckContext,
  ) -> TstId {
    let (node, on_true, on_false) = self.check_bool(id, ctx);
    self.path = merge(&[on_true, on_false]);
    node
  }

  fn check_literal(
    &mut self,
    value: &ASTLiteralValue,
    span: &Span,
  ) -> TstId {
    match value {
      ASTLiteralValue::Int(value) => {
        let ty = self.types.int();
        self.alloc_node(TstKind::IntLit(*value), span, ty)
      },
      ASTLiteralValue::Real(value) => {
        let ty = self.types.real();
        self.alloc_node(TstKind::RealLit(*value), span, ty)
      },
      ASTLiteralValue::Char(value) => {
        let ty = self.types.char();
        self.alloc_node(TstKind::IntLit(*value as i32), span, ty)
      },
      ASTLiteralValue::String(value) => {
        let ty = self.types.string();
        self.alloc_node(TstKind::StringLit(value.clone()), span, ty)
      },
    }
  }

  // #region Names

  /// `skip_freed` is set for the operand of `free`, which reports double frees itself.
  pub(crate) fn check_identifier(
    &mut self,
    name: &str,
    span: &Span,
    skip_freed: bool,
  ) -> TstId {
    let Some(symbol) = self.scopes.lookup(name) else {
      return self.error_node(DiagnosticMessage::UndeclaredIdentifier {
        name: name.to_string(),
        span: span.clone(),
      });
    };

    let sym = self.symbols.get(&symbol).clone();
    match &sym.kind {
      SymbolKind::Var | SymbolKind::Global { .. } => self.read_variable(symbol, &sym, span, skip_freed),
      SymbolKind::Constant(value) => self.constant_node(value, span),
      SymbolKind::Function { overloads } => match overloads.as_slice() {
        [single] if self.functions.get(&single.function).class.is_some() => {
          self.error_node(DiagnosticMessage::MethodNotCalled {
            name: name.to_string(),
            span: span.clone(),
          })
        },
        [single] => {
          let ty = self
            .types
            .function(single.param_types.clone(), single.return_type, single.is_vararg);
          self.alloc_node(
            TstKind::FunctionName {
              symbol,
              function: single.function,
            },
            span,
            ty,
          )
        },
        _ => self.error_node(DiagnosticMessage::OverloadedReference {
          name: name.to_string(),
          span: span.clone(),
        }),
      },
      SymbolKind::Field { .. } | SymbolKind::InlineField { .. } => match self.lookup_this() {
        Some(this) => {
          let object = self.this_node(this, span);
          self.alloc_node(TstKind::Member { object, field: symbol }, span, sym.ty)
        },
        None => self.error_node(DiagnosticMessage::NotAValue {
          name: name.to_string(),
          span: span.clone(),
        }),
      },
      SymbolKind::TypeName => self.error_node(DiagnosticMessage::NotAValue {
        name: name.to_string(),
        span: span.clone(),
      }),
    }
  }

  fn read_variable(
    &mut self,
    symbol: SymbolId,
    sym: &Symbol,
    span: &Span,
    skip_freed: bool,
  ) -> TstId {
    if self.path.is_uninitialized(symbol) {
      self.add_diagnostic(
        DiagnosticMessage::UninitializedSymbol {
          name: sym.name.clone(),
          span: span.clone(),
        }
        .report(),
      );
    } else if self.path.is_maybe_uninitialized(symbol) {
      self.add_diagnostic(
        DiagnosticMessage::MaybeUninitializedSymbol {
          name: sym.name.clone(),
          span: span.clone(),
        }
        .report(),
      );
    }

    if !skip_freed && self.path.is_freed(symbol) {
      self.add_diagnostic(
        DiagnosticMessage::PossibleUseAfterFree {
          name: sym.name.clone(),
          span: span.clone(),
        }
        .report(),
      );
    }

    let kind = match sym.kind {
      SymbolKind::Global { .. } => TstKind::Global(symbol),
      _ => TstKind::Variable(symbol),
    };
    let ty = self.path.get_type(symbol, sym.ty);

    if ty != sym.ty && matches!(self.types.get(&sym.ty), Type::ErrorUnion(_)) {
      let node = self.alloc_node(kind, span, sym.ty);
      return self.alloc_node(TstKind::Unwrap(node), span, ty);
    }
    self.alloc_node(kind, span, ty)
  }

  fn constant_node(
    &mut self,
    value: &ConstValue,
    span: &Span,
  ) -> TstId {
    match value {
      ConstValue::Int { value, ty } => self.alloc_node(TstKind::IntLit(*value), span, *ty),
      ConstValue::Real(value) => {
        let ty = self.types.real();
        self.alloc_node(TstKind::RealLit(value.0 as f64), span, ty)
      },
      ConstValue::String(value) => {
        let ty = self.types.string();
        self.alloc_node(TstKind::StringLit(value.clone()), span, ty)
      },
    }
  }

  fn this_node(
    &mut self,
    this: SymbolId,
    span: &Span,
  ) -> TstId {
    let ty = self.symbols.get(&this).ty;
    self.alloc_node(TstKind::Variable(this), span, ty)
  }

  // #endregion Names

  // #region Operators

  pub(crate) fn binary_node(
    &mut self,
    binary: &ASTBinary,
    left: TstId,
    right: TstId,
  ) -> TstId {
    let (left_type, right_type) = (self.tst.ty(left), self.tst.ty(right));
    if self.types.is_error(&left_type) || self.types.is_error(&right_type) {
      return self.silent_error(&binary.span, "invalid operand".to_string());
    }

    let left_promoted = self.types.default_promotion(left_type);
    let right_promoted = self.types.default_promotion(right_type);
    let table_op = binary_op(
      binary.operator,
      self.types.get(&left_promoted),
      self.types.get(&right_promoted),
    );

    let op = match (table_op, binary.operator) {
      (Some(op), _) => op,
      (None, ASTBinaryOperator::Eq) if self.equality_comparable(left_type, right_type) => AluOp::EqI,
      (None, ASTBinaryOperator::Neq) if self.equality_comparable(left_type, right_type) => AluOp::NeqI,
      _ => {
        return self.error_node(DiagnosticMessage::InvalidBinaryOperator {
          op: binary.operator.symbol().to_string(),
          left: self.types.display(&left_promoted),
          right: self.types.display(&right_promoted),
          span: binary.span.clone(),
        });
      },
    };

    let ty = if op.is_comparison() {
      self.types.bool()
    } else {
      left_promoted
    };
    self.alloc_node(TstKind::Binary { op, left, right }, &binary.span, ty)
  }

  /// Identity comparison of booleans, enums and references, including against `null`.
  fn equality_comparable(
    &self,
    left: TypeId,
    right: TypeId,
  ) -> bool {
    let null_against = |a: TypeId, b: TypeId| {
      matches!(self.types.get(&a), Type::Null)
        && (matches!(self.types.get(&b), Type::Nullable(_) | Type::Null | Type::Any) || self.types.is_heap_reference(&b))
    };
    if null_against(left, right) || null_against(right, left) {
      return true;
    }

    let comparable_kind = !matches!(
      self.types.get(&left),
      Type::Unit | Type::Nothing | Type::Real | Type::Null
    );
    comparable_kind
      && (self.types.is_assignable_from(&left, &right) || self.types.is_assignable_from(&right, &left))
  }

  fn check_minus(
    &mut self,
    operand: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let operand = self.check_expr(operand, ctx);
    let ty = self.types.default_promotion(self.tst.ty(operand));

    match self.types.get(&ty) {
      Type::Int | Type::Real => self.alloc_node(TstKind::Minus(operand), span, ty),
      Type::Error => operand,
      _ => self.error_node(DiagnosticMessage::InvalidUnaryOperator {
        op: "-".to_string(),
        ty: self.types.display(&ty),
        span: span.clone(),
      }),
    }
  }

  /// Ranges only exist as the subject of a `for` loop.
  pub(crate) fn check_range(
    &mut self,
    start: ExprId,
    end: ExprId,
    operator: ASTRangeOperator,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let start = self.check_expr(start, ctx);
    let end = self.check_expr(end, ctx);
    let int = self.types.int();

    for bound in [start, end] {
      let ty = self.tst.ty(bound);
      if self.types.is_error(&ty) {
        return self.silent_error(span, "invalid range".to_string());
      }
      if self.types.default_promotion(ty) != int {
        return self.error_node(DiagnosticMessage::InvalidRange {
          ty: self.types.display(&ty),
          span: span.clone(),
        });
      }
    }

    let op = match operator {
      ASTRangeOperator::Lt => AluOp::LtI,
      ASTRangeOperator::Lte => AluOp::LteI,
      ASTRangeOperator::Gt => AluOp::GtI,
      ASTRangeOperator::Gte => AluOp::GteI,
    };
    let ty = self.types.range(int);
    self.alloc_node(TstKind::Range { start, end, op }, span, ty)
  }

  fn check_cast(
    &mut self,
    expression: ExprId,
    target: &FplTypeSyntax,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let expression = self.check_expr(expression, ctx);
    let from = self.tst.ty(expression);
    let to = self.resolve_type(target);

    let word = |ty: &Type| matches!(ty, Type::Int | Type::Char | Type::Bool | Type::Enum(_));
    let allowed = from == to
      || self.types.is_error(&from)
      || self.types.is_error(&to)
      || (word(self.types.get(&from)) && word(self.types.get(&to)))
      || (matches!(self.types.get(&to), Type::Any)
        && (self.types.is_heap_reference(&from) || matches!(self.types.get(&from), Type::Nullable(_))));

    if !allowed {
      return self.error_node(DiagnosticMessage::InvalidCast {
        from: self.types.display(&from),
        to: self.types.display(&to),
        span: span.clone(),
      });
    }
    self.alloc_node(TstKind::Cast(expression), span, to)
  }

  fn check_if_expr(
    &mut self,
    condition: ExprId,
    then_branch: ExprId,
    else_branch: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let (condition, on_true, on_false) = self.check_bool(condition, ctx);

    self.path = on_true;
    let then_branch = self.check_expr(then_branch, ctx);
    let then_path = std::mem::replace(&mut self.path, on_false);
    let else_branch = self.check_expr(else_branch, ctx);
    self.path = merge(&[then_path, self.path.clone()]);

    let (then_type, else_type) = (self.tst.ty(then_branch), self.tst.ty(else_branch));
    let Some(ty) = self.branch_type(then_type, else_type) else {
      return self.error_node(DiagnosticMessage::IncompatibleBranches {
        then_ty: self.types.display(&then_type),
        else_ty: self.types.display(&else_type),
        span: span.clone(),
      });
    };

    self.alloc_node(
      TstKind::IfExpr {
        condition,
        then_branch,
        else_branch,
      },
      span,
      ty,
    )
  }

  /// The type both branches of an if expression fit in, if any.
  fn branch_type(
    &mut self,
    a: TypeId,
    b: TypeId,
  ) -> Option<TypeId> {
    if a == b || self.types.is_error(&b) {
      return Some(a);
    }
    if self.types.is_error(&a) {
      return Some(b);
    }

    let a_null = matches!(self.types.get(&a), Type::Null);
    let b_null = matches!(self.types.get(&b), Type::Null);
    if a_null && !self.types.is_value_type(&b) {
      return Some(self.types.nullable(b));
    }
    if b_null && !self.types.is_value_type(&a) {
      return Some(self.types.nullable(a));
    }

    if self.types.is_assignable_from(&a, &b) {
      Some(a)
    } else if self.types.is_assignable_from(&b, &a) {
      Some(b)
    } else {
      None
    }
  }

  // #endregion Operators

  // #region Access

  fn check_index(
    &mut self,
    object: ExprId,
    index: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let array = self.check_expr(object, ctx);
    let index = self.check_expr(index, ctx);
    let int = self.types.int();
    let index = self.coerce(index, int);

    let ty = self.tst.ty(array);
    let element = match self.types.get(&ty) {
      Type::Error => return self.silent_error(span, "invalid index".to_string()),
      Type::Array(_) | Type::InlineArray { .. } | Type::String => self.types.element_type(&ty),
      _ => None,
    };

    match element {
      Some(element) => self.alloc_node(TstKind::Index { array, index }, span, element),
      None => self.error_node(DiagnosticMessage::NotIndexable {
        ty: self.types.display(&ty),
        span: span.clone(),
      }),
    }
  }

  fn check_member(
    &mut self,
    member: &ASTMember,
    ctx: &mut CheckContext,
  ) -> TstId {
    if let Some(value) = self.enum_value(member) {
      return value;
    }

    let object = self.check_expr(member.object, ctx);
    if let Some(error) = self.check_access(object, &member.name, &member.span) {
      return error;
    }
    self.member_of(object, &member.name, &member.span)
  }

  /// `Color.RED`: a value named through its enum type.
  fn enum_value(
    &mut self,
    member: &ASTMember,
  ) -> Option<TstId> {
    let ast = self.ast;
    let ASTExpression::Identifier { name, .. } = ast.expr(&member.object) else {
      return None;
    };
    let symbol = self.scopes.lookup(name)?;
    let sym = self.symbols.get(&symbol);
    if !matches!(sym.kind, SymbolKind::TypeName) {
      return None;
    }
    let id = match self.types.get(&sym.ty) {
      Type::Enum(id) => *id,
      _ => return None,
    };
    let scope = *self.enum_scopes.get(&id)?;

    let value = self
      .scopes
      .lookup_in(scope, &member.name)
      .map(|value| self.symbols.get(&value).kind.clone());
    Some(match value {
      Some(SymbolKind::Constant(ConstValue::Int { value, ty })) => {
        self.alloc_node(TstKind::IntLit(value), &member.span, ty)
      },
      _ => self.error_node(DiagnosticMessage::NoSuchEnumValue {
        enum_name: name.clone(),
        name: member.name.clone(),
        span: member.span.clone(),
      }),
    })
  }

  /// Members cannot be reached through a value that may be null or an error.
  fn check_access(
    &mut self,
    object: TstId,
    name: &str,
    span: &Span,
  ) -> Option<TstId> {
    let ty = self.tst.ty(object);
    let message = match self.types.get(&ty) {
      Type::Error => return Some(self.silent_error(span, format!("no member {}", name))),
      Type::Null => DiagnosticMessage::NullFieldAccess {
        field: name.to_string(),
        span: span.clone(),
      },
      Type::Nullable(_) => DiagnosticMessage::MaybeNullAccess {
        field: name.to_string(),
        span: span.clone(),
      },
      Type::ErrorUnion(_) => DiagnosticMessage::MaybeErrorAccess {
        field: name.to_string(),
        span: span.clone(),
      },
      _ => return None,
    };
    Some(self.error_node(message))
  }

  fn member_of(
    &mut self,
    object: TstId,
    name: &str,
    span: &Span,
  ) -> TstId {
    let ty = self.tst.ty(object);

    match self.types.get(&ty).clone() {
      Type::Class { class, .. } => {
        let member = self.types.class(&class).members.get(name).copied();
        if let Some(field) = member {
          let (kind, field_type) = {
            let sym = self.symbols.get(&field);
            (sym.kind.clone(), sym.ty)
          };
          match kind {
            SymbolKind::Field { .. } | SymbolKind::InlineField { .. } => {
              let subst = self.types.substitution_for(&ty);
              let field_type = self.types.substitute(field_type, &subst);
              return self.alloc_node(TstKind::Member { object, field }, span, field_type);
            },
            SymbolKind::Function { .. } => {
              return self.error_node(DiagnosticMessage::MethodNotCalled {
                name: name.to_string(),
                span: span.clone(),
              });
            },
            _ => {},
          }
        }
      },
      Type::Array(_) | Type::String if name == "size" => {
        let int = self.types.int();
        let field = self.size_symbol;
        return self.alloc_node(TstKind::Member { object, field }, span, int);
      },
      Type::InlineArray { count, .. } if name == "size" => {
        let int = self.types.int();
        return self.alloc_node(TstKind::IntLit(count as i32), span, int);
      },
      Type::Enum(enum_id) => {
        let column = self
          .types
          .enum_def(&enum_id)
          .column(name)
          .map(|(index, column)| (index, column.ty));
        if let Some((column, column_type)) = column {
          return self.alloc_node(
            TstKind::EnumData {
              value: object,
              enum_id,
              column,
            },
            span,
            column_type,
          );
        }
      },
      _ => {},
    }

    self.error_node(DiagnosticMessage::NoSuchField {
      ty: self.types.display(&ty),
      field: name.to_string(),
      span: span.clone(),
    })
  }

  // #endregion Access

  // #region Calls

  fn check_args(
    &mut self,
    args: &[ExprId],
    ctx: &mut CheckContext,
  ) -> Vec<TstId> {
    let mut nodes = Vec::with_capacity(args.len());
    for arg in args {
      nodes.push(self.check_expr(*arg, ctx));
    }
    nodes
  }

  fn check_call(
    &mut self,
    call: &ASTCall,
    ctx: &mut CheckContext,
  ) -> TstId {
    let ast = self.ast;
    match ast.expr(&call.callee) {
      ASTExpression::Identifier { name, span } => {
        let overloads = self
          .scopes
          .lookup(name)
          .and_then(|symbol| match &self.symbols.get(&symbol).kind {
            SymbolKind::Function { overloads } => Some((symbol, overloads.clone())),
            _ => None,
          });

        match overloads {
          Some((symbol, overloads)) => {
            let args = self.check_args(&call.args, ctx);
            self.call_function(symbol, name, &overloads, args, span, &call.span)
          },
          None => self.call_value(call, ctx),
        }
      },
      ASTExpression::Member(member) => self.call_member(member, call, ctx),
      _ => self.call_value(call, ctx),
    }
  }

  fn call_function(
    &mut self,
    symbol: SymbolId,
    name: &str,
    overloads: &[FunctionInstance],
    args: Vec<TstId>,
    callee_span: &Span,
    span: &Span,
  ) -> TstId {
    let (instance, args) = match self.resolve_call(name, overloads, args, span) {
      Ok(resolved) => resolved,
      Err(error) => return error,
    };

    if self.functions.get(&instance.function).class.is_some() {
      let Some(this) = self.lookup_this() else {
        return self.error_node(DiagnosticMessage::NotAValue {
          name: name.to_string(),
          span: callee_span.clone(),
        });
      };
      let receiver = self.this_node(this, callee_span);
      return self.alloc_node(
        TstKind::MethodCall {
          receiver,
          function: instance.function,
          args,
        },
        span,
        instance.return_type,
      );
    }

    let function_type = self
      .types
      .function(instance.param_types.clone(), instance.return_type, instance.is_vararg);
    let callee = self.alloc_node(
      TstKind::FunctionName {
        symbol,
        function: instance.function,
      },
      callee_span,
      function_type,
    );
    self.alloc_node(TstKind::Call { callee, args }, span, instance.return_type)
  }

  fn call_member(
    &mut self,
    member: &ASTMember,
    call: &ASTCall,
    ctx: &mut CheckContext,
  ) -> TstId {
    let object = self.check_expr(member.object, ctx);
    let access_error = self.check_access(object, &member.name, &member.span);
    let args = self.check_args(&call.args, ctx);
    if let Some(error) = access_error {
      return error;
    }

    let ty = self.tst.ty(object);
    let methods = match self.types.get(&ty) {
      Type::Class { class, .. } => self
        .types
        .class(class)
        .members
        .get(&member.name)
        .and_then(|symbol| match &self.symbols.get(symbol).kind {
          SymbolKind::Function { overloads } => Some(overloads.clone()),
          _ => None,
        }),
      _ => None,
    };

    let Some(methods) = methods else {
      let callee = self.member_of(object, &member.name, &member.span);
      return self.call_indirect(callee, args, &call.span);
    };

    let subst = self.types.substitution_for(&ty);
    let candidates: Vec<FunctionInstance> = methods.iter().map(|m| m.map_type(&mut self.types, &subst)).collect();
    match self.resolve_call(&member.name, &candidates, args, &call.span) {
      Ok((instance, args)) => self.alloc_node(
        TstKind::MethodCall {
          receiver: object,
          function: instance.function,
          args,
        },
        &call.span,
        instance.return_type,
      ),
      Err(error) => error,
    }
  }

  fn call_value(
    &mut self,
    call: &ASTCall,
    ctx: &mut CheckContext,
  ) -> TstId {
    let callee = self.check_expr(call.callee, ctx);
    let args = self.check_args(&call.args, ctx);
    self.call_indirect(callee, args, &call.span)
  }

  /// A call through a function-typed value.
  fn call_indirect(
    &mut self,
    callee: TstId,
    args: Vec<TstId>,
    span: &Span,
  ) -> TstId {
    let ty = self.tst.ty(callee);
    let (params, ret, is_vararg) = match self.types.get(&ty) {
      Type::Function { params, ret, is_vararg } => (params.clone(), *ret, *is_vararg),
      Type::Error => return callee,
      _ => {
        return self.error_node(DiagnosticMessage::NotCallable {
          ty: self.types.display(&ty),
          span: span.clone(),
        });
      },
    };

    let instance = FunctionInstance {
      function: Default::default(),
      name: String::new(),
      param_types: params,
      this_type: None,
      is_vararg,
      return_type: ret,
      substitution: Substitution::new(),
    };
    let display = self.types.display(&ty);
    match self.resolve_call(&display, &[instance], args, span) {
      Ok((_, args)) => self.alloc_node(TstKind::CallIndirect { callee, args }, span, ret),
      Err(error) => error,
    }
  }

  /// Picks the overload for `args` and converts them to its parameter types.
  pub(crate) fn resolve_call(
    &mut self,
    name: &str,
    candidates: &[FunctionInstance],
    args: Vec<TstId>,
    span: &Span,
  ) -> Result<(FunctionInstance, Vec<TstId>), TstId> {
    let arg_types: Vec<TypeId> = args.iter().map(|a| self.tst.ty(*a)).collect();

    match resolve_overload(&self.types, candidates, &arg_types) {
      Resolution::Found(instance) => {
        let args = self.pack_args(&instance, args, span);
        Ok((instance, args))
      },
      Resolution::NoMatch if arg_types.iter().any(|t| self.types.is_error(t)) => {
        Err(self.silent_error(span, format!("no match for {}", name)))
      },
      Resolution::NoMatch => Err(self.error_node(DiagnosticMessage::NoMatchingFunction {
        call: call_description(&self.types, name, &arg_types),
        candidates: candidates.iter().map(|c| c.signature(&self.types)).collect(),
        span: span.clone(),
      })),
      Resolution::Ambiguous(found) => Err(self.error_node(DiagnosticMessage::AmbiguousCall {
        call: call_description(&self.types, name, &arg_types),
        candidates: found.iter().map(|c| c.signature(&self.types)).collect(),
        span: span.clone(),
      })),
    }
  }

  /// One argument per declared parameter: trailing vararg arguments are
  /// gathered into a stack-allocated array.
  fn pack_args(
    &mut self,
    instance: &FunctionInstance,
    args: Vec<TstId>,
    span: &Span,
  ) -> Vec<TstId> {
    let params = &instance.param_types;
    let fixed = if instance.is_vararg {
      params.len().saturating_sub(1)
    } else {
      params.len()
    };

    let mut args = args.into_iter();
    let mut packed = Vec::with_capacity(params.len());
    for param in &params[..fixed] {
      if let Some(arg) = args.next() {
        packed.push(self.coerce(arg, *param));
      }
    }

    if instance.is_vararg {
      if let Some(&element) = params.last() {
        let elements: Vec<TstId> = args.map(|arg| self.coerce(arg, element)).collect();
        let ty = self.types.array(element);
        packed.push(self.alloc_node(TstKind::ArrayLiteral { elements, local: true }, span, ty));
      }
    }

    packed
  }

  // #endregion Calls

  // #region Allocation

  fn check_new(
    &mut self,
    new: &ASTNew,
    ctx: &mut CheckContext,
  ) -> TstId {
    let ty = self.resolve_constructed_type(&new.type_);

    match self.types.get(&ty).clone() {
      Type::Error => {
        self.check_args(&new.args, ctx);
        self.silent_error(&new.span, "invalid new".to_string())
      },
      Type::Array(element) => self.new_array(new, ty, element, ctx),
      Type::Class { class, args: type_args } => {
        let Some(constructor) = self.types.class(&class).constructor else {
          return self.error_node(DiagnosticMessage::NotInstantiable {
            ty: self.types.display(&ty),
            span: new.span.clone(),
          });
        };
        let args = self.check_args(&new.args, ctx);
        let arg_types: Vec<TypeId> = args.iter().map(|a| self.tst.ty(*a)).collect();

        let instance = FunctionInstance::create(
          constructor,
          &self.functions,
          &self.symbols,
          &mut self.types,
          &Substitution::new(),
        );
        let type_params = &self.types.class(&class).type_params;
        let uninstantiated = !type_params.is_empty() && *type_params == type_args;
        let subst = if uninstantiated {
          infer_substitution(&self.types, &instance.param_types, &arg_types)
        } else {
          self.types.substitution_for(&ty)
        };
        let ty = self.types.substitute(ty, &subst);
        let instance = instance.map_type(&mut self.types, &subst);

        let name = self.types.class(&class).name.clone();
        match self.resolve_call(&name, &[instance], args, &new.span) {
          Ok((_, args)) => self.alloc_node(
            TstKind::NewObject {
              class,
              constructor: Some(constructor),
              args,
              local: new.local,
            },
            &new.span,
            ty,
          ),
          Err(error) => error,
        }
      },
      _ => self.error_node(DiagnosticMessage::NotInstantiable {
        ty: self.types.display(&ty),
        span: new.span.clone(),
      }),
    }
  }

  /// `new Array<T>(size)`, optionally with a lambda giving each element from `it`.
  fn new_array(
    &mut self,
    new: &ASTNew,
    ty: TypeId,
    element: TypeId,
    ctx: &mut CheckContext,
  ) -> TstId {
    let args = self.check_args(&new.args, ctx);
    let [size] = args.as_slice() else {
      return self.error_node(DiagnosticMessage::ArraySizeArgs(new.span.clone()));
    };
    let int = self.types.int();
    let size = self.coerce(*size, int);

    let lambda = match new.lambda {
      Some(lambda) => {
        let ast = self.ast;
        let (body, span) = match ast.expr(&lambda) {
          ASTExpression::Lambda { body, span } => (*body, span),
          other => (lambda, other.span()),
        };

        self.scopes.push(ScopeKind::Block);
        let it = self.define_symbol(Symbol::new("it", span.clone(), int, false, SymbolKind::Var));
        let body = self.check_expr(body, ctx);
        let body = self.coerce(body, element);
        self.scopes.pop();
        Some(TstLambda { it, body })
      },
      None => None,
    };

    self.alloc_node(
      TstKind::NewArray {
        size,
        lambda,
        local: new.local,
      },
      &new.span,
      ty,
    )
  }

  /// `new Array<T>[a, b, c]`; the element type may be left for the first element to decide.
  fn check_new_initialiser(
    &mut self,
    new: &ASTNewInitialiser,
    ctx: &mut CheckContext,
  ) -> TstId {
    let elements = self.check_args(&new.elements, ctx);

    let ty = match &new.type_ {
      FplTypeSyntax::Array { element: None, span } => match elements.first() {
        Some(first) => {
          let element = self.tst.ty(*first);
          self.types.array(element)
        },
        None => {
          return self.error_node(DiagnosticMessage::WrongTypeArgCount {
            name: "Array".to_string(),
            expected: 1,
            got: 0,
            span: span.clone(),
          });
        },
      },
      syntax => self.resolve_type(syntax),
    };

    let element = match self.types.get(&ty) {
      Type::Array(element) => *element,
      Type::Error => return self.silent_error(&new.span, "invalid array".to_string()),
      _ => {
        return self.error_node(DiagnosticMessage::NotInstantiable {
          ty: self.types.display(&ty),
          span: new.span.clone(),
        });
      },
    };

    let elements = elements.into_iter().map(|e| self.coerce(e, element)).collect();
    self.alloc_node(
      TstKind::ArrayLiteral {
        elements,
        local: new.local,
      },
      &new.span,
      ty,
    )
  }

  // #endregion Allocation

  // #region Jumps

  fn check_return(
    &mut self,
    value: Option<ExprId>,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let value = value.map(|v| self.check_expr(v, ctx));

    let value = match (ctx.function, ctx.return_type) {
      (Some(_), Some(return_type)) => match value {
        Some(node) if returns_value(&self.types, &return_type) => Some(self.coerce(node, return_type)),
        Some(node) => {
          let got = self.tst.ty(node);
          if !self.types.is_error(&got) {
            self.add_diagnostic(
              DiagnosticMessage::TypeMismatch {
                expected: self.types.display(&return_type),
                got: self.types.display(&got),
                span: self.tst.get(node).span.clone(),
              }
              .report(),
            );
          }
          Some(node)
        },
        None if returns_value(&self.types, &return_type) => {
          self.add_diagnostic(
            DiagnosticMessage::MissingReturnValue {
              ty: self.types.display(&return_type),
              span: span.clone(),
            }
            .report(),
          );
          None
        },
        None => None,
      },
      _ => {
        self.add_diagnostic(DiagnosticMessage::ReturnOutsideFunction(span.clone()).report());
        value
      },
    };

    self.path = self.path.set_unreachable();
    let nothing = self.types.nothing();
    self.alloc_node(TstKind::Return(value), span, nothing)
  }

  fn check_jump(
    &mut self,
    span: &Span,
    is_break: bool,
    ctx: &mut CheckContext,
  ) -> TstId {
    let Some(frame) = ctx.loop_frame.as_mut() else {
      let message = if is_break {
        DiagnosticMessage::BreakOutsideLoop(span.clone())
      } else {
        DiagnosticMessage::ContinueOutsideLoop(span.clone())
      };
      return self.error_node(message);
    };

    let snapshot = self.path.clone();
    let kind = if is_break {
      frame.breaks.push(snapshot);
      TstKind::Break
    } else {
      frame.continues.push(snapshot);
      TstKind::Continue
    };

    self.path = self.path.set_unreachable();
    let nothing = self.types.nothing();
    self.alloc_node(kind, span, nothing)
  }

  // #endregion Jumps
}

/// The ALU operation for `left operator right` on promoted operand types.
fn binary_op(
  operator: ASTBinaryOperator,
  left: &Type,
  right: &Type,
) -> Option<AluOp> {
  use ASTBinaryOperator as B;

  match (left, right) {
    (Type::Int, Type::Int) => match operator {
      B::Plus => Some(AluOp::AddI),
      B::Minus => Some(AluOp::SubI),
      B::Star => Some(AluOp::MulI),
      B::Slash => Some(AluOp::DivI),
      B::Percent => Some(AluOp::ModI),
      B::Left => Some(AluOp::ShlI),
      B::Right => Some(AluOp::ShrI),
      B::Amp => Some(AluOp::AndI),
      B::Bar => Some(AluOp::OrI),
      B::Caret => Some(AluOp::XorI),
      B::Eq => Some(AluOp::EqI),
      B::Neq => Some(AluOp::NeqI),
      B::Lt => Some(AluOp::LtI),
      B::Lte => Some(AluOp::LteI),
      B::Gt => Some(AluOp::GtI),
      B::Gte => Some(AluOp::GteI),
      B::And | B::Or => None,
    },
    (Type::Real, Type::Real) => match operator {
      B::Plus => Some(AluOp::AddR),
      B::Minus => Some(AluOp::SubR),
      B::Star => Some(AluOp::MulR),
      B::Slash => Some(AluOp::DivR),
      B::Percent => Some(AluOp::ModR),
      B::Eq => Some(AluOp::EqR),
      B::Neq => Some(AluOp::NeqR),
      B::Lt => Some(AluOp::LtR),
      B::Lte => Some(AluOp::LteR),
      B::Gt => Some(AluOp::GtR),
      B::Gte => Some(AluOp::GteR),
      _ => None,
    },
    (Type::String, Type::String) => match operator {
      B::Eq => Some(AluOp::EqS),
      B::Neq => Some(AluOp::NeqS),
      B::Lt => Some(AluOp::LtS),
      B::Lte => Some(AluOp::LteS),
      B::Gt => Some(AluOp::GtS),
      B::Gte => Some(AluOp::GteS),
      _ => None,
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn operator_table_distinguishes_operand_kinds() {
    assert_eq!(binary_op(ASTBinaryOperator::Plus, &Type::Int, &Type::Int), Some(AluOp::AddI));
    assert_eq!(binary_op(ASTBinaryOperator::Plus, &Type::Real, &Type::Real), Some(AluOp::AddR));
    assert_eq!(binary_op(ASTBinaryOperator::Lt, &Type::String, &Type::String), Some(AluOp::LtS));
    assert_eq!(binary_op(ASTBinaryOperator::Plus, &Type::String, &Type::String), None);
    assert_eq!(binary_op(ASTBinaryOperator::Plus, &Type::Int, &Type::Real), None);
  }
}

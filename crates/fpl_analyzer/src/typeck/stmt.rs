use std::collections::HashSet;

use fpl_ast::{
  ExprId, StmtId,
  expressions::ASTExpression,
  statements::{ASTAssignOperator, ASTIfClause, ASTStatement, ASTVariable, ASTWhenClause},
  type_::FplTypeSyntax,
};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_tst::{AluOp, TstId, TstKind};
use fpl_type::{
  span::Span,
  symbol::{Symbol, SymbolKind},
  types::{Type, TypeId},
  value::ConstValue,
};

use crate::{Analyzer, ScopeKind, path_context::merge, typeck::CheckContext};

impl<'a> Analyzer<'a> {
  pub(crate) fn check_stmts(
    &mut self,
    stmts: &[StmtId],
    ctx: &mut CheckContext,
  ) -> Vec<TstId> {
    let mut nodes = Vec::with_capacity(stmts.len());
    for stmt in stmts {
      if let Some(node) = self.check_stmt(*stmt, ctx) {
        nodes.push(node);
      }
    }
    nodes
  }

  fn check_block(
    &mut self,
    stmts: &[StmtId],
    kind: ScopeKind,
    ctx: &mut CheckContext,
  ) -> Vec<TstId> {
    self.scopes.push(kind);
    let body = self.check_stmts(stmts, ctx);
    self.scopes.pop();
    body
  }

  fn check_stmt(
    &mut self,
    id: StmtId,
    ctx: &mut CheckContext,
  ) -> Option<TstId> {
    let ast = self.ast;
    let unit = self.types.unit();

    match ast.stmt(&id) {
      ASTStatement::Expression { expression, span } => {
        let expression = self.check_expr(*expression, ctx);
        Some(self.alloc_node(TstKind::ExpressionStatement(expression), span, unit))
      },
      ASTStatement::Assign {
        operator,
        target,
        value,
        span,
      } => Some(self.check_assign(*operator, *target, *value, span, ctx)),
      ASTStatement::Variable(variable) => Some(self.check_declaration(variable, ctx)),
      ASTStatement::Const(decl) => {
        // File-level constants were bound before any body was checked.
        if self.scopes.current_kind() != ScopeKind::File {
          self.define_const(decl);
        }
        None
      },
      ASTStatement::Function(function) => {
        if self.function_of_stmt.contains_key(&id) {
          self.check_function(id, function)
        } else {
          self.add_diagnostic(DiagnosticMessage::NestedFunction(function.span.clone()).report());
          None
        }
      },
      ASTStatement::Class(class) => self.check_class(id, class),
      ASTStatement::Enum(_) => None,
      ASTStatement::If { clauses, span } => Some(self.check_if(clauses, span, ctx)),
      ASTStatement::While { condition, body, span } => Some(self.check_while(*condition, body, span, ctx)),
      ASTStatement::Repeat { body, condition, span } => Some(self.check_repeat(body, *condition, span, ctx)),
      ASTStatement::For {
        variable,
        iterable,
        body,
        span,
      } => Some(self.check_for(variable, *iterable, body, span, ctx)),
      ASTStatement::When { subject, clauses, span } => Some(self.check_when(*subject, clauses, span, ctx)),
      ASTStatement::Print { args, span } => Some(self.check_print(args, span, ctx)),
      ASTStatement::Free { expression, span } => Some(self.check_free(*expression, span, ctx)),
      ASTStatement::Null(span) => Some(self.alloc_node(TstKind::Null, span, unit)),
    }
  }

  // #region Declarations

  /// The written type wins over the initialiser's; with neither there is nothing to go on.
  pub(crate) fn declared_type(
    &mut self,
    name: &str,
    syntax: Option<&FplTypeSyntax>,
    value: Option<TstId>,
    span: &Span,
  ) -> TypeId {
    match (syntax, value) {
      (Some(syntax), _) => self.resolve_type(syntax),
      (None, Some(value)) => self.tst.ty(value),
      (None, None) => {
        self.add_diagnostic(
          DiagnosticMessage::UnresolvedDeclType {
            name: name.to_string(),
            span: span.clone(),
          }
          .report(),
        );
        self.types.error()
      },
    }
  }

  fn check_declaration(
    &mut self,
    variable: &ASTVariable,
    ctx: &mut CheckContext,
  ) -> TstId {
    let value = variable.value.map(|v| self.check_expr(v, ctx));
    let ty = self.declared_type(&variable.name, variable.type_.as_ref(), value, &variable.span);
    let value = value.map(|v| self.coerce(v, ty));

    let kind = if self.scopes.current_kind() == ScopeKind::File {
      SymbolKind::Global {
        offset: self.allocate_global(&ty),
      }
    } else {
      SymbolKind::Var
    };
    let symbol = self.define_symbol(Symbol::new(
      &variable.name,
      variable.span.clone(),
      ty,
      variable.mutable,
      kind,
    ));

    self.path = match value {
      Some(value) => self.path_after_assign(symbol, ty, value),
      None => self.path.add_uninitialized(symbol),
    };

    let unit = self.types.unit();
    self.alloc_node(TstKind::Declaration { symbol, value }, &variable.span, unit)
  }

  // #endregion Declarations

  // #region Assignment

  fn check_assign(
    &mut self,
    operator: ASTAssignOperator,
    target: ExprId,
    value: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let op = match operator {
      ASTAssignOperator::Assign => AluOp::EqI,
      ASTAssignOperator::AddAssign => AluOp::AddI,
      ASTAssignOperator::SubAssign => AluOp::SubI,
    };

    let ast = self.ast;
    match ast.expr(&target) {
      ASTExpression::Identifier { name, span: target_span } => {
        self.assign_identifier(op, name, target_span, value, span, ctx)
      },
      ASTExpression::Member(_) | ASTExpression::Index { .. } => {
        let target = self.check_expr(target, ctx);
        let value = self.check_expr(value, ctx);
        match self.check_lvalue(target) {
          Some(error) => error,
          None => self.assign_node(op, target, value, span),
        }
      },
      other => {
        let target_span = other.span().clone();
        self.check_expr(value, ctx);
        self.error_node(DiagnosticMessage::NotAnLvalue(target_span))
      },
    }
  }

  fn assign_identifier(
    &mut self,
    op: AluOp,
    name: &str,
    target_span: &Span,
    value: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let Some(symbol) = self.scopes.lookup(name) else {
      self.check_expr(value, ctx);
      return self.error_node(DiagnosticMessage::UndeclaredIdentifier {
        name: name.to_string(),
        span: target_span.clone(),
      });
    };
    let sym = self.symbols.get(&symbol).clone();

    match sym.kind {
      SymbolKind::Var | SymbolKind::Global { .. } => {},
      SymbolKind::Field { .. } | SymbolKind::InlineField { .. } => {
        let target = self.check_identifier(name, target_span, true);
        let value = self.check_expr(value, ctx);
        return match self.check_lvalue(target) {
          Some(error) => error,
          None => self.assign_node(op, target, value, span),
        };
      },
      _ => {
        self.check_expr(value, ctx);
        return self.error_node(DiagnosticMessage::NotAnLvalue(target_span.clone()));
      },
    }

    let value = self.check_expr(value, ctx);

    // A `val` may be assigned exactly once, on paths where it is still unset.
    if !sym.mutable && !self.path.is_uninitialized(symbol) {
      let message = if self.path.is_maybe_uninitialized(symbol) {
        DiagnosticMessage::MayAlreadyBeInitialised {
          name: name.to_string(),
          span: target_span.clone(),
        }
      } else {
        DiagnosticMessage::NotMutable {
          name: name.to_string(),
          span: target_span.clone(),
        }
      };
      self.add_diagnostic(message.report());
    }

    let target = if op == AluOp::EqI {
      let kind = match sym.kind {
        SymbolKind::Global { .. } => TstKind::Global(symbol),
        _ => TstKind::Variable(symbol),
      };
      self.alloc_node(kind, target_span, sym.ty)
    } else {
      self.check_identifier(name, target_span, false)
    };

    let node = self.assign_node(op, target, value, span);
    if op == AluOp::EqI {
      if let TstKind::Assign { value, .. } = self.tst.kind(node) {
        let value = *value;
        self.path = self.path_after_assign(symbol, sym.ty, value);
      }
    } else {
      self.path = self.path.reassign_var(symbol);
    }
    node
  }

  /// Reports targets that cannot be written: `val` fields, `size` and string characters.
  fn check_lvalue(
    &mut self,
    target: TstId,
  ) -> Option<TstId> {
    let span = self.tst.get(target).span.clone();
    match self.tst.kind(target) {
      TstKind::Member { field, .. } => {
        let field = self.symbols.get(field);
        if field.mutable {
          return None;
        }
        let name = field.name.clone();
        Some(self.error_node(DiagnosticMessage::NotMutable { name, span }))
      },
      TstKind::Index { array, .. } => {
        let array_type = self.tst.ty(*array);
        match self.types.get(&array_type) {
          Type::String => Some(self.error_node(DiagnosticMessage::NotAnLvalue(span))),
          _ => None,
        }
      },
      TstKind::Error(_) => Some(target),
      _ => Some(self.error_node(DiagnosticMessage::NotAnLvalue(span))),
    }
  }

  fn assign_node(
    &mut self,
    op: AluOp,
    target: TstId,
    value: TstId,
    span: &Span,
  ) -> TstId {
    let target_type = self.tst.ty(target);
    let value = if op == AluOp::EqI {
      self.coerce(value, target_type)
    } else {
      let promoted = self.types.default_promotion(target_type);
      if !matches!(self.types.get(&promoted), Type::Int | Type::Error) {
        return self.error_node(DiagnosticMessage::InvalidCompoundAssign {
          op: if op == AluOp::AddI { "+=" } else { "-=" }.to_string(),
          ty: self.types.display(&target_type),
          span: span.clone(),
        });
      }
      self.coerce(value, promoted)
    };

    let unit = self.types.unit();
    self.alloc_node(TstKind::Assign { op, target, value }, span, unit)
  }

  // #endregion Assignment

  // #region Control flow

  fn check_if(
    &mut self,
    clauses: &[ASTIfClause],
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let unit = self.types.unit();
    let mut nodes = Vec::with_capacity(clauses.len());
    let mut ends = Vec::with_capacity(clauses.len() + 1);
    let mut has_else = false;

    for clause in clauses {
      let (condition, on_false) = match clause.condition {
        Some(condition) => {
          let (node, on_true, on_false) = self.check_bool(condition, ctx);
          self.path = on_true;
          (Some(node), Some(on_false))
        },
        None => {
          has_else = true;
          (None, None)
        },
      };

      let body = self.check_block(&clause.body, ScopeKind::Block, ctx);
      ends.push(self.path.clone());
      nodes.push(self.alloc_node(TstKind::IfClause { condition, body }, &clause.span, unit));

      match on_false {
        Some(on_false) => self.path = on_false,
        None => break,
      }
    }

    if !has_else {
      ends.push(self.path.clone());
    }
    self.path = merge(&ends);
    self.alloc_node(TstKind::If(nodes), span, unit)
  }

  /// Variables assigned anywhere in a loop body lose their narrowing before
  /// the loop starts, as the assignment may run before the next iteration.
  fn forget_loop_assignments(
    &mut self,
    body: &[StmtId],
  ) {
    let mut names = HashSet::new();
    collect_assigned(self.ast, body, &mut names);

    for name in names {
      if let Some(symbol) = self.scopes.lookup(&name) {
        self.path = self.path.clear_refinement(symbol);
      }
    }
  }

  fn check_while(
    &mut self,
    condition: ExprId,
    body: &[StmtId],
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    self.forget_loop_assignments(body);
    let (condition, on_true, on_false) = self.check_bool(condition, ctx);

    self.path = on_true;
    let outer = ctx.enter_loop();
    let body = self.check_block(body, ScopeKind::Loop, ctx);
    let frame = ctx.exit_loop(outer);

    let mut loop_back = vec![self.path.clone()];
    loop_back.extend(frame.continues);
    let loop_back = merge(&loop_back);

    let mut exits = vec![on_false.clone()];
    exits.extend(frame.breaks);
    // With a constant `true` condition the loop only ends through `break`.
    if !on_false.unreachable {
      exits.push(loop_back);
    }
    self.path = merge(&exits);

    let unit = self.types.unit();
    self.alloc_node(TstKind::While { condition, body }, span, unit)
  }

  /// `repeat ... until cond`: the condition sees the body's declarations.
  fn check_repeat(
    &mut self,
    body: &[StmtId],
    condition: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    self.forget_loop_assignments(body);

    let outer = ctx.enter_loop();
    self.scopes.push(ScopeKind::Loop);
    let body = self.check_stmts(body, ctx);
    let frame = ctx.exit_loop(outer);

    let mut reaching_condition = vec![self.path.clone()];
    reaching_condition.extend(frame.continues);
    self.path = merge(&reaching_condition);
    let (condition, on_true, _) = self.check_bool(condition, ctx);
    self.scopes.pop();

    let mut exits = vec![on_true];
    exits.extend(frame.breaks);
    self.path = merge(&exits);

    let unit = self.types.unit();
    self.alloc_node(TstKind::Repeat { condition, body }, span, unit)
  }

  fn check_for(
    &mut self,
    variable: &str,
    iterable: ExprId,
    body: &[StmtId],
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let ast = self.ast;
    let iterable_node = match ast.expr(&iterable) {
      ASTExpression::Range {
        start,
        end,
        operator,
        span,
      } => self.check_range(*start, *end, *operator, span, ctx),
      _ => self.check_expr(iterable, ctx),
    };
    let ty = self.tst.ty(iterable_node);
    let element = match self.iteration_element(ty) {
      Some(element) => element,
      None => {
        let iterable_span = self.ast.expr(&iterable).span().clone();
        self.add_diagnostic(
          DiagnosticMessage::CannotIterate {
            ty: self.types.display(&ty),
            span: iterable_span,
          }
          .report(),
        );
        self.types.error()
      },
    };

    self.forget_loop_assignments(body);
    let entry = self.path.clone();
    let outer = ctx.enter_loop();

    self.scopes.push(ScopeKind::Loop);
    let variable = self.define_symbol(Symbol::new(variable, span.clone(), element, false, SymbolKind::Var));
    let body = self.check_stmts(body, ctx);
    self.scopes.pop();
    let frame = ctx.exit_loop(outer);

    let mut exits = vec![entry, self.path.clone()];
    exits.extend(frame.continues);
    exits.extend(frame.breaks);
    self.path = merge(&exits);

    let unit = self.types.unit();
    self.alloc_node(
      TstKind::For {
        variable,
        iterable: iterable_node,
        body,
      },
      span,
      unit,
    )
  }

  /// Element type of a `for` loop over `ty`. Besides the built-in sequences,
  /// any class with an Int `size` field and a `get(Int)` method can be iterated.
  pub(crate) fn iteration_element(
    &self,
    ty: TypeId,
  ) -> Option<TypeId> {
    match self.types.get(&ty) {
      Type::Error => Some(ty),
      Type::Range(_) | Type::Array(_) | Type::InlineArray { .. } | Type::String => self.types.element_type(&ty),
      Type::Class { class, .. } => {
        let members = &self.types.class(class).members;
        let size = self.symbols.get(members.get("size")?);
        let has_size = matches!(size.kind, SymbolKind::Field { .. }) && size.ty == self.types.int();

        let get = self.symbols.get(members.get("get")?);
        let SymbolKind::Function { overloads } = &get.kind else {
          return None;
        };
        let getter = overloads
          .iter()
          .find(|o| o.param_types.len() == 1 && o.param_types[0] == self.types.int())?;
        has_size.then_some(getter.return_type)
      },
      _ => None,
    }
  }

  fn check_when(
    &mut self,
    subject: ExprId,
    clauses: &[ASTWhenClause],
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let subject_node = self.check_expr(subject, ctx);
    let subject_type = self.tst.ty(subject_node);
    let promoted = self.types.default_promotion(subject_type);
    let valid = matches!(
      self.types.get(&promoted),
      Type::Int | Type::String | Type::Enum(_) | Type::Error
    );
    if !valid {
      self.add_diagnostic(
        DiagnosticMessage::InvalidWhenType {
          ty: self.types.display(&subject_type),
          span: self.tst.get(subject_node).span.clone(),
        }
        .report(),
      );
    }

    let unit = self.types.unit();
    let entry = self.path.clone();
    let mut seen: HashSet<ConstValue> = HashSet::new();
    let mut nodes = Vec::with_capacity(clauses.len());
    let mut ends = Vec::with_capacity(clauses.len() + 1);
    let mut has_else = false;

    for (index, clause) in clauses.iter().enumerate() {
      if clause.values.is_empty() {
        has_else = true;
        if index + 1 != clauses.len() {
          self.add_diagnostic(DiagnosticMessage::ElseNotLast(clause.span.clone()).report());
        }
      }

      self.path = entry.clone();
      let mut values = Vec::with_capacity(clause.values.len());
      for value in &clause.values {
        let node = self.check_expr(*value, ctx);
        let node = if valid { self.coerce(node, subject_type) } else { node };
        self.check_when_value(node, &mut seen);
        values.push(node);
      }

      let body = self.check_block(&clause.body, ScopeKind::Block, ctx);
      ends.push(self.path.clone());
      nodes.push(self.alloc_node(TstKind::WhenClause { values, body }, &clause.span, unit));
    }

    if !has_else {
      ends.push(entry);
    }
    self.path = merge(&ends);

    self.alloc_node(
      TstKind::When {
        subject: subject_node,
        clauses: nodes,
      },
      span,
      unit,
    )
  }

  fn check_when_value(
    &mut self,
    node: TstId,
    seen: &mut HashSet<ConstValue>,
  ) {
    let ty = self.tst.ty(node);
    if self.types.is_error(&ty) {
      return;
    }
    let span = self.tst.get(node).span.clone();

    let Some(value) = self.eval_const(node) else {
      self.add_diagnostic(DiagnosticMessage::NotConstant(span).report());
      return;
    };

    if !seen.insert(value.clone()) {
      let value = self.when_value_text(&value);
      self.add_diagnostic(DiagnosticMessage::DuplicateValue { value, span }.report());
    }
  }

  /// How a `when` value is written in source: enum values by name, characters quoted.
  fn when_value_text(
    &self,
    value: &ConstValue,
  ) -> String {
    match value {
      ConstValue::Int { value, ty } => match self.types.get(ty) {
        Type::Enum(id) => self
          .types
          .enum_def(id)
          .values
          .get(*value as usize)
          .cloned()
          .unwrap_or_else(|| value.to_string()),
        Type::Char => char::from_u32(*value as u32)
          .map(|c| format!("'{}'", c))
          .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
      },
      other => other.to_string(),
    }
  }

  // #endregion Control flow

  // #region Print and free

  fn check_print(
    &mut self,
    args: &[ExprId],
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let mut nodes = Vec::with_capacity(args.len());
    for arg in args {
      let node = self.check_expr(*arg, ctx);
      let ty = self.tst.ty(node);
      let printable = matches!(
        self.types.get(&ty),
        Type::Int | Type::Char | Type::String | Type::Bool | Type::Enum(_) | Type::Error
      );

      if printable {
        nodes.push(node);
      } else {
        nodes.push(self.error_node(DiagnosticMessage::CannotPrint {
          ty: self.types.display(&ty),
          span: self.tst.get(node).span.clone(),
        }));
      }
    }

    let unit = self.types.unit();
    self.alloc_node(TstKind::Print(nodes), span, unit)
  }

  fn check_free(
    &mut self,
    expression: ExprId,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> TstId {
    let ast = self.ast;
    let freed_symbol = match ast.expr(&expression) {
      ASTExpression::Identifier { name, .. } => self
        .scopes
        .lookup(name)
        .filter(|s| matches!(self.symbols.get(s).kind, SymbolKind::Var | SymbolKind::Global { .. })),
      _ => None,
    };

    let node = match ast.expr(&expression) {
      ASTExpression::Identifier { name, span } => self.check_identifier(name, span, true),
      _ => self.check_expr(expression, ctx),
    };
    let ty = self.tst.ty(node);
    let inner = self.types.strip_nullable(ty);
    let unit = self.types.unit();

    if !self.types.is_heap_reference(&inner) && !self.types.is_error(&inner) {
      let error = self.error_node(DiagnosticMessage::CannotFree {
        ty: self.types.display(&ty),
        span: self.tst.get(node).span.clone(),
      });
      return self.alloc_node(TstKind::Free(error), span, unit);
    }

    if let Some(symbol) = freed_symbol {
      if self.path.is_freed(symbol) {
        let expression_span = self.tst.get(node).span.clone();
        self.add_diagnostic(DiagnosticMessage::PossibleDoubleFree(expression_span).report());
      }
      self.path = self.path.free_var(symbol);
    }

    self.alloc_node(TstKind::Free(node), span, unit)
  }

  // #endregion Print and free
}

/// Names assigned with `=`, `+=` or `-=` anywhere in `stmts`.
fn collect_assigned(
  ast: &fpl_ast::ASTProgram,
  stmts: &[StmtId],
  names: &mut HashSet<String>,
) {
  for stmt in stmts {
    match ast.stmt(stmt) {
      ASTStatement::Assign { target, .. } => {
        if let ASTExpression::Identifier { name, .. } = ast.expr(target) {
          names.insert(name.clone());
        }
      },
      ASTStatement::If { clauses, .. } => {
        for clause in clauses {
          collect_assigned(ast, &clause.body, names);
        }
      },
      ASTStatement::When { clauses, .. } => {
        for clause in clauses {
          collect_assigned(ast, &clause.body, names);
        }
      },
      ASTStatement::While { body, .. } | ASTStatement::Repeat { body, .. } | ASTStatement::For { body, .. } => {
        collect_assigned(ast, body, names);
      },
      _ => {},
    }
  }
}

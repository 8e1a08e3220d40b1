use fpl_ast::{
  ExprId,
  expressions::{ASTBinary, ASTBinaryOperator, ASTExpression, ASTUnaryOperator},
  type_::FplTypeSyntax,
};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_tst::{TstId, TstKind};
use fpl_type::{
  span::Span,
  symbol::SymbolKind,
  types::{Type, TypeId},
};

use crate::{Analyzer, PathContext, path_context::merge, typeck::CheckContext};

/// A checked condition with the states that hold when it is true and when it is false.
type Branches = (TstId, PathContext, PathContext);

impl<'a> Analyzer<'a> {
  /// Checks `id` as a Bool. `and`, `or`, `not`, null tests and `is` tests
  /// split the current path; anything else leaves both branches equal.
  pub(crate) fn check_bool(
    &mut self,
    id: ExprId,
    ctx: &mut CheckContext,
  ) -> Branches {
    let ast = self.ast;
    match ast.expr(&id) {
      ASTExpression::Binary(binary) if binary.operator == ASTBinaryOperator::And => {
        let (left, left_true, left_false) = self.check_bool(binary.left, ctx);
        self.path = left_true;
        let (right, right_true, right_false) = self.check_bool(binary.right, ctx);

        let bool = self.types.bool();
        let node = self.alloc_node(TstKind::And { left, right }, &binary.span, bool);
        (node, right_true, merge(&[left_false, right_false]))
      },
      ASTExpression::Binary(binary) if binary.operator == ASTBinaryOperator::Or => {
        let (left, left_true, left_false) = self.check_bool(binary.left, ctx);
        self.path = left_false;
        let (right, right_true, right_false) = self.check_bool(binary.right, ctx);

        let bool = self.types.bool();
        let node = self.alloc_node(TstKind::Or { left, right }, &binary.span, bool);
        (node, merge(&[left_true, right_true]), right_false)
      },
      ASTExpression::Unary {
        operator: ASTUnaryOperator::Not,
        operand,
        span,
      } => {
        let (operand, on_true, on_false) = self.check_bool(*operand, ctx);
        let bool = self.types.bool();
        let node = self.alloc_node(TstKind::Not(operand), span, bool);
        (node, on_false, on_true)
      },
      ASTExpression::Is {
        expression,
        target,
        span,
      } => self.check_is(*expression, target, span, ctx),
      ASTExpression::Binary(binary)
        if matches!(binary.operator, ASTBinaryOperator::Eq | ASTBinaryOperator::Neq) =>
      {
        match self.null_test(binary, ctx) {
          Some(branches) => branches,
          None => self.plain_condition(id, ctx),
        }
      },
      _ => self.plain_condition(id, ctx),
    }
  }

  fn plain_condition(
    &mut self,
    id: ExprId,
    ctx: &mut CheckContext,
  ) -> Branches {
    let node = self.check_expr(id, ctx);
    let ty = self.tst.ty(node);
    let bool = self.types.bool();

    if ty != bool && !self.types.is_error(&ty) {
      let error = self.error_node(DiagnosticMessage::TypeMismatch {
        expected: self.types.display(&bool),
        got: self.types.display(&ty),
        span: self.tst.get(node).span.clone(),
      });
      return (error, self.path.clone(), self.path.clone());
    }

    // `true` and `false` make one branch dead.
    match self.tst.kind(node) {
      TstKind::IntLit(0) if ty == bool => (node, self.path.set_unreachable(), self.path.clone()),
      TstKind::IntLit(_) if ty == bool => (node, self.path.clone(), self.path.set_unreachable()),
      _ => (node, self.path.clone(), self.path.clone()),
    }
  }

  /// `x != null` and `x = null` for a variable currently typed `T?`.
  fn null_test(
    &mut self,
    binary: &ASTBinary,
    ctx: &mut CheckContext,
  ) -> Option<Branches> {
    let ast = self.ast;
    let is_null = |id: &ExprId| matches!(ast.expr(id), ASTExpression::Identifier { name, .. } if name == "null");

    let variable = if is_null(&binary.right) {
      binary.left
    } else if is_null(&binary.left) {
      binary.right
    } else {
      return None;
    };
    let ASTExpression::Identifier { name, .. } = ast.expr(&variable) else {
      return None;
    };

    let symbol = self.scopes.lookup(name)?;
    let sym = self.symbols.get(&symbol);
    if !matches!(sym.kind, SymbolKind::Var | SymbolKind::Global { .. }) {
      return None;
    }
    let inner = match self.types.get(&self.path.get_type(symbol, sym.ty)) {
      Type::Nullable(inner) => *inner,
      _ => return None,
    };

    let left = self.check_expr(binary.left, ctx);
    let right = self.check_expr(binary.right, ctx);
    let node = self.binary_node(binary, left, right);

    let null = self.types.null();
    let when_null = self.path.refine_type(symbol, null);
    let when_value = self.path.refine_type(symbol, inner);
    Some(match binary.operator {
      ASTBinaryOperator::Eq => (node, when_null, when_value),
      _ => (node, when_value, when_null),
    })
  }

  /// `x is T`: on the true branch a variable `x` is known to be a `T`, and
  /// on the false branch whatever is left of its current type.
  fn check_is(
    &mut self,
    expression: ExprId,
    target: &FplTypeSyntax,
    span: &Span,
    ctx: &mut CheckContext,
  ) -> Branches {
    let node = self.check_expr(expression, ctx);
    let target = self.resolve_type(target);
    let ty = self.tst.ty(node);

    let testable = matches!(
      self.types.get(&ty),
      Type::Nullable(_) | Type::ErrorUnion(_) | Type::Any | Type::Error
    );
    if !testable {
      let error = self.error_node(DiagnosticMessage::InvalidIsTest {
        ty: self.types.display(&ty),
        span: span.clone(),
      });
      return (error, self.path.clone(), self.path.clone());
    }

    let bool = self.types.bool();
    let is_node = self.alloc_node(
      TstKind::Is {
        expression: node,
        target,
      },
      span,
      bool,
    );

    let ast = self.ast;
    let refined = match ast.expr(&expression) {
      ASTExpression::Identifier { name, .. } => self
        .scopes
        .lookup(name)
        .filter(|symbol| matches!(self.symbols.get(symbol).kind, SymbolKind::Var | SymbolKind::Global { .. })),
      _ => None,
    };

    match refined {
      Some(symbol) if !self.types.is_error(&target) => {
        let current = self.path.get_type(symbol, self.symbols.get(&symbol).ty);
        let on_false = match self.is_test_complement(current, target) {
          Some(rest) => self.path.refine_type(symbol, rest),
          None => self.path.clone(),
        };
        (is_node, self.path.refine_type(symbol, target), on_false)
      },
      _ => (is_node, self.path.clone(), self.path.clone()),
    }
  }

  /// What a variable of type `current` must be when `is target` fails.
  /// Testing a `T!` for an enum tests for any error, so failing leaves `T`;
  /// testing a `T?` for `T` fails only on null.
  fn is_test_complement(
    &self,
    current: TypeId,
    target: TypeId,
  ) -> Option<TypeId> {
    match (self.types.get(&current), self.types.get(&target)) {
      (Type::ErrorUnion(inner), Type::Enum(_)) => Some(*inner),
      (Type::Nullable(inner), _) if *inner == target => Some(self.types.null()),
      _ => None,
    }
  }
}

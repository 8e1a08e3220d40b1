use fpl_ast::statements::ASTConst;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_tst::{AluOp, TstId, TstKind};
use fpl_type::{
  symbol::{Symbol, SymbolId, SymbolKind},
  value::ConstValue,
};
use ordered_float::OrderedFloat;

use crate::{Analyzer, typeck::CheckContext};

impl<'a> Analyzer<'a> {
  /// Folds a checked expression to a compile-time value, if it is one.
  pub(crate) fn eval_const(
    &self,
    node: TstId,
  ) -> Option<ConstValue> {
    let ty = self.tst.ty(node);
    match self.tst.kind(node) {
      TstKind::IntLit(value) => Some(ConstValue::Int { value: *value, ty }),
      TstKind::RealLit(value) => Some(ConstValue::Real(OrderedFloat(*value as f32))),
      TstKind::StringLit(value) => Some(ConstValue::String(value.clone())),
      TstKind::Minus(operand) => match self.eval_const(*operand)? {
        ConstValue::Int { value, .. } => Some(ConstValue::Int {
          value: value.wrapping_neg(),
          ty,
        }),
        ConstValue::Real(value) => Some(ConstValue::Real(-value)),
        ConstValue::String(_) => None,
      },
      TstKind::Cast(operand) => match self.eval_const(*operand)? {
        ConstValue::Int { value, .. } => Some(ConstValue::Int { value, ty }),
        other => Some(other),
      },
      TstKind::Binary { op, left, right } => {
        let left = self.eval_const(*left)?;
        let right = self.eval_const(*right)?;
        match (left, right) {
          (ConstValue::Int { value: l, .. }, ConstValue::Int { value: r, .. }) => {
            op.evaluate(l, r).map(|value| ConstValue::Int { value, ty })
          },
          (ConstValue::Real(l), ConstValue::Real(r)) => fold_real(*op, l.0, r.0).map(|v| ConstValue::Real(OrderedFloat(v))),
          _ => None,
        }
      },
      _ => None,
    }
  }

  /// Checks a `const` and binds it in the current scope. A value that does not
  /// fold is reported and bound as a poisoned `0` of type Error.
  pub(crate) fn define_const(
    &mut self,
    decl: &ASTConst,
  ) -> SymbolId {
    let mut ctx = CheckContext::top_level();
    let node = self.check_expr(decl.value, &mut ctx);

    let node = match &decl.type_ {
      Some(syntax) => {
        let declared = self.resolve_type(syntax);
        self.coerce(node, declared)
      },
      None => node,
    };

    let node_ty = self.tst.ty(node);
    let (value, ty) = match self.eval_const(node) {
      Some(value) => (value, node_ty),
      None => {
        if !self.types.is_error(&node_ty) {
          let span = self.ast.expr(&decl.value).span().clone();
          self.add_diagnostic(DiagnosticMessage::NotConstant(span).report());
        }
        let error = self.types.error();
        (ConstValue::Int { value: 0, ty: error }, error)
      },
    };

    self.define_symbol(Symbol::new(
      &decl.name,
      decl.span.clone(),
      ty,
      false,
      SymbolKind::Constant(value),
    ))
  }
}

fn fold_real(
  op: AluOp,
  lhs: f32,
  rhs: f32,
) -> Option<f32> {
  match op {
    AluOp::AddR => Some(lhs + rhs),
    AluOp::SubR => Some(lhs - rhs),
    AluOp::MulR => Some(lhs * rhs),
    AluOp::DivR => Some(lhs / rhs),
    _ => None,
  }
}

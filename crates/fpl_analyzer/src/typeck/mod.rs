mod cond;
mod expr;
mod stmt;

use std::mem;

use fpl_diagnostics::message::DiagnosticMessage;
use fpl_tst::{TstId, TstKind};
use fpl_type::{
  function::FunctionId,
  symbol::{SymbolId, SymbolKind},
  types::{Type, TypeId},
};

use crate::{Analyzer, PathContext};

/// Path snapshots taken at `break` and `continue` inside the innermost loop.
#[derive(Debug, Clone, Default)]
pub struct LoopFrame {
  pub breaks: Vec<PathContext>,
  pub continues: Vec<PathContext>,
}

/// Where an expression is being checked: the enclosing function, if any, and
/// the innermost loop.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
  pub function: Option<FunctionId>,
  pub return_type: Option<TypeId>,
  pub loop_frame: Option<LoopFrame>,
}

impl CheckContext {
  /// File-level code: no function to return from, no loop.
  pub fn top_level() -> Self {
    Self::default()
  }

  pub fn for_function(
    function: FunctionId,
    return_type: TypeId,
  ) -> Self {
    Self {
      function: Some(function),
      return_type: Some(return_type),
      loop_frame: None,
    }
  }

  /// Starts collecting snapshots for a new loop; hand the result back to `exit_loop`.
  pub fn enter_loop(&mut self) -> Option<LoopFrame> {
    self.loop_frame.replace(LoopFrame::default())
  }

  pub fn exit_loop(
    &mut self,
    outer: Option<LoopFrame>,
  ) -> LoopFrame {
    mem::replace(&mut self.loop_frame, outer).unwrap_or_default()
  }
}

impl<'a> Analyzer<'a> {
  /// Converts `node` to `expected`. A value going into an error union is
  /// wrapped; anything not assignable is reported.
  pub(crate) fn coerce(
    &mut self,
    node: TstId,
    expected: TypeId,
  ) -> TstId {
    let actual = self.tst.ty(node);
    if actual == expected || self.types.is_error(&actual) || self.types.is_error(&expected) {
      return node;
    }

    if !self.types.is_assignable_from(&expected, &actual) {
      let span = self.tst.get(node).span.clone();
      return self.error_node(DiagnosticMessage::TypeMismatch {
        expected: self.types.display(&expected),
        got: self.types.display(&actual),
        span,
      });
    }

    let wraps = matches!(self.types.get(&expected), Type::ErrorUnion(_))
      && !matches!(self.types.get(&actual), Type::ErrorUnion(_));
    if wraps {
      let span = self.tst.get(node).span.clone();
      return self.alloc_node(TstKind::MakeUnion(node), &span, expected);
    }

    node
  }

  /// The `this` of the method or constructor being checked.
  pub(crate) fn lookup_this(&self) -> Option<SymbolId> {
    let symbol = self.scopes.lookup("this")?;
    match self.symbols.get(&symbol).kind {
      SymbolKind::Var => Some(symbol),
      _ => None,
    }
  }

  /// The state after `symbol`, declared as `declared`, is assigned `value`.
  /// Assigning a plain value to a nullable or error union variable narrows it
  /// until the next assignment.
  pub(crate) fn path_after_assign(
    &self,
    symbol: SymbolId,
    declared: TypeId,
    value: TstId,
  ) -> PathContext {
    let value_type = match self.tst.kind(value) {
      TstKind::MakeUnion(inner) => self.tst.ty(*inner),
      _ => self.tst.ty(value),
    };
    let path = self.path.initialize(symbol).reassign_var(symbol);
    if self.types.is_error(&value_type) {
      return path.clear_refinement(symbol);
    }

    match self.types.get(&declared) {
      Type::Nullable(_) if matches!(self.types.get(&value_type), Type::Null) => path.refine_type(symbol, value_type),
      Type::Nullable(inner) | Type::ErrorUnion(inner)
        if value_type != declared && self.types.is_assignable_from(inner, &value_type) =>
      {
        path.refine_type(symbol, *inner)
      },
      _ => path.clear_refinement(symbol),
    }
  }
}

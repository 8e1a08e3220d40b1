use std::collections::{HashMap, HashSet};

use fpl_type::{symbol::SymbolId, types::TypeId};

/// What is known about variables at one point of a function body.
///
/// Values are treated as immutable: every update returns a new context, so a
/// snapshot taken at a `break` is never disturbed by later statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathContext {
  /// Uninitialized on every path reaching this point.
  pub uninitialized: HashSet<SymbolId>,
  /// Uninitialized on at least one path reaching this point.
  pub maybe_uninitialized: HashSet<SymbolId>,
  /// Types proven narrower than the declaration, e.g. `Cat` for a `Cat?` after a null test.
  pub refined_types: HashMap<SymbolId, TypeId>,
  pub freed: HashSet<SymbolId>,
  pub unreachable: bool,
}

impl PathContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn unreachable() -> Self {
    Self {
      unreachable: true,
      ..Self::default()
    }
  }

  pub fn set_unreachable(&self) -> Self {
    Self {
      unreachable: true,
      ..self.clone()
    }
  }

  pub fn add_uninitialized(
    &self,
    symbol: SymbolId,
  ) -> Self {
    let mut next = self.clone();
    next.uninitialized.insert(symbol);
    next.maybe_uninitialized.insert(symbol);
    next
  }

  pub fn initialize(
    &self,
    symbol: SymbolId,
  ) -> Self {
    if !self.maybe_uninitialized.contains(&symbol) {
      return self.clone();
    }
    let mut next = self.clone();
    next.uninitialized.remove(&symbol);
    next.maybe_uninitialized.remove(&symbol);
    next
  }

  pub fn free_var(
    &self,
    symbol: SymbolId,
  ) -> Self {
    let mut next = self.clone();
    next.freed.insert(symbol);
    next
  }

  /// A reassigned variable no longer points at the freed object.
  pub fn reassign_var(
    &self,
    symbol: SymbolId,
  ) -> Self {
    if !self.freed.contains(&symbol) {
      return self.clone();
    }
    let mut next = self.clone();
    next.freed.remove(&symbol);
    next
  }

  /// Also marks the symbol initialized.
  pub fn refine_type(
    &self,
    symbol: SymbolId,
    ty: TypeId,
  ) -> Self {
    let mut next = self.clone();
    next.uninitialized.remove(&symbol);
    next.maybe_uninitialized.remove(&symbol);
    next.refined_types.insert(symbol, ty);
    next
  }

  pub fn clear_refinement(
    &self,
    symbol: SymbolId,
  ) -> Self {
    if !self.refined_types.contains_key(&symbol) {
      return self.clone();
    }
    let mut next = self.clone();
    next.refined_types.remove(&symbol);
    next
  }

  pub fn get_type(
    &self,
    symbol: SymbolId,
    declared: TypeId,
  ) -> TypeId {
    self.refined_types.get(&symbol).copied().unwrap_or(declared)
  }

  pub fn is_uninitialized(
    &self,
    symbol: SymbolId,
  ) -> bool {
    self.uninitialized.contains(&symbol)
  }

  pub fn is_maybe_uninitialized(
    &self,
    symbol: SymbolId,
  ) -> bool {
    self.maybe_uninitialized.contains(&symbol)
  }

  pub fn is_freed(
    &self,
    symbol: SymbolId,
  ) -> bool {
    self.freed.contains(&symbol)
  }
}

/// Join of the contexts at a control-flow merge point.
///
/// Unreachable inputs are ignored. A symbol stays definitely uninitialized
/// only if every reachable input says so, and maybe-uninitialized if any
/// does. A refinement survives only when all reachable inputs agree on it.
pub fn merge(paths: &[PathContext]) -> PathContext {
  let reachable: Vec<&PathContext> = paths.iter().filter(|p| !p.unreachable).collect();

  let Some(first) = reachable.first() else {
    return PathContext::unreachable();
  };

  let maybe_uninitialized = reachable
    .iter()
    .flat_map(|p| p.maybe_uninitialized.iter().copied())
    .collect();

  let uninitialized = first
    .uninitialized
    .iter()
    .filter(|s| reachable.iter().all(|p| p.uninitialized.contains(s)))
    .copied()
    .collect();

  let freed = reachable.iter().flat_map(|p| p.freed.iter().copied()).collect();

  let refined_types = first
    .refined_types
    .iter()
    .filter(|(s, ty)| reachable.iter().all(|p| p.refined_types.get(s) == Some(ty)))
    .map(|(s, ty)| (*s, *ty))
    .collect();

  PathContext {
    uninitialized,
    maybe_uninitialized,
    refined_types,
    freed,
    unreachable: false,
  }
}

#[cfg(test)]
mod tests {
  use fpl_type::Id;

  use super::*;

  fn sym(i: u32) -> SymbolId {
    Id::new(i)
  }

  #[test]
  fn initialize_clears_both_sets() {
    let path = PathContext::new().add_uninitialized(sym(1));
    assert!(path.is_uninitialized(sym(1)));

    let path = path.initialize(sym(1));
    assert!(!path.is_uninitialized(sym(1)));
    assert!(!path.is_maybe_uninitialized(sym(1)));
  }

  #[test]
  fn branch_that_initializes_leaves_maybe() {
    let start = PathContext::new().add_uninitialized(sym(1));
    let then_branch = start.initialize(sym(1));

    let merged = merge(&[then_branch, start]);
    assert!(!merged.is_uninitialized(sym(1)));
    assert!(merged.is_maybe_uninitialized(sym(1)));
  }

  #[test]
  fn unreachable_branches_do_not_count() {
    let start = PathContext::new().add_uninitialized(sym(1));
    let returned = start.initialize(sym(1)).set_unreachable();

    let merged = merge(&[returned, start.clone()]);
    assert_eq!(merged, start);
    assert!(merge(&[PathContext::unreachable()]).unreachable);
  }

  #[test]
  fn refinements_must_agree() {
    let a = PathContext::new().refine_type(sym(1), Id::new(10)).refine_type(sym(2), Id::new(11));
    let b = PathContext::new().refine_type(sym(1), Id::new(10)).refine_type(sym(2), Id::new(12));

    let merged = merge(&[a, b]);
    assert_eq!(merged.get_type(sym(1), Id::new(0)), Id::new(10));
    assert_eq!(merged.get_type(sym(2), Id::new(0)), Id::new(0));
  }

  #[test]
  fn reassignment_forgets_free() {
    let path = PathContext::new().free_var(sym(4));
    assert!(path.is_freed(sym(4)));
    assert!(!path.reassign_var(sym(4)).is_freed(sym(4)));
  }
}

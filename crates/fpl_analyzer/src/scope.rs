use std::collections::HashMap;

use fpl_type::{Id, Store, symbol::SymbolId};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
  Global,
  File,
  /// Members and type parameters of one class.
  Class,
  /// Values of one enum; only reached through `Enum.VALUE`.
  Enum,
  Function,
  Block,
  Loop,
}

#[derive(Debug, Clone)]
pub struct Scope {
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  pub symbols: HashMap<String, SymbolId>,
}

/// Scopes are never freed: class, enum and file scopes are re-entered after
/// the binder built them.
#[derive(Debug, Clone)]
pub struct ScopeTree {
  scopes: Store<Scope>,
  current: ScopeId,
}

impl Default for ScopeTree {
  fn default() -> Self {
    Self::new()
  }
}

impl ScopeTree {
  pub fn new() -> Self {
    let mut scopes = Store::new();
    let global = scopes.alloc(Scope {
      parent: None,
      kind: ScopeKind::Global,
      symbols: HashMap::new(),
    });

    Self { scopes, current: global }
  }

  pub fn global(&self) -> ScopeId {
    Id::new(0)
  }

  pub fn push(
    &mut self,
    kind: ScopeKind,
  ) -> ScopeId {
    let new = self.scopes.alloc(Scope {
      parent: Some(self.current),
      kind,
      symbols: HashMap::new(),
    });

    self.current = new;
    new
  }

  pub fn pop(&mut self) {
    if let Some(parent) = self.scopes.get(&self.current).parent {
      self.current = parent;
    }
  }

  /// Binds `name` in the current scope. On a clash the symbol already there is returned.
  pub fn define(
    &mut self,
    name: &str,
    symbol: SymbolId,
  ) -> Result<(), SymbolId> {
    let current = self.current;
    self.define_in(current, name, symbol)
  }

  pub fn define_in(
    &mut self,
    scope: ScopeId,
    name: &str,
    symbol: SymbolId,
  ) -> Result<(), SymbolId> {
    let scope = self.scopes.get_mut(&scope);
    match scope.symbols.get(name) {
      Some(existing) => Err(*existing),
      None => {
        scope.symbols.insert(name.to_string(), symbol);
        Ok(())
      },
    }
  }

  pub fn lookup(
    &self,
    name: &str,
  ) -> Option<SymbolId> {
    let mut current = self.current;
    loop {
      let scope = self.scopes.get(&current);
      if let Some(symbol) = scope.symbols.get(name) {
        return Some(*symbol);
      }
      match scope.parent {
        Some(parent) => current = parent,
        None => return None,
      }
    }
  }

  /// Only the given scope, no parents.
  pub fn lookup_in(
    &self,
    scope: ScopeId,
    name: &str,
  ) -> Option<SymbolId> {
    self.scopes.get(&scope).symbols.get(name).copied()
  }

  /// Innermost enclosing scope of the given kind.
  pub fn find_enclosing(
    &self,
    kind: ScopeKind,
  ) -> Option<ScopeId> {
    let mut current = self.current;
    loop {
      let scope = self.scopes.get(&current);
      if scope.kind == kind {
        return Some(current);
      }
      match scope.parent {
        Some(parent) => current = parent,
        None => return None,
      }
    }
  }

  pub fn current(&self) -> ScopeId {
    self.current
  }

  pub fn current_kind(&self) -> ScopeKind {
    self.scopes.get(&self.current).kind
  }

  pub fn set_current(
    &mut self,
    scope: ScopeId,
  ) {
    self.current = scope;
  }

  pub fn get_scope(
    &self,
    id: &ScopeId,
  ) -> &Scope {
    self.scopes.get(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inner_scopes_shadow_and_pop() {
    let mut scopes = ScopeTree::new();
    scopes.define("x", Id::new(1)).unwrap();

    scopes.push(ScopeKind::Function);
    assert_eq!(scopes.lookup("x"), Some(Id::new(1)));
    scopes.define("x", Id::new(2)).unwrap();
    assert_eq!(scopes.lookup("x"), Some(Id::new(2)));

    scopes.pop();
    assert_eq!(scopes.lookup("x"), Some(Id::new(1)));
  }

  #[test]
  fn duplicate_in_same_scope_returns_previous() {
    let mut scopes = ScopeTree::new();
    scopes.define("x", Id::new(3)).unwrap();
    assert_eq!(scopes.define("x", Id::new(4)), Err(Id::new(3)));
  }

  #[test]
  fn lookup_in_ignores_parents() {
    let mut scopes = ScopeTree::new();
    scopes.define("x", Id::new(1)).unwrap();
    let inner = scopes.push(ScopeKind::Enum);
    assert_eq!(scopes.lookup_in(inner, "x"), None);
    assert_eq!(scopes.find_enclosing(ScopeKind::Global), Some(scopes.global()));
  }
}

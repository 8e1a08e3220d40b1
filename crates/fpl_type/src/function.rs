use crate::{
  Id, Store,
  span::Span,
  symbol::{SymbolId, SymbolStore},
  types::{ClassId, Substitution, TypeId, TypeStore},
};

pub type FunctionId = Id<FunctionDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
  User,
  Constructor,
}

/// One code body. Generic instantiations share it through `FunctionInstance`.
#[derive(Debug, Clone)]
pub struct FunctionDef {
  pub name: String,
  /// Signature-mangled label, e.g. `/fred(Int,Int)` or `Cat/meow()`.
  pub qualified: String,
  pub span: Span,
  pub params: Vec<SymbolId>,
  pub this_symbol: Option<SymbolId>,
  pub is_vararg: bool,
  pub return_type: TypeId,
  pub class: Option<ClassId>,
  pub kind: FunctionKind,
}

impl FunctionDef {
  /// Declared parameter types. A vararg parameter is an `Array<T>` inside the
  /// body but contributes its element `T` to the signature.
  pub fn param_types(
    &self,
    symbols: &SymbolStore,
    types: &TypeStore,
  ) -> Vec<TypeId> {
    let mut params: Vec<TypeId> = self.params.iter().map(|p| symbols.get(p).ty).collect();
    if self.is_vararg {
      if let Some(last) = params.last_mut() {
        if let Some(element) = types.element_type(last) {
          *last = element;
        }
      }
    }
    params
  }

  pub fn returns_value(
    &self,
    types: &TypeStore,
  ) -> bool {
    returns_value(types, &self.return_type)
  }
}

pub fn returns_value(
  types: &TypeStore,
  ty: &TypeId,
) -> bool {
  !matches!(
    types.get(ty),
    crate::types::Type::Unit | crate::types::Type::Nothing
  )
}

#[derive(Debug, Clone, Default)]
pub struct FunctionStore {
  functions: Store<FunctionDef>,
}

impl FunctionStore {
  pub fn new() -> Self {
    Self { functions: Store::new() }
  }

  pub fn alloc(
    &mut self,
    def: FunctionDef,
  ) -> FunctionId {
    self.functions.alloc(def)
  }

  pub fn get(
    &self,
    id: &FunctionId,
  ) -> &FunctionDef {
    self.functions.get(id)
  }

  pub fn get_mut(
    &mut self,
    id: &FunctionId,
  ) -> &mut FunctionDef {
    self.functions.get_mut(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (FunctionId, &FunctionDef)> {
    self.functions.iter()
  }

  pub fn len(&self) -> usize {
    self.functions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.functions.is_empty()
  }
}

/// A typed view of a `FunctionDef` for one set of type arguments.
#[derive(Debug, Clone)]
pub struct FunctionInstance {
  pub function: FunctionId,
  pub name: String,
  pub param_types: Vec<TypeId>,
  pub this_type: Option<TypeId>,
  pub is_vararg: bool,
  pub return_type: TypeId,
  pub substitution: Substitution,
}

impl FunctionInstance {
  pub fn create(
    id: FunctionId,
    functions: &FunctionStore,
    symbols: &SymbolStore,
    types: &mut TypeStore,
    substitution: &Substitution,
  ) -> Self {
    let def = functions.get(&id);
    let param_types = def
      .param_types(symbols, types)
      .into_iter()
      .map(|ty| types.substitute(ty, substitution))
      .collect();
    let this_type = def.this_symbol.map(|s| {
      let ty = symbols.get(&s).ty;
      types.substitute(ty, substitution)
    });
    let return_type = types.substitute(def.return_type, substitution);

    Self {
      function: id,
      name: def.name.clone(),
      param_types,
      this_type,
      is_vararg: def.is_vararg,
      return_type,
      substitution: substitution.clone(),
    }
  }

  /// Re-view this instance under further bindings, e.g. a method read through `Box<Int>`.
  pub fn map_type(
    &self,
    types: &mut TypeStore,
    substitution: &Substitution,
  ) -> Self {
    let mut combined = self.substitution.clone();
    for (k, v) in substitution {
      combined.insert(*k, *v);
    }

    Self {
      function: self.function,
      name: self.name.clone(),
      param_types: self.param_types.iter().map(|t| types.substitute(*t, substitution)).collect(),
      this_type: self.this_type.map(|t| types.substitute(t, substitution)),
      is_vararg: self.is_vararg,
      return_type: types.substitute(self.return_type, substitution),
      substitution: combined,
    }
  }

  /// Return type is not part of the key.
  pub fn same_signature(
    &self,
    other: &FunctionInstance,
  ) -> bool {
    self.is_vararg == other.is_vararg && self.param_types == other.param_types
  }

  /// `fred(Int,Int...)`.
  pub fn signature(
    &self,
    types: &TypeStore,
  ) -> String {
    format!("{}({})", self.name, param_list(types, &self.param_types, self.is_vararg))
  }
}

/// Comma-joined parameter types, the last one suffixed with `...` when vararg.
pub fn param_list(
  types: &TypeStore,
  params: &[TypeId],
  is_vararg: bool,
) -> String {
  let mut parts: Vec<String> = params.iter().map(|p| types.display(p)).collect();
  if is_vararg {
    if let Some(last) = parts.last_mut() {
      last.push_str("...");
    }
  }
  parts.join(",")
}

use crate::{
  Id, Store,
  function::FunctionInstance,
  span::Span,
  types::{ClassId, TypeId, TypeStore},
  value::ConstValue,
};

pub type SymbolId = Id<Symbol>;

/// Byte offset of the implicit `size` word stored in front of arrays and strings.
pub const SIZE_FIELD_OFFSET: i32 = -4;

#[derive(Debug, Clone)]
pub enum SymbolKind {
  Var,
  Global { offset: u32 },
  Function { overloads: Vec<FunctionInstance> },
  Constant(ConstValue),
  /// `class` is `None` only for the built-in `size` field of arrays and strings.
  Field { class: Option<ClassId>, offset: i32 },
  InlineField { class: ClassId, offset: i32 },
  TypeName,
}

#[derive(Debug, Clone)]
pub struct Symbol {
  pub name: String,
  pub span: Span,
  pub ty: TypeId,
  pub mutable: bool,
  pub kind: SymbolKind,
}

impl Symbol {
  pub fn new(
    name: &str,
    span: Span,
    ty: TypeId,
    mutable: bool,
    kind: SymbolKind,
  ) -> Self {
    Self {
      name: name.to_string(),
      span,
      ty,
      mutable,
      kind,
    }
  }

  pub fn is_variable(&self) -> bool {
    matches!(self.kind, SymbolKind::Var | SymbolKind::Global { .. })
  }

  pub fn kind_name(&self) -> &'static str {
    match self.kind {
      SymbolKind::Var => "var",
      SymbolKind::Global { .. } => "global",
      SymbolKind::Function { .. } => "function",
      SymbolKind::Constant(_) => "constant",
      SymbolKind::Field { .. } => "field",
      SymbolKind::InlineField { .. } => "inline field",
      SymbolKind::TypeName => "type",
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolStore {
  symbols: Store<Symbol>,
}

impl SymbolStore {
  pub fn new() -> Self {
    Self { symbols: Store::new() }
  }

  pub fn alloc(
    &mut self,
    symbol: Symbol,
  ) -> SymbolId {
    self.symbols.alloc(symbol)
  }

  pub fn get(
    &self,
    id: &SymbolId,
  ) -> &Symbol {
    self.symbols.get(id)
  }

  pub fn get_mut(
    &mut self,
    id: &SymbolId,
  ) -> &mut Symbol {
    self.symbols.get_mut(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
    self.symbols.iter()
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  /// One-line description used by tree dumps, e.g. `VAR:x:Int`.
  pub fn details(
    &self,
    id: &SymbolId,
    types: &TypeStore,
  ) -> String {
    let sym = self.get(id);
    let tag = match sym.kind {
      SymbolKind::Var => "VAR",
      SymbolKind::Global { .. } => "GLOBAL",
      SymbolKind::Function { .. } => return format!("FUN:{}", sym.name),
      SymbolKind::Constant(_) => "CONST",
      SymbolKind::Field { .. } => "FIELD",
      SymbolKind::InlineField { .. } => "INLINE",
      SymbolKind::TypeName => return format!("TYPE:{}", sym.name),
    };
    format!("{}:{}:{}", tag, sym.name, types.display(&sym.ty))
  }
}

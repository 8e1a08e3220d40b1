use std::collections::HashMap;

use crate::{
  Id, Store,
  function::FunctionId,
  span::Span,
  symbol::SymbolId,
  value::ConstValue,
};

pub type TypeId = Id<Type>;
pub type ClassId = Id<ClassDef>;
pub type EnumId = Id<EnumDef>;

/// Type parameter → argument bindings of one generic instantiation.
pub type Substitution = HashMap<TypeId, TypeId>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
  Unit,
  Null,
  Bool,
  Char,
  Int,
  Real,
  String,
  Any,
  Nothing,
  Error,

  Array(TypeId),
  Range(TypeId),
  Nullable(TypeId),
  ErrorUnion(TypeId),
  Vararg(TypeId),
  InlineArray {
    element: TypeId,
    count: u32,
  },
  Function {
    params: Vec<TypeId>,
    ret: TypeId,
    is_vararg: bool,
  },
  /// A class, with `args` bound to its type parameters (empty for plain classes).
  Class {
    class: ClassId,
    args: Vec<TypeId>,
  },
  TypeParameter {
    name: String,
    class: ClassId,
    index: u32,
  },
  Enum(EnumId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InlineArrayKey {
  element: TypeId,
  count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FunctionKey {
  params: Vec<TypeId>,
  ret: TypeId,
  is_vararg: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClassKey {
  class: ClassId,
  args: Vec<TypeId>,
}

/// A user class. Owns its member table; member symbols point back through `SymbolKind::Field::class`.
#[derive(Debug, Clone)]
pub struct ClassDef {
  pub name: String,
  pub span: Span,
  pub type_params: Vec<TypeId>,
  pub members: HashMap<String, SymbolId>,
  pub fields: Vec<SymbolId>,
  pub size: u32,
  pub constructor: Option<FunctionId>,
}

impl ClassDef {
  /// Reserve room for a field and return its offset.
  pub fn allocate_field(
    &mut self,
    size: u32,
    align: u32,
  ) -> u32 {
    let align = align.max(1);
    let offset = (self.size + align - 1) & !(align - 1);
    self.size = offset + size;
    offset
  }
}

#[derive(Debug, Clone)]
pub struct EnumColumn {
  pub name: String,
  pub ty: TypeId,
  pub values: Vec<ConstValue>,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
  pub name: String,
  pub span: Span,
  pub values: Vec<String>,
  pub columns: Vec<EnumColumn>,
}

impl EnumDef {
  pub fn column(
    &self,
    name: &str,
  ) -> Option<(usize, &EnumColumn)> {
    self.columns.iter().enumerate().find(|(_, c)| c.name == name)
  }
}

#[derive(Debug, Clone)]
pub struct TypeStore {
  types: Store<Type>,
  primitives: HashMap<Type, TypeId>,
  arrays: HashMap<TypeId, TypeId>,
  ranges: HashMap<TypeId, TypeId>,
  nullables: HashMap<TypeId, TypeId>,
  error_unions: HashMap<TypeId, TypeId>,
  varargs: HashMap<TypeId, TypeId>,
  inline_arrays: HashMap<InlineArrayKey, TypeId>,
  functions: HashMap<FunctionKey, TypeId>,
  class_instances: HashMap<ClassKey, TypeId>,
  enum_types: HashMap<EnumId, TypeId>,
  classes: Store<ClassDef>,
  enums: Store<EnumDef>,
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = Self {
      types: Store::new(),
      primitives: HashMap::new(),
      arrays: HashMap::new(),
      ranges: HashMap::new(),
      nullables: HashMap::new(),
      error_unions: HashMap::new(),
      varargs: HashMap::new(),
      inline_arrays: HashMap::new(),
      functions: HashMap::new(),
      class_instances: HashMap::new(),
      enum_types: HashMap::new(),
      classes: Store::new(),
      enums: Store::new(),
    };
    store.init_primitives();
    store
  }

  fn init_primitives(&mut self) {
    let primitives = [
      Type::Unit,
      Type::Null,
      Type::Bool,
      Type::Char,
      Type::Int,
      Type::Real,
      Type::String,
      Type::Any,
      Type::Nothing,
      Type::Error,
    ];

    for ty in primitives {
      let id = self.types.alloc(ty.clone());
      self.primitives.insert(ty, id);
    }
  }

  pub fn get(
    &self,
    id: &TypeId,
  ) -> &Type {
    self.types.get(id)
  }

  #[inline]
  pub fn unit(&self) -> TypeId {
    self.primitives[&Type::Unit]
  }
  #[inline]
  pub fn null(&self) -> TypeId {
    self.primitives[&Type::Null]
  }
  #[inline]
  pub fn bool(&self) -> TypeId {
    self.primitives[&Type::Bool]
  }
  #[inline]
  pub fn char(&self) -> TypeId {
    self.primitives[&Type::Char]
  }
  #[inline]
  pub fn int(&self) -> TypeId {
    self.primitives[&Type::Int]
  }
  #[inline]
  pub fn real(&self) -> TypeId {
    self.primitives[&Type::Real]
  }
  #[inline]
  pub fn string(&self) -> TypeId {
    self.primitives[&Type::String]
  }
  #[inline]
  pub fn any(&self) -> TypeId {
    self.primitives[&Type::Any]
  }
  #[inline]
  pub fn nothing(&self) -> TypeId {
    self.primitives[&Type::Nothing]
  }
  #[inline]
  pub fn error(&self) -> TypeId {
    self.primitives[&Type::Error]
  }

  pub fn array(
    &mut self,
    element: TypeId,
  ) -> TypeId {
    if let Some(&id) = self.arrays.get(&element) {
      return id;
    }
    let id = self.types.alloc(Type::Array(element));
    self.arrays.insert(element, id);
    id
  }

  pub fn range(
    &mut self,
    element: TypeId,
  ) -> TypeId {
    if let Some(&id) = self.ranges.get(&element) {
      return id;
    }
    let id = self.types.alloc(Type::Range(element));
    self.ranges.insert(element, id);
    id
  }

  /// `T?`. Idempotent, and value types come back unchanged since they have no null.
  pub fn nullable(
    &mut self,
    inner: TypeId,
  ) -> TypeId {
    match self.get(&inner) {
      Type::Error | Type::Nullable(_) | Type::Null => return inner,
      t if is_value_type(t) => return inner,
      _ => {},
    }

    if let Some(&id) = self.nullables.get(&inner) {
      return id;
    }
    let id = self.types.alloc(Type::Nullable(inner));
    self.nullables.insert(inner, id);
    id
  }

  /// `T!`. Callers check `can_be_error_union` first; errors are encoded as small integers
  /// so only pointer-like `T` can share the word.
  pub fn error_union(
    &mut self,
    inner: TypeId,
  ) -> TypeId {
    if matches!(self.get(&inner), Type::Error | Type::ErrorUnion(_)) {
      return inner;
    }
    if let Some(&id) = self.error_unions.get(&inner) {
      return id;
    }
    let id = self.types.alloc(Type::ErrorUnion(inner));
    self.error_unions.insert(inner, id);
    id
  }

  pub fn vararg(
    &mut self,
    element: TypeId,
  ) -> TypeId {
    if let Some(&id) = self.varargs.get(&element) {
      return id;
    }
    let id = self.types.alloc(Type::Vararg(element));
    self.varargs.insert(element, id);
    id
  }

  pub fn inline_array(
    &mut self,
    element: TypeId,
    count: u32,
  ) -> TypeId {
    let key = InlineArrayKey { element, count };
    if let Some(&id) = self.inline_arrays.get(&key) {
      return id;
    }
    let id = self.types.alloc(Type::InlineArray { element, count });
    self.inline_arrays.insert(key, id);
    id
  }

  pub fn function(
    &mut self,
    params: Vec<TypeId>,
    ret: TypeId,
    is_vararg: bool,
  ) -> TypeId {
    let key = FunctionKey {
      params: params.clone(),
      ret,
      is_vararg,
    };
    if let Some(&id) = self.functions.get(&key) {
      return id;
    }
    let id = self.types.alloc(Type::Function { params, ret, is_vararg });
    self.functions.insert(key, id);
    id
  }

  pub fn class_instance(
    &mut self,
    class: ClassId,
    args: Vec<TypeId>,
  ) -> TypeId {
    let key = ClassKey {
      class,
      args: args.clone(),
    };
    if let Some(&id) = self.class_instances.get(&key) {
      return id;
    }
    let id = self.types.alloc(Type::Class { class, args });
    self.class_instances.insert(key, id);
    id
  }

  pub fn enum_type(
    &mut self,
    id: EnumId,
  ) -> TypeId {
    if let Some(&ty) = self.enum_types.get(&id) {
      return ty;
    }
    let ty = self.types.alloc(Type::Enum(id));
    self.enum_types.insert(id, ty);
    ty
  }

  /// Allocate a class shell. Its type parameters become `TypeParameter` types owned by it.
  pub fn new_class(
    &mut self,
    name: &str,
    span: Span,
    type_param_names: &[String],
  ) -> ClassId {
    let class = self.classes.alloc(ClassDef {
      name: name.to_string(),
      span,
      type_params: Vec::new(),
      members: HashMap::new(),
      fields: Vec::new(),
      size: 0,
      constructor: None,
    });

    let params: Vec<TypeId> = type_param_names
      .iter()
      .enumerate()
      .map(|(index, name)| {
        self.types.alloc(Type::TypeParameter {
          name: name.clone(),
          class,
          index: index as u32,
        })
      })
      .collect();

    self.classes.get_mut(&class).type_params = params;
    class
  }

  pub fn class(
    &self,
    id: &ClassId,
  ) -> &ClassDef {
    self.classes.get(id)
  }

  pub fn class_mut(
    &mut self,
    id: &ClassId,
  ) -> &mut ClassDef {
    self.classes.get_mut(id)
  }

  pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
    self.classes.iter()
  }

  /// The class seen from inside its own body: arguments are its own type parameters.
  pub fn class_self_type(
    &mut self,
    id: ClassId,
  ) -> TypeId {
    let args = self.class(&id).type_params.clone();
    self.class_instance(id, args)
  }

  pub fn new_enum(
    &mut self,
    name: &str,
    span: Span,
  ) -> EnumId {
    self.enums.alloc(EnumDef {
      name: name.to_string(),
      span,
      values: Vec::new(),
      columns: Vec::new(),
    })
  }

  pub fn enum_def(
    &self,
    id: &EnumId,
  ) -> &EnumDef {
    self.enums.get(id)
  }

  pub fn enum_def_mut(
    &mut self,
    id: &EnumId,
  ) -> &mut EnumDef {
    self.enums.get_mut(id)
  }

  pub fn enums(&self) -> impl Iterator<Item = (EnumId, &EnumDef)> {
    self.enums.iter()
  }

  #[inline]
  pub fn is_error(
    &self,
    ty: &TypeId,
  ) -> bool {
    matches!(self.get(ty), Type::Error)
  }

  pub fn is_value_type(
    &self,
    ty: &TypeId,
  ) -> bool {
    is_value_type(self.get(ty))
  }

  /// Types an error union may carry: the value must never look like a small integer.
  pub fn can_be_error_union(
    &self,
    ty: &TypeId,
  ) -> bool {
    matches!(
      self.get(ty),
      Type::String | Type::Array(_) | Type::Class { .. } | Type::Any | Type::Error | Type::Function { .. }
    )
  }

  /// Types that live behind a pointer and so may be freed.
  pub fn is_heap_reference(
    &self,
    ty: &TypeId,
  ) -> bool {
    matches!(self.get(ty), Type::String | Type::Array(_) | Type::Class { .. })
  }

  pub fn strip_nullable(
    &self,
    ty: TypeId,
  ) -> TypeId {
    match self.get(&ty) {
      Type::Nullable(inner) => *inner,
      _ => ty,
    }
  }

  pub fn default_promotion(
    &self,
    ty: TypeId,
  ) -> TypeId {
    match self.get(&ty) {
      Type::Char => self.int(),
      _ => ty,
    }
  }

  pub fn types_equal(
    &self,
    a: &TypeId,
    b: &TypeId,
  ) -> bool {
    a == b || self.is_error(a) || self.is_error(b)
  }

  /// Can a value of type `src` be stored where `dst` is expected?
  pub fn is_assignable_from(
    &self,
    dst: &TypeId,
    src: &TypeId,
  ) -> bool {
    if dst == src {
      return true;
    }

    match (self.get(dst), self.get(src)) {
      (Type::Error, _) | (_, Type::Error) | (Type::Any, _) | (_, Type::Nothing) => true,
      (Type::Nullable(_), Type::Null) => true,
      (Type::Nullable(d), Type::Nullable(s)) => self.is_assignable_from(d, s),
      (Type::Nullable(d), _) => self.is_assignable_from(d, src),
      (Type::ErrorUnion(d), Type::ErrorUnion(s)) => self.is_assignable_from(d, s),
      (Type::ErrorUnion(_), Type::Enum(_)) => true,
      (Type::ErrorUnion(d), _) => self.is_assignable_from(d, src),
      (Type::Class { class: dc, args: da }, Type::Class { class: sc, args: sa }) if dc == sc => {
        let generic = self.class(dc).type_params == *da || self.class(sc).type_params == *sa;
        generic || da.iter().zip(sa.iter()).all(|(d, s)| self.types_equal(d, s))
      },
      _ => false,
    }
  }

  pub fn substitute(
    &mut self,
    ty: TypeId,
    subst: &Substitution,
  ) -> TypeId {
    if subst.is_empty() {
      return ty;
    }

    match self.get(&ty).clone() {
      Type::TypeParameter { .. } => subst.get(&ty).copied().unwrap_or(ty),
      Type::Array(e) => {
        let e = self.substitute(e, subst);
        self.array(e)
      },
      Type::Range(e) => {
        let e = self.substitute(e, subst);
        self.range(e)
      },
      Type::Nullable(e) => {
        let e = self.substitute(e, subst);
        self.nullable(e)
      },
      Type::ErrorUnion(e) => {
        let e = self.substitute(e, subst);
        self.error_union(e)
      },
      Type::Vararg(e) => {
        let e = self.substitute(e, subst);
        self.vararg(e)
      },
      Type::InlineArray { element, count } => {
        let e = self.substitute(element, subst);
        self.inline_array(e, count)
      },
      Type::Function { params, ret, is_vararg } => {
        let params = params.into_iter().map(|p| self.substitute(p, subst)).collect();
        let ret = self.substitute(ret, subst);
        self.function(params, ret, is_vararg)
      },
      Type::Class { class, args } => {
        let args = args.into_iter().map(|a| self.substitute(a, subst)).collect();
        self.class_instance(class, args)
      },
      _ => ty,
    }
  }

  /// Bindings for reading members of `ty` when it is an instantiated generic class.
  pub fn substitution_for(
    &self,
    ty: &TypeId,
  ) -> Substitution {
    match self.get(ty) {
      Type::Class { class, args } => self.class(class).type_params.iter().copied().zip(args.iter().copied()).collect(),
      _ => Substitution::new(),
    }
  }

  pub fn size_in_bytes(
    &self,
    ty: &TypeId,
  ) -> u32 {
    match self.get(ty) {
      Type::Bool | Type::Char => 1,
      Type::Unit | Type::Error | Type::Nothing => 0,
      Type::InlineArray { element, count } => self.size_in_bytes(element) * count,
      _ => 4,
    }
  }

  pub fn alignment(
    &self,
    ty: &TypeId,
  ) -> u32 {
    match self.get(ty) {
      Type::InlineArray { element, .. } => self.alignment(element),
      _ => match self.size_in_bytes(ty) {
        0 | 1 => 1,
        2 => 2,
        _ => 4,
      },
    }
  }

  /// Element type of `Array`, `InlineArray`, `Range` and `Vararg`.
  pub fn element_type(
    &self,
    ty: &TypeId,
  ) -> Option<TypeId> {
    match self.get(ty) {
      Type::Array(e) | Type::Range(e) | Type::Vararg(e) | Type::InlineArray { element: e, .. } => Some(*e),
      Type::String => Some(self.char()),
      _ => None,
    }
  }

  pub fn display(
    &self,
    ty: &TypeId,
  ) -> String {
    match self.get(ty) {
      Type::Unit => "Unit".to_string(),
      Type::Null => "Null".to_string(),
      Type::Bool => "Bool".to_string(),
      Type::Char => "Char".to_string(),
      Type::Int => "Int".to_string(),
      Type::Real => "Real".to_string(),
      Type::String => "String".to_string(),
      Type::Any => "Any".to_string(),
      Type::Nothing => "Nothing".to_string(),
      Type::Error => "Error".to_string(),
      Type::Array(e) => format!("Array<{}>", self.display(e)),
      Type::Range(e) => format!("Range<{}>", self.display(e)),
      Type::Nullable(e) => format!("{}?", self.display(e)),
      Type::ErrorUnion(e) => format!("{}!", self.display(e)),
      Type::Vararg(e) => format!("{}...", self.display(e)),
      Type::InlineArray { element, count } => format!("inline Array<{}>({})", self.display(element), count),
      Type::Function { params, ret, is_vararg } => {
        let mut params: Vec<String> = params.iter().map(|p| self.display(p)).collect();
        if *is_vararg {
          if let Some(last) = params.last_mut() {
            last.push_str("...");
          }
        }
        format!("({})->{}", params.join(","), self.display(ret))
      },
      Type::Class { class, args } => {
        let def = self.class(class);
        if args.is_empty() {
          def.name.clone()
        } else {
          let args: Vec<String> = args.iter().map(|a| self.display(a)).collect();
          format!("{}<{}>", def.name, args.join(","))
        }
      },
      Type::TypeParameter { name, .. } => name.clone(),
      Type::Enum(id) => self.enum_def(id).name.clone(),
    }
  }
}

fn is_value_type(ty: &Type) -> bool {
  matches!(
    ty,
    Type::Int | Type::Real | Type::Char | Type::Bool | Type::Unit | Type::Enum(_)
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn composite_types_are_interned() {
    let mut store = TypeStore::new();
    let int = store.int();
    let a = store.array(int);
    let b = store.array(int);
    assert_eq!(a, b);

    let f1 = store.function(vec![int, a], int, false);
    let f2 = store.function(vec![int, a], int, false);
    let f3 = store.function(vec![int, a], int, true);
    assert_eq!(f1, f2);
    assert_ne!(f1, f3);
  }

  #[test]
  fn nullable_rules() {
    let mut store = TypeStore::new();
    let string = store.string();
    let n1 = store.nullable(string);
    let n2 = store.nullable(n1);
    assert_eq!(n1, n2);
    assert_eq!(store.display(&n1), "String?");

    let int = store.int();
    assert_eq!(store.nullable(int), int);
    let error = store.error();
    assert_eq!(store.nullable(error), error);
  }

  #[test]
  fn nullable_accepts_null_and_inner() {
    let mut store = TypeStore::new();
    let string = store.string();
    let nullable = store.nullable(string);
    assert!(store.is_assignable_from(&nullable, &store.null()));
    assert!(store.is_assignable_from(&nullable, &string));
    assert!(!store.is_assignable_from(&string, &nullable));
  }

  #[test]
  fn field_layout_pads_to_alignment() {
    let mut store = TypeStore::new();
    let class = store.new_class("Cat", Span::default(), &[]);
    let def = store.class_mut(&class);
    assert_eq!(def.allocate_field(1, 1), 0);
    assert_eq!(def.allocate_field(4, 4), 4);
    assert_eq!(def.allocate_field(1, 1), 8);
    assert_eq!(def.allocate_field(2, 2), 10);
    assert_eq!(def.size, 12);
  }

  #[test]
  fn substitute_generic_members() {
    let mut store = TypeStore::new();
    let class = store.new_class("Box", Span::default(), &["T".to_string()]);
    let t = store.class(&class).type_params[0];
    let array_t = store.array(t);

    let int = store.int();
    let instance = store.class_instance(class, vec![int]);
    let subst = store.substitution_for(&instance);

    let substituted = store.substitute(array_t, &subst);
    assert_eq!(store.display(&substituted), "Array<Int>");
    assert_eq!(store.display(&instance), "Box<Int>");
  }

  #[test]
  fn error_union_accepts_enum_and_value() {
    let mut store = TypeStore::new();
    let string = store.string();
    let union = store.error_union(string);
    let e = store.new_enum("Err", Span::default());
    let enum_ty = store.enum_type(e);

    assert!(store.is_assignable_from(&union, &string));
    assert!(store.is_assignable_from(&union, &enum_ty));
    assert!(!store.is_assignable_from(&string, &union));
    assert_eq!(store.display(&union), "String!");
  }
}

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::types::TypeId;

/// A compile-time value: constants, enum values and enum data columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
  Int { value: i32, ty: TypeId },
  Real(OrderedFloat<f32>),
  String(String),
}

impl std::fmt::Display for ConstValue {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      ConstValue::Int { value, .. } => write!(f, "{}", value),
      ConstValue::Real(r) => write!(f, "{}", r),
      ConstValue::String(s) => write!(f, "{}", s),
    }
  }
}

/// Data referenced by address from code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticValue {
  /// Index into the string pool.
  String(u32),
  ClassDescriptor(String),
  /// `Planet/mass`: one word per enum value.
  EnumTable { enum_name: String, column: String },
  Function(String),
}

impl std::fmt::Display for StaticValue {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      StaticValue::String(index) => write!(f, "OBJ{}", index),
      StaticValue::ClassDescriptor(name) => write!(f, "{}/class", name),
      StaticValue::EnumTable { enum_name, column } => write!(f, "{}/{}", enum_name, column),
      StaticValue::Function(name) => write!(f, "{}", name),
    }
  }
}

/// Deduplicated string literals, numbered in first-use order.
#[derive(Debug, Clone, Default)]
pub struct StringPool {
  strings: Vec<String>,
  index: HashMap<String, u32>,
}

impl StringPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn intern(
    &mut self,
    s: &str,
  ) -> u32 {
    if let Some(&i) = self.index.get(s) {
      return i;
    }
    let i = self.strings.len() as u32;
    self.strings.push(s.to_string());
    self.index.insert(s.to_string(), i);
    i
  }

  pub fn get(
    &self,
    index: u32,
  ) -> &str {
    &self.strings[index as usize]
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
    self.strings.iter().enumerate().map(|(i, s)| (i as u32, s.as_str()))
  }

  pub fn len(&self) -> usize {
    self.strings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.strings.is_empty()
  }
}

use fpl_type::value::StringPool;

use crate::function::Function;

/// `Cat/class`: what `mallocObject` needs to know about a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
  pub name: String,
  pub size: u32,
}

/// One word per enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
  Int(i32),
  /// Index into the string pool.
  String(u32),
}

/// A data column of an enum, e.g. `Planet/mass`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTable {
  pub label: String,
  pub entries: Vec<TableEntry>,
}

/// Everything code generation produces: the functions and the static data they reference.
#[derive(Debug, Clone, Default)]
pub struct IrProgram {
  pub functions: Vec<Function>,
  pub strings: StringPool,
  pub classes: Vec<ClassDescriptor>,
  pub enum_tables: Vec<EnumTable>,
  /// Bytes of the globals area addressed from R29.
  pub globals_size: u32,
}

impl IrProgram {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn dump(&self) -> String {
    let mut out = String::new();
    for func in &self.functions {
      func.dump(&mut out);
    }
    out
  }
}

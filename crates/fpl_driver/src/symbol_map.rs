use ascii_table::AsciiTable;
use serde::Serialize;

use fpl_type::{
  file::SourceMap,
  symbol::{Symbol, SymbolKind, SymbolStore},
  types::{Type, TypeStore},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolLocation {
  pub filename: String,
  pub line: u32,
  pub column: u32,
}

/// One entry of `symbol-map.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
  pub name: String,
  pub kind: String,
  #[serde(rename = "type")]
  pub ty: String,
  pub definition: SymbolLocation,
  pub mutable: bool,
}

#[derive(Serialize)]
struct SymbolMap<'a> {
  symbols: &'a [SymbolEntry],
}

/// Every symbol declared in source, in declaration order. Built-in names
/// (`Int`, `true`, the `size` field...) have no location and are skipped.
pub fn collect_symbols(
  sm: &SourceMap,
  symbols: &SymbolStore,
  types: &TypeStore,
) -> Vec<SymbolEntry> {
  symbols
    .iter()
    .filter(|(_, sym)| !sym.span.is_empty())
    .map(|(_, sym)| {
      let (line, column) = sm.line_col(&sym.span.file, sym.span.start);
      SymbolEntry {
        name: sym.name.clone(),
        kind: kind_name(sym, types).to_string(),
        ty: types.display(&sym.ty),
        definition: SymbolLocation {
          filename: sm.get(&sym.span.file).name.clone(),
          line,
          column,
        },
        mutable: sym.mutable,
      }
    })
    .collect()
}

fn kind_name(
  sym: &Symbol,
  types: &TypeStore,
) -> &'static str {
  match sym.kind {
    SymbolKind::TypeName => match types.get(&sym.ty) {
      Type::Class { .. } => "class",
      Type::Enum(_) => "enum",
      _ => "type",
    },
    _ => sym.kind_name(),
  }
}

/// `{"symbols":[...]}`, pretty printed.
pub fn symbol_map_json(entries: &[SymbolEntry]) -> serde_json::Result<String> {
  serde_json::to_string_pretty(&SymbolMap { symbols: entries })
}

pub fn format_symbol_table(entries: &[SymbolEntry]) -> String {
  let mut table = AsciiTable::default();
  table.column(0).set_header("Name");
  table.column(1).set_header("Kind");
  table.column(2).set_header("Type");
  table.column(3).set_header("Mutable");
  table.column(4).set_header("Defined At");

  let rows: Vec<Vec<String>> = entries
    .iter()
    .map(|e| {
      vec![
        e.name.clone(),
        e.kind.clone(),
        e.ty.clone(),
        e.mutable.to_string(),
        format!("{}:{}.{}", e.definition.filename, e.definition.line, e.definition.column),
      ]
    })
    .collect();

  table.format(rows)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry() -> SymbolEntry {
    SymbolEntry {
      name: "x".to_string(),
      kind: "global".to_string(),
      ty: "Int".to_string(),
      definition: SymbolLocation {
        filename: "test.fpl".to_string(),
        line: 1,
        column: 5,
      },
      mutable: false,
    }
  }

  #[test]
  fn json_uses_original_field_names() {
    let json = symbol_map_json(&[entry()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let symbol = &value["symbols"][0];
    assert_eq!(symbol["type"], "Int");
    assert_eq!(symbol["kind"], "global");
    assert_eq!(symbol["definition"]["filename"], "test.fpl");
    assert_eq!(symbol["definition"]["column"], 5);
    assert_eq!(symbol["mutable"], false);
  }

  #[test]
  fn table_has_a_row_per_symbol() {
    let table = format_symbol_table(&[entry()]);
    assert!(table.contains("Name"));
    assert!(table.contains("test.fpl:1.5"));
  }
}

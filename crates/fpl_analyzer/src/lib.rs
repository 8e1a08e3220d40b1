mod binder;
mod const_eval;
mod overload;
pub mod path_context;
mod resolver;
pub mod scope;
pub mod typeck;

use std::collections::HashMap;

use fpl_ast::{ASTProgram, StmtId};
use fpl_config::{DebugTrace, FplConfig};
use fpl_diagnostics::diagnostic_report::Diagnostic;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::{log_dbg, trace_dbg};
use fpl_tst::{Tst, TstId, TstKind, TstNode};
use fpl_type::{
  file::SourceMap,
  function::{FunctionId, FunctionStore},
  span::Span,
  symbol::{SIZE_FIELD_OFFSET, Symbol, SymbolId, SymbolKind, SymbolStore},
  types::{ClassId, EnumId, TypeId, TypeStore},
  value::ConstValue,
};

pub use path_context::{PathContext, merge};
pub use scope::{ScopeId, ScopeKind, ScopeTree};
pub use typeck::{CheckContext, LoopFrame};

/// Name of the function holding a file's top-level statements.
pub const TOP_FUNCTION_NAME: &str = "<top>";

pub struct AnalyzerOutput {
  pub tst: Tst,
  pub types: TypeStore,
  pub symbols: SymbolStore,
  pub functions: FunctionStore,
  pub diagnostics: Vec<Diagnostic>,
  /// Bytes of global storage, addressed from R29.
  pub globals_size: u32,
  /// Holds the top-level statements of every file; `None` when there are none.
  pub top_function: Option<FunctionId>,
}

impl AnalyzerOutput {
  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(|d| d.is_error())
  }
}

/// A `fun` found by the binder. `scope` holds its parameters; its name is bound in `owner`.
struct FunctionDecl {
  stmt: StmtId,
  scope: ScopeId,
  owner: ScopeId,
  class: Option<ClassId>,
}

pub struct Analyzer<'a> {
  config: &'a FplConfig,
  sm: &'a SourceMap,
  ast: &'a ASTProgram,
  types: TypeStore,
  symbols: SymbolStore,
  functions: FunctionStore,
  tst: Tst,
  scopes: ScopeTree,
  path: PathContext,
  diagnostics: Vec<Diagnostic>,
  file_scopes: Vec<ScopeId>,
  function_decls: Vec<FunctionDecl>,
  function_scopes: HashMap<FunctionId, ScopeId>,
  function_of_stmt: HashMap<StmtId, FunctionId>,
  class_decls: Vec<(StmtId, ClassId)>,
  class_of_stmt: HashMap<StmtId, ClassId>,
  class_scopes: HashMap<ClassId, ScopeId>,
  constructor_scopes: HashMap<ClassId, ScopeId>,
  enum_decls: Vec<(StmtId, EnumId)>,
  enum_scopes: HashMap<EnumId, ScopeId>,
  class_inits: HashMap<ClassId, Vec<TstId>>,
  globals_size: u32,
  size_symbol: SymbolId,
  top_function: Option<FunctionId>,
}

impl<'a> Analyzer<'a> {
  pub fn new(
    config: &'a FplConfig,
    sm: &'a SourceMap,
    ast: &'a ASTProgram,
  ) -> Self {
    let types = TypeStore::new();
    let mut symbols = SymbolStore::new();
    let size_symbol = symbols.alloc(Symbol::new(
      "size",
      Span::default(),
      types.int(),
      false,
      SymbolKind::Field {
        class: None,
        offset: SIZE_FIELD_OFFSET,
      },
    ));

    let mut analyzer = Self {
      config,
      sm,
      ast,
      types,
      symbols,
      functions: FunctionStore::new(),
      tst: Tst::new(),
      scopes: ScopeTree::new(),
      path: PathContext::new(),
      diagnostics: Vec::new(),
      file_scopes: Vec::new(),
      function_decls: Vec::new(),
      function_scopes: HashMap::new(),
      function_of_stmt: HashMap::new(),
      class_decls: Vec::new(),
      class_of_stmt: HashMap::new(),
      class_scopes: HashMap::new(),
      constructor_scopes: HashMap::new(),
      enum_decls: Vec::new(),
      enum_scopes: HashMap::new(),
      class_inits: HashMap::new(),
      globals_size: 0,
      size_symbol,
      top_function: None,
    };
    analyzer.define_builtins();
    analyzer
  }

  /// Runs the three symbol passes, then checks every file into one typed tree.
  pub fn analyze(
    config: &'a FplConfig,
    sm: &'a SourceMap,
    ast: &'a ASTProgram,
  ) -> AnalyzerOutput {
    let mut analyzer = Analyzer::new(config, sm, ast);

    analyzer.identify_classes();
    analyzer.identify_functions();
    analyzer.identify_fields();
    trace_dbg!(
      config,
      DebugTrace::Analyzer,
      "{} symbols, {} functions identified",
      analyzer.symbols.len(),
      analyzer.functions.len()
    );

    let root = analyzer.check_program();
    analyzer.tst.root = Some(root);
    log_dbg!(config, "typed tree has {} nodes", analyzer.tst.len());

    AnalyzerOutput {
      tst: analyzer.tst,
      types: analyzer.types,
      symbols: analyzer.symbols,
      functions: analyzer.functions,
      diagnostics: analyzer.diagnostics,
      globals_size: analyzer.globals_size,
      top_function: analyzer.top_function,
    }
  }

  fn define_builtins(&mut self) {
    let builtin_types = [
      ("Int", self.types.int()),
      ("Char", self.types.char()),
      ("Real", self.types.real()),
      ("String", self.types.string()),
      ("Bool", self.types.bool()),
      ("Unit", self.types.unit()),
      ("Any", self.types.any()),
      ("Nothing", self.types.nothing()),
    ];
    for (name, ty) in builtin_types {
      let symbol = self
        .symbols
        .alloc(Symbol::new(name, Span::default(), ty, false, SymbolKind::TypeName));
      let _ = self.scopes.define(name, symbol);
    }

    let constants = [
      ("null", 0, self.types.null()),
      ("true", 1, self.types.bool()),
      ("false", 0, self.types.bool()),
    ];
    for (name, value, ty) in constants {
      let symbol = self.symbols.alloc(Symbol::new(
        name,
        Span::default(),
        ty,
        false,
        SymbolKind::Constant(ConstValue::Int { value, ty }),
      ));
      let _ = self.scopes.define(name, symbol);
    }
  }

  fn add_diagnostic(
    &mut self,
    diagnostic: Diagnostic,
  ) {
    self.diagnostics.push(diagnostic);
  }

  fn location(
    &self,
    span: &Span,
  ) -> String {
    self.sm.location(span)
  }

  /// Allocates `symbol` and binds it in the current scope. A clash is reported
  /// and the new symbol is still returned so checking can carry on.
  fn define_symbol(
    &mut self,
    symbol: Symbol,
  ) -> SymbolId {
    let scope = self.scopes.current();
    self.define_symbol_in(scope, symbol)
  }

  fn define_symbol_in(
    &mut self,
    scope: ScopeId,
    symbol: Symbol,
  ) -> SymbolId {
    let name = symbol.name.clone();
    let span = symbol.span.clone();
    let id = self.symbols.alloc(symbol);

    match self.scopes.define_in(scope, &name, id) {
      Ok(()) => {
        if self.scopes.get_scope(&scope).kind == ScopeKind::File {
          // File-scope names are visible to later files; on a clash the first file wins.
          let global = self.scopes.global();
          let _ = self.scopes.define_in(global, &name, id);
        }
      },
      Err(existing) => {
        let previous_span = self.symbols.get(&existing).span.clone();
        self.add_diagnostic(
          DiagnosticMessage::DuplicateSymbol {
            name,
            span,
            previous: self.location(&previous_span),
            previous_span,
          }
          .report(),
        );
      },
    }

    id
  }

  fn alloc_node(
    &mut self,
    kind: TstKind,
    span: &Span,
    ty: TypeId,
  ) -> TstId {
    self.tst.alloc(TstNode {
      kind,
      span: span.clone(),
      ty,
    })
  }

  /// Reports `message` and returns an Error-typed leaf in its place.
  fn error_node(
    &mut self,
    message: DiagnosticMessage,
  ) -> TstId {
    let span = message.primary_span();
    let text = message.to_string();
    self.add_diagnostic(message.report());
    self.silent_error(&span, text)
  }

  /// An Error-typed leaf for a failure that was already reported elsewhere.
  fn silent_error(
    &mut self,
    span: &Span,
    text: String,
  ) -> TstId {
    let ty = self.types.error();
    self.alloc_node(TstKind::Error(text), span, ty)
  }

  fn allocate_global(
    &mut self,
    ty: &TypeId,
  ) -> u32 {
    let size = self.types.size_in_bytes(ty);
    let align = self.types.alignment(ty).max(1);
    let offset = (self.globals_size + align - 1) & !(align - 1);
    self.globals_size = offset + size;
    offset
  }
}

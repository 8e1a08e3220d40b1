use std::mem;

use fpl_ast::{
  StmtId,
  statements::{ASTClass, ASTEnum, ASTFunction, ASTParameter, ASTParameterKind, ASTStatement},
};
use fpl_config::DebugTrace;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::trace_dbg;
use fpl_tst::{AluOp, TstId, TstKind};
use fpl_type::{
  BytePosition,
  function::{FunctionDef, FunctionId, FunctionInstance, FunctionKind, param_list},
  span::Span,
  symbol::{Symbol, SymbolId, SymbolKind},
  types::{ClassId, EnumColumn, EnumId, Substitution, Type, TypeId},
  value::ConstValue,
};

use crate::{Analyzer, FunctionDecl, PathContext, ScopeId, ScopeKind, TOP_FUNCTION_NAME, typeck::CheckContext};

impl<'a> Analyzer<'a> {
  // #region identifyClasses

  /// Creates a scope per file, and a type for every class and enum wherever
  /// it is declared. Function scopes are created here too so that types
  /// declared inside a body have somewhere to live.
  pub(crate) fn identify_classes(&mut self) {
    let ast = self.ast;
    for file in &ast.files {
      let global = self.scopes.global();
      self.scopes.set_current(global);
      let file_scope = self.scopes.push(ScopeKind::File);
      self.file_scopes.push(file_scope);
      self.identify_types_in(&file.statements, file_scope, file_scope, true);
    }
  }

  fn identify_types_in(
    &mut self,
    stmts: &[StmtId],
    scope: ScopeId,
    file_scope: ScopeId,
    top_level: bool,
  ) {
    let ast = self.ast;
    for stmt_id in stmts {
      match ast.stmt(stmt_id) {
        ASTStatement::Class(class) => {
          let (id, class_scope) = self.declare_class(*stmt_id, class, scope, file_scope);
          for member in &class.body {
            if let ASTStatement::Function(method) = ast.stmt(member) {
              let method_scope = self.declare_function(*member, class_scope, Some(id));
              self.identify_types_in(&method.body, method_scope, file_scope, false);
            }
          }
        },
        ASTStatement::Enum(decl) => self.declare_enum(*stmt_id, decl, scope, file_scope),
        ASTStatement::Function(function) if top_level => {
          let function_scope = self.declare_function(*stmt_id, scope, None);
          self.identify_types_in(&function.body, function_scope, file_scope, false);
        },
        ASTStatement::If { clauses, .. } => {
          for clause in clauses {
            self.identify_types_in(&clause.body, scope, file_scope, false);
          }
        },
        ASTStatement::When { clauses, .. } => {
          for clause in clauses {
            self.identify_types_in(&clause.body, scope, file_scope, false);
          }
        },
        ASTStatement::While { body, .. } | ASTStatement::Repeat { body, .. } | ASTStatement::For { body, .. } => {
          self.identify_types_in(body, scope, file_scope, false);
        },
        _ => {},
      }
    }
  }

  fn declare_class(
    &mut self,
    stmt: StmtId,
    class: &ASTClass,
    scope: ScopeId,
    file_scope: ScopeId,
  ) -> (ClassId, ScopeId) {
    let id = self.types.new_class(&class.name, class.span.clone(), &class.type_params);
    let ty = self.types.class_self_type(id);
    let name = Symbol::new(&class.name, class.span.clone(), ty, false, SymbolKind::TypeName);
    let name_symbol = self.define_symbol_in(scope, name);

    self.scopes.set_current(file_scope);
    let class_scope = self.scopes.push(ScopeKind::Class);
    if scope != file_scope {
      let _ = self.scopes.define_in(class_scope, &class.name, name_symbol);
    }

    let params = self.types.class(&id).type_params.clone();
    for (name, param) in class.type_params.iter().zip(params) {
      self.define_symbol_in(
        class_scope,
        Symbol::new(name, class.span.clone(), param, false, SymbolKind::TypeName),
      );
    }

    self.class_decls.push((stmt, id));
    self.class_of_stmt.insert(stmt, id);
    self.class_scopes.insert(id, class_scope);
    (id, class_scope)
  }

  fn declare_enum(
    &mut self,
    stmt: StmtId,
    decl: &ASTEnum,
    scope: ScopeId,
    file_scope: ScopeId,
  ) {
    let id = self.types.new_enum(&decl.name, decl.span.clone());
    let ty = self.types.enum_type(id);
    self.define_symbol_in(
      scope,
      Symbol::new(&decl.name, decl.span.clone(), ty, false, SymbolKind::TypeName),
    );

    self.scopes.set_current(file_scope);
    let enum_scope = self.scopes.push(ScopeKind::Enum);
    for (index, value) in decl.values.iter().enumerate() {
      let constant = ConstValue::Int {
        value: index as i32,
        ty,
      };
      self.define_symbol_in(
        enum_scope,
        Symbol::new(&value.name, value.span.clone(), ty, false, SymbolKind::Constant(constant)),
      );
      self.types.enum_def_mut(&id).values.push(value.name.clone());
    }

    self.enum_decls.push((stmt, id));
    self.enum_scopes.insert(id, enum_scope);
  }

  /// Opens the parameter scope of a function under `owner`, where its name will be bound.
  fn declare_function(
    &mut self,
    stmt: StmtId,
    owner: ScopeId,
    class: Option<ClassId>,
  ) -> ScopeId {
    self.scopes.set_current(owner);
    let scope = self.scopes.push(ScopeKind::Function);
    self.function_decls.push(FunctionDecl {
      stmt,
      scope,
      owner,
      class,
    });
    scope
  }

  // #endregion identifyClasses

  // #region identifyFunctions

  pub(crate) fn identify_functions(&mut self) {
    let ast = self.ast;
    let decls = mem::take(&mut self.function_decls);

    for decl in &decls {
      let ASTStatement::Function(function) = ast.stmt(&decl.stmt) else {
        continue;
      };
      let id = self.define_function(decl, function);
      self.function_of_stmt.insert(decl.stmt, id);
      self.function_scopes.insert(id, decl.scope);
    }
  }

  fn define_function(
    &mut self,
    decl: &FunctionDecl,
    function: &ASTFunction,
  ) -> FunctionId {
    self.scopes.set_current(decl.scope);

    let this_symbol = match decl.class {
      Some(class) => {
        let ty = self.types.class_self_type(class);
        Some(self.define_symbol(Symbol::new("this", function.span.clone(), ty, false, SymbolKind::Var)))
      },
      None => None,
    };
    let params = self.define_parameters(&function.parameters, function.is_vararg);
    let return_type = match &function.return_type {
      Some(syntax) => self.resolve_type(syntax),
      None => self.types.unit(),
    };

    let mut def = FunctionDef {
      name: function.name.clone(),
      qualified: String::new(),
      span: function.span.clone(),
      params,
      this_symbol,
      is_vararg: function.is_vararg,
      return_type,
      class: decl.class,
      kind: FunctionKind::User,
    };
    let prefix = decl.class.map(|c| self.types.class(&c).name.clone()).unwrap_or_default();
    let param_types = def.param_types(&self.symbols, &self.types);
    def.qualified = format!(
      "{}/{}({})",
      prefix,
      function.name,
      param_list(&self.types, &param_types, function.is_vararg)
    );

    let id = self.functions.alloc(def);
    self.bind_function_name(id, decl.owner, decl.class);
    id
  }

  /// Parameters are immutable locals of the function scope. A vararg parameter
  /// is an array inside the body.
  fn define_parameters(
    &mut self,
    parameters: &[ASTParameter],
    is_vararg: bool,
  ) -> Vec<SymbolId> {
    let last = parameters.len().saturating_sub(1);
    let mut symbols = Vec::with_capacity(parameters.len());

    for (index, param) in parameters.iter().enumerate() {
      let mut ty = self.resolve_type(&param.type_);
      if is_vararg && index == last {
        ty = self.types.array(ty);
      }
      symbols.push(self.define_symbol(Symbol::new(&param.name, param.span.clone(), ty, false, SymbolKind::Var)));
    }

    symbols
  }

  /// Adds the function to the overload set of its name in `owner`, creating the set if needed.
  fn bind_function_name(
    &mut self,
    id: FunctionId,
    owner: ScopeId,
    class: Option<ClassId>,
  ) {
    let instance = FunctionInstance::create(id, &self.functions, &self.symbols, &mut self.types, &Substitution::new());
    let def = self.functions.get(&id);
    let (name, span) = (def.name.clone(), def.span.clone());

    let Some(existing) = self.scopes.lookup_in(owner, &name) else {
      let ty = self
        .types
        .function(instance.param_types.clone(), instance.return_type, instance.is_vararg);
      let symbol = self.define_symbol_in(
        owner,
        Symbol::new(
          &name,
          span,
          ty,
          false,
          SymbolKind::Function {
            overloads: vec![instance],
          },
        ),
      );
      if let Some(class) = class {
        self.types.class_mut(&class).members.insert(name, symbol);
      }
      return;
    };

    let existing_symbol = self.symbols.get(&existing);
    let (is_function, previous_span) = match &existing_symbol.kind {
      SymbolKind::Function { overloads } => (
        true,
        overloads
          .iter()
          .find(|o| o.same_signature(&instance))
          .map(|o| self.functions.get(&o.function).span.clone()),
      ),
      _ => (false, Some(existing_symbol.span.clone())),
    };

    match (is_function, previous_span) {
      (true, None) => {
        if let SymbolKind::Function { overloads } = &mut self.symbols.get_mut(&existing).kind {
          overloads.push(instance);
        }
      },
      (true, Some(previous_span)) => {
        self.add_diagnostic(
          DiagnosticMessage::DuplicateFunction {
            signature: instance.signature(&self.types),
            span,
            previous: self.location(&previous_span),
            previous_span,
          }
          .report(),
        );
      },
      (false, previous_span) => {
        let previous_span = previous_span.unwrap_or_default();
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
  }

  // #endregion identifyFunctions

  // #region identifyFields

  pub(crate) fn identify_fields(&mut self) {
    let ast = self.ast;

    for (file, scope) in ast.files.iter().zip(self.file_scopes.clone()) {
      self.scopes.set_current(scope);
      for stmt in &file.statements {
        if let ASTStatement::Const(decl) = ast.stmt(stmt) {
          self.define_const(decl);
        }
      }
    }

    // Every constructor exists before any field initialiser is checked.
    let classes = self.class_decls.clone();
    for (stmt, class) in &classes {
      if let ASTStatement::Class(decl) = ast.stmt(stmt) {
        self.define_constructor(*class, decl);
      }
    }
    for (stmt, class) in &classes {
      if let ASTStatement::Class(decl) = ast.stmt(stmt) {
        self.define_fields(*class, decl);
      }
    }

    let enums = self.enum_decls.clone();
    for (stmt, id) in &enums {
      if let ASTStatement::Enum(decl) = ast.stmt(stmt) {
        self.define_enum_columns(*id, decl);
      }
    }
  }

  fn define_constructor(
    &mut self,
    class: ClassId,
    decl: &ASTClass,
  ) {
    let Some(&class_scope) = self.class_scopes.get(&class) else {
      return;
    };
    self.scopes.set_current(class_scope);
    let scope = self.scopes.push(ScopeKind::Function);

    let this_type = self.types.class_self_type(class);
    let this = self.define_symbol(Symbol::new("this", decl.span.clone(), this_type, false, SymbolKind::Var));
    let params = self.define_parameters(&decl.parameters, false);

    let mut def = FunctionDef {
      name: decl.name.clone(),
      qualified: String::new(),
      span: decl.span.clone(),
      params,
      this_symbol: Some(this),
      is_vararg: false,
      return_type: self.types.unit(),
      class: Some(class),
      kind: FunctionKind::Constructor,
    };
    let param_types = def.param_types(&self.symbols, &self.types);
    def.qualified = format!("{}/new({})", decl.name, param_list(&self.types, &param_types, false));

    let id = self.functions.alloc(def);
    self.types.class_mut(&class).constructor = Some(id);
    self.constructor_scopes.insert(class, scope);
    self.function_scopes.insert(id, scope);
  }

  /// `val`/`var` constructor parameters and body declarations become fields,
  /// each initialised by an assignment in the constructor.
  fn define_fields(
    &mut self,
    class: ClassId,
    decl: &ASTClass,
  ) {
    let (Some(&class_scope), Some(&constructor_scope)) =
      (self.class_scopes.get(&class), self.constructor_scopes.get(&class))
    else {
      return;
    };
    let Some(constructor) = self.types.class(&class).constructor else {
      return;
    };
    let def = self.functions.get(&constructor);
    let Some(this) = def.this_symbol else {
      return;
    };
    let params = def.params.clone();

    self.scopes.set_current(constructor_scope);
    self.path = PathContext::new();
    let mut ctx = CheckContext::for_function(constructor, self.types.unit());
    let mut inits = Vec::new();

    for (param, symbol) in decl.parameters.iter().zip(params) {
      if param.kind == ASTParameterKind::Plain {
        continue;
      }
      let ty = self.symbols.get(&symbol).ty;
      let field = self.define_field(
        class,
        class_scope,
        &param.name,
        &param.span,
        ty,
        param.kind == ASTParameterKind::Var,
      );
      let value = self.alloc_node(TstKind::Variable(symbol), &param.span, ty);
      inits.push(self.field_init(this, field, value, &param.span));
    }

    let ast = self.ast;
    for member in &decl.body {
      let ASTStatement::Variable(variable) = ast.stmt(member) else {
        continue;
      };
      let value = variable.value.map(|v| self.check_expr(v, &mut ctx));
      let ty = self.declared_type(&variable.name, variable.type_.as_ref(), value, &variable.span);
      let value = value.map(|v| self.coerce(v, ty));

      let field = self.define_field(
        class,
        class_scope,
        &variable.name,
        &variable.span,
        ty,
        variable.mutable,
      );
      if let Some(value) = value {
        inits.push(self.field_init(this, field, value, &variable.span));
      }
    }

    trace_dbg!(
      self.config,
      DebugTrace::Analyzer,
      "class {} has {} bytes of fields",
      decl.name,
      self.types.class(&class).size
    );
    self.class_inits.insert(class, inits);
  }

  fn define_field(
    &mut self,
    class: ClassId,
    class_scope: ScopeId,
    name: &str,
    span: &Span,
    ty: TypeId,
    mutable: bool,
  ) -> SymbolId {
    let size = self.types.size_in_bytes(&ty);
    let align = self.types.alignment(&ty);
    let offset = self.types.class_mut(&class).allocate_field(size, align) as i32;

    let kind = match self.types.get(&ty) {
      Type::InlineArray { .. } => SymbolKind::InlineField { class, offset },
      _ => SymbolKind::Field {
        class: Some(class),
        offset,
      },
    };
    let symbol = self.define_symbol_in(class_scope, Symbol::new(name, span.clone(), ty, mutable, kind));

    let def = self.types.class_mut(&class);
    def.members.insert(name.to_string(), symbol);
    def.fields.push(symbol);
    symbol
  }

  /// `this.field = value`
  fn field_init(
    &mut self,
    this: SymbolId,
    field: SymbolId,
    value: TstId,
    span: &Span,
  ) -> TstId {
    let this_type = self.symbols.get(&this).ty;
    let field_type = self.symbols.get(&field).ty;
    let object = self.alloc_node(TstKind::Variable(this), span, this_type);
    let target = self.alloc_node(TstKind::Member { object, field }, span, field_type);
    let unit = self.types.unit();
    self.alloc_node(
      TstKind::Assign {
        op: AluOp::EqI,
        target,
        value,
      },
      span,
      unit,
    )
  }

  fn define_enum_columns(
    &mut self,
    id: EnumId,
    decl: &ASTEnum,
  ) {
    let Some(&scope) = self.enum_scopes.get(&id) else {
      return;
    };
    self.scopes.set_current(scope);

    let mut columns = Vec::with_capacity(decl.parameters.len());
    for param in &decl.parameters {
      let ty = self.resolve_type(&param.type_);
      columns.push(EnumColumn {
        name: param.name.clone(),
        ty,
        values: Vec::new(),
      });
    }

    let mut ctx = CheckContext::top_level();
    for value in &decl.values {
      if value.args.len() != columns.len() {
        self.add_diagnostic(
          DiagnosticMessage::EnumValueArity {
            name: value.name.clone(),
            expected: columns.len(),
            got: value.args.len(),
            span: value.span.clone(),
          }
          .report(),
        );
      }

      for (index, column) in columns.iter_mut().enumerate() {
        let folded = match value.args.get(index) {
          Some(arg) => {
            let node = self.check_expr(*arg, &mut ctx);
            let node = self.coerce(node, column.ty);
            let folded = self.eval_const(node);
            if folded.is_none() && !self.types.is_error(&self.tst.ty(node)) {
              let span = self.ast.expr(arg).span().clone();
              self.add_diagnostic(DiagnosticMessage::NotConstant(span).report());
            }
            folded
          },
          None => None,
        };
        column.values.push(folded.unwrap_or(ConstValue::Int {
          value: 0,
          ty: column.ty,
        }));
      }
    }

    self.types.enum_def_mut(&id).columns = columns;
  }

  // #endregion identifyFields

  // #region Checking

  /// Checks every file in its own scope and collects them under one `Top` node.
  pub(crate) fn check_program(&mut self) -> TstId {
    let ast = self.ast;
    let unit = self.types.unit();
    let mut files = Vec::with_capacity(ast.files.len());

    for (file, scope) in ast.files.iter().zip(self.file_scopes.clone()) {
      if file.statements.iter().any(|s| is_executable(ast.stmt(s))) {
        self.ensure_top_function();
      }

      self.scopes.set_current(scope);
      self.path = PathContext::new();
      let mut ctx = CheckContext::top_level();
      let body = self.check_stmts(&file.statements, &mut ctx);

      let name = self.sm.get(&file.file).module_name().to_string();
      let span = Span::empty_at(file.file, BytePosition(0));
      files.push(self.alloc_node(TstKind::File { name, body }, &span, unit));
    }

    let span = files.first().map(|f| self.tst.get(*f).span.clone()).unwrap_or_default();
    self.alloc_node(TstKind::Top(files), &span, unit)
  }

  /// Top-level statements run, in file order, from one synthetic function.
  fn ensure_top_function(&mut self) -> FunctionId {
    if let Some(id) = self.top_function {
      return id;
    }

    let id = self.functions.alloc(FunctionDef {
      name: TOP_FUNCTION_NAME.to_string(),
      qualified: TOP_FUNCTION_NAME.to_string(),
      span: Span::default(),
      params: Vec::new(),
      this_symbol: None,
      is_vararg: false,
      return_type: self.types.unit(),
      class: None,
      kind: FunctionKind::User,
    });
    self.top_function = Some(id);
    id
  }

  pub(crate) fn check_function(
    &mut self,
    stmt: StmtId,
    function: &ASTFunction,
  ) -> Option<TstId> {
    let id = *self.function_of_stmt.get(&stmt)?;
    let scope = *self.function_scopes.get(&id)?;
    let return_type = self.functions.get(&id).return_type;
    trace_dbg!(
      self.config,
      DebugTrace::Analyzer,
      "checking {}",
      self.functions.get(&id).qualified
    );

    let saved_path = mem::replace(&mut self.path, PathContext::new());
    let saved_scope = self.scopes.current();
    self.scopes.set_current(scope);

    let mut ctx = CheckContext::for_function(id, return_type);
    let body = self.check_stmts(&function.body, &mut ctx);

    if !self.path.unreachable && self.functions.get(&id).returns_value(&self.types) {
      self.add_diagnostic(
        DiagnosticMessage::MissingReturn {
          name: function.name.clone(),
          span: function.span.clone(),
        }
        .report(),
      );
    }

    self.path = saved_path;
    self.scopes.set_current(saved_scope);

    let unit = self.types.unit();
    Some(self.alloc_node(TstKind::Function { function: id, body }, &function.span, unit))
  }

  /// The class node carries the constructor's field initialisation, then the methods.
  pub(crate) fn check_class(
    &mut self,
    stmt: StmtId,
    class: &ASTClass,
  ) -> Option<TstId> {
    let id = *self.class_of_stmt.get(&stmt)?;
    let constructor = self.types.class(&id).constructor?;

    let ast = self.ast;
    let mut methods = Vec::new();
    for member in &class.body {
      if let ASTStatement::Function(method) = ast.stmt(member) {
        methods.extend(self.check_function(*member, method));
      }
    }

    let body = self.class_inits.remove(&id).unwrap_or_default();
    let unit = self.types.unit();
    Some(self.alloc_node(
      TstKind::Class {
        class: id,
        constructor,
        body,
        methods,
      },
      &class.span,
      unit,
    ))
  }

  // #endregion Checking
}

fn is_executable(stmt: &ASTStatement) -> bool {
  !matches!(
    stmt,
    ASTStatement::Function(_)
      | ASTStatement::Class(_)
      | ASTStatement::Enum(_)
      | ASTStatement::Const(_)
      | ASTStatement::Null(_)
  )
}

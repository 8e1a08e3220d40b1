use fpl_ast::type_::FplTypeSyntax;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_type::{
  span::Span,
  symbol::SymbolKind,
  types::{Type, TypeId},
  value::ConstValue,
};

use crate::{Analyzer, typeck::CheckContext};

impl<'a> Analyzer<'a> {
  /// Resolves a written type in the current scope. Failures are reported and give Error.
  pub(crate) fn resolve_type(
    &mut self,
    syntax: &FplTypeSyntax,
  ) -> TypeId {
    match syntax {
      FplTypeSyntax::Named { name, args, span } => self.resolve_named(name, args, span, false),
      FplTypeSyntax::Array { element, span } => match element {
        Some(element) => {
          let element = self.resolve_type(element);
          self.types.array(element)
        },
        None => {
          self.add_diagnostic(
            DiagnosticMessage::WrongTypeArgCount {
              name: "Array".to_string(),
              expected: 1,
              got: 0,
              span: span.clone(),
            }
            .report(),
          );
          self.types.error()
        },
      },
      FplTypeSyntax::FixedArray { element, size, span } => {
        let element = self.resolve_type(element);
        let mut ctx = CheckContext::top_level();
        let size_node = self.check_expr(*size, &mut ctx);
        match self.eval_const(size_node) {
          Some(ConstValue::Int { value, .. }) if value >= 0 => self.types.inline_array(element, value as u32),
          _ => {
            self.add_diagnostic(DiagnosticMessage::NotConstant(span.clone()).report());
            self.types.error()
          },
        }
      },
      FplTypeSyntax::Range { element, .. } => {
        let element = self.resolve_type(element);
        self.types.range(element)
      },
      FplTypeSyntax::Nullable { inner, .. } => {
        let inner = self.resolve_type(inner);
        self.types.nullable(inner)
      },
      FplTypeSyntax::ErrorUnion { inner, span } => {
        let inner = self.resolve_type(inner);
        if !self.types.can_be_error_union(&inner) {
          self.add_diagnostic(
            DiagnosticMessage::InvalidErrorUnion {
              ty: self.types.display(&inner),
              span: span.clone(),
            }
            .report(),
          );
          return self.types.error();
        }
        self.types.error_union(inner)
      },
    }
  }

  /// Like `resolve_type`, but a generic class may be named without arguments
  /// (`new Box(10)`); its own type parameters are then left in place for inference.
  pub(crate) fn resolve_constructed_type(
    &mut self,
    syntax: &FplTypeSyntax,
  ) -> TypeId {
    match syntax {
      FplTypeSyntax::Named { name, args, span } => self.resolve_named(name, args, span, true),
      _ => self.resolve_type(syntax),
    }
  }

  fn resolve_named(
    &mut self,
    name: &str,
    args: &[FplTypeSyntax],
    span: &Span,
    allow_uninstantiated: bool,
  ) -> TypeId {
    let Some(symbol) = self.scopes.lookup(name) else {
      self.add_diagnostic(
        DiagnosticMessage::UnknownType {
          name: name.to_string(),
          span: span.clone(),
        }
        .report(),
      );
      return self.types.error();
    };

    let symbol = self.symbols.get(&symbol);
    let (is_type, ty) = (matches!(symbol.kind, SymbolKind::TypeName), symbol.ty);
    if !is_type {
      self.add_diagnostic(
        DiagnosticMessage::NotAType {
          name: name.to_string(),
          span: span.clone(),
        }
        .report(),
      );
      return self.types.error();
    }

    let class = match self.types.get(&ty) {
      Type::Class { class, .. } => Some(*class),
      _ => None,
    };
    let expected = class.map(|c| self.types.class(&c).type_params.len()).unwrap_or(0);

    if args.is_empty() && (expected == 0 || allow_uninstantiated) {
      return ty;
    }

    if args.len() != expected {
      self.add_diagnostic(
        DiagnosticMessage::WrongTypeArgCount {
          name: name.to_string(),
          expected,
          got: args.len(),
          span: span.clone(),
        }
        .report(),
      );
      return self.types.error();
    }

    let args: Vec<TypeId> = args.iter().map(|a| self.resolve_type(a)).collect();
    match class {
      Some(class) => self.types.class_instance(class, args),
      None => ty,
    }
  }
}

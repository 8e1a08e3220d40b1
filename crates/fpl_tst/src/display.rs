use fpl_type::{
  function::{FunctionStore, param_list},
  symbol::SymbolStore,
  types::TypeStore,
};

use crate::{Tst, TstId, TstKind};

/// Renders the typed tree one node per line, children indented by two spaces.
pub struct TstPrinter<'a> {
  tst: &'a Tst,
  types: &'a TypeStore,
  symbols: &'a SymbolStore,
  functions: &'a FunctionStore,
  indent: usize,
  output: String,
}

impl<'a> TstPrinter<'a> {
  pub fn new(
    tst: &'a Tst,
    types: &'a TypeStore,
    symbols: &'a SymbolStore,
    functions: &'a FunctionStore,
  ) -> Self {
    Self {
      tst,
      types,
      symbols,
      functions,
      indent: 0,
      output: String::new(),
    }
  }

  pub fn print(mut self) -> String {
    if let Some(root) = self.tst.root {
      self.print_node(root);
    }
    self.output
  }

  pub fn print_from(
    mut self,
    id: TstId,
  ) -> String {
    self.print_node(id);
    self.output
  }

  fn line(
    &mut self,
    text: String,
  ) {
    self.output.push_str(&"  ".repeat(self.indent));
    self.output.push_str(&text);
    self.output.push('\n');
  }

  fn children(
    &mut self,
    ids: &[TstId],
  ) {
    self.indent += 1;
    for id in ids {
      self.print_node(*id);
    }
    self.indent -= 1;
  }

  fn child(
    &mut self,
    id: TstId,
  ) {
    self.children(&[id]);
  }

  fn print_node(
    &mut self,
    id: TstId,
  ) {
    let node = self.tst.get(id);
    let ty = self.types.display(&node.ty);

    match &node.kind {
      TstKind::IntLit(value) => self.line(format!("int: {} ({})", value, ty)),
      TstKind::RealLit(value) => self.line(format!("real: {} ({})", format_real(*value), ty)),
      TstKind::StringLit(value) => self.line(format!("string: \"{}\" ({})", value, ty)),
      TstKind::Variable(symbol) => {
        let name = &self.symbols.get(symbol).name;
        self.line(format!("var: {} ({})", name, ty));
      },
      TstKind::Global(symbol) => {
        let name = &self.symbols.get(symbol).name;
        self.line(format!("global: {} ({})", name, ty));
      },
      TstKind::FunctionName { symbol, .. } => {
        let name = &self.symbols.get(symbol).name;
        self.line(format!("function: {} ({})", name, ty));
      },
      TstKind::Binary { op, left, right } => {
        self.line(format!("{} ({})", op, ty));
        self.children(&[*left, *right]);
      },
      TstKind::And { left, right } => {
        self.line(format!("and ({})", ty));
        self.children(&[*left, *right]);
      },
      TstKind::Or { left, right } => {
        self.line(format!("or ({})", ty));
        self.children(&[*left, *right]);
      },
      TstKind::Not(operand) => {
        self.line(format!("not ({})", ty));
        self.child(*operand);
      },
      TstKind::Minus(operand) => {
        self.line(format!("minus ({})", ty));
        self.child(*operand);
      },
      TstKind::Index { array, index } => {
        self.line(format!("index ({})", ty));
        self.children(&[*array, *index]);
      },
      TstKind::Member { object, field } => {
        let name = &self.symbols.get(field).name;
        self.line(format!("member: {} ({})", name, ty));
        self.child(*object);
      },
      TstKind::EnumData { value, enum_id, column } => {
        let name = &self.types.enum_def(enum_id).columns[*column].name;
        self.line(format!("enum-data: {} ({})", name, ty));
        self.child(*value);
      },
      TstKind::Return(value) => {
        self.line(format!("return ({})", ty));
        if let Some(value) = value {
          self.child(*value);
        }
      },
      TstKind::Break => self.line(format!("break ({})", ty)),
      TstKind::Continue => self.line(format!("continue ({})", ty)),
      TstKind::IfExpr {
        condition,
        then_branch,
        else_branch,
      } => {
        self.line(format!("if-expr ({})", ty));
        self.children(&[*condition, *then_branch, *else_branch]);
      },
      TstKind::Range { start, end, op } => {
        self.line(format!("range: {} ({})", op, ty));
        self.children(&[*start, *end]);
      },
      TstKind::Call { callee, args } => {
        self.line(format!("call ({})", ty));
        self.child(*callee);
        self.children(args);
      },
      TstKind::MethodCall {
        receiver,
        function,
        args,
      } => {
        let name = &self.functions.get(function).name;
        self.line(format!("method-call: {} ({})", name, ty));
        self.child(*receiver);
        self.children(args);
      },
      TstKind::CallIndirect { callee, args } => {
        self.line(format!("call ({})", ty));
        self.child(*callee);
        self.children(args);
      },
      TstKind::NewObject { args, local, .. } => {
        let tag = if *local { "local-object" } else { "new-object" };
        self.line(format!("{} ({})", tag, ty));
        self.children(args);
      },
      TstKind::NewArray { size, lambda, local } => {
        let tag = if *local { "local-array" } else { "new-array" };
        self.line(format!("{} ({})", tag, ty));
        self.child(*size);
        if let Some(lambda) = lambda {
          self.indent += 1;
          self.line("lambda: it".to_string());
          self.child(lambda.body);
          self.indent -= 1;
        }
      },
      TstKind::ArrayLiteral { elements, local } => {
        let tag = if *local { "local-array-literal" } else { "array-literal" };
        self.line(format!("{} ({})", tag, ty));
        self.children(elements);
      },
      TstKind::Cast(expression) => {
        self.line(format!("cast ({})", ty));
        self.child(*expression);
      },
      TstKind::Is { expression, target } => {
        self.line(format!("is: {} ({})", self.types.display(target), ty));
        self.child(*expression);
      },
      TstKind::MakeUnion(expression) => {
        self.line(format!("make-union ({})", ty));
        self.child(*expression);
      },
      TstKind::Unwrap(expression) => {
        self.line(format!("unwrap ({})", ty));
        self.child(*expression);
      },
      TstKind::Error(message) => self.line(format!("error: {}", message)),

      TstKind::ExpressionStatement(expression) => {
        self.line("expr-stmt".to_string());
        self.child(*expression);
      },
      TstKind::Assign { op, target, value } => {
        self.line(format!("assign {}", op));
        self.children(&[*target, *value]);
      },
      TstKind::Declaration { symbol, value } => {
        self.line(format!("decl: {}", self.symbols.details(symbol, self.types)));
        if let Some(value) = value {
          self.child(*value);
        }
      },
      TstKind::Free(expression) => {
        self.line("free".to_string());
        self.child(*expression);
      },
      TstKind::Print(args) => {
        self.line("print".to_string());
        self.children(args);
      },
      TstKind::Null => self.line("null-stmt".to_string()),
      TstKind::If(clauses) => {
        self.line("if".to_string());
        self.children(clauses);
      },
      TstKind::IfClause { condition, body } => {
        self.line("if-clause".to_string());
        if let Some(condition) = condition {
          self.child(*condition);
        }
        self.children(body);
      },
      TstKind::While { condition, body } => {
        self.line("while".to_string());
        self.child(*condition);
        self.children(body);
      },
      TstKind::Repeat { condition, body } => {
        self.line("repeat".to_string());
        self.child(*condition);
        self.children(body);
      },
      TstKind::For {
        variable,
        iterable,
        body,
      } => {
        self.line(format!("for: {}", self.symbols.get(variable).name));
        self.child(*iterable);
        self.children(body);
      },
      TstKind::When { subject, clauses } => {
        self.line("when".to_string());
        self.child(*subject);
        self.children(clauses);
      },
      TstKind::WhenClause { values, body } => {
        if values.is_empty() {
          self.line("when-else".to_string());
        } else {
          self.line("when-clause".to_string());
        }
        self.children(values);
        self.children(body);
      },
      TstKind::Function { function, body } => {
        let def = self.functions.get(function);
        let params = def.param_types(self.symbols, self.types);
        let signature = format!("{}({})", def.name, param_list(self.types, &params, def.is_vararg));
        self.line(format!("function: {}", signature));
        self.children(body);
      },
      TstKind::Class { class, body, methods, .. } => {
        self.line(format!("class: {}", self.types.class(class).name));
        self.children(body);
        self.children(methods);
      },
      TstKind::File { name, body } => {
        self.line(format!("file: {}", name));
        self.children(body);
      },
      TstKind::Top(body) => {
        self.line("top".to_string());
        self.children(body);
      },
    }
  }
}

/// Reals always show a fractional part: `4.0`, `20.2`.
pub fn format_real(value: f64) -> String {
  if value.fract() == 0.0 && value.is_finite() {
    format!("{:.1}", value)
  } else {
    format!("{}", value)
  }
}

#[cfg(test)]
mod tests {
  use fpl_type::span::Span;

  use super::*;
  use crate::{AluOp, TstNode};

  #[test]
  fn nested_nodes_indent_by_two() {
    let types = TypeStore::new();
    let symbols = SymbolStore::new();
    let functions = FunctionStore::new();
    let mut tst = Tst::new();

    let int = types.int();
    let one = tst.alloc(TstNode {
      kind: TstKind::IntLit(1),
      span: Span::default(),
      ty: int,
    });
    let two = tst.alloc(TstNode {
      kind: TstKind::RealLit(4.0),
      span: Span::default(),
      ty: types.real(),
    });
    let sum = tst.alloc(TstNode {
      kind: TstKind::Binary {
        op: AluOp::AddI,
        left: one,
        right: two,
      },
      span: Span::default(),
      ty: int,
    });

    let text = TstPrinter::new(&tst, &types, &symbols, &functions).print_from(sum);
    assert_eq!(text, "ADD_I (Int)\n  int: 1 (Int)\n  real: 4.0 (Real)\n");
  }

  #[test]
  fn reals_keep_a_fraction() {
    assert_eq!(format_real(4.0), "4.0");
    assert_eq!(format_real(20.2), "20.2");
    assert_eq!(format_real(-0.5), "-0.5");
  }
}

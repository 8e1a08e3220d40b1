//! Indented tree dump of the AST, one node per line, one space per level.
//!
//! ```text
//! File test
//!  Decl VAL x
//!   Binop PLUS
//!    Intlit 1
//!    Intlit 2
//! ```

use crate::{
  ASTProgram, ExprId, StmtId,
  expressions::{ASTExpression, ASTLiteralValue, ASTUnaryOperator},
  statements::{ASTAssignOperator, ASTParameter, ASTParameterKind, ASTStatement},
  type_::FplTypeSyntax,
};

pub fn format_program(program: &ASTProgram) -> String {
  let mut printer = ASTPrinter::new(program);
  for file in &program.files {
    printer.line(0, &format!("File {}", file.name));
    for stmt in &file.statements {
      printer.statement(stmt, 1);
    }
  }
  printer.out
}

/// Reals print like `123.4`, keeping a trailing `.0` on whole numbers.
pub fn format_real(value: f64) -> String {
  if value.fract() == 0.0 && value.is_finite() {
    format!("{:.1}", value)
  } else {
    format!("{}", value)
  }
}

struct ASTPrinter<'a> {
  program: &'a ASTProgram,
  out: String,
}

impl<'a> ASTPrinter<'a> {
  fn new(program: &'a ASTProgram) -> Self {
    Self {
      program,
      out: String::new(),
    }
  }

  fn line(
    &mut self,
    indent: usize,
    text: &str,
  ) {
    self.out.push_str(&" ".repeat(indent));
    self.out.push_str(text);
    self.out.push('\n');
  }

  fn block(
    &mut self,
    body: &[StmtId],
    indent: usize,
  ) {
    for stmt in body {
      self.statement(stmt, indent);
    }
  }

  fn parameter(
    &mut self,
    param: &ASTParameter,
    indent: usize,
  ) {
    let text = match param.kind {
      ASTParameterKind::Plain => format!("Parameter {}", param.name),
      ASTParameterKind::Val => format!("Parameter VAL {}", param.name),
      ASTParameterKind::Var => format!("Parameter VAR {}", param.name),
    };
    self.line(indent, &text);
    self.type_syntax(&param.type_, indent + 1);
  }

  fn type_syntax(
    &mut self,
    ty: &FplTypeSyntax,
    indent: usize,
  ) {
    match ty {
      FplTypeSyntax::Named { name, args, .. } => {
        self.line(indent, &format!("Type {}", name));
        for arg in args {
          self.type_syntax(arg, indent + 1);
        }
      },
      FplTypeSyntax::Array { element, .. } => {
        self.line(indent, "TypeArray");
        if let Some(element) = element {
          self.type_syntax(element, indent + 1);
        }
      },
      FplTypeSyntax::FixedArray { element, size, .. } => {
        self.line(indent, "TypeFixedArray");
        self.type_syntax(element, indent + 1);
        self.expression(size, indent + 1);
      },
      FplTypeSyntax::Range { element, .. } => {
        self.line(indent, "TypeRange");
        self.type_syntax(element, indent + 1);
      },
      FplTypeSyntax::Nullable { inner, .. } => {
        self.line(indent, "TypeNullable");
        self.type_syntax(inner, indent + 1);
      },
      FplTypeSyntax::ErrorUnion { inner, .. } => {
        self.line(indent, "TypeErrorUnion");
        self.type_syntax(inner, indent + 1);
      },
    }
  }

  fn statement(
    &mut self,
    id: &StmtId,
    indent: usize,
  ) {
    let program = self.program;
    match program.stmt(id) {
      ASTStatement::Expression { expression, .. } => {
        self.line(indent, "ExprStmt");
        self.expression(expression, indent + 1);
      },
      ASTStatement::Assign {
        operator, target, value, ..
      } => {
        let text = match operator {
          ASTAssignOperator::Assign => "Assign",
          ASTAssignOperator::AddAssign => "Assign PLUSEQ",
          ASTAssignOperator::SubAssign => "Assign MINUSEQ",
        };
        self.line(indent, text);
        self.expression(target, indent + 1);
        self.expression(value, indent + 1);
      },
      ASTStatement::Variable(var) => {
        let kind = if var.mutable { "VAR" } else { "VAL" };
        self.line(indent, &format!("Decl {} {}", kind, var.name));
        if let Some(ty) = &var.type_ {
          self.type_syntax(ty, indent + 1);
        }
        if let Some(value) = &var.value {
          self.expression(value, indent + 1);
        }
      },
      ASTStatement::Const(c) => {
        self.line(indent, &format!("Const {}", c.name));
        if let Some(ty) = &c.type_ {
          self.type_syntax(ty, indent + 1);
        }
        self.expression(&c.value, indent + 1);
      },
      ASTStatement::Function(func) => {
        self.line(indent, &format!("Function {}", func.name));
        for param in &func.parameters {
          self.parameter(param, indent + 1);
        }
        if let Some(ret) = &func.return_type {
          self.type_syntax(ret, indent + 1);
        }
        self.block(&func.body, indent + 1);
      },
      ASTStatement::Class(class) => {
        self.line(indent, &format!("Class {}", class.name));
        for param in &class.parameters {
          self.parameter(param, indent + 1);
        }
        self.block(&class.body, indent + 1);
      },
      ASTStatement::Enum(e) => {
        self.line(indent, &format!("Enum {}", e.name));
        for param in &e.parameters {
          self.parameter(param, indent + 1);
        }
        for value in &e.values {
          self.line(indent + 1, &format!("EnumValue {}", value.name));
          for arg in &value.args {
            self.expression(arg, indent + 2);
          }
        }
      },
      ASTStatement::If { clauses, .. } => {
        self.line(indent, "If");
        for clause in clauses {
          self.line(indent + 1, "IfClause");
          if let Some(cond) = &clause.condition {
            self.expression(cond, indent + 2);
          }
          self.block(&clause.body, indent + 2);
        }
      },
      ASTStatement::While { condition, body, .. } => {
        self.line(indent, "While");
        self.expression(condition, indent + 1);
        self.block(body, indent + 1);
      },
      ASTStatement::Repeat { body, condition, .. } => {
        self.line(indent, "Repeat");
        self.expression(condition, indent + 1);
        self.block(body, indent + 1);
      },
      ASTStatement::For {
        variable,
        iterable,
        body,
        ..
      } => {
        self.line(indent, &format!("For {}", variable));
        self.expression(iterable, indent + 1);
        self.block(body, indent + 1);
      },
      ASTStatement::When { subject, clauses, .. } => {
        self.line(indent, "When");
        self.expression(subject, indent + 1);
        for clause in clauses {
          if clause.values.is_empty() {
            self.line(indent + 1, "WhenClause else");
          } else {
            self.line(indent + 1, "WhenClause");
          }
          for value in &clause.values {
            self.expression(value, indent + 2);
          }
          self.block(&clause.body, indent + 2);
        }
      },
      ASTStatement::Print { args, .. } => {
        self.line(indent, "Print");
        for arg in args {
          self.expression(arg, indent + 1);
        }
      },
      ASTStatement::Free { expression, .. } => {
        self.line(indent, "Free");
        self.expression(expression, indent + 1);
      },
      ASTStatement::Null(_) => self.line(indent, "NullStmt"),
    }
  }

  fn expression(
    &mut self,
    id: &ExprId,
    indent: usize,
  ) {
    let program = self.program;
    match program.expr(id) {
      ASTExpression::Literal { value, .. } => {
        let text = match value {
          ASTLiteralValue::Int(v) => format!("Intlit {}", v),
          ASTLiteralValue::Real(v) => format!("Reallit {}", format_real(*v)),
          ASTLiteralValue::Char(c) => format!("Charlit {}", c),
          ASTLiteralValue::String(s) => format!("Stringlit {}", s),
        };
        self.line(indent, &text);
      },
      ASTExpression::Identifier { name, .. } => self.line(indent, &format!("Id {}", name)),
      ASTExpression::Binary(binary) => {
        self.line(indent, &format!("Binop {}", binary.operator));
        self.expression(&binary.left, indent + 1);
        self.expression(&binary.right, indent + 1);
      },
      ASTExpression::Unary { operator, operand, .. } => {
        let text = match operator {
          ASTUnaryOperator::Minus => "Minus",
          ASTUnaryOperator::Not => "Not",
        };
        self.line(indent, text);
        self.expression(operand, indent + 1);
      },
      ASTExpression::Index { object, index, .. } => {
        self.line(indent, "Index");
        self.expression(object, indent + 1);
        self.expression(index, indent + 1);
      },
      ASTExpression::Member(member) => {
        self.line(indent, &format!("Member {}", member.name));
        self.expression(&member.object, indent + 1);
      },
      ASTExpression::Call(call) => {
        self.line(indent, "Call");
        self.expression(&call.callee, indent + 1);
        for arg in &call.args {
          self.expression(arg, indent + 1);
        }
      },
      ASTExpression::Range {
        start, end, operator, ..
      } => {
        self.line(indent, &format!("Range {}", operator));
        self.expression(start, indent + 1);
        self.expression(end, indent + 1);
      },
      ASTExpression::Cast { expression, target, .. } => {
        self.line(indent, "Cast");
        self.expression(expression, indent + 1);
        self.type_syntax(target, indent + 1);
      },
      ASTExpression::Is { expression, target, .. } => {
        self.line(indent, "Is");
        self.expression(expression, indent + 1);
        self.type_syntax(target, indent + 1);
      },
      ASTExpression::IfExpr {
        condition,
        then_branch,
        else_branch,
        ..
      } => {
        self.line(indent, "IfExpr");
        self.expression(condition, indent + 1);
        self.expression(then_branch, indent + 1);
        self.expression(else_branch, indent + 1);
      },
      ASTExpression::New(new) => {
        self.line(indent, if new.local { "Local" } else { "New" });
        self.type_syntax(&new.type_, indent + 1);
        for arg in &new.args {
          self.expression(arg, indent + 1);
        }
        if let Some(lambda) = &new.lambda {
          self.expression(lambda, indent + 1);
        }
      },
      ASTExpression::NewInitialiser(init) => {
        self.line(indent, if init.local { "LocalInitialiser" } else { "NewInitialiser" });
        self.type_syntax(&init.type_, indent + 1);
        for element in &init.elements {
          self.expression(element, indent + 1);
        }
      },
      ASTExpression::Lambda { body, .. } => {
        self.line(indent, "Lambda");
        self.expression(body, indent + 1);
      },
      ASTExpression::Return { value, .. } => {
        self.line(indent, "Return");
        if let Some(value) = value {
          self.expression(value, indent + 1);
        }
      },
      ASTExpression::Break(_) => self.line(indent, "Break"),
      ASTExpression::Continue(_) => self.line(indent, "Continue"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reals_keep_a_fraction() {
    assert_eq!(format_real(123.4), "123.4");
    assert_eq!(format_real(4.0), "4.0");
  }
}

use fpl_type::span::Span;

use crate::{ExprId, StmtId, type_::FplTypeSyntax};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASTAssignOperator {
  Assign,
  AddAssign,
  SubAssign,
}

/// `val`/`var` in front of a constructor parameter promotes it to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASTParameterKind {
  Plain,
  Val,
  Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTParameter {
  pub kind: ASTParameterKind,
  pub name: String,
  pub type_: FplTypeSyntax,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTVariable {
  pub mutable: bool,
  pub name: String,
  pub type_: Option<FplTypeSyntax>,
  pub value: Option<ExprId>,
  pub span: Span,
}

impl ASTVariable {
  pub fn new(
    mutable: bool,
    name: String,
    type_: Option<FplTypeSyntax>,
    value: Option<ExprId>,
    span: Span,
  ) -> Self {
    Self {
      mutable,
      name,
      type_,
      value,
      span,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTConst {
  pub name: String,
  pub type_: Option<FplTypeSyntax>,
  pub value: ExprId,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTFunction {
  pub name: String,
  pub parameters: Vec<ASTParameter>,
  pub is_vararg: bool,
  pub return_type: Option<FplTypeSyntax>,
  pub body: Vec<StmtId>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTClass {
  pub name: String,
  pub type_params: Vec<String>,
  pub parameters: Vec<ASTParameter>,
  pub body: Vec<StmtId>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTEnumValue {
  pub name: String,
  pub args: Vec<ExprId>,
  pub span: Span,
}

/// `enum Planet(val mass:Int) [MERCURY(3), VENUS(5)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTEnum {
  pub name: String,
  pub parameters: Vec<ASTParameter>,
  pub values: Vec<ASTEnumValue>,
  pub span: Span,
}

/// `cond` is `None` for the `else` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTIfClause {
  pub condition: Option<ExprId>,
  pub body: Vec<StmtId>,
  pub span: Span,
}

/// An empty `values` list is the `else` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTWhenClause {
  pub values: Vec<ExprId>,
  pub body: Vec<StmtId>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTStatement {
  Expression {
    expression: ExprId,
    span: Span,
  },
  Assign {
    operator: ASTAssignOperator,
    target: ExprId,
    value: ExprId,
    span: Span,
  },
  Variable(ASTVariable),
  Const(ASTConst),
  Function(ASTFunction),
  Class(ASTClass),
  Enum(ASTEnum),
  If {
    clauses: Vec<ASTIfClause>,
    span: Span,
  },
  While {
    condition: ExprId,
    body: Vec<StmtId>,
    span: Span,
  },
  Repeat {
    body: Vec<StmtId>,
    condition: ExprId,
    span: Span,
  },
  For {
    variable: String,
    iterable: ExprId,
    body: Vec<StmtId>,
    span: Span,
  },
  When {
    subject: ExprId,
    clauses: Vec<ASTWhenClause>,
    span: Span,
  },
  Print {
    args: Vec<ExprId>,
    span: Span,
  },
  Free {
    expression: ExprId,
    span: Span,
  },
  /// Placeholder left where a statement failed to parse.
  Null(Span),
}

impl ASTStatement {
  pub fn span(&self) -> &Span {
    match self {
      ASTStatement::Expression { span, .. }
      | ASTStatement::Assign { span, .. }
      | ASTStatement::If { span, .. }
      | ASTStatement::While { span, .. }
      | ASTStatement::Repeat { span, .. }
      | ASTStatement::For { span, .. }
      | ASTStatement::When { span, .. }
      | ASTStatement::Print { span, .. }
      | ASTStatement::Free { span, .. }
      | ASTStatement::Null(span) => span,
      ASTStatement::Variable(v) => &v.span,
      ASTStatement::Const(c) => &c.span,
      ASTStatement::Function(f) => &f.span,
      ASTStatement::Class(c) => &c.span,
      ASTStatement::Enum(e) => &e.span,
    }
  }
}

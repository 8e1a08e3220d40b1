use fpl_type::span::Span;

use crate::{ExprId, type_::FplTypeSyntax};

#[derive(Debug, Clone, PartialEq)]
pub enum ASTLiteralValue {
  Int(i32),
  Real(f64),
  Char(char),
  String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASTBinaryOperator {
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Left,
  Right,
  Amp,
  Bar,
  Caret,
  Lt,
  Gt,
  Lte,
  Gte,
  Eq,
  Neq,
  And,
  Or,
}

impl ASTBinaryOperator {
  /// The operator as written, for diagnostics.
  pub fn symbol(&self) -> &'static str {
    match self {
      ASTBinaryOperator::Plus => "+",
      ASTBinaryOperator::Minus => "-",
      ASTBinaryOperator::Star => "*",
      ASTBinaryOperator::Slash => "/",
      ASTBinaryOperator::Percent => "%",
      ASTBinaryOperator::Left => "<<",
      ASTBinaryOperator::Right => ">>",
      ASTBinaryOperator::Amp => "&",
      ASTBinaryOperator::Bar => "|",
      ASTBinaryOperator::Caret => "^",
      ASTBinaryOperator::Lt => "<",
      ASTBinaryOperator::Gt => ">",
      ASTBinaryOperator::Lte => "<=",
      ASTBinaryOperator::Gte => ">=",
      ASTBinaryOperator::Eq => "=",
      ASTBinaryOperator::Neq => "!=",
      ASTBinaryOperator::And => "and",
      ASTBinaryOperator::Or => "or",
    }
  }
}

impl std::fmt::Display for ASTBinaryOperator {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let name = match self {
      ASTBinaryOperator::Plus => "PLUS",
      ASTBinaryOperator::Minus => "MINUS",
      ASTBinaryOperator::Star => "STAR",
      ASTBinaryOperator::Slash => "SLASH",
      ASTBinaryOperator::Percent => "PERCENT",
      ASTBinaryOperator::Left => "LEFT",
      ASTBinaryOperator::Right => "RIGHT",
      ASTBinaryOperator::Amp => "AMP",
      ASTBinaryOperator::Bar => "BAR",
      ASTBinaryOperator::Caret => "CARET",
      ASTBinaryOperator::Lt => "LT",
      ASTBinaryOperator::Gt => "GT",
      ASTBinaryOperator::Lte => "LTE",
      ASTBinaryOperator::Gte => "GTE",
      ASTBinaryOperator::Eq => "EQ",
      ASTBinaryOperator::Neq => "NEQ",
      ASTBinaryOperator::And => "AND",
      ASTBinaryOperator::Or => "OR",
    };
    write!(f, "{}", name)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASTUnaryOperator {
  Minus,
  Not,
}

/// The comparison a range loop runs while true: `a..b` is `Lte`, `a..<b` is `Lt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASTRangeOperator {
  Lt,
  Lte,
  Gt,
  Gte,
}

impl std::fmt::Display for ASTRangeOperator {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let name = match self {
      ASTRangeOperator::Lt => "LT",
      ASTRangeOperator::Lte => "LTE",
      ASTRangeOperator::Gt => "GT",
      ASTRangeOperator::Gte => "GTE",
    };
    write!(f, "{}", name)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTBinary {
  pub operator: ASTBinaryOperator,
  pub left: ExprId,
  pub right: ExprId,
  pub span: Span,
}

impl ASTBinary {
  pub fn new(
    operator: ASTBinaryOperator,
    left: ExprId,
    right: ExprId,
    span: Span,
  ) -> Self {
    Self {
      operator,
      left,
      right,
      span,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTCall {
  pub callee: ExprId,
  pub args: Vec<ExprId>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTMember {
  pub object: ExprId,
  pub name: String,
  pub span: Span,
}

/// `new T(args){lambda}`, or `local ...` for stack allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTNew {
  pub type_: FplTypeSyntax,
  pub args: Vec<ExprId>,
  pub lambda: Option<ExprId>,
  pub local: bool,
  pub span: Span,
}

/// `new Array<T>[a, b, c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTNewInitialiser {
  pub type_: FplTypeSyntax,
  pub elements: Vec<ExprId>,
  pub local: bool,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTExpression {
  Literal {
    value: ASTLiteralValue,
    span: Span,
  },
  Identifier {
    name: String,
    span: Span,
  },
  Binary(ASTBinary),
  Unary {
    operator: ASTUnaryOperator,
    operand: ExprId,
    span: Span,
  },
  Index {
    object: ExprId,
    index: ExprId,
    span: Span,
  },
  Member(ASTMember),
  Call(ASTCall),
  Range {
    start: ExprId,
    end: ExprId,
    operator: ASTRangeOperator,
    span: Span,
  },
  Cast {
    expression: ExprId,
    target: FplTypeSyntax,
    span: Span,
  },
  Is {
    expression: ExprId,
    target: FplTypeSyntax,
    span: Span,
  },
  IfExpr {
    condition: ExprId,
    then_branch: ExprId,
    else_branch: ExprId,
    span: Span,
  },
  New(ASTNew),
  NewInitialiser(ASTNewInitialiser),
  /// Body of `{ ... }` after an array constructor, evaluated once per element with `it` bound.
  Lambda {
    body: ExprId,
    span: Span,
  },
  Return {
    value: Option<ExprId>,
    span: Span,
  },
  Break(Span),
  Continue(Span),
}

impl ASTExpression {
  pub fn span(&self) -> &Span {
    match self {
      ASTExpression::Literal { span, .. }
      | ASTExpression::Identifier { span, .. }
      | ASTExpression::Unary { span, .. }
      | ASTExpression::Index { span, .. }
      | ASTExpression::Range { span, .. }
      | ASTExpression::Cast { span, .. }
      | ASTExpression::Is { span, .. }
      | ASTExpression::IfExpr { span, .. }
      | ASTExpression::Lambda { span, .. }
      | ASTExpression::Return { span, .. }
      | ASTExpression::Break(span)
      | ASTExpression::Continue(span) => span,
      ASTExpression::Binary(b) => &b.span,
      ASTExpression::Member(m) => &m.span,
      ASTExpression::Call(c) => &c.span,
      ASTExpression::New(n) => &n.span,
      ASTExpression::NewInitialiser(n) => &n.span,
    }
  }
}

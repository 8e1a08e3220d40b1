pub mod display;
pub mod operation;

use fpl_type::{
  Id, Store,
  function::FunctionId,
  span::Span,
  symbol::SymbolId,
  types::{ClassId, EnumId, TypeId},
};

pub use operation::AluOp;

pub type TstId = Id<TstNode>;

/// `it` and the expression evaluated once per element of `new Array<T>(n){...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TstLambda {
  pub it: SymbolId,
  pub body: TstId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TstKind {
  // Expression
  /// Int, Char, Bool, enum values and `null` share one representation.
  IntLit(i32),
  RealLit(f64),
  StringLit(String),
  Variable(SymbolId),
  Global(SymbolId),
  FunctionName {
    symbol: SymbolId,
    function: FunctionId,
  },
  Binary {
    op: AluOp,
    left: TstId,
    right: TstId,
  },
  And {
    left: TstId,
    right: TstId,
  },
  Or {
    left: TstId,
    right: TstId,
  },
  Not(TstId),
  Minus(TstId),
  Index {
    array: TstId,
    index: TstId,
  },
  Member {
    object: TstId,
    field: SymbolId,
  },
  /// A data column of an enum value, read from its static table.
  EnumData {
    value: TstId,
    enum_id: EnumId,
    column: usize,
  },
  Return(Option<TstId>),
  Break,
  Continue,
  IfExpr {
    condition: TstId,
    then_branch: TstId,
    else_branch: TstId,
  },
  Range {
    start: TstId,
    end: TstId,
    op: AluOp,
  },
  /// Direct call; `callee` is always a `FunctionName`.
  Call {
    callee: TstId,
    args: Vec<TstId>,
  },
  MethodCall {
    receiver: TstId,
    function: FunctionId,
    args: Vec<TstId>,
  },
  CallIndirect {
    callee: TstId,
    args: Vec<TstId>,
  },
  NewObject {
    class: ClassId,
    constructor: Option<FunctionId>,
    args: Vec<TstId>,
    local: bool,
  },
  NewArray {
    size: TstId,
    lambda: Option<TstLambda>,
    local: bool,
  },
  ArrayLiteral {
    elements: Vec<TstId>,
    local: bool,
  },
  Cast(TstId),
  Is {
    expression: TstId,
    target: TypeId,
  },
  /// A plain value stored where an error union is expected.
  MakeUnion(TstId),
  /// An error union proven to hold a value.
  Unwrap(TstId),
  Error(String),

  // Statement
  ExpressionStatement(TstId),
  /// `op` is `EqI` for plain assignment, `AddI`/`SubI` for `+=`/`-=`.
  Assign {
    op: AluOp,
    target: TstId,
    value: TstId,
  },
  Declaration {
    symbol: SymbolId,
    value: Option<TstId>,
  },
  Free(TstId),
  Print(Vec<TstId>),
  Null,

  // Block
  If(Vec<TstId>),
  IfClause {
    condition: Option<TstId>,
    body: Vec<TstId>,
  },
  While {
    condition: TstId,
    body: Vec<TstId>,
  },
  Repeat {
    condition: TstId,
    body: Vec<TstId>,
  },
  For {
    variable: SymbolId,
    iterable: TstId,
    body: Vec<TstId>,
  },
  When {
    subject: TstId,
    clauses: Vec<TstId>,
  },
  /// Empty `values` is the `else` clause.
  WhenClause {
    values: Vec<TstId>,
    body: Vec<TstId>,
  },
  Function {
    function: FunctionId,
    body: Vec<TstId>,
  },
  /// `body` is the constructor: field initialisation in declaration order.
  Class {
    class: ClassId,
    constructor: FunctionId,
    body: Vec<TstId>,
    methods: Vec<TstId>,
  },
  File {
    name: String,
    body: Vec<TstId>,
  },
  Top(Vec<TstId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TstNode {
  pub kind: TstKind,
  pub span: Span,
  /// Statements carry `Unit`.
  pub ty: TypeId,
}

/// The typed tree of a whole program. `root` is the `Top` node once checking finishes.
#[derive(Debug, Clone, Default)]
pub struct Tst {
  nodes: Store<TstNode>,
  pub root: Option<TstId>,
}

impl Tst {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc(
    &mut self,
    node: TstNode,
  ) -> TstId {
    self.nodes.alloc(node)
  }

  pub fn get(
    &self,
    id: TstId,
  ) -> &TstNode {
    self.nodes.get(&id)
  }

  pub fn get_mut(
    &mut self,
    id: TstId,
  ) -> &mut TstNode {
    self.nodes.get_mut(&id)
  }

  #[inline]
  pub fn kind(
    &self,
    id: TstId,
  ) -> &TstKind {
    &self.get(id).kind
  }

  #[inline]
  pub fn ty(
    &self,
    id: TstId,
  ) -> TypeId {
    self.get(id).ty
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

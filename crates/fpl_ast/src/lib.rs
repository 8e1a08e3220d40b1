pub mod display;
pub mod expressions;
pub mod statements;
pub mod type_;

use fpl_type::{Id, Store, file::FileId};

use crate::expressions::ASTExpression;
use crate::statements::ASTStatement;

pub type ExprId = Id<ASTExpression>;
pub type StmtId = Id<ASTStatement>;

/// The statements of one source file, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTFile {
  pub name: String,
  pub file: FileId,
  pub statements: Vec<StmtId>,
}

/// All parsed files. Ids of every file index into the same two arenas.
#[derive(Debug, Clone, Default)]
pub struct ASTProgram {
  pub expressions: Store<ASTExpression>,
  pub statements: Store<ASTStatement>,
  pub files: Vec<ASTFile>,
}

impl ASTProgram {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn expr(
    &self,
    id: &ExprId,
  ) -> &ASTExpression {
    self.expressions.get(id)
  }

  #[inline]
  pub fn stmt(
    &self,
    id: &StmtId,
  ) -> &ASTStatement {
    self.statements.get(id)
  }

  pub fn alloc_expr(
    &mut self,
    expr: ASTExpression,
  ) -> ExprId {
    self.expressions.alloc(expr)
  }

  pub fn alloc_stmt(
    &mut self,
    stmt: ASTStatement,
  ) -> StmtId {
    self.statements.alloc(stmt)
  }
}

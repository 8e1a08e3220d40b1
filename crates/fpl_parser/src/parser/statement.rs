use fpl_ast::{
  StmtId,
  statements::{ASTAssignOperator, ASTIfClause, ASTStatement, ASTWhenClause},
};
use fpl_config::DebugTrace;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::trace_dbg;
use fpl_token::token_types::TokenType;
use fpl_type::span::Span;

use crate::parser::{FplParser, ParserResult};

impl<'a> FplParser<'a> {
  /// One statement. On a syntax error the rest of the line is skipped and a
  /// `NullStmt` takes the statement's place.
  pub(crate) fn parse_statement(&mut self) -> StmtId {
    let span = self.peek().span.clone();

    let result = match self.kind() {
      TokenType::Val | TokenType::Var => self.parse_variable(),
      TokenType::Const => self.parse_const(),
      TokenType::Fun => self.parse_function(),
      TokenType::Class => self.parse_class(),
      TokenType::Enum => self.parse_enum(),
      TokenType::If => self.parse_if(),
      TokenType::While => self.parse_while(),
      TokenType::Repeat => self.parse_repeat(),
      TokenType::For => self.parse_for(),
      TokenType::When => self.parse_when(),
      TokenType::Print => self.parse_print(),
      TokenType::Free => self.parse_free(),
      _ => self.parse_expression_statement(),
    };

    self.recover(result, span)
  }

  pub(crate) fn recover(
    &mut self,
    result: ParserResult<StmtId>,
    span: Span,
  ) -> StmtId {
    match result {
      Ok(statement) => statement,
      Err(diagnostic) => {
        trace_dbg!(self.config, DebugTrace::Parser, "recovering from: {}", diagnostic);
        self.diagnostics.push(diagnostic);
        self.skip_to_end_of_line();
        self.program.alloc_stmt(ASTStatement::Null(span))
      },
    }
  }

  /// An expression on its own line, or an assignment `lhs (=|+=|-=) rhs`.
  fn parse_expression_statement(&mut self) -> ParserResult<StmtId> {
    let span = self.peek().span.clone();
    let target = self.parse_postfix()?;

    let operator = match self.kind() {
      TokenType::Eq => Some(ASTAssignOperator::Assign),
      TokenType::PlusEq => Some(ASTAssignOperator::AddAssign),
      TokenType::MinusEq => Some(ASTAssignOperator::SubAssign),
      _ => None,
    };

    let Some(operator) = operator else {
      self.expect_eol();
      return Ok(self.program.alloc_stmt(ASTStatement::Expression {
        expression: target,
        span,
      }));
    };

    let span = self.bump().span;
    let value = self.parse_expression()?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Assign {
      operator,
      target,
      value,
      span,
    }))
  }

  /// `then statement` on the same line, or an indented block.
  fn parse_then_or_block(&mut self) -> ParserResult<Vec<StmtId>> {
    if self.eat(TokenType::Then) {
      return Ok(vec![self.parse_statement()]);
    }

    if self.eat(TokenType::Eol) {
      return Ok(self.parse_block());
    }

    Err(DiagnosticMessage::ExpectedThenOrEol(self.peek().span.clone()))
  }

  fn parse_if(&mut self) -> ParserResult<StmtId> {
    let span = self.peek().span.clone();
    let mut clauses = Vec::new();

    loop {
      let clause_span = self.bump().span;
      let condition = self.parse_expression()?;
      let body = self.parse_then_or_block()?;
      clauses.push(ASTIfClause {
        condition: Some(condition),
        body,
        span: clause_span,
      });

      if !self.at(TokenType::Elsif) {
        break;
      }
    }

    if self.at(TokenType::Else) {
      let clause_span = self.bump().span;
      let body = if self.eat(TokenType::Eol) {
        self.parse_block()
      } else {
        vec![self.parse_statement()]
      };
      clauses.push(ASTIfClause {
        condition: None,
        body,
        span: clause_span,
      });
    }

    self.check_end(TokenType::If);
    Ok(self.program.alloc_stmt(ASTStatement::If { clauses, span }))
  }

  fn parse_while(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let condition = self.parse_expression()?;
    let body = self.parse_then_or_block()?;
    self.check_end(TokenType::While);

    Ok(self.program.alloc_stmt(ASTStatement::While { condition, body, span }))
  }

  /// `repeat` block `until condition`.
  fn parse_repeat(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    self.expect_eol();
    let body = self.parse_block();
    self.expect(TokenType::Until)?;
    let condition = self.parse_expression()?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Repeat { body, condition, span }))
  }

  fn parse_for(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let variable = self.expect(TokenType::Id)?.lexeme;
    self.expect(TokenType::In)?;
    let iterable = self.parse_expression()?;
    let body = self.parse_then_or_block()?;
    self.check_end(TokenType::For);

    Ok(self.program.alloc_stmt(ASTStatement::For {
      variable,
      iterable,
      body,
      span,
    }))
  }

  /// ```text
  /// when expr
  ///     1, 2 -> statement
  ///     3 ->
  ///         block
  ///     else -> statement
  /// ```
  fn parse_when(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let subject = self.parse_expression()?;
    self.expect_eol();

    let mut clauses = Vec::new();
    if self.eat(TokenType::Indent) {
      while !self.at(TokenType::Dedent) && !self.at(TokenType::Eof) {
        clauses.push(self.parse_when_clause()?);
      }
      self.expect(TokenType::Dedent)?;
    } else {
      self.diagnostics.push(DiagnosticMessage::MissingWhenBlock(self.peek().span.clone()));
    }
    self.check_end(TokenType::When);

    Ok(self.program.alloc_stmt(ASTStatement::When { subject, clauses, span }))
  }

  fn parse_when_clause(&mut self) -> ParserResult<ASTWhenClause> {
    let span = self.peek().span.clone();

    let mut values = Vec::new();
    if !self.eat(TokenType::Else) {
      values.push(self.parse_expression()?);
      while self.eat(TokenType::Comma) {
        values.push(self.parse_expression()?);
      }
    }
    self.expect(TokenType::Arrow)?;

    let body = if self.at(TokenType::Eol) {
      self.expect_eol();
      self.parse_block()
    } else {
      vec![self.parse_statement()]
    };

    Ok(ASTWhenClause { values, body, span })
  }

  fn parse_print(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let args = self.parse_expression_list()?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Print { args, span }))
  }

  fn parse_free(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let expression = self.parse_expression()?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Free { expression, span }))
  }
}

use fpl_ast::{
  ExprId,
  expressions::{
    ASTBinary, ASTBinaryOperator, ASTCall, ASTExpression, ASTLiteralValue, ASTMember, ASTNew, ASTNewInitialiser,
    ASTRangeOperator, ASTUnaryOperator,
  },
};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_token::{token::Token, token_types::TokenType};

use crate::parser::{FplParser, ParserResult};

/// Binary operator levels from tightest to loosest. Ranges sit between
/// `add` and `comparison` and are handled separately.
const MULT_OPERATORS: &[(TokenType, ASTBinaryOperator)] = &[
  (TokenType::Star, ASTBinaryOperator::Star),
  (TokenType::Slash, ASTBinaryOperator::Slash),
  (TokenType::Percent, ASTBinaryOperator::Percent),
  (TokenType::Left, ASTBinaryOperator::Left),
  (TokenType::Right, ASTBinaryOperator::Right),
  (TokenType::Amp, ASTBinaryOperator::Amp),
];
const ADD_OPERATORS: &[(TokenType, ASTBinaryOperator)] = &[
  (TokenType::Plus, ASTBinaryOperator::Plus),
  (TokenType::Minus, ASTBinaryOperator::Minus),
  (TokenType::Bar, ASTBinaryOperator::Bar),
  (TokenType::Caret, ASTBinaryOperator::Caret),
];
const COMPARISON_OPERATORS: &[(TokenType, ASTBinaryOperator)] = &[
  (TokenType::Lt, ASTBinaryOperator::Lt),
  (TokenType::Gt, ASTBinaryOperator::Gt),
  (TokenType::Lte, ASTBinaryOperator::Lte),
  (TokenType::Gte, ASTBinaryOperator::Gte),
  (TokenType::Eq, ASTBinaryOperator::Eq),
  (TokenType::Neq, ASTBinaryOperator::Neq),
];
const AND_OPERATORS: &[(TokenType, ASTBinaryOperator)] = &[(TokenType::And, ASTBinaryOperator::And)];
const OR_OPERATORS: &[(TokenType, ASTBinaryOperator)] = &[(TokenType::Or, ASTBinaryOperator::Or)];

impl<'a> FplParser<'a> {
  /// `if c then a else b`, or a cast expression.
  pub(crate) fn parse_expression(&mut self) -> ParserResult<ExprId> {
    if !self.eat(TokenType::If) {
      return self.parse_cast();
    }

    let condition = self.parse_cast()?;
    self.expect(TokenType::Then)?;
    let then_branch = self.parse_expression()?;
    self.expect(TokenType::Else)?;
    let else_branch = self.parse_expression()?;

    let span = self.program.expr(&condition).span().clone();
    Ok(self.program.alloc_expr(ASTExpression::IfExpr {
      condition,
      then_branch,
      else_branch,
      span,
    }))
  }

  /// `( expr { ',' expr } )`
  pub(crate) fn parse_expression_list(&mut self) -> ParserResult<Vec<ExprId>> {
    self.parse_delimited_list(TokenType::OpenB, TokenType::CloseB, Self::parse_expression)
  }

  fn parse_cast(&mut self) -> ParserResult<ExprId> {
    let expression = self.parse_or()?;

    if self.at(TokenType::As) {
      let span = self.bump().span;
      let target = self.parse_type()?;
      return Ok(self.program.alloc_expr(ASTExpression::Cast {
        expression,
        target,
        span,
      }));
    }

    if self.at(TokenType::Is) {
      let span = self.bump().span;
      let target = self.parse_type()?;
      return Ok(self.program.alloc_expr(ASTExpression::Is {
        expression,
        target,
        span,
      }));
    }

    Ok(expression)
  }

  fn parse_or(&mut self) -> ParserResult<ExprId> {
    self.parse_left_assoc(OR_OPERATORS, Self::parse_and)
  }

  fn parse_and(&mut self) -> ParserResult<ExprId> {
    self.parse_left_assoc(AND_OPERATORS, Self::parse_comparison)
  }

  fn parse_comparison(&mut self) -> ParserResult<ExprId> {
    self.parse_left_assoc(COMPARISON_OPERATORS, Self::parse_range)
  }

  /// `a..b`, with an optional comparison after the dots: `a..<b`, `a..>b`.
  fn parse_range(&mut self) -> ParserResult<ExprId> {
    let start = self.parse_add()?;
    if !self.at(TokenType::DotDot) {
      return Ok(start);
    }

    let span = self.bump().span;
    let operator = match self.kind() {
      TokenType::Lt => ASTRangeOperator::Lt,
      TokenType::Gt => ASTRangeOperator::Gt,
      TokenType::Gte => ASTRangeOperator::Gte,
      TokenType::Lte => ASTRangeOperator::Lte,
      _ => {
        let end = self.parse_add()?;
        return Ok(self.program.alloc_expr(ASTExpression::Range {
          start,
          end,
          operator: ASTRangeOperator::Lte,
          span,
        }));
      },
    };
    self.bump();

    let end = self.parse_add()?;
    Ok(self.program.alloc_expr(ASTExpression::Range {
      start,
      end,
      operator,
      span,
    }))
  }

  fn parse_add(&mut self) -> ParserResult<ExprId> {
    self.parse_left_assoc(ADD_OPERATORS, Self::parse_mult)
  }

  fn parse_mult(&mut self) -> ParserResult<ExprId> {
    self.parse_left_assoc(MULT_OPERATORS, Self::parse_prefix)
  }

  fn parse_left_assoc<F>(
    &mut self,
    operators: &[(TokenType, ASTBinaryOperator)],
    mut operand: F,
  ) -> ParserResult<ExprId>
  where
    F: FnMut(&mut Self) -> ParserResult<ExprId>,
  {
    let mut left = operand(self)?;

    loop {
      let kind = self.kind();
      let Some((_, operator)) = operators.iter().find(|(t, _)| *t == kind) else {
        return Ok(left);
      };

      let span = self.bump().span;
      let right = operand(self)?;
      left = self
        .program
        .alloc_expr(ASTExpression::Binary(ASTBinary::new(*operator, left, right, span)));
    }
  }

  fn parse_prefix(&mut self) -> ParserResult<ExprId> {
    let operator = match self.kind() {
      TokenType::Minus => ASTUnaryOperator::Minus,
      TokenType::Not => ASTUnaryOperator::Not,
      _ => return self.parse_postfix(),
    };

    let span = self.bump().span;
    let operand = self.parse_postfix()?;
    Ok(self.program.alloc_expr(ASTExpression::Unary {
      operator,
      operand,
      span,
    }))
  }

  /// Primary followed by any number of `[index]`, `.member` and `(args)`.
  /// The resulting node carries the span of the leftmost operand.
  pub(crate) fn parse_postfix(&mut self) -> ParserResult<ExprId> {
    let mut expression = self.parse_primary()?;

    loop {
      let span = self.program.expr(&expression).span().clone();
      expression = match self.kind() {
        TokenType::OpenSq => {
          self.bump();
          let index = self.parse_expression()?;
          self.expect(TokenType::CloseSq)?;
          self.program.alloc_expr(ASTExpression::Index {
            object: expression,
            index,
            span,
          })
        },
        TokenType::Dot => {
          self.bump();
          let name = self.expect_name()?.lexeme;
          self.program.alloc_expr(ASTExpression::Member(ASTMember {
            object: expression,
            name,
            span,
          }))
        },
        TokenType::OpenB => {
          let args = self.parse_expression_list()?;
          self.program.alloc_expr(ASTExpression::Call(ASTCall {
            callee: expression,
            args,
            span,
          }))
        },
        _ => return Ok(expression),
      };
    }
  }

  fn parse_primary(&mut self) -> ParserResult<ExprId> {
    match self.kind() {
      TokenType::Id => {
        let token = self.bump();
        Ok(self.program.alloc_expr(ASTExpression::Identifier {
          name: token.lexeme,
          span: token.span,
        }))
      },
      TokenType::IntLit => {
        let token = self.bump();
        Ok(self.parse_int_literal(token))
      },
      TokenType::RealLit => {
        let token = self.bump();
        Ok(self.parse_real_literal(token))
      },
      TokenType::CharLit => {
        let token = self.bump();
        Ok(self.parse_char_literal(token))
      },
      TokenType::StringLit => {
        let token = self.bump();
        Ok(self.program.alloc_expr(ASTExpression::Literal {
          value: ASTLiteralValue::String(token.lexeme),
          span: token.span,
        }))
      },
      TokenType::OpenB => {
        self.bump();
        let expression = self.parse_expression()?;
        self.expect(TokenType::CloseB)?;
        Ok(expression)
      },
      TokenType::Return => {
        let span = self.bump().span;
        let value = if self.at_any(&[TokenType::Eol, TokenType::CloseB, TokenType::CloseSq, TokenType::CloseCl]) {
          None
        } else {
          Some(self.parse_expression()?)
        };
        Ok(self.program.alloc_expr(ASTExpression::Return { value, span }))
      },
      TokenType::Break => {
        let span = self.bump().span;
        Ok(self.program.alloc_expr(ASTExpression::Break(span)))
      },
      TokenType::Continue => {
        let span = self.bump().span;
        Ok(self.program.alloc_expr(ASTExpression::Continue(span)))
      },
      TokenType::New | TokenType::Local => self.parse_new(),
      _ => Err(DiagnosticMessage::UnexpectedToken {
        found: format!("'{}'", self.peek().lexeme),
        expected: "primary expression".to_string(),
        at: self.peek().span.clone(),
      }),
    }
  }

  /// Hex with a `0x` prefix, decimal otherwise. Malformed text is reported
  /// and read as 0 so parsing can continue.
  fn parse_int_literal(
    &mut self,
    token: Token,
  ) -> ExprId {
    let text = &token.lexeme;
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
      Some(hex) => u32::from_str_radix(hex, 16).map(|v| v as i32).ok(),
      None => text.parse::<i32>().ok(),
    };

    let value = parsed.unwrap_or_else(|| {
      self.diagnostics.push(DiagnosticMessage::MalformedIntLiteral {
        text: text.clone(),
        at: token.span.clone(),
      });
      0
    });

    self.program.alloc_expr(ASTExpression::Literal {
      value: ASTLiteralValue::Int(value),
      span: token.span,
    })
  }

  fn parse_real_literal(
    &mut self,
    token: Token,
  ) -> ExprId {
    let value = token.lexeme.parse::<f64>().unwrap_or_else(|_| {
      self.diagnostics.push(DiagnosticMessage::MalformedRealLiteral {
        text: token.lexeme.clone(),
        at: token.span.clone(),
      });
      0.0
    });

    self.program.alloc_expr(ASTExpression::Literal {
      value: ASTLiteralValue::Real(value),
      span: token.span,
    })
  }

  fn parse_char_literal(
    &mut self,
    token: Token,
  ) -> ExprId {
    let mut chars = token.lexeme.chars();
    let value = match (chars.next(), chars.next()) {
      (Some(c), None) => c,
      (first, _) => {
        self.diagnostics.push(DiagnosticMessage::MalformedCharLiteral {
          text: token.lexeme.clone(),
          at: token.span.clone(),
        });
        first.unwrap_or('\0')
      },
    };

    self.program.alloc_expr(ASTExpression::Literal {
      value: ASTLiteralValue::Char(value),
      span: token.span,
    })
  }

  /// `new T(args) [{lambda}]`, `new T[a, b]`, or the `local` forms.
  fn parse_new(&mut self) -> ParserResult<ExprId> {
    let token = self.bump();
    let local = token.type_ == TokenType::Local;
    let type_ = self.parse_type()?;

    if self.at(TokenType::OpenSq) {
      let elements = self.parse_delimited_list(TokenType::OpenSq, TokenType::CloseSq, Self::parse_expression)?;
      return Ok(self.program.alloc_expr(ASTExpression::NewInitialiser(ASTNewInitialiser {
        type_,
        elements,
        local,
        span: token.span,
      })));
    }

    let args = if self.at(TokenType::OpenB) {
      self.parse_expression_list()?
    } else {
      Vec::new()
    };

    let lambda = if self.at(TokenType::OpenCl) {
      let span = self.bump().span;
      let body = self.parse_expression()?;
      self.expect(TokenType::CloseCl)?;
      Some(self.program.alloc_expr(ASTExpression::Lambda { body, span }))
    } else {
      None
    };

    Ok(self.program.alloc_expr(ASTExpression::New(ASTNew {
      type_,
      args,
      lambda,
      local,
      span: token.span,
    })))
  }
}

use fpl_ast::{
  StmtId,
  statements::{
    ASTClass, ASTConst, ASTEnum, ASTEnumValue, ASTFunction, ASTParameter, ASTParameterKind, ASTStatement,
    ASTVariable,
  },
};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_token::token_types::TokenType;

use crate::parser::{FplParser, ParserResult};

impl<'a> FplParser<'a> {
  /// `val|var name [: type] [= expr]`
  pub(crate) fn parse_variable(&mut self) -> ParserResult<StmtId> {
    let token = self.bump();
    let name = self.expect(TokenType::Id)?.lexeme;
    let type_ = self.parse_optional_type()?;
    let value = if self.eat(TokenType::Eq) {
      Some(self.parse_expression()?)
    } else {
      None
    };
    self.expect_eol();

    let variable = ASTVariable::new(token.type_ == TokenType::Var, name, type_, value, token.span);
    Ok(self.program.alloc_stmt(ASTStatement::Variable(variable)))
  }

  /// `const name [: type] = expr`
  pub(crate) fn parse_const(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let name = self.expect(TokenType::Id)?.lexeme;
    let type_ = self.parse_optional_type()?;
    self.expect(TokenType::Eq)?;
    let value = self.parse_expression()?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Const(ASTConst {
      name,
      type_,
      value,
      span,
    })))
  }

  /// `fun name(params) [-> type]` followed by an indented body.
  pub(crate) fn parse_function(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let name = self.expect_name()?.lexeme;
    let (parameters, is_vararg) = self.parse_parameter_list(false)?;
    let return_type = if self.eat(TokenType::Arrow) {
      Some(self.parse_type()?)
    } else {
      None
    };
    self.expect_eol();

    let body = self.parse_block();
    self.check_end(TokenType::Fun);

    Ok(self.program.alloc_stmt(ASTStatement::Function(ASTFunction {
      name,
      parameters,
      is_vararg,
      return_type,
      body,
      span,
    })))
  }

  /// `( [param {, param}] [...] )`. The trailing `...` makes the last
  /// parameter a vararg.
  fn parse_parameter_list(
    &mut self,
    for_constructor: bool,
  ) -> ParserResult<(Vec<ASTParameter>, bool)> {
    self.expect(TokenType::OpenB)?;

    let mut parameters = Vec::new();
    if !self.at(TokenType::CloseB) && !self.at(TokenType::DotDotDot) {
      parameters.push(self.parse_parameter(for_constructor)?);
      while self.eat(TokenType::Comma) {
        parameters.push(self.parse_parameter(for_constructor)?);
      }
    }

    let is_vararg = self.eat(TokenType::DotDotDot);
    self.expect(TokenType::CloseB)?;

    if parameters.is_empty() && is_vararg {
      self.diagnostics.push(DiagnosticMessage::EmptyVarargs(self.peek().span.clone()));
    }

    Ok((parameters, is_vararg))
  }

  fn parse_parameter(
    &mut self,
    for_constructor: bool,
  ) -> ParserResult<ASTParameter> {
    let kind = match self.kind() {
      TokenType::Val | TokenType::Var => {
        let token = self.bump();
        if !for_constructor {
          self.diagnostics.push(DiagnosticMessage::ParameterKeywordOutsideConstructor {
            keyword: token.lexeme.clone(),
            at: token.span.clone(),
          });
        }
        if token.type_ == TokenType::Var {
          ASTParameterKind::Var
        } else {
          ASTParameterKind::Val
        }
      },
      _ => ASTParameterKind::Plain,
    };

    let name = self.expect(TokenType::Id)?;
    self.expect(TokenType::Colon)?;
    let type_ = self.parse_type()?;

    Ok(ASTParameter {
      kind,
      name: name.lexeme,
      type_,
      span: name.span,
    })
  }

  /// `class Name[<T, ...>][(params)]` with an optional indented body of
  /// fields and methods.
  pub(crate) fn parse_class(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let name = self.expect(TokenType::Id)?.lexeme;

    let mut type_params = Vec::new();
    if self.eat(TokenType::Lt) {
      type_params.push(self.expect(TokenType::Id)?.lexeme);
      while self.eat(TokenType::Comma) {
        type_params.push(self.expect(TokenType::Id)?.lexeme);
      }
      self.expect_greater()?;
    }

    let parameters = if self.at(TokenType::OpenB) {
      self.parse_parameter_list(true)?.0
    } else {
      Vec::new()
    };
    self.expect_eol();

    let body = if self.at(TokenType::Indent) {
      self.parse_indented(Self::parse_class_member)
    } else {
      Vec::new()
    };
    self.check_end(TokenType::Class);

    Ok(self.program.alloc_stmt(ASTStatement::Class(ASTClass {
      name,
      type_params,
      parameters,
      body,
      span,
    })))
  }

  fn parse_class_member(&mut self) -> StmtId {
    let span = self.peek().span.clone();

    let result = match self.kind() {
      TokenType::Val | TokenType::Var => self.parse_variable(),
      TokenType::Fun => self.parse_function(),
      _ => Err(DiagnosticMessage::NotAllowedInClass {
        found: self.peek().lexeme.clone(),
        at: span.clone(),
      }),
    };

    self.recover(result, span)
  }

  /// `enum Name[(params)] [A, B(args), ...]`
  pub(crate) fn parse_enum(&mut self) -> ParserResult<StmtId> {
    let span = self.bump().span;
    let name = self.expect(TokenType::Id)?.lexeme;
    let parameters = if self.at(TokenType::OpenB) {
      self.parse_parameter_list(true)?.0
    } else {
      Vec::new()
    };

    let values = self.parse_delimited_list(TokenType::OpenSq, TokenType::CloseSq, |parser| {
      let token = parser.expect(TokenType::Id)?;
      let args = if parser.at(TokenType::OpenB) {
        parser.parse_expression_list()?
      } else {
        Vec::new()
      };
      Ok(ASTEnumValue {
        name: token.lexeme,
        args,
        span: token.span,
      })
    })?;
    self.expect_eol();

    Ok(self.program.alloc_stmt(ASTStatement::Enum(ASTEnum {
      name,
      parameters,
      values,
      span,
    })))
  }
}

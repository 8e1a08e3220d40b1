use fpl_ast::type_::FplTypeSyntax;
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_token::token_types::TokenType;

use crate::parser::{FplParser, ParserResult};

impl<'a> FplParser<'a> {
  /// ```text
  /// type := ( ID [ '<' type { ',' type } '>' ]
  ///         | 'Array' [ '<' type '>' ]
  ///         | 'Range' '<' type '>'
  ///         | 'FixedArray' '<' type '>' '(' expr ')' ) [ '?' | '!' ]
  /// ```
  pub(crate) fn parse_type(&mut self) -> ParserResult<FplTypeSyntax> {
    let span = self.peek().span.clone();

    let ty = match self.kind() {
      TokenType::Id => {
        let name = self.bump().lexeme;
        let mut args = Vec::new();
        if self.eat(TokenType::Lt) {
          args.push(self.parse_type()?);
          while self.eat(TokenType::Comma) {
            args.push(self.parse_type()?);
          }
          self.expect_greater()?;
        }
        FplTypeSyntax::Named {
          name,
          args,
          span: span.clone(),
        }
      },
      TokenType::Array => {
        self.bump();
        let element = if self.eat(TokenType::Lt) {
          let element = self.parse_type()?;
          self.expect_greater()?;
          Some(Box::new(element))
        } else {
          None
        };
        FplTypeSyntax::Array {
          element,
          span: span.clone(),
        }
      },
      TokenType::Range => {
        self.bump();
        self.expect(TokenType::Lt)?;
        let element = Box::new(self.parse_type()?);
        self.expect_greater()?;
        FplTypeSyntax::Range {
          element,
          span: span.clone(),
        }
      },
      TokenType::FixedArray => {
        self.bump();
        self.expect(TokenType::Lt)?;
        let element = Box::new(self.parse_type()?);
        self.expect_greater()?;
        self.expect(TokenType::OpenB)?;
        let size = self.parse_expression()?;
        self.expect(TokenType::CloseB)?;
        FplTypeSyntax::FixedArray {
          element,
          size,
          span: span.clone(),
        }
      },
      _ => {
        return Err(DiagnosticMessage::UnexpectedToken {
          found: format!("'{}'", self.peek().lexeme),
          expected: "type expression".to_string(),
          at: self.peek().span.clone(),
        });
      },
    };

    if self.eat(TokenType::QMark) {
      return Ok(FplTypeSyntax::Nullable {
        inner: Box::new(ty),
        span,
      });
    }

    if self.eat(TokenType::Bang) {
      return Ok(FplTypeSyntax::ErrorUnion {
        inner: Box::new(ty),
        span,
      });
    }

    Ok(ty)
  }

  /// `: type`, when present.
  pub(crate) fn parse_optional_type(&mut self) -> ParserResult<Option<FplTypeSyntax>> {
    if self.eat(TokenType::Colon) {
      Ok(Some(self.parse_type()?))
    } else {
      Ok(None)
    }
  }
}

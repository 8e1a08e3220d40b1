use fpl_diagnostics::message::DiagnosticMessage;
use fpl_token::token_types::TokenType;

use crate::parser::FplParser;

impl<'a> FplParser<'a> {
  /// Drops the rest of the line, including its `EOL`.
  pub(crate) fn skip_to_end_of_line(&mut self) {
    while !self.at(TokenType::Eol) && !self.at(TokenType::Eof) {
      self.bump();
    }
    self.bump();
  }

  /// Reports anything left on the line, then resynchronises after it.
  pub(crate) fn expect_eol(&mut self) {
    if !self.at(TokenType::Eol) {
      self.diagnostics.push(DiagnosticMessage::ExpectedEol {
        found: self.peek().lexeme.clone(),
        at: self.peek().span.clone(),
      });
    }
    self.skip_to_end_of_line();
  }

  /// `end` lines are optional; when present they must name the construct
  /// they close (`end fun`, `end if`) or stand alone.
  pub(crate) fn check_end(
    &mut self,
    kind: TokenType,
  ) {
    if !self.at(TokenType::End) {
      return;
    }

    let end = self.bump();
    let closing = self.bump();
    if closing.type_ == TokenType::Eol {
      return;
    }

    if closing.type_ != kind {
      self.diagnostics.push(DiagnosticMessage::MismatchedEnd {
        found: closing.lexeme,
        expected: kind.text().to_string(),
        at: end.span,
      });
    }
    self.expect_eol();
  }
}

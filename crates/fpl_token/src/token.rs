use fpl_type::span::Span;

use crate::token_types::TokenType;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub type_: TokenType,
  /// Source text, or the unescaped contents for string and character literals.
  pub lexeme: String,
  pub span: Span,
}

impl Default for Token {
  fn default() -> Self {
    Self {
      type_: TokenType::Eof,
      lexeme: TokenType::Eof.text().to_string(),
      span: Span::default(),
    }
  }
}

impl Token {
  pub fn new(
    type_: TokenType,
    lexeme: String,
    span: Span,
  ) -> Self {
    Self { type_, lexeme, span }
  }
}

/// Tokens print as their text; parser messages quote them as written.
impl std::fmt::Display for Token {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "{}", self.lexeme)
  }
}

mod declarations;
mod expression;
mod recovery;
mod statement;
mod type_syntax;

use fpl_ast::{ASTFile, ASTProgram, StmtId};
use fpl_config::{DebugTrace, FplConfig};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::trace_dbg;
use fpl_token::{token::Token, token_types::TokenType};
use fpl_type::{file::FileId, span::Span};

pub type ParserResult<T> = Result<T, DiagnosticMessage>;

/// Recursive-descent parser for one file. Nodes go into the shared
/// `ASTProgram` arenas so several files can be parsed into one program.
pub struct FplParser<'a> {
  config: &'a FplConfig,
  program: &'a mut ASTProgram,
  tokens: Vec<Token>,
  cursor: usize,
  pub diagnostics: Vec<DiagnosticMessage>,

  /// Set after the first half of a `>>` closed a type argument list; the
  /// second half is still waiting to be consumed as a `>`.
  pending_greater: bool,
  pending_greater_span: Option<Span>,
}

impl<'a> FplParser<'a> {
  pub fn new(
    config: &'a FplConfig,
    program: &'a mut ASTProgram,
    mut tokens: Vec<Token>,
  ) -> Self {
    if tokens.last().map(|t| t.type_) != Some(TokenType::Eof) {
      let span = tokens.last().map(|t| t.span.clone()).unwrap_or_default();
      tokens.push(Token::new(TokenType::Eof, TokenType::Eof.text().to_string(), span));
    }

    Self {
      config,
      program,
      tokens,
      cursor: 0,
      diagnostics: Vec::new(),
      pending_greater: false,
      pending_greater_span: None,
    }
  }

  /// Parses every statement up to end of file. Syntax errors are collected in
  /// `diagnostics`; failed statements are left as `NullStmt` placeholders.
  pub fn parse_file(
    &mut self,
    name: &str,
    file: FileId,
  ) -> ASTFile {
    trace_dbg!(self.config, DebugTrace::Parser, "parsing file {}", name);

    let mut statements = Vec::new();
    while !self.at(TokenType::Eof) {
      statements.push(self.parse_statement());
    }

    ASTFile {
      name: name.to_string(),
      file,
      statements,
    }
  }

  /// Comma-separated items between `opening` and `closing`.
  pub(crate) fn parse_delimited_list<T, F>(
    &mut self,
    opening: TokenType,
    closing: TokenType,
    mut parse_item: F,
  ) -> ParserResult<Vec<T>>
  where
    F: FnMut(&mut Self) -> ParserResult<T>,
  {
    self.expect(opening)?;
    let mut items = Vec::new();

    if !self.at(closing) {
      items.push(parse_item(self)?);
      while self.eat(TokenType::Comma) {
        items.push(parse_item(self)?);
      }
    }

    self.expect(closing)?;
    Ok(items)
  }

  /// An indented block of statements. A missing `INDENT` is reported and
  /// yields an empty body.
  pub(crate) fn parse_block(&mut self) -> Vec<StmtId> {
    self.parse_indented(Self::parse_statement)
  }

  pub(crate) fn parse_indented<F>(
    &mut self,
    mut parse_item: F,
  ) -> Vec<StmtId>
  where
    F: FnMut(&mut Self) -> StmtId,
  {
    let mut body = Vec::new();
    if !self.at(TokenType::Indent) {
      self.diagnostics.push(DiagnosticMessage::MissingIndentedBlock(self.peek().span.clone()));
      return body;
    }

    self.bump();
    while !self.at(TokenType::Dedent) && !self.at(TokenType::Eof) {
      body.push(parse_item(self));
    }

    if let Err(diagnostic) = self.expect(TokenType::Dedent) {
      self.diagnostics.push(diagnostic);
    }
    body
  }

  fn peek(&self) -> &Token {
    &self.tokens[self.cursor]
  }

  /// Kind of the current token, honouring a split `>>`.
  fn kind(&self) -> TokenType {
    if self.pending_greater {
      TokenType::Gt
    } else {
      self.peek().type_
    }
  }

  fn at(
    &self,
    token_type: TokenType,
  ) -> bool {
    self.kind() == token_type
  }

  fn at_any(
    &self,
    token_types: &[TokenType],
  ) -> bool {
    token_types.contains(&self.kind())
  }

  fn eat(
    &mut self,
    token_type: TokenType,
  ) -> bool {
    if self.at(token_type) {
      self.bump();
      true
    } else {
      false
    }
  }

  fn expect(
    &mut self,
    token_type: TokenType,
  ) -> ParserResult<Token> {
    if self.at(token_type) {
      return Ok(self.bump());
    }

    Err(DiagnosticMessage::UnexpectedToken {
      found: self.peek().lexeme.clone(),
      expected: token_type.text().to_string(),
      at: self.peek().span.clone(),
    })
  }

  /// An identifier. `free` is also accepted so classes can declare and call
  /// a `free()` method.
  fn expect_name(&mut self) -> ParserResult<Token> {
    if self.at(TokenType::Free) {
      let mut token = self.bump();
      token.type_ = TokenType::Id;
      return Ok(token);
    }
    self.expect(TokenType::Id)
  }

  /// Consumes a `>` closing a type argument list, splitting `>>` in two.
  fn expect_greater(&mut self) -> ParserResult<Span> {
    if self.pending_greater {
      self.pending_greater = false;
      return Ok(self.pending_greater_span.take().unwrap_or_else(|| self.peek().span.clone()));
    }

    if self.at(TokenType::Right) {
      let span = self.bump().span;
      self.pending_greater = true;
      self.pending_greater_span = Some(span.clone());
      return Ok(span);
    }

    self.expect(TokenType::Gt).map(|t| t.span)
  }

  /// Advances past the current token and returns it. The trailing `EOF` is
  /// never stepped over.
  fn bump(&mut self) -> Token {
    if self.pending_greater {
      self.pending_greater = false;
      let span = self.pending_greater_span.take().unwrap_or_else(|| self.peek().span.clone());
      return Token::new(TokenType::Gt, ">".to_string(), span);
    }

    let token = self.tokens[self.cursor].clone();
    if self.cursor + 1 < self.tokens.len() {
      self.cursor += 1;
    }
    token
  }
}

#[cfg(test)]
mod tests {
  use fpl_ast::display::format_program;
  use fpl_type::file::SourceMap;

  use super::*;
  use crate::FplLexer;

  fn parse(src: &str) -> String {
    let config = FplConfig::silent();
    let mut sm = SourceMap::new();
    let file = sm.add_file("test.fpl", src.to_string());
    let mut lexer = FplLexer::new(&config, file, &sm.get(&file).text);
    lexer.scan_tokens();

    let mut program = ASTProgram::new();
    let mut parser = FplParser::new(&config, &mut program, lexer.tokens);
    let ast_file = parser.parse_file("test", file);
    assert!(parser.diagnostics.is_empty(), "{:?}", parser.diagnostics);
    program.files.push(ast_file);
    format_program(&program)
  }

  #[test]
  fn nested_generic_close_splits_shift() {
    insta::assert_snapshot!(parse("val a : Array<Array<Int>>?\n"), @r"
    File test
     Decl VAL a
      TypeNullable
       TypeArray
        TypeArray
         Type Int
    ");
  }

  #[test]
  fn shift_operator_still_parses() {
    insta::assert_snapshot!(parse("val a = 1 >> 2\n"), @r"
    File test
     Decl VAL a
      Binop RIGHT
       Intlit 1
       Intlit 2
    ");
  }
}

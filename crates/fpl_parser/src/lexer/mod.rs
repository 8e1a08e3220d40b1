use fpl_config::{DebugTrace, FplConfig};
use fpl_diagnostics::message::DiagnosticMessage;
use fpl_log::trace_dbg;
use fpl_token::{token::Token, token_types::TokenType};
use fpl_type::{BytePosition, file::FileId, span::Span};

/// Turns source text into tokens, synthesising `EOL`, `INDENT` and `DEDENT`
/// from line breaks and leading whitespace.
pub struct FplLexer<'a> {
  config: &'a FplConfig,
  source: &'a str,
  file: FileId,
  pub tokens: Vec<Token>,
  pub diagnostics: Vec<DiagnosticMessage>,
  start: usize,
  current: usize,
  /// 1-based column of `current`.
  column: u32,
  line_continues: bool,
  at_start_of_line: bool,
  indent_stack: Vec<u32>,
}

impl<'a> FplLexer<'a> {
  pub fn new(
    config: &'a FplConfig,
    file: FileId,
    source: &'a str,
  ) -> Self {
    Self {
      config,
      source,
      file,
      tokens: vec![],
      diagnostics: vec![],
      start: 0,
      current: 0,
      column: 1,
      line_continues: true,
      at_start_of_line: true,
      indent_stack: vec![1],
    }
  }

  pub fn scan_tokens(&mut self) {
    loop {
      let token = self.next_token();
      trace_dbg!(self.config, DebugTrace::Lexer, "{} {}", token.type_, token.lexeme);

      let done = token.type_ == TokenType::Eof;
      self.tokens.push(token);
      if done {
        break;
      }
    }
  }

  fn next_token(&mut self) -> Token {
    self.skip_whitespace_and_comments();
    self.start = self.current;

    let (kind, lexeme) = if self.is_at_end() {
      let kind = if !self.at_start_of_line {
        TokenType::Eol
      } else if self.indent_stack.len() > 1 {
        self.indent_stack.pop();
        TokenType::Dedent
      } else {
        TokenType::Eof
      };
      (kind, kind.text().to_string())
    } else if self.at_start_of_line && self.column > self.indent_top() {
      self.indent_stack.push(self.column);
      (TokenType::Indent, TokenType::Indent.text().to_string())
    } else if self.at_start_of_line && self.column < self.indent_top() {
      self.indent_stack.pop();
      if self.column > self.indent_top() {
        self.diagnostics.push(DiagnosticMessage::IndentationError {
          got: self.column,
          expected: self.indent_top(),
          at: self.span(),
        });
        self.indent_stack.push(self.column);
      }
      (TokenType::Dedent, TokenType::Dedent.text().to_string())
    } else {
      self.scan_token()
    };

    if kind == TokenType::Error {
      self.diagnostics.push(DiagnosticMessage::InvalidToken {
        text: lexeme.clone(),
        at: self.span(),
      });
    }

    self.line_continues = kind.line_continues();
    self.at_start_of_line = matches!(kind, TokenType::Eol | TokenType::Dedent);

    Token::new(kind, lexeme, self.span())
  }

  fn scan_token(&mut self) -> (TokenType, String) {
    let c = self.peek().unwrap_or('\n');

    if c == '\n' {
      self.advance();
      return (TokenType::Eol, TokenType::Eol.text().to_string());
    }

    if c.is_alphabetic() || c == '_' {
      let word = self.read_word();
      let kind = TokenType::from_keyword(&word).unwrap_or(TokenType::Id);
      return (kind, word);
    }

    if c.is_ascii_digit() {
      let number = self.read_number();
      let kind = if number.contains('.') { TokenType::RealLit } else { TokenType::IntLit };
      return (kind, number);
    }

    match c {
      '"' => (TokenType::StringLit, self.read_quoted('"')),
      '\'' => (TokenType::CharLit, self.read_quoted('\'')),
      _ => {
        let text = self.read_punctuation();
        let kind = TokenType::from_punctuation(&text).unwrap_or(TokenType::Error);
        (kind, text)
      },
    }
  }

  fn skip_whitespace_and_comments(&mut self) {
    while let Some(c) = self.peek() {
      match c {
        ' ' | '\t' | '\r' => {
          self.advance();
        },
        '#' => {
          while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
          }
        },
        '\n' if self.line_continues => {
          self.advance();
        },
        _ => break,
      }
    }
  }

  fn read_word(&mut self) -> String {
    let mut word = String::new();
    while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
      word.push(c);
      self.advance();
    }
    word
  }

  /// Digits and letters, so `123a` and `0x1F` lex as one token and fail in the parser.
  fn read_number(&mut self) -> String {
    let mut number = self.read_alphanumeric();
    if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_alphanumeric()) {
      self.advance();
      number.push('.');
      number.push_str(&self.read_alphanumeric());
    }
    number
  }

  fn read_alphanumeric(&mut self) -> String {
    let mut text = String::new();
    while let Some(c) = self.peek().filter(|c| c.is_alphanumeric()) {
      text.push(c);
      self.advance();
    }
    text
  }

  /// Contents of a string or character literal with escapes resolved.
  fn read_quoted(
    &mut self,
    quote: char,
  ) -> String {
    self.advance();

    let mut text = String::new();
    while let Some(c) = self.peek() {
      if c == quote {
        break;
      }
      text.push(self.escaped_char());
    }

    if self.peek() == Some(quote) {
      self.advance();
    } else if quote == '"' {
      self.diagnostics.push(DiagnosticMessage::UnterminatedString(self.span()));
    } else {
      self.diagnostics.push(DiagnosticMessage::UnterminatedCharacter(self.span()));
    }

    text
  }

  fn escaped_char(&mut self) -> char {
    let c = self.advance();
    if c != '\\' {
      return c;
    }

    match self.advance() {
      'n' => '\n',
      't' => '\t',
      'r' => '\r',
      other => other,
    }
  }

  fn read_punctuation(&mut self) -> String {
    let c = self.advance();
    let mut text = c.to_string();

    let Some(next) = self.peek() else {
      return text;
    };

    let pair = matches!(
      (c, next),
      ('<', '=')
        | ('>', '=')
        | ('!', '=')
        | ('<', '<')
        | ('>', '>')
        | ('-', '>')
        | ('.', '.')
        | ('?', '.')
        | ('!', '!')
        | ('+', '=')
        | ('-', '=')
        | ('?', ':')
    );

    if pair {
      text.push(self.advance());
      if text == ".." && self.peek() == Some('.') {
        text.push(self.advance());
      }
    }

    text
  }

  fn indent_top(&self) -> u32 {
    self.indent_stack.last().copied().unwrap_or(1)
  }

  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  fn peek(&self) -> Option<char> {
    self.source[self.current..].chars().next()
  }

  fn peek_next(&self) -> Option<char> {
    self.source[self.current..].chars().nth(1)
  }

  /// Consumes one char. Past the end it yields `'\n'` without moving.
  fn advance(&mut self) -> char {
    let Some(c) = self.peek() else {
      return '\n';
    };

    self.current += c.len_utf8();
    if c == '\n' {
      self.column = 1;
    } else {
      self.column += 1;
    }
    c
  }

  fn span(&self) -> Span {
    Span::new(self.file, BytePosition(self.start as u32), BytePosition(self.current as u32))
  }
}

#[cfg(test)]
mod tests {
  use fpl_diagnostics::format_batch;
  use fpl_type::file::SourceMap;

  use super::*;

  fn lex(src: &str) -> (Vec<Token>, String) {
    let config = FplConfig::silent();
    let mut sm = SourceMap::new();
    let file = sm.add_file("test.txt", src.to_string());
    let mut lexer = FplLexer::new(&config, file, &sm.get(&file).text);
    lexer.scan_tokens();

    let reports: Vec<_> = lexer.diagnostics.iter().map(|d| d.report()).collect();
    let errors = format_batch(&reports, &sm);
    (lexer.tokens.clone(), errors)
  }

  fn dump(src: &str) -> String {
    let (tokens, _) = lex(src);
    tokens
      .iter()
      .filter(|t| t.type_ != TokenType::Eof)
      .map(|t| format!("{} {}\n", t.type_, t))
      .collect()
  }

  #[test]
  fn tokens_with_layout() {
    let src = "fun x 123 123.45 (\n   # this is a comment\n   \"hello\" ) <= 'x'\nval x = 1\n   val y = 2\nelse";

    insta::assert_snapshot!(dump(src), @r"
    FUN fun
    ID x
    INTLIT 123
    REALLIT 123.45
    OPENB (
    STRINGLIT hello
    CLOSEB )
    LTE <=
    CHARLIT x
    EOL <end of line>
    VAL val
    ID x
    EQ =
    INTLIT 1
    EOL <end of line>
    INDENT <indent>
    VAL val
    ID y
    EQ =
    INTLIT 2
    EOL <end of line>
    DEDENT <dedent>
    ELSE else
    EOL <end of line>
    ");
  }

  #[test]
  fn ranges_split_into_dotdot_and_comparison() {
    insta::assert_snapshot!(dump("0..<10"), @r"
    INTLIT 0
    DOTDOT ..
    LT <
    INTLIT 10
    EOL <end of line>
    ");
  }

  #[test]
  fn escaped_quote_in_string() {
    let (tokens, errors) = lex("val d = \"\\\"\\n\"");
    assert_eq!(errors, "");
    assert_eq!(tokens[3].type_, TokenType::StringLit);
    assert_eq!(tokens[3].lexeme, "\"\n");
  }

  #[test]
  fn dedent_to_unknown_column() {
    let (_, errors) = lex("val a = \"a\"\n   val d = \"b\"\n val e = \"c\"");
    assert_eq!(errors, "test.txt:3.2-3.2: Indentation error - got column 2, expected 1");
  }

  #[test]
  fn unterminated_literals() {
    assert_eq!(lex("val a = \"a").1, "test.txt:1.9-1.10: Unterminated string literal");
    assert_eq!(lex("val a = 'a").1, "test.txt:1.9-1.10: Unterminated character literal");
  }

  #[test]
  fn invalid_token() {
    assert_eq!(lex("val a = £").1, "test.txt:1.9-1.9: Invalid token '£'");
  }

  #[test]
  fn every_indent_is_closed() {
    let (tokens, _) = lex("fun f()\n    if x\n        y = 1\n");
    let indents = tokens.iter().filter(|t| t.type_ == TokenType::Indent).count();
    let dedents = tokens.iter().filter(|t| t.type_ == TokenType::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(indents, dedents);
    assert_eq!(tokens.last().map(|t| t.type_), Some(TokenType::Eof));
  }

  #[test]
  fn operator_at_line_end_joins_lines() {
    let (tokens, _) = lex("val x = 1 +\n    2\n");
    let kinds: Vec<_> = tokens.iter().map(|t| t.type_).collect();
    assert_eq!(
      kinds,
      vec![
        TokenType::Val,
        TokenType::Id,
        TokenType::Eq,
        TokenType::IntLit,
        TokenType::Plus,
        TokenType::IntLit,
        TokenType::Eol,
        TokenType::Eof
      ]
    );
  }
}

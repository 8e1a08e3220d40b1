#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
  // Literals
  Id,
  IntLit,
  RealLit,
  StringLit,
  CharLit,

  // Brackets
  OpenB,
  CloseB,
  OpenSq,
  CloseSq,
  OpenCl,
  CloseCl,

  // Operators
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Left,
  Right,
  Amp,
  Bar,
  Caret,
  Lt,
  Gt,
  Lte,
  Gte,
  Eq,
  Neq,
  Dot,
  DotDot,
  DotDotDot,
  Arrow,
  Comma,
  Colon,
  QMark,
  Bang,
  PlusEq,
  MinusEq,

  // Keywords
  And,
  Or,
  Not,
  Val,
  Var,
  Const,
  Fun,
  Class,
  Enum,
  If,
  Then,
  Elsif,
  Else,
  End,
  While,
  Repeat,
  Until,
  For,
  In,
  When,
  Print,
  Return,
  Break,
  Continue,
  New,
  Local,
  Free,
  As,
  Is,
  Array,
  FixedArray,
  Range,

  // Layout
  Eol,
  Indent,
  Dedent,
  Eof,
  Error,
}

impl TokenType {
  /// How the token is written, or a placeholder for tokens without fixed text.
  pub fn text(&self) -> &'static str {
    match self {
      TokenType::Id => "<identifier>",
      TokenType::IntLit => "<int literal>",
      TokenType::RealLit => "<real literal>",
      TokenType::StringLit => "<string literal>",
      TokenType::CharLit => "<char literal>",
      TokenType::OpenB => "(",
      TokenType::CloseB => ")",
      TokenType::OpenSq => "[",
      TokenType::CloseSq => "]",
      TokenType::OpenCl => "{",
      TokenType::CloseCl => "}",
      TokenType::Plus => "+",
      TokenType::Minus => "-",
      TokenType::Star => "*",
      TokenType::Slash => "/",
      TokenType::Percent => "%",
      TokenType::Left => "<<",
      TokenType::Right => ">>",
      TokenType::Amp => "&",
      TokenType::Bar => "|",
      TokenType::Caret => "^",
      TokenType::Lt => "<",
      TokenType::Gt => ">",
      TokenType::Lte => "<=",
      TokenType::Gte => ">=",
      TokenType::Eq => "=",
      TokenType::Neq => "!=",
      TokenType::Dot => ".",
      TokenType::DotDot => "..",
      TokenType::DotDotDot => "...",
      TokenType::Arrow => "->",
      TokenType::Comma => ",",
      TokenType::Colon => ":",
      TokenType::QMark => "?",
      TokenType::Bang => "!",
      TokenType::PlusEq => "+=",
      TokenType::MinusEq => "-=",
      TokenType::And => "and",
      TokenType::Or => "or",
      TokenType::Not => "not",
      TokenType::Val => "val",
      TokenType::Var => "var",
      TokenType::Const => "const",
      TokenType::Fun => "fun",
      TokenType::Class => "class",
      TokenType::Enum => "enum",
      TokenType::If => "if",
      TokenType::Then => "then",
      TokenType::Elsif => "elsif",
      TokenType::Else => "else",
      TokenType::End => "end",
      TokenType::While => "while",
      TokenType::Repeat => "repeat",
      TokenType::Until => "until",
      TokenType::For => "for",
      TokenType::In => "in",
      TokenType::When => "when",
      TokenType::Print => "print",
      TokenType::Return => "return",
      TokenType::Break => "break",
      TokenType::Continue => "continue",
      TokenType::New => "new",
      TokenType::Local => "local",
      TokenType::Free => "free",
      TokenType::As => "as",
      TokenType::Is => "is",
      TokenType::Array => "Array",
      TokenType::FixedArray => "FixedArray",
      TokenType::Range => "Range",
      TokenType::Eol => "<end of line>",
      TokenType::Indent => "<indent>",
      TokenType::Dedent => "<dedent>",
      TokenType::Eof => "<end of file>",
      TokenType::Error => "<error>",
    }
  }

  pub fn from_keyword(word: &str) -> Option<TokenType> {
    let kind = match word {
      "and" => TokenType::And,
      "or" => TokenType::Or,
      "not" => TokenType::Not,
      "val" => TokenType::Val,
      "var" => TokenType::Var,
      "const" => TokenType::Const,
      "fun" => TokenType::Fun,
      "class" => TokenType::Class,
      "enum" => TokenType::Enum,
      "if" => TokenType::If,
      "then" => TokenType::Then,
      "elsif" => TokenType::Elsif,
      "else" => TokenType::Else,
      "end" => TokenType::End,
      "while" => TokenType::While,
      "repeat" => TokenType::Repeat,
      "until" => TokenType::Until,
      "for" => TokenType::For,
      "in" => TokenType::In,
      "when" => TokenType::When,
      "print" => TokenType::Print,
      "return" => TokenType::Return,
      "break" => TokenType::Break,
      "continue" => TokenType::Continue,
      "new" => TokenType::New,
      "local" => TokenType::Local,
      "free" => TokenType::Free,
      "as" => TokenType::As,
      "is" => TokenType::Is,
      "Array" => TokenType::Array,
      "FixedArray" => TokenType::FixedArray,
      "Range" => TokenType::Range,
      _ => return None,
    };
    Some(kind)
  }

  pub fn from_punctuation(text: &str) -> Option<TokenType> {
    let kind = match text {
      "(" => TokenType::OpenB,
      ")" => TokenType::CloseB,
      "[" => TokenType::OpenSq,
      "]" => TokenType::CloseSq,
      "{" => TokenType::OpenCl,
      "}" => TokenType::CloseCl,
      "+" => TokenType::Plus,
      "-" => TokenType::Minus,
      "*" => TokenType::Star,
      "/" => TokenType::Slash,
      "%" => TokenType::Percent,
      "<<" => TokenType::Left,
      ">>" => TokenType::Right,
      "&" => TokenType::Amp,
      "|" => TokenType::Bar,
      "^" => TokenType::Caret,
      "<" => TokenType::Lt,
      ">" => TokenType::Gt,
      "<=" => TokenType::Lte,
      ">=" => TokenType::Gte,
      "=" => TokenType::Eq,
      "!=" => TokenType::Neq,
      "." => TokenType::Dot,
      ".." => TokenType::DotDot,
      "..." => TokenType::DotDotDot,
      "->" => TokenType::Arrow,
      "," => TokenType::Comma,
      ":" => TokenType::Colon,
      "?" => TokenType::QMark,
      "!" => TokenType::Bang,
      "+=" => TokenType::PlusEq,
      "-=" => TokenType::MinusEq,
      _ => return None,
    };
    Some(kind)
  }

  /// A newline directly after this token does not end the statement.
  pub fn line_continues(&self) -> bool {
    matches!(
      self,
      TokenType::Eol
        | TokenType::Indent
        | TokenType::Dedent
        | TokenType::OpenB
        | TokenType::OpenSq
        | TokenType::OpenCl
        | TokenType::Plus
        | TokenType::Minus
        | TokenType::Star
        | TokenType::Slash
        | TokenType::Percent
        | TokenType::Left
        | TokenType::Right
        | TokenType::Amp
        | TokenType::Bar
        | TokenType::Caret
        | TokenType::Lt
        | TokenType::Lte
        | TokenType::Gte
        | TokenType::Eq
        | TokenType::Neq
        | TokenType::Dot
        | TokenType::DotDot
        | TokenType::Comma
        | TokenType::Colon
        | TokenType::PlusEq
        | TokenType::MinusEq
        | TokenType::And
        | TokenType::Or
        | TokenType::Not
        | TokenType::As
        | TokenType::Is
    )
  }
}

impl std::fmt::Display for TokenType {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let name = match self {
      TokenType::Id => "ID",
      TokenType::IntLit => "INTLIT",
      TokenType::RealLit => "REALLIT",
      TokenType::StringLit => "STRINGLIT",
      TokenType::CharLit => "CHARLIT",
      TokenType::OpenB => "OPENB",
      TokenType::CloseB => "CLOSEB",
      TokenType::OpenSq => "OPENSQ",
      TokenType::CloseSq => "CLOSESQ",
      TokenType::OpenCl => "OPENCL",
      TokenType::CloseCl => "CLOSECL",
      TokenType::Plus => "PLUS",
      TokenType::Minus => "MINUS",
      TokenType::Star => "STAR",
      TokenType::Slash => "SLASH",
      TokenType::Percent => "PERCENT",
      TokenType::Left => "LEFT",
      TokenType::Right => "RIGHT",
      TokenType::Amp => "AMP",
      TokenType::Bar => "BAR",
      TokenType::Caret => "CARET",
      TokenType::Lt => "LT",
      TokenType::Gt => "GT",
      TokenType::Lte => "LTE",
      TokenType::Gte => "GTE",
      TokenType::Eq => "EQ",
      TokenType::Neq => "NEQ",
      TokenType::Dot => "DOT",
      TokenType::DotDot => "DOTDOT",
      TokenType::DotDotDot => "DOTDOTDOT",
      TokenType::Arrow => "ARROW",
      TokenType::Comma => "COMMA",
      TokenType::Colon => "COLON",
      TokenType::QMark => "QMARK",
      TokenType::Bang => "BANG",
      TokenType::PlusEq => "PLUSEQ",
      TokenType::MinusEq => "MINUSEQ",
      TokenType::And => "AND",
      TokenType::Or => "OR",
      TokenType::Not => "NOT",
      TokenType::Val => "VAL",
      TokenType::Var => "VAR",
      TokenType::Const => "CONST",
      TokenType::Fun => "FUN",
      TokenType::Class => "CLASS",
      TokenType::Enum => "ENUM",
      TokenType::If => "IF",
      TokenType::Then => "THEN",
      TokenType::Elsif => "ELSIF",
      TokenType::Else => "ELSE",
      TokenType::End => "END",
      TokenType::While => "WHILE",
      TokenType::Repeat => "REPEAT",
      TokenType::Until => "UNTIL",
      TokenType::For => "FOR",
      TokenType::In => "IN",
      TokenType::When => "WHEN",
      TokenType::Print => "PRINT",
      TokenType::Return => "RETURN",
      TokenType::Break => "BREAK",
      TokenType::Continue => "CONTINUE",
      TokenType::New => "NEW",
      TokenType::Local => "LOCAL",
      TokenType::Free => "FREE",
      TokenType::As => "AS",
      TokenType::Is => "IS",
      TokenType::Array => "ARRAY",
      TokenType::FixedArray => "FIXEDARRAY",
      TokenType::Range => "RANGE",
      TokenType::Eol => "EOL",
      TokenType::Indent => "INDENT",
      TokenType::Dedent => "DEDENT",
      TokenType::Eof => "EOF",
      TokenType::Error => "ERROR",
    };
    write!(f, "{}", name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keywords_and_punctuation_round_trip_through_text() {
    for word in ["fun", "elsif", "Array", "local", "is"] {
      let kind = TokenType::from_keyword(word).unwrap();
      assert_eq!(kind.text(), word);
    }
    assert_eq!(TokenType::from_keyword("fred"), None);
    assert_eq!(TokenType::from_punctuation("..."), Some(TokenType::DotDotDot));
    assert_eq!(TokenType::from_punctuation("?."), None);
  }

  #[test]
  fn closing_tokens_end_the_line() {
    assert!(TokenType::Plus.line_continues());
    assert!(TokenType::And.line_continues());
    assert!(!TokenType::CloseB.line_continues());
    assert!(!TokenType::Gt.line_continues());
    assert!(!TokenType::Arrow.line_continues());
    assert!(!TokenType::Id.line_continues());
  }
}

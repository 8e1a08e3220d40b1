use std::fmt;

use fpl_type::span::Span;

use super::diagnostic_report::{Diagnostic, Severity};

/// Every diagnostic the compiler can produce. Type names are rendered by the
/// producer, so messages can be formatted without a type store.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticMessage {
  // #region Lexer
  InvalidToken {
    text: String,
    at: Span,
  },
  UnterminatedString(Span),
  UnterminatedCharacter(Span),
  InvalidEscape {
    ch: char,
    at: Span,
  },
  MalformedIntLiteral {
    text: String,
    at: Span,
  },
  MalformedRealLiteral {
    text: String,
    at: Span,
  },
  MalformedCharLiteral {
    text: String,
    at: Span,
  },
  IndentationError {
    got: u32,
    expected: u32,
    at: Span,
  },
  // #endregion Lexer
  // #region Parser
  UnexpectedToken {
    found: String,
    expected: String,
    at: Span,
  },
  MismatchedEnd {
    found: String,
    expected: String,
    at: Span,
  },
  ParameterKeywordOutsideConstructor {
    keyword: String,
    at: Span,
  },
  EmptyVarargs(Span),
  ExpectedEol {
    found: String,
    at: Span,
  },
  ExpectedThenOrEol(Span),
  MissingIndentedBlock(Span),
  MissingWhenBlock(Span),
  NotAllowedInClass {
    found: String,
    at: Span,
  },
  // #endregion Parser
  // #region Names
  UndeclaredIdentifier {
    name: String,
    span: Span,
  },
  DuplicateSymbol {
    name: String,
    span: Span,
    previous: String,
    previous_span: Span,
  },
  DuplicateFunction {
    signature: String,
    span: Span,
    previous: String,
    previous_span: Span,
  },
  NotAValue {
    name: String,
    span: Span,
  },
  UnknownType {
    name: String,
    span: Span,
  },
  NotAType {
    name: String,
    span: Span,
  },
  WrongTypeArgCount {
    name: String,
    expected: usize,
    got: usize,
    span: Span,
  },
  NestedFunction(Span),
  UnresolvedDeclType {
    name: String,
    span: Span,
  },
  // #endregion Names
  // #region Calls
  NoMatchingFunction {
    call: String,
    candidates: Vec<String>,
    span: Span,
  },
  AmbiguousCall {
    call: String,
    candidates: Vec<String>,
    span: Span,
  },
  NotCallable {
    ty: String,
    span: Span,
  },
  OverloadedReference {
    name: String,
    span: Span,
  },
  MethodNotCalled {
    name: String,
    span: Span,
  },
  NotInstantiable {
    ty: String,
    span: Span,
  },
  ArraySizeArgs(Span),
  // #endregion Calls
  // #region Types
  TypeMismatch {
    expected: String,
    got: String,
    span: Span,
  },
  InvalidBinaryOperator {
    op: String,
    left: String,
    right: String,
    span: Span,
  },
  InvalidUnaryOperator {
    op: String,
    ty: String,
    span: Span,
  },
  InvalidCompoundAssign {
    op: String,
    ty: String,
    span: Span,
  },
  InvalidErrorUnion {
    ty: String,
    span: Span,
  },
  InvalidCast {
    from: String,
    to: String,
    span: Span,
  },
  InvalidIsTest {
    ty: String,
    span: Span,
  },
  IncompatibleBranches {
    then_ty: String,
    else_ty: String,
    span: Span,
  },
  InvalidRange {
    ty: String,
    span: Span,
  },
  RangeOutsideFor(Span),
  NotIndexable {
    ty: String,
    span: Span,
  },
  CannotIterate {
    ty: String,
    span: Span,
  },
  CannotPrint {
    ty: String,
    span: Span,
  },
  // #endregion Types
  // #region Members
  NullFieldAccess {
    field: String,
    span: Span,
  },
  MaybeNullAccess {
    field: String,
    span: Span,
  },
  MaybeErrorAccess {
    field: String,
    span: Span,
  },
  NoSuchField {
    ty: String,
    field: String,
    span: Span,
  },
  NoSuchEnumValue {
    enum_name: String,
    name: String,
    span: Span,
  },
  EnumValueArity {
    name: String,
    expected: usize,
    got: usize,
    span: Span,
  },
  // #endregion Members
  // #region Flow
  UninitializedSymbol {
    name: String,
    span: Span,
  },
  MaybeUninitializedSymbol {
    name: String,
    span: Span,
  },
  MayAlreadyBeInitialised {
    name: String,
    span: Span,
  },
  NotMutable {
    name: String,
    span: Span,
  },
  NotAnLvalue(Span),
  BreakOutsideLoop(Span),
  ContinueOutsideLoop(Span),
  ReturnOutsideFunction(Span),
  MissingReturnValue {
    ty: String,
    span: Span,
  },
  MissingReturn {
    name: String,
    span: Span,
  },
  CannotFree {
    ty: String,
    span: Span,
  },
  PossibleDoubleFree(Span),
  PossibleUseAfterFree {
    name: String,
    span: Span,
  },
  // #endregion Flow
  // #region When/Const
  InvalidWhenType {
    ty: String,
    span: Span,
  },
  DuplicateValue {
    value: String,
    span: Span,
  },
  ElseNotLast(Span),
  NotConstant(Span),
  // #endregion When/Const
}

impl fmt::Display for DiagnosticMessage {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      DiagnosticMessage::InvalidToken { text, .. } => write!(f, "Invalid token '{}'", text),
      DiagnosticMessage::UnterminatedString(_) => write!(f, "Unterminated string literal"),
      DiagnosticMessage::UnterminatedCharacter(_) => write!(f, "Unterminated character literal"),
      DiagnosticMessage::InvalidEscape { ch, .. } => write!(f, "Invalid escape sequence '\\{}'", ch),
      DiagnosticMessage::MalformedIntLiteral { text, .. } => write!(f, "Malformed integer literal '{}'", text),
      DiagnosticMessage::MalformedRealLiteral { text, .. } => write!(f, "Malformed real literal '{}'", text),
      DiagnosticMessage::MalformedCharLiteral { text, .. } => write!(f, "Malformed character literal '{}'", text),
      DiagnosticMessage::IndentationError { got, expected, .. } => {
        write!(f, "Indentation error - got column {}, expected {}", got, expected)
      },
      DiagnosticMessage::UnexpectedToken { found, expected, .. } => {
        write!(f, "Got {} when expecting {}", found, expected)
      },
      DiagnosticMessage::MismatchedEnd { found, expected, .. } => {
        write!(f, "Got 'end {}' when expecting 'end {}'", found, expected)
      },
      DiagnosticMessage::ParameterKeywordOutsideConstructor { keyword, .. } => {
        write!(f, "'{}' only allowed in constructors", keyword)
      },
      DiagnosticMessage::EmptyVarargs(_) => write!(f, "Cannot have varargs with an empty parameter list"),
      DiagnosticMessage::ExpectedEol { found, .. } => write!(f, "Got '{}' when expecting end of line", found),
      DiagnosticMessage::ExpectedThenOrEol(_) => write!(f, "Expected 'then' or 'end of line'"),
      DiagnosticMessage::MissingIndentedBlock(_) => write!(f, "Missing indented block"),
      DiagnosticMessage::MissingWhenBlock(_) => write!(f, "Expected indented block after when"),
      DiagnosticMessage::NotAllowedInClass { found, .. } => write!(f, "{} not allowed in Class body", found),
      DiagnosticMessage::UndeclaredIdentifier { name, .. } => write!(f, "Undeclared identifier '{}'", name),
      DiagnosticMessage::DuplicateSymbol { name, previous, .. } => {
        write!(f, "Duplicate symbol '{}', first defined at {}", name, previous)
      },
      DiagnosticMessage::DuplicateFunction { signature, previous, .. } => {
        write!(f, "Duplicate function '{}', first defined at {}", signature, previous)
      },
      DiagnosticMessage::NotAValue { name, .. } => write!(f, "'{}' is not a value", name),
      DiagnosticMessage::UnknownType { name, .. } => write!(f, "Unknown type '{}'", name),
      DiagnosticMessage::NotAType { name, .. } => write!(f, "'{}' is not a type", name),
      DiagnosticMessage::WrongTypeArgCount { name, expected, got, .. } => {
        write!(f, "Type '{}' expects {} type arguments, got {}", name, expected, got)
      },
      DiagnosticMessage::NestedFunction(_) => write!(f, "Functions can only be declared at file or class level"),
      DiagnosticMessage::UnresolvedDeclType { name, .. } => write!(f, "Cannot resolve type for '{}'", name),
      DiagnosticMessage::NoMatchingFunction { call, candidates, .. } => {
        write!(f, "No functions match '{}'. Candidates are: {}", call, candidates.join(", "))
      },
      DiagnosticMessage::AmbiguousCall { call, candidates, .. } => {
        write!(f, "Ambiguous call to '{}'. Candidates are: {}", call, candidates.join(", "))
      },
      DiagnosticMessage::NotCallable { ty, .. } => write!(f, "Cannot call expression of type '{}'", ty),
      DiagnosticMessage::OverloadedReference { name, .. } => {
        write!(f, "Cannot take a reference to overloaded function '{}'", name)
      },
      DiagnosticMessage::MethodNotCalled { name, .. } => write!(f, "Method '{}' must be called", name),
      DiagnosticMessage::NotInstantiable { ty, .. } => write!(f, "Cannot create an instance of '{}'", ty),
      DiagnosticMessage::ArraySizeArgs(_) => write!(f, "Array constructor takes a single Int size"),
      DiagnosticMessage::TypeMismatch { expected, got, .. } => {
        write!(f, "Got type '{}' when expecting '{}'", got, expected)
      },
      DiagnosticMessage::InvalidBinaryOperator { op, left, right, .. } => {
        write!(f, "Invalid binary operator '{}' for types {} and {}", op, left, right)
      },
      DiagnosticMessage::InvalidUnaryOperator { op, ty, .. } => {
        write!(f, "Invalid unary operator '{}' for type {}", op, ty)
      },
      DiagnosticMessage::InvalidCompoundAssign { op, ty, .. } => {
        write!(f, "Operator '{}' not defined for type '{}'", op, ty)
      },
      DiagnosticMessage::InvalidErrorUnion { ty, .. } => {
        write!(f, "Type '{}' cannot be used in an error union", ty)
      },
      DiagnosticMessage::InvalidCast { from, to, .. } => write!(f, "Cannot cast '{}' to '{}'", from, to),
      DiagnosticMessage::InvalidIsTest { ty, .. } => {
        write!(f, "'is' requires a nullable or error union, got '{}'", ty)
      },
      DiagnosticMessage::IncompatibleBranches { then_ty, else_ty, .. } => {
        write!(f, "Incompatible types '{}' and '{}' in if expression", then_ty, else_ty)
      },
      DiagnosticMessage::InvalidRange { ty, .. } => write!(f, "Invalid range of type '{}'", ty),
      DiagnosticMessage::RangeOutsideFor(_) => write!(f, "Ranges can only be used in a for loop"),
      DiagnosticMessage::NotIndexable { ty, .. } => write!(f, "Cannot index into type '{}'", ty),
      DiagnosticMessage::CannotIterate { ty, .. } => write!(f, "Cannot iterate over type '{}'", ty),
      DiagnosticMessage::CannotPrint { ty, .. } => write!(f, "Cannot print values of type '{}'", ty),
      DiagnosticMessage::NullFieldAccess { field, .. } => {
        write!(f, "Cannot access field '{}' of expression of type Null", field)
      },
      DiagnosticMessage::MaybeNullAccess { field, .. } => {
        write!(f, "Cannot access '{}' as expression may be null", field)
      },
      DiagnosticMessage::MaybeErrorAccess { field, .. } => {
        write!(f, "Cannot access '{}' as expression may be an error", field)
      },
      DiagnosticMessage::NoSuchField { ty, field, .. } => write!(f, "Type '{}' has no field named '{}'", ty, field),
      DiagnosticMessage::NoSuchEnumValue { enum_name, name, .. } => {
        write!(f, "Enum '{}' has no value '{}'", enum_name, name)
      },
      DiagnosticMessage::EnumValueArity { name, expected, got, .. } => {
        write!(f, "Enum value '{}' expects {} arguments, got {}", name, expected, got)
      },
      DiagnosticMessage::UninitializedSymbol { name, .. } => write!(f, "Symbol '{}' is uninitialized", name),
      DiagnosticMessage::MaybeUninitializedSymbol { name, .. } => {
        write!(f, "Symbol '{}' may be uninitialized", name)
      },
      DiagnosticMessage::MayAlreadyBeInitialised { name, .. } => write!(f, "'{}' may already be initialised", name),
      DiagnosticMessage::NotMutable { name, .. } => write!(f, "Symbol '{}' is not mutable", name),
      DiagnosticMessage::NotAnLvalue(_) => write!(f, "Expression is not an lvalue"),
      DiagnosticMessage::BreakOutsideLoop(_) => write!(f, "'break' outside of a loop"),
      DiagnosticMessage::ContinueOutsideLoop(_) => write!(f, "'continue' outside of a loop"),
      DiagnosticMessage::ReturnOutsideFunction(_) => write!(f, "'return' outside of a function"),
      DiagnosticMessage::MissingReturnValue { ty, .. } => {
        write!(f, "Function must return a value of type '{}'", ty)
      },
      DiagnosticMessage::MissingReturn { name, .. } => write!(f, "Function '{}' must return a value", name),
      DiagnosticMessage::CannotFree { ty, .. } => write!(f, "Cannot free expression of type '{}'", ty),
      DiagnosticMessage::PossibleDoubleFree(_) => write!(f, "Possible double free"),
      DiagnosticMessage::PossibleUseAfterFree { .. } => write!(f, "possible use of freed object"),
      DiagnosticMessage::InvalidWhenType { ty, .. } => write!(f, "Invalid type '{}' for when expression", ty),
      DiagnosticMessage::DuplicateValue { value, .. } => write!(f, "Duplicate value '{}'", value),
      DiagnosticMessage::ElseNotLast(_) => write!(f, "Else clause must be the last clause"),
      DiagnosticMessage::NotConstant(_) => write!(f, "Expression is not a compile-time constant"),
    }
  }
}

impl DiagnosticMessage {
  pub fn primary_span(&self) -> Span {
    match self {
      DiagnosticMessage::InvalidToken { at, .. }
      | DiagnosticMessage::UnterminatedString(at)
      | DiagnosticMessage::UnterminatedCharacter(at)
      | DiagnosticMessage::InvalidEscape { at, .. }
      | DiagnosticMessage::MalformedIntLiteral { at, .. }
      | DiagnosticMessage::MalformedRealLiteral { at, .. }
      | DiagnosticMessage::MalformedCharLiteral { at, .. }
      | DiagnosticMessage::IndentationError { at, .. }
      | DiagnosticMessage::UnexpectedToken { at, .. }
      | DiagnosticMessage::MismatchedEnd { at, .. }
      | DiagnosticMessage::ParameterKeywordOutsideConstructor { at, .. }
      | DiagnosticMessage::EmptyVarargs(at)
      | DiagnosticMessage::ExpectedEol { at, .. }
      | DiagnosticMessage::ExpectedThenOrEol(at)
      | DiagnosticMessage::MissingIndentedBlock(at)
      | DiagnosticMessage::MissingWhenBlock(at)
      | DiagnosticMessage::NotAllowedInClass { at, .. } => at.clone(),

      DiagnosticMessage::UndeclaredIdentifier { span, .. }
      | DiagnosticMessage::DuplicateSymbol { span, .. }
      | DiagnosticMessage::DuplicateFunction { span, .. }
      | DiagnosticMessage::NotAValue { span, .. }
      | DiagnosticMessage::UnknownType { span, .. }
      | DiagnosticMessage::NotAType { span, .. }
      | DiagnosticMessage::WrongTypeArgCount { span, .. }
      | DiagnosticMessage::NestedFunction(span)
      | DiagnosticMessage::UnresolvedDeclType { span, .. }
      | DiagnosticMessage::NoMatchingFunction { span, .. }
      | DiagnosticMessage::AmbiguousCall { span, .. }
      | DiagnosticMessage::NotCallable { span, .. }
      | DiagnosticMessage::OverloadedReference { span, .. }
      | DiagnosticMessage::MethodNotCalled { span, .. }
      | DiagnosticMessage::NotInstantiable { span, .. }
      | DiagnosticMessage::ArraySizeArgs(span)
      | DiagnosticMessage::TypeMismatch { span, .. }
      | DiagnosticMessage::InvalidBinaryOperator { span, .. }
      | DiagnosticMessage::InvalidUnaryOperator { span, .. }
      | DiagnosticMessage::InvalidCompoundAssign { span, .. }
      | DiagnosticMessage::InvalidErrorUnion { span, .. }
      | DiagnosticMessage::InvalidCast { span, .. }
      | DiagnosticMessage::InvalidIsTest { span, .. }
      | DiagnosticMessage::IncompatibleBranches { span, .. }
      | DiagnosticMessage::InvalidRange { span, .. }
      | DiagnosticMessage::NotIndexable { span, .. }
      | DiagnosticMessage::CannotIterate { span, .. }
      | DiagnosticMessage::CannotPrint { span, .. }
      | DiagnosticMessage::NullFieldAccess { span, .. }
      | DiagnosticMessage::MaybeNullAccess { span, .. }
      | DiagnosticMessage::MaybeErrorAccess { span, .. }
      | DiagnosticMessage::NoSuchField { span, .. }
      | DiagnosticMessage::NoSuchEnumValue { span, .. }
      | DiagnosticMessage::EnumValueArity { span, .. }
      | DiagnosticMessage::UninitializedSymbol { span, .. }
      | DiagnosticMessage::MaybeUninitializedSymbol { span, .. }
      | DiagnosticMessage::MayAlreadyBeInitialised { span, .. }
      | DiagnosticMessage::NotMutable { span, .. }
      | DiagnosticMessage::NotAnLvalue(span)
      | DiagnosticMessage::BreakOutsideLoop(span)
      | DiagnosticMessage::ContinueOutsideLoop(span)
      | DiagnosticMessage::ReturnOutsideFunction(span)
      | DiagnosticMessage::MissingReturnValue { span, .. }
      | DiagnosticMessage::MissingReturn { span, .. }
      | DiagnosticMessage::CannotFree { span, .. }
      | DiagnosticMessage::PossibleDoubleFree(span)
      | DiagnosticMessage::PossibleUseAfterFree { span, .. }
      | DiagnosticMessage::InvalidWhenType { span, .. }
      | DiagnosticMessage::DuplicateValue { span, .. }
      | DiagnosticMessage::ElseNotLast(span)
      | DiagnosticMessage::RangeOutsideFor(span)
      | DiagnosticMessage::NotConstant(span) => span.clone(),
    }
  }

  pub fn code(&self) -> String {
    match self {
      DiagnosticMessage::InvalidToken { .. } => "L0001",
      DiagnosticMessage::UnterminatedString(_) => "L0002",
      DiagnosticMessage::UnterminatedCharacter(_) => "L0003",
      DiagnosticMessage::InvalidEscape { .. } => "L0004",
      DiagnosticMessage::IndentationError { .. } => "L0005",
      DiagnosticMessage::UnexpectedToken { .. } => "P0001",
      DiagnosticMessage::MismatchedEnd { .. } => "P0002",
      DiagnosticMessage::ParameterKeywordOutsideConstructor { .. } => "P0003",
      DiagnosticMessage::EmptyVarargs(_) => "P0004",
      DiagnosticMessage::MalformedIntLiteral { .. } => "P0005",
      DiagnosticMessage::MalformedRealLiteral { .. } => "P0006",
      DiagnosticMessage::MalformedCharLiteral { .. } => "P0007",
      DiagnosticMessage::ExpectedEol { .. } => "P0008",
      DiagnosticMessage::ExpectedThenOrEol(_) => "P0009",
      DiagnosticMessage::MissingIndentedBlock(_) => "P0010",
      DiagnosticMessage::MissingWhenBlock(_) => "P0011",
      DiagnosticMessage::NotAllowedInClass { .. } => "P0012",
      DiagnosticMessage::UndeclaredIdentifier { .. } => "A0001",
      DiagnosticMessage::DuplicateSymbol { .. } => "A0002",
      DiagnosticMessage::DuplicateFunction { .. } => "A0003",
      DiagnosticMessage::NotAValue { .. } => "A0004",
      DiagnosticMessage::UnknownType { .. } => "A0005",
      DiagnosticMessage::NotAType { .. } => "A0006",
      DiagnosticMessage::WrongTypeArgCount { .. } => "A0007",
      DiagnosticMessage::NestedFunction(_) => "A0008",
      DiagnosticMessage::NoMatchingFunction { .. } => "A0009",
      DiagnosticMessage::AmbiguousCall { .. } => "A0010",
      DiagnosticMessage::NotCallable { .. } => "A0011",
      DiagnosticMessage::OverloadedReference { .. } => "A0012",
      DiagnosticMessage::MethodNotCalled { .. } => "A0013",
      DiagnosticMessage::NotInstantiable { .. } => "A0014",
      DiagnosticMessage::ArraySizeArgs(_) => "A0015",
      DiagnosticMessage::TypeMismatch { .. } => "A0016",
      DiagnosticMessage::InvalidBinaryOperator { .. } => "A0017",
      DiagnosticMessage::InvalidUnaryOperator { .. } => "A0018",
      DiagnosticMessage::InvalidCompoundAssign { .. } => "A0019",
      DiagnosticMessage::InvalidErrorUnion { .. } => "A0020",
      DiagnosticMessage::InvalidCast { .. } => "A0021",
      DiagnosticMessage::InvalidIsTest { .. } => "A0022",
      DiagnosticMessage::IncompatibleBranches { .. } => "A0023",
      DiagnosticMessage::InvalidRange { .. } => "A0024",
      DiagnosticMessage::NotIndexable { .. } => "A0025",
      DiagnosticMessage::CannotIterate { .. } => "A0026",
      DiagnosticMessage::CannotPrint { .. } => "A0027",
      DiagnosticMessage::NullFieldAccess { .. } => "A0028",
      DiagnosticMessage::MaybeNullAccess { .. } => "A0029",
      DiagnosticMessage::MaybeErrorAccess { .. } => "A0030",
      DiagnosticMessage::NoSuchField { .. } => "A0031",
      DiagnosticMessage::NoSuchEnumValue { .. } => "A0032",
      DiagnosticMessage::EnumValueArity { .. } => "A0033",
      DiagnosticMessage::UninitializedSymbol { .. } => "A0034",
      DiagnosticMessage::MaybeUninitializedSymbol { .. } => "A0035",
      DiagnosticMessage::MayAlreadyBeInitialised { .. } => "A0036",
      DiagnosticMessage::NotMutable { .. } => "A0037",
      DiagnosticMessage::NotAnLvalue(_) => "A0038",
      DiagnosticMessage::BreakOutsideLoop(_) => "A0039",
      DiagnosticMessage::ContinueOutsideLoop(_) => "A0040",
      DiagnosticMessage::ReturnOutsideFunction(_) => "A0041",
      DiagnosticMessage::MissingReturnValue { .. } => "A0042",
      DiagnosticMessage::MissingReturn { .. } => "A0043",
      DiagnosticMessage::CannotFree { .. } => "A0044",
      DiagnosticMessage::InvalidWhenType { .. } => "A0045",
      DiagnosticMessage::DuplicateValue { .. } => "A0046",
      DiagnosticMessage::ElseNotLast(_) => "A0047",
      DiagnosticMessage::NotConstant(_) => "A0048",
      DiagnosticMessage::UnresolvedDeclType { .. } => "A0049",
      DiagnosticMessage::RangeOutsideFor(_) => "A0050",
      DiagnosticMessage::PossibleDoubleFree(_) => "W0001",
      DiagnosticMessage::PossibleUseAfterFree { .. } => "W0002",
    }
    .to_string()
  }

  pub fn level(&self) -> Severity {
    match self {
      DiagnosticMessage::PossibleDoubleFree(_) | DiagnosticMessage::PossibleUseAfterFree { .. } => Severity::Warning,
      _ => Severity::Error,
    }
  }

  fn secondary_labels(&self) -> Vec<(Span, String)> {
    match self {
      DiagnosticMessage::DuplicateSymbol { previous_span, .. }
      | DiagnosticMessage::DuplicateFunction { previous_span, .. } => {
        vec![(previous_span.clone(), "Previous definition here".to_string())]
      },
      _ => vec![],
    }
  }

  pub fn report(&self) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(self.level(), self.to_string(), self.code(), self.primary_span());
    for (span, message) in self.secondary_labels() {
      diagnostic = diagnostic.with_label(span, message);
    }
    if let DiagnosticMessage::PossibleUseAfterFree { name, .. } = self {
      diagnostic = diagnostic.with_note(format!("'{}' was freed on some path reaching this use", name));
    }
    diagnostic
  }
}

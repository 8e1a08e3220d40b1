use fpl_type::span::Span;

use crate::ExprId;

/// A type as written in source. Resolved to a `TypeId` by the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum FplTypeSyntax {
  /// `Int`, `Cat`, `Box<Int>`.
  Named {
    name: String,
    args: Vec<FplTypeSyntax>,
    span: Span,
  },
  /// `Array<T>`; the element may be left out in `new Array[...]`.
  Array {
    element: Option<Box<FplTypeSyntax>>,
    span: Span,
  },
  /// `FixedArray<T>(n)`: elements stored inline.
  FixedArray {
    element: Box<FplTypeSyntax>,
    size: ExprId,
    span: Span,
  },
  Range {
    element: Box<FplTypeSyntax>,
    span: Span,
  },
  Nullable {
    inner: Box<FplTypeSyntax>,
    span: Span,
  },
  ErrorUnion {
    inner: Box<FplTypeSyntax>,
    span: Span,
  },
}

impl FplTypeSyntax {
  pub fn span(&self) -> &Span {
    match self {
      FplTypeSyntax::Named { span, .. }
      | FplTypeSyntax::Array { span, .. }
      | FplTypeSyntax::FixedArray { span, .. }
      | FplTypeSyntax::Range { span, .. }
      | FplTypeSyntax::Nullable { span, .. }
      | FplTypeSyntax::ErrorUnion { span, .. } => span,
    }
  }
}

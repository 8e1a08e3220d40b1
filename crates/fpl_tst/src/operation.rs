/// A typed ALU operation. The suffix names the operand kind: `_I` for
/// word-sized integers, `_R` for reals, `_S` for strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
  AddI,
  SubI,
  MulI,
  DivI,
  ModI,
  AndI,
  OrI,
  XorI,
  ShlI,
  ShrI,
  EqI,
  NeqI,
  LtI,
  LteI,
  GtI,
  GteI,

  AddR,
  SubR,
  MulR,
  DivR,
  ModR,
  EqR,
  NeqR,
  LtR,
  LteR,
  GtR,
  GteR,

  EqS,
  NeqS,
  LtS,
  LteS,
  GtS,
  GteS,

  /// `idx4 d, i, size`: `i` scaled to a byte offset, trapping unless `0 <= i < size`.
  /// Only produced by code generation.
  Idx1,
  Idx4,
}

impl AluOp {
  pub fn is_comparison(&self) -> bool {
    matches!(
      self,
      AluOp::EqI
        | AluOp::NeqI
        | AluOp::LtI
        | AluOp::LteI
        | AluOp::GtI
        | AluOp::GteI
        | AluOp::EqR
        | AluOp::NeqR
        | AluOp::LtR
        | AluOp::LteR
        | AluOp::GtR
        | AluOp::GteR
        | AluOp::EqS
        | AluOp::NeqS
        | AluOp::LtS
        | AluOp::LteS
        | AluOp::GtS
        | AluOp::GteS
    )
  }

  pub fn is_commutative(&self) -> bool {
    matches!(
      self,
      AluOp::AddI | AluOp::MulI | AluOp::AndI | AluOp::OrI | AluOp::XorI | AluOp::EqI | AluOp::NeqI
    )
  }

  /// String comparisons are done through `strcmp` and an integer comparison
  /// of its result against zero. This gives that integer comparison.
  pub fn string_to_int(&self) -> Option<AluOp> {
    match self {
      AluOp::EqS => Some(AluOp::EqI),
      AluOp::NeqS => Some(AluOp::NeqI),
      AluOp::LtS => Some(AluOp::LtI),
      AluOp::LteS => Some(AluOp::LteI),
      AluOp::GtS => Some(AluOp::GtI),
      AluOp::GteS => Some(AluOp::GteI),
      _ => None,
    }
  }

  /// Folds an integer operation. Comparisons give 0 or 1; `None` for
  /// non-integer operations and division by zero.
  pub fn evaluate(
    &self,
    lhs: i32,
    rhs: i32,
  ) -> Option<i32> {
    let value = match self {
      AluOp::AddI => lhs.wrapping_add(rhs),
      AluOp::SubI => lhs.wrapping_sub(rhs),
      AluOp::MulI => lhs.wrapping_mul(rhs),
      AluOp::DivI if rhs != 0 => lhs.wrapping_div(rhs),
      AluOp::ModI if rhs != 0 => lhs.wrapping_rem(rhs),
      AluOp::AndI => lhs & rhs,
      AluOp::OrI => lhs | rhs,
      AluOp::XorI => lhs ^ rhs,
      AluOp::ShlI => lhs.wrapping_shl(rhs as u32),
      AluOp::ShrI => lhs.wrapping_shr(rhs as u32),
      AluOp::EqI => (lhs == rhs) as i32,
      AluOp::NeqI => (lhs != rhs) as i32,
      AluOp::LtI => (lhs < rhs) as i32,
      AluOp::LteI => (lhs <= rhs) as i32,
      AluOp::GtI => (lhs > rhs) as i32,
      AluOp::GteI => (lhs >= rhs) as i32,
      _ => return None,
    };
    Some(value)
  }

  pub fn index_for_size(element_size: u32) -> AluOp {
    if element_size == 1 { AluOp::Idx1 } else { AluOp::Idx4 }
  }

  /// The comparison that holds exactly when `self` does not.
  pub fn inverse(&self) -> Option<AluOp> {
    match self {
      AluOp::EqI => Some(AluOp::NeqI),
      AluOp::NeqI => Some(AluOp::EqI),
      AluOp::LtI => Some(AluOp::GteI),
      AluOp::LteI => Some(AluOp::GtI),
      AluOp::GtI => Some(AluOp::LteI),
      AluOp::GteI => Some(AluOp::LtI),
      _ => None,
    }
  }
}

impl std::fmt::Display for AluOp {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let name = match self {
      AluOp::AddI => "ADD_I",
      AluOp::SubI => "SUB_I",
      AluOp::MulI => "MUL_I",
      AluOp::DivI => "DIV_I",
      AluOp::ModI => "MOD_I",
      AluOp::AndI => "AND_I",
      AluOp::OrI => "OR_I",
      AluOp::XorI => "XOR_I",
      AluOp::ShlI => "SHL_I",
      AluOp::ShrI => "SHR_I",
      AluOp::EqI => "EQ_I",
      AluOp::NeqI => "NEQ_I",
      AluOp::LtI => "LT_I",
      AluOp::LteI => "LTE_I",
      AluOp::GtI => "GT_I",
      AluOp::GteI => "GTE_I",
      AluOp::AddR => "ADD_R",
      AluOp::SubR => "SUB_R",
      AluOp::MulR => "MUL_R",
      AluOp::DivR => "DIV_R",
      AluOp::ModR => "MOD_R",
      AluOp::EqR => "EQ_R",
      AluOp::NeqR => "NEQ_R",
      AluOp::LtR => "LT_R",
      AluOp::LteR => "LTE_R",
      AluOp::GtR => "GT_R",
      AluOp::GteR => "GTE_R",
      AluOp::EqS => "EQ_S",
      AluOp::NeqS => "NEQ_S",
      AluOp::LtS => "LT_S",
      AluOp::LteS => "LTE_S",
      AluOp::GtS => "GT_S",
      AluOp::GteS => "GTE_S",
      AluOp::Idx1 => "idx1",
      AluOp::Idx4 => "idx4",
    };
    write!(f, "{}", name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evaluate_folds_integer_ops() {
    assert_eq!(AluOp::AddI.evaluate(1, 2), Some(3));
    assert_eq!(AluOp::LtI.evaluate(1, 2), Some(1));
    assert_eq!(AluOp::ShrI.evaluate(-8, 1), Some(-4));
    assert_eq!(AluOp::DivI.evaluate(1, 0), None);
    assert_eq!(AluOp::AddR.evaluate(1, 2), None);
  }

  #[test]
  fn string_comparisons_map_to_integer_ones() {
    assert_eq!(AluOp::LteS.string_to_int(), Some(AluOp::LteI));
    assert_eq!(AluOp::AddI.string_to_int(), None);
    assert_eq!(AluOp::LtI.inverse(), Some(AluOp::GteI));
  }
}

use std::fmt;

/// Internal failures of the backend. These abort compilation: they point at
/// a code generation bug or a function too large for the register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
  /// A temporary written by more than one instruction.
  NotSsa { function: String, reg: String },
  /// No machine register is free of interference for `reg`.
  NoRegister { function: String, reg: String },
}

impl BackendError {
  pub fn function(&self) -> &str {
    match self {
      BackendError::NotSsa { function, .. } | BackendError::NoRegister { function, .. } => function,
    }
  }
}

impl fmt::Display for BackendError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      BackendError::NotSsa { reg, .. } => write!(f, "Reg {} is not SSA", reg),
      BackendError::NoRegister { reg, .. } => write!(f, "Unable to find a register for {}", reg),
    }
  }
}

impl std::error::Error for BackendError {}

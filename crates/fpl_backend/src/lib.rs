//! Optimisation, register allocation and assembly output for IR functions.

mod asm;
mod errors;
mod liveness;
mod peephole;
mod rebuild;
mod regalloc;

use fpl_config::{DebugTrace, FplConfig};
use fpl_ir::{Function, IrProgram};
use fpl_log::{log_dbg, trace_dbg};

pub use asm::emit_assembly;
pub use errors::BackendError;
pub use liveness::LiveMap;
pub use peephole::{peephole, peephole_fixpoint};
pub use rebuild::rebuild_index;
pub use regalloc::allocate_registers;

/// Peephole to a fixpoint, allocate machine registers, then peephole again.
pub fn run_backend(
  config: &FplConfig,
  program: &mut IrProgram,
) -> Result<(), BackendError> {
  for func in &mut program.functions {
    run_function(config, func)?;
  }
  log_dbg!(config, "backend finished {} functions", program.functions.len());
  Ok(())
}

pub fn run_function(
  config: &FplConfig,
  func: &mut Function,
) -> Result<(), BackendError> {
  trace_dbg!(config, DebugTrace::Backend, "optimising {}", func.name);
  peephole_fixpoint(config, func)?;

  let live = LiveMap::build(func);
  allocate_registers(config, func, &live)?;

  peephole_fixpoint(config, func)
}

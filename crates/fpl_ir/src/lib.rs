pub mod function;
pub mod instr;
pub mod lowering;
pub mod program;
pub mod reg;

pub use function::Function;
pub use instr::{FieldRef, Instr, MemSize};
pub use lowering::{LoweringInput, lower_program};
pub use program::{ClassDescriptor, EnumTable, IrProgram, TableEntry};
pub use reg::{LabelId, Reg, RegId, RegKind};

mod api;
mod pipeline;
mod session;
mod symbol_map;

pub use api::{CompileError, CompileOutput, compile};
pub use pipeline::{build_files, check_files};
pub use session::CompilationSession;
pub use symbol_map::{SymbolEntry, SymbolLocation, collect_symbols, format_symbol_table, symbol_map_json};

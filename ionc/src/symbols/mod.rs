pub mod table;
pub mod types;

pub use table::{FuncId, Function, Symbols, VarId, Variable};
pub use types::{DataType, TypeTable};

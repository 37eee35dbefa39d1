pub mod codegen;
pub mod program;

pub use program::Program;

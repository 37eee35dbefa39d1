use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Unknown label: '{0}'")]
    UnknownLabel(String),

    #[error("Invalid immediate: '{0}'")]
    BadImmediate(String),

    #[error("Stack underflow at pc={0}")]
    StackUnderflow(usize),

    #[error("Memory access out of range: {0:#x}")]
    BadAddress(u64),

    #[error("Unsupported syscall: {0}")]
    UnsupportedSyscall(u64),

    #[error("Program counter out of code: pc={0}")]
    OutOfCode(usize),
}

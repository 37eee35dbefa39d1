pub mod compile;
pub mod config;
pub mod error;
pub mod grammer;
pub mod symbols;
pub mod util;

pub use compile::Program;
pub use config::Config;
pub use error::Error;
pub use grammer::lexer::Lexer;
pub use grammer::parsercore::Parser;
pub use util::maps::SymbolMap;

use arch::asm::Code;

/// Tokenize and parse one source file.
///
/// Returns the program when parsing got through the whole file, together with every
/// error collected along the way (lexer errors first).
pub fn parse(file: &str, source: &str) -> (Option<Program>, Vec<Error>) {
    let (tokens, mut errors) = Lexer::new(file, source).parse();
    let (program, parse_errors) = Parser::new(tokens.into_iter()).parse();
    errors.extend(parse_errors);
    (program, errors)
}

/// Compile one source file to a NASM unit.
pub fn compile(file: &str, source: &str) -> Result<Code, Vec<Error>> {
    let (program, errors) = parse(file, source);
    match program {
        Some(program) if errors.is_empty() => program.assemble().map_err(|e| vec![e]),
        _ => Err(errors),
    }
}

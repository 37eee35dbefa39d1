use crate::grammer::token::{Pos, Token, TokenKind};
use color_print::cprintln;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

// Source position without lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl<'a> From<&Pos<'a>> for Position {
    fn from(pos: &Pos<'a>) -> Self {
        Position {
            file: pos.file.to_string(),
            line: pos.line,
            col: pos.col,
        }
    }
}

// Token information without lifetime
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub pos: Position,
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.pos)
    }
}

impl<'a> From<&Token<'a>> for TokenInfo {
    fn from(token: &Token<'a>) -> Self {
        TokenInfo {
            kind: token.kind.clone(),
            pos: Position::from(&token.pos),
        }
    }
}

// Unified error type for the Ion compiler
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    // Lexer errors
    #[error("Invalid character: '{0}' at {1}")]
    UnexpectedCharacter(char, Position),

    #[error("Multiple dots in number: beginning at {0}")]
    MultipleDotsInNumber(Position),

    // Parser errors
    #[error("Unexpected token {1}, expected {0}")]
    ExpectedDifferentToken(String, TokenInfo),

    #[error("Unexpected token {1}, expected '{0}'")]
    ExpectedDifferentValue(String, TokenInfo),

    #[error("Missing character: '{0}' at {1}")]
    MissingCharacter(char, Position),

    #[error("Unknown function: '{0}' at {1}")]
    UnknownFunction(String, Position),

    #[error("Unknown variable: '{0}' at {1}")]
    UnknownVariable(String, Position),

    #[error("Unexpected token: {0}, expected: {1}")]
    UnexpectedToken(TokenInfo, String),

    #[error("Unknown DataType: '{0}' at {1}")]
    UnknownDataType(String, Position),

    #[error("Trying to redeclare variable: '{0}' at {1}")]
    VariableRedeclaration(String, Position),

    #[error("Trying to redeclare function: '{0}' at {1}")]
    FunctionRedeclaration(String, Position),

    #[error("'{0}' is a type, which is not valid in the given context ({1})")]
    DataTypeNotValidInContext(String, Position),

    #[error("Not implemented: {0} at {1}")]
    NotImplemented(String, Position),

    // Assembly errors
    #[error("Missing entry point: main")]
    MissingEntryPoint,

    #[error("Unsupported in code generation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Fatal errors stop the parsing pass; everything else is collected.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NotImplemented(..) | Error::UnexpectedToken(..) | Error::Io(_)
        )
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Error::UnexpectedCharacter(_, pos)
            | Error::MultipleDotsInNumber(pos)
            | Error::MissingCharacter(_, pos)
            | Error::UnknownFunction(_, pos)
            | Error::UnknownVariable(_, pos)
            | Error::UnknownDataType(_, pos)
            | Error::VariableRedeclaration(_, pos)
            | Error::FunctionRedeclaration(_, pos)
            | Error::DataTypeNotValidInContext(_, pos)
            | Error::NotImplemented(_, pos) => Some(pos),
            Error::ExpectedDifferentToken(_, info)
            | Error::ExpectedDifferentValue(_, info)
            | Error::UnexpectedToken(info, _) => Some(&info.pos),
            Error::Io(_) | Error::Config(_) | Error::MissingEntryPoint | Error::Unsupported(_) => {
                None
            }
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, files: &IndexMap<String, Vec<String>>) {
        cprintln!("<red,bold>error</>: {}", self);

        let Some(pos) = self.position() else {
            return;
        };
        cprintln!("     <blue>--></> <underline>{}</>", pos);
        cprintln!("      <blue>|</>");

        let line_content = files
            .get(&pos.file)
            .and_then(|lines| lines.get(pos.line.saturating_sub(1)))
            .map(|s| s.as_str())
            .unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", pos.line, line_content);
        cprintln!(
            "      <blue>|</> {}<red,bold>^</>",
            " ".repeat(pos.col.saturating_sub(1))
        );
    }
}

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub pos: Pos<'a>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, pos: Pos<'a>) -> Self {
        Token { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Double character tokens
    EqualEqual,  // '=='
    ExclEqual,   // '!='
    RAngleEqual, // '>='
    LAngleEqual, // '<='
    PlusPlus,    // '++'
    MinusMinus,  // '--'
    PlusEqual,   // '+='
    MinusEqual,  // '-='
    StarEqual,   // '*='
    SlashEqual,  // '/='

    // Single character tokens
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    Star,      // '*'
    Slash,     // '/'
    Excl,      // '!'
    Colon,     // ':'
    Semicolon, // ';'
    LParen,    // '('
    RParen,    // ')'
    LCurly,    // '{'
    RCurly,    // '}'
    LAngle,    // '<'
    RAngle,    // '>'

    // Keywords
    KwIf,      // "if"
    KwElse,    // "else"
    KwWhile,   // "while"
    KwDo,      // "do"
    KwSwitch,  // "switch"
    KwCase,    // "case"
    KwDefault, // "default"
    KwStruct,  // "struct"
    KwClass,   // "class"
    KwPutc,    // "putc"

    // Identifier
    Ident(String),

    // Literals
    Integer(String),
    Float(String),

    // Special
    Comment(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let text = match self {
            EqualEqual => "==",
            ExclEqual => "!=",
            RAngleEqual => ">=",
            LAngleEqual => "<=",
            PlusPlus => "++",
            MinusMinus => "--",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            Equal => "=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Excl => "!",
            Colon => ":",
            Semicolon => ";",
            LParen => "(",
            RParen => ")",
            LCurly => "{",
            RCurly => "}",
            LAngle => "<",
            RAngle => ">",
            KwIf => "if",
            KwElse => "else",
            KwWhile => "while",
            KwDo => "do",
            KwSwitch => "switch",
            KwCase => "case",
            KwDefault => "default",
            KwStruct => "struct",
            KwClass => "class",
            KwPutc => "putc",
            Ident(s) => return write!(f, "identifier `{}`", s),
            Integer(s) => return write!(f, "integer `{}`", s),
            Float(s) => return write!(f, "float `{}`", s),
            Comment(_) => "comment",
            Eof => "end of file",
        };
        write!(f, "`{}`", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pos<'a> {
    pub file: &'a str,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Pos<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

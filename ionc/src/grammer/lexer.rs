use super::token::{Pos, Token, TokenKind};
use crate::error::{Error, Position};
use std::iter::Peekable;
use std::str::CharIndices;

pub struct Lexer<'a> {
    file: &'a str,
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str, code: &'a str) -> Self {
        Self { file, code }
    }

    /// Tokenize the whole source. The result always ends with a single `Eof` token.
    pub fn parse(self) -> (Vec<Token<'a>>, Vec<Error>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let mut eof = Pos {
            file: self.file,
            line: 1,
            col: 1,
        };
        for (idx, line) in self.code.lines().enumerate() {
            let lexer = LineLexer::new(line, self.file, idx + 1);
            let (toks, errs) = lexer.parse();
            tokens.extend(toks);
            errors.extend(errs);
            eof = Pos {
                file: self.file,
                line: idx + 1,
                col: line.len() + 1,
            };
        }
        tokens.push(Token::new(TokenKind::Eof, eof));
        (tokens, errors)
    }
}

pub struct LineLexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    file: &'a str,
    line: usize,
    errors: Vec<Error>,
}

impl<'a> LineLexer<'a> {
    pub fn new(code: &'a str, file: &'a str, line: usize) -> Self {
        Self {
            iter: code.char_indices().peekable(),
            file,
            line,
            errors: Vec::new(),
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }
}

// ----------------------------------------------------------------------------
// Lexer
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    pub fn parse(mut self) -> (Vec<Token<'a>>, Vec<Error>) {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            let pos = Pos {
                file: self.file,
                line: self.line,
                col: idx + 1,
            };

            // 1. Double character token
            if let Some((_, ch1)) = self.peek_nth(1) {
                // Comment
                if ch0 == '/' && ch1 == '/' {
                    self.consume(); // consume '/'
                    self.consume(); // consume '/'
                    while self.iter.next_if(|(_, c)| c.is_whitespace()).is_some() {}
                    let comment = self.iter.by_ref().map(|(_, ch)| ch).collect::<String>();
                    tokens.push(Token::new(TokenKind::Comment(comment), pos));
                    break;
                }

                if let Some(kind) = double_char_token(ch0, ch1) {
                    self.consume(); // consume
                    self.consume(); // consume second char
                    tokens.push(Token::new(kind, pos));
                    continue;
                }
            }

            // 2. Single character token
            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 3. Number literal
            if ch0.is_ascii_digit() {
                let kind = self.parse_number(&pos);
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 4. Identifier or keyword
            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                tokens.push(Token::new(self.parse_string(), pos));
                continue;
            }

            // Error
            self.consume();
            self.errors
                .push(Error::UnexpectedCharacter(ch0, Position::from(&pos)));
        }
        (tokens, self.errors)
    }

    fn parse_string(&mut self) -> TokenKind {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        match keyword(&lexeme) {
            Some(kind) => kind,
            None => TokenKind::Ident(lexeme),
        }
    }

    // Number: 123, 1.5
    fn parse_number(&mut self, pos: &Pos) -> TokenKind {
        let mut lexeme = String::new();
        let mut is_float = false;
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| ch.is_ascii_digit() || *ch == '.')
        {
            if ch == '.' {
                if is_float {
                    self.errors.push(Error::MultipleDotsInNumber(Position::from(pos)));
                }
                is_float = true;
            }
            lexeme.push(ch);
        }
        if is_float {
            TokenKind::Float(lexeme)
        } else {
            TokenKind::Integer(lexeme)
        }
    }
}

fn double_char_token(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('!', '=') => Some(TokenKind::ExclEqual),
        ('<', '=') => Some(TokenKind::LAngleEqual),
        ('>', '=') => Some(TokenKind::RAngleEqual),
        ('+', '+') => Some(TokenKind::PlusPlus),
        ('-', '-') => Some(TokenKind::MinusMinus),
        ('+', '=') => Some(TokenKind::PlusEqual),
        ('-', '=') => Some(TokenKind::MinusEqual),
        ('*', '=') => Some(TokenKind::StarEqual),
        ('/', '=') => Some(TokenKind::SlashEqual),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        '=' => Some(TokenKind::Equal),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '!' => Some(TokenKind::Excl),
        ':' => Some(TokenKind::Colon),
        ';' => Some(TokenKind::Semicolon),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        '<' => Some(TokenKind::LAngle),
        '>' => Some(TokenKind::RAngle),
        _ => None,
    }
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "if" => Some(TokenKind::KwIf),
        "else" => Some(TokenKind::KwElse),
        "while" => Some(TokenKind::KwWhile),
        "do" => Some(TokenKind::KwDo),
        "switch" => Some(TokenKind::KwSwitch),
        "case" => Some(TokenKind::KwCase),
        "default" => Some(TokenKind::KwDefault),
        "struct" => Some(TokenKind::KwStruct),
        "class" => Some(TokenKind::KwClass),
        "putc" => Some(TokenKind::KwPutc),
        _ => None,
    }
}

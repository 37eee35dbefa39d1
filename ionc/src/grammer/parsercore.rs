use super::ast::{Node, NodeKind};
use super::token::{Pos, Token, TokenKind};
use crate::error::{Error, Position, TokenInfo};
use crate::symbols::{Symbols, TypeTable};
use itertools::{peek_nth, PeekNth};
use std::iter::Filter;

type Significant<'a> = fn(&Token<'a>) -> bool;

fn significant(token: &Token) -> bool {
    !matches!(token.kind, TokenKind::Comment(_))
}

pub struct Parser<'a, I: Iterator<Item = Token<'a>>> {
    tokens: PeekNth<Filter<I, Significant<'a>>>,
    errors: Vec<Error>,
    last: Pos<'a>,
    nodes: usize,
    pub(crate) types: TypeTable,
    pub(crate) symbols: Symbols,
}

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: peek_nth(tokens.filter(significant as Significant<'a>)),
            errors: Vec::new(),
            last: Pos {
                file: "",
                line: 1,
                col: 1,
            },
            nodes: 0,
            types: TypeTable::new(),
            symbols: Symbols::new(),
        }
    }

    /// Record a recoverable error and keep parsing
    pub fn error(&mut self, e: Error) {
        self.errors.push(e);
    }

    pub(crate) fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    /// Allocate a node with the next free id
    pub(crate) fn node(&mut self, kind: NodeKind) -> Node {
        let id = self.nodes;
        self.nodes += 1;
        Node { id, kind }
    }

    /// Record the error of a failed lookup/declaration and carry on without a value
    pub(crate) fn recover<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.error(e);
                None
            }
        }
    }

    /// Placeholder standing in for an expression that failed to resolve
    pub(crate) fn placeholder(&mut self) -> Node {
        self.node(NodeKind::Integer("0".into()))
    }
}

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    /// Peek : Watch next token without consuming it
    pub fn peek(&mut self) -> Option<&Token<'a>> {
        self.tokens.peek()
    }

    /// Peek the token `n` positions ahead (0 is the next token)
    pub fn peek_nth(&mut self, n: usize) -> Option<&Token<'a>> {
        self.tokens.peek_nth(n)
    }

    /// Kind of the next token; an exhausted stream reads as `Eof`
    pub fn peek_kind(&mut self) -> TokenKind {
        self.peek()
            .map(|token| token.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    /// Next : Consume next token and return it. `Eof` is never consumed.
    pub fn next(&mut self) -> Option<Token<'a>> {
        if self.check_if(|token| token.kind == TokenKind::Eof) {
            return self.peek().cloned();
        }
        let token = self.tokens.next()?;
        self.last = token.pos.clone();
        Some(token)
    }

    /// Position of the next token, or of the last consumed one at the end of the stream
    pub fn position(&mut self) -> Position {
        match self.peek() {
            Some(token) => Position::from(&token.pos),
            None => Position::from(&self.last),
        }
    }

    /// Owned snapshot of the next token for error reporting
    pub fn info(&mut self) -> TokenInfo {
        match self.peek() {
            Some(token) => TokenInfo::from(token),
            None => TokenInfo {
                kind: TokenKind::Eof,
                pos: Position::from(&self.last),
            },
        }
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> bool {
        self.peek().is_some_and(|token| cond(token))
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token<'a>> {
        if self.check_if(|token| token.kind != TokenKind::Eof && cond(token)) {
            self.next()
        } else {
            None
        }
    }

    /// Next token should match the condition. On mismatch the error is recorded and the
    /// offending token is skipped (unless it is `Eof`).
    pub fn expect_tobe<F: Fn(&Token) -> bool>(&mut self, cond: F, expected: &str) -> Option<Token<'a>> {
        if let Some(token) = self.consume_if(&cond) {
            return Some(token);
        }
        let info = self.info();
        self.error(Error::ExpectedDifferentToken(expected.to_string(), info));
        self.next();
        None
    }

    /// Like `expect_tobe`, for keywords: a mismatch is reported as a wrong value.
    pub fn expect_value<F: Fn(&Token) -> bool>(&mut self, cond: F, expected: &str) -> Option<Token<'a>> {
        if let Some(token) = self.consume_if(&cond) {
            return Some(token);
        }
        let info = self.info();
        self.error(Error::ExpectedDifferentValue(expected.to_string(), info));
        self.next();
        None
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(
            |token| matches!(&token.kind, $kind),
            stringify!($kind),
        )
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat, $following:expr) => {
        if check!($parser, $trigger) {
            $parser.next();
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(|token| matches!(&token.kind, $trigger))
    };
}

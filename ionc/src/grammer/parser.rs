use super::ast::{AssignOp, BinaryOp, Node, NodeKind, Timing, UnaryOp};
use super::parsercore::Parser;
use super::token::{Token, TokenKind::*};
use crate::compile::Program;
use crate::error::{Error, Position};
use crate::symbols::{DataType, VarId};
use crate::{check, expect, optional};
use std::iter::Peekable;

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    /// Parse a whole translation unit.
    ///
    /// Recoverable errors are collected and returned alongside the program. A fatal error
    /// ends the pass: it is appended to the collected errors and no program is produced.
    pub fn parse(mut self) -> (Option<Program>, Vec<Error>) {
        let result = self.parse_program();
        let mut errors = self.take_errors();
        match result {
            Ok(()) => {
                let (functions, variables) = self.symbols.into_parts();
                (Some(Program::new(functions, variables)), errors)
            }
            Err(fatal) => {
                errors.push(fatal);
                (None, errors)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Definitions
// ----------------------------------------------------------------------------

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    /// program = { struct-def | class-def | global } EOF
    fn parse_program(&mut self) -> Result<(), Error> {
        loop {
            match self.peek_kind() {
                Eof => return Ok(()),
                KwStruct => self.parse_struct()?,
                KwClass => self.parse_class()?,
                Ident(_) => self.parse_global()?,
                _ => {
                    return Err(Error::UnexpectedToken(
                        self.info(),
                        "struct, class, function or variable definition".into(),
                    ))
                }
            }
        }
    }

    /// global = type ident ( "(" ")" block | ";" )
    fn parse_global(&mut self) -> Result<(), Error> {
        let ty = self.parse_type()?;
        let (name, pos) = self.parse_ident()?;
        match self.peek_kind() {
            // Function definition
            LParen => {
                self.next();
                expect!(self, RParen);
                let func = self.symbols.declare_func(&name, &pos);
                let id = self.recover(func);
                let body = self.parse_block()?;
                if let Some(id) = id {
                    self.symbols.define_func(id, body);
                }
                Ok(())
            }

            // Global variable declaration
            Semicolon => {
                self.next();
                self.declare_var(&name, ty, &pos);
                Ok(())
            }

            _ => Err(Error::UnexpectedToken(self.info(), "`(` or `;`".into())),
        }
    }

    /// struct-def = "struct" ident "{" { type ident ";" } "}" [ ";" ]
    fn parse_struct(&mut self) -> Result<(), Error> {
        self.next();
        let (name, _) = self.parse_name()?;
        expect!(self, LCurly);

        let mut fields: Vec<(String, DataType)> = Vec::new();
        loop {
            match self.peek_kind() {
                RCurly => {
                    self.next();
                    break;
                }
                Eof => {
                    let pos = self.position();
                    self.error(Error::MissingCharacter('}', pos));
                    break;
                }
                _ => {
                    let ty = self.parse_type()?;
                    let (field, pos) = self.parse_ident()?;
                    expect!(self, Semicolon);
                    if fields.iter().any(|(known, _)| *known == field) {
                        self.error(Error::VariableRedeclaration(field, pos));
                    } else {
                        fields.push((field, ty));
                    }
                }
            }
        }
        optional!(self, Semicolon);

        self.types.register(DataType::Struct(name, fields));
        Ok(())
    }

    /// class-def = "class" ident ";"
    fn parse_class(&mut self) -> Result<(), Error> {
        self.next();
        let (name, _) = self.parse_name()?;
        expect!(self, Semicolon);
        self.types.register(DataType::Class(name));
        Ok(())
    }

    /// type = ident { "*" }
    fn parse_type(&mut self) -> Result<DataType, Error> {
        let (name, pos) = self.parse_name()?;
        let resolved = self.types.resolve(&name, &pos);
        let base = self.recover(resolved).unwrap_or(DataType::UInt64);

        let mut depth = 0;
        while optional!(self, Star).is_some() {
            depth += 1;
        }
        Ok(base.pointer(depth))
    }

    /// Any identifier
    fn parse_name(&mut self) -> Result<(String, Position), Error> {
        let pos = self.position();
        match self.peek_kind() {
            Ident(name) => {
                self.next();
                Ok((name, pos))
            }
            _ => Err(Error::UnexpectedToken(self.info(), "identifier".into())),
        }
    }

    /// Identifier that names a new symbol; type names are rejected
    fn parse_ident(&mut self) -> Result<(String, Position), Error> {
        let (name, pos) = self.parse_name()?;
        if self.types.exists(&name) {
            self.error(Error::DataTypeNotValidInContext(name.clone(), pos.clone()));
        }
        Ok((name, pos))
    }

    fn declare_var(&mut self, name: &str, ty: DataType, pos: &Position) -> Option<VarId> {
        if ty == DataType::Void {
            self.error(Error::DataTypeNotValidInContext(
                ty.to_string(),
                pos.clone(),
            ));
        }
        let declared = self.symbols.declare_var(name, ty, pos);
        self.recover(declared)
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    /// block = "{" { stmt } "}" | stmt
    fn parse_block(&mut self) -> Result<Node, Error> {
        if optional!(self, LCurly).is_none() {
            return match self.parse_stmt()? {
                Some(stmt) => Ok(stmt),
                None => Ok(self.node(NodeKind::Block(vec![]))),
            };
        }

        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                RCurly => {
                    self.next();
                    break;
                }
                Eof => {
                    let pos = self.position();
                    self.error(Error::MissingCharacter('}', pos));
                    break;
                }
                _ => {
                    if let Some(stmt) = self.parse_stmt()? {
                        stmts.push(stmt);
                    }
                }
            }
        }
        Ok(self.node(NodeKind::Block(stmts)))
    }

    /// stmt = ";" | block | if-stmt | while-stmt | do-stmt | switch-stmt | putc-stmt | expr ";"
    fn parse_stmt(&mut self) -> Result<Option<Node>, Error> {
        match self.peek_kind() {
            // Empty statement: ";"
            Semicolon => {
                self.next();
                Ok(None)
            }
            LCurly => self.parse_block().map(Some),
            KwIf => self.parse_if().map(Some),
            KwWhile => self.parse_while().map(Some),
            KwDo => self.parse_do().map(Some),
            KwSwitch => self.parse_switch().map(Some),
            KwPutc => self.parse_putc().map(Some),

            // Expression statement: expr ";"
            _ => {
                let expr = self.parse_expr()?;
                expect!(self, Semicolon);
                Ok(Some(expr))
            }
        }
    }

    /// if-stmt = "if" "(" expr ")" block [ "else" block ]
    fn parse_if(&mut self) -> Result<Node, Error> {
        self.next();
        expect!(self, LParen);
        let cond = self.parse_expr()?;
        expect!(self, RParen);
        let then = self.parse_block()?;
        let other = optional!(self, KwElse, Box::new(self.parse_block()?));
        Ok(self.node(NodeKind::If(Box::new(cond), Box::new(then), other)))
    }

    /// while-stmt = "while" "(" expr ")" block
    fn parse_while(&mut self) -> Result<Node, Error> {
        self.next();
        expect!(self, LParen);
        let cond = self.parse_expr()?;
        expect!(self, RParen);
        let body = self.parse_block()?;
        Ok(self.node(NodeKind::While(Box::new(cond), Box::new(body))))
    }

    /// do-stmt = "do" block "while" "(" expr ")" ";"
    fn parse_do(&mut self) -> Result<Node, Error> {
        self.next();
        let body = self.parse_block()?;
        self.expect_value(|token| matches!(token.kind, KwWhile), "while");
        expect!(self, LParen);
        let cond = self.parse_expr()?;
        expect!(self, RParen);
        expect!(self, Semicolon);
        Ok(self.node(NodeKind::DoWhile(Box::new(body), Box::new(cond))))
    }

    /// switch-stmt = "switch" "(" expr ")" "{" { "case" expr ":" { stmt } } [ "default" ":" { stmt } ] "}"
    fn parse_switch(&mut self) -> Result<Node, Error> {
        self.next();
        expect!(self, LParen);
        let disc = self.parse_expr()?;
        expect!(self, RParen);
        expect!(self, LCurly);

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.peek_kind() {
                KwCase => {
                    // Cases after the default are kept, but reported
                    if default.is_some() {
                        let info = self.info();
                        self.error(Error::ExpectedDifferentValue("}".into(), info));
                    }
                    self.next();
                    let value = self.parse_expr()?;
                    expect!(self, Colon);
                    let body = self.parse_case_body()?;
                    cases.push((value, body));
                }
                KwDefault => {
                    if default.is_some() {
                        let info = self.info();
                        self.error(Error::ExpectedDifferentValue("}".into(), info));
                    }
                    self.next();
                    expect!(self, Colon);
                    default = Some(Box::new(self.parse_case_body()?));
                }
                RCurly => {
                    self.next();
                    break;
                }
                Eof => {
                    let pos = self.position();
                    self.error(Error::MissingCharacter('}', pos));
                    break;
                }
                _ => {
                    self.expect_value(|token| matches!(token.kind, KwCase), "case");
                }
            }
        }
        Ok(self.node(NodeKind::Switch(Box::new(disc), cases, default)))
    }

    /// Statements up to the next "case", "default" or "}"
    fn parse_case_body(&mut self) -> Result<Node, Error> {
        let mut stmts = Vec::new();
        while !check!(self, KwCase | KwDefault | RCurly | Eof) {
            if let Some(stmt) = self.parse_stmt()? {
                stmts.push(stmt);
            }
        }
        Ok(self.node(NodeKind::Block(stmts)))
    }

    /// putc-stmt = "putc" "(" expr ")" ";"
    fn parse_putc(&mut self) -> Result<Node, Error> {
        self.next();
        expect!(self, LParen);
        let expr = self.parse_expr()?;
        expect!(self, RParen);
        expect!(self, Semicolon);
        Ok(self.node(NodeKind::PutChar(Box::new(expr))))
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    /// expr = particle { binop particle }
    pub(crate) fn parse_expr(&mut self) -> Result<Node, Error> {
        let first = self.parse_particle()?;
        let mut rest = Vec::new();
        while let Some(op) = self.parse_binop()? {
            let particle = self.parse_particle()?;
            rest.push((op, particle));
        }
        Ok(self.reduce(first, &mut rest.into_iter().peekable(), 0))
    }

    /// Fold a flat `particle { op particle }` sequence into a tree.
    ///
    /// Operators at or above `floor` are folded left to right. When the next operator binds
    /// tighter than the current one, that run is reduced first with its level as the floor.
    fn reduce<R>(&mut self, lhs: Node, rest: &mut Peekable<R>, floor: u8) -> Node
    where
        R: Iterator<Item = (BinaryOp, Node)>,
    {
        let mut lhs = lhs;
        while let Some((op, mut rhs)) = rest.next_if(|(op, _)| op.level() >= floor) {
            while let Some(next) = rest
                .peek()
                .map(|(next, _)| next.level())
                .filter(|&next| next > op.level())
            {
                rhs = self.reduce(rhs, rest, next);
            }
            lhs = self.node(NodeKind::Binary(op, Box::new(lhs), Box::new(rhs)));
        }
        lhs
    }

    /// binop = "==" | "!=" | "<" | ">" | "<=" | ">=" | "+" | "-" | "*"
    fn parse_binop(&mut self) -> Result<Option<BinaryOp>, Error> {
        let op = match self.peek_kind() {
            EqualEqual => BinaryOp::Eq,
            ExclEqual => BinaryOp::Ne,
            LAngle => BinaryOp::Lt,
            RAngle => BinaryOp::Gt,
            LAngleEqual => BinaryOp::Le,
            RAngleEqual => BinaryOp::Ge,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => {
                return Err(Error::NotImplemented(
                    "division operator `/`".into(),
                    self.position(),
                ))
            }
            _ => return Ok(None),
        };
        self.next();
        Ok(Some(op))
    }

    /// assign-op = "=" | "+=" | "-=" | "*="
    fn parse_assign_op(&mut self) -> Result<Option<AssignOp>, Error> {
        let op = match self.peek_kind() {
            Equal => AssignOp::Set,
            PlusEqual => AssignOp::Add,
            MinusEqual => AssignOp::Sub,
            StarEqual => AssignOp::Mul,
            SlashEqual => {
                return Err(Error::NotImplemented(
                    "division assignment `/=`".into(),
                    self.position(),
                ))
            }
            _ => return Ok(None),
        };
        self.next();
        Ok(Some(op))
    }

    /// particle = "(" expr ")" | "-" particle | "!" particle | ( "++" | "--" ) ident
    ///          | int-lit | float-lit | ident-particle
    fn parse_particle(&mut self) -> Result<Node, Error> {
        match self.peek_kind() {
            // Parenthesized expression: "(" expr ")"
            LParen => {
                self.next();
                let inner = self.parse_expr()?;
                expect!(self, RParen);
                Ok(inner)
            }

            // Unary minus: "-" particle
            Minus => {
                self.next();
                let operand = self.parse_particle()?;
                Ok(self.node(NodeKind::Unary(UnaryOp::Neg, Box::new(operand))))
            }

            // Logical not: "!" particle
            Excl => {
                self.next();
                let operand = self.parse_particle()?;
                Ok(self.node(NodeKind::Unary(UnaryOp::Not, Box::new(operand))))
            }

            // Prefix increment / decrement: ( "++" | "--" ) ident
            kind @ (PlusPlus | MinusMinus) => {
                self.next();
                let var = self.parse_var_ref()?;
                Ok(self.step(kind == PlusPlus, var, Timing::Before))
            }

            Integer(text) => {
                self.next();
                Ok(self.node(NodeKind::Integer(text)))
            }

            Float(text) => {
                self.next();
                Ok(self.node(NodeKind::Float(text)))
            }

            Ident(_) => self.parse_ident_particle(),

            _ => Err(Error::UnexpectedToken(self.info(), "expression".into())),
        }
    }

    /// ident-particle = declaration | ident "(" ")" | ident assign-op expr
    ///                | ident ( "++" | "--" ) | ident
    fn parse_ident_particle(&mut self) -> Result<Node, Error> {
        if self.is_declaration() {
            return self.parse_declaration();
        }

        let (name, pos) = self.parse_name()?;
        if self.types.exists(&name) {
            self.error(Error::DataTypeNotValidInContext(name, pos));
            return Ok(self.placeholder());
        }

        match self.peek_kind() {
            // Function call: ident "(" ")"
            LParen => {
                self.next();
                expect!(self, RParen);
                let func = self.symbols.lookup_func(&name, &pos);
                Ok(match self.recover(func) {
                    Some(func) => self.node(NodeKind::Call(func)),
                    None => self.placeholder(),
                })
            }

            // Postfix increment / decrement: ident ( "++" | "--" )
            kind @ (PlusPlus | MinusMinus) => {
                self.next();
                let var = self.symbols.lookup_var(&name, &pos);
                let var = self.recover(var);
                Ok(self.step(kind == PlusPlus, var, Timing::After))
            }

            _ => {
                let var = self.symbols.lookup_var(&name, &pos);
                let var = self.recover(var);
                match self.parse_assign_op()? {
                    // Assignment: ident assign-op expr
                    Some(op) => {
                        let value = self.parse_expr()?;
                        Ok(self.assign(var, op, value))
                    }
                    // Variable access: ident
                    None => Ok(match var {
                        Some(var) => self.node(NodeKind::Access(var)),
                        None => self.placeholder(),
                    }),
                }
            }
        }
    }

    /// `ident ident` always starts a declaration, `ident "*"` only when the identifier is a type.
    fn is_declaration(&mut self) -> bool {
        let Some(Ident(first)) = self.peek().map(|token| token.kind.clone()) else {
            return false;
        };
        let second = self.peek_nth(1).map(|token| token.kind.clone());
        match second {
            Some(Ident(_)) => true,
            Some(Star) => self.types.exists(&first),
            _ => false,
        }
    }

    /// declaration = type ident [ assign-op expr ]
    fn parse_declaration(&mut self) -> Result<Node, Error> {
        let ty = self.parse_type()?;
        let (name, pos) = self.parse_ident()?;
        let var = self.declare_var(&name, ty, &pos);
        match self.parse_assign_op()? {
            Some(op) => {
                let value = self.parse_expr()?;
                Ok(self.assign(var, op, value))
            }
            None => Ok(match var {
                Some(var) => self.node(NodeKind::Access(var)),
                None => self.placeholder(),
            }),
        }
    }

    /// Variable operand of a prefix increment / decrement
    fn parse_var_ref(&mut self) -> Result<Option<VarId>, Error> {
        let (name, pos) = self.parse_name()?;
        if self.types.exists(&name) {
            self.error(Error::DataTypeNotValidInContext(name, pos));
            return Ok(None);
        }
        let var = self.symbols.lookup_var(&name, &pos);
        Ok(self.recover(var))
    }

    fn assign(&mut self, var: Option<VarId>, op: AssignOp, value: Node) -> Node {
        match var {
            Some(var) => self.node(NodeKind::Assign(var, op, Box::new(value))),
            None => value,
        }
    }

    fn step(&mut self, increment: bool, var: Option<VarId>, timing: Timing) -> Node {
        match (var, increment) {
            (Some(var), true) => self.node(NodeKind::Increment(var, timing)),
            (Some(var), false) => self.node(NodeKind::Decrement(var, timing)),
            (None, _) => self.placeholder(),
        }
    }
}

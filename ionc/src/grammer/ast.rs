use crate::symbols::{FuncId, VarId};
use std::fmt;

/// AST node. `id` is unique among all nodes of one parse and names the labels of
/// control-flow constructs (`if_<id>_else`, `while_<id>_end`, ...).
#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Block(Vec<Node>),                                // "{" { stmt } "}"
    If(Box<Node>, Box<Node>, Option<Box<Node>>),     // "if" "(" expr ")" block [ "else" block ]
    While(Box<Node>, Box<Node>),                     // "while" "(" expr ")" block
    DoWhile(Box<Node>, Box<Node>),                   // "do" block "while" "(" expr ")" ";"
    Switch(Box<Node>, Vec<(Node, Node)>, Option<Box<Node>>), // "switch" "(" expr ")" "{" { case } [ default ] "}"
    Assign(VarId, AssignOp, Box<Node>),              // ident assign-op expr
    Access(VarId),                                   // ident
    Integer(String),                                 // int-lit
    Float(String),                                   // float-lit
    Unary(UnaryOp, Box<Node>),                       // ( "-" | "!" ) particle
    Binary(BinaryOp, Box<Node>, Box<Node>),          // particle binop particle
    Increment(VarId, Timing),                        // "++" ident | ident "++"
    Decrement(VarId, Timing),                        // "--" ident | ident "--"
    Call(FuncId),                                    // ident "(" ")"
    PutChar(Box<Node>),                              // "putc" "(" expr ")" ";"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // "-"
    Not, // "!"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, // "+"
    Sub, // "-"
    Mul, // "*"
    Eq,  // "=="
    Ne,  // "!="
    Lt,  // "<"
    Gt,  // ">"
    Le,  // "<="
    Ge,  // ">="
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set, // "="
    Add, // "+="
    Sub, // "-="
    Mul, // "*="
}

/// When an increment/decrement takes effect relative to reading the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Before, // "++" ident
    After,  // ident "++"
}

impl BinaryOp {
    /// Precedence level: comparisons 1, additive 2, multiplicative 3.
    pub fn level(self) -> u8 {
        match self {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge => 1,
            BinaryOp::Add | BinaryOp::Sub => 2,
            BinaryOp::Mul => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
        }
    }
}

// S-expression rendering, used by `--verbose` and by tests
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Block(stmts) => {
                write!(f, "(block")?;
                for stmt in stmts {
                    write!(f, " {}", stmt)?;
                }
                write!(f, ")")
            }
            NodeKind::If(cond, then, Some(other)) => {
                write!(f, "(if {} {} {})", cond, then, other)
            }
            NodeKind::If(cond, then, None) => write!(f, "(if {} {})", cond, then),
            NodeKind::While(cond, body) => write!(f, "(while {} {})", cond, body),
            NodeKind::DoWhile(body, cond) => write!(f, "(do {} {})", body, cond),
            NodeKind::Switch(disc, cases, default) => {
                write!(f, "(switch {}", disc)?;
                for (value, block) in cases {
                    write!(f, " (case {} {})", value, block)?;
                }
                if let Some(default) = default {
                    write!(f, " (default {})", default)?;
                }
                write!(f, ")")
            }
            NodeKind::Assign(var, op, value) => write!(f, "({} {} {})", op.symbol(), var, value),
            NodeKind::Access(var) => write!(f, "{}", var),
            NodeKind::Integer(text) | NodeKind::Float(text) => write!(f, "{}", text),
            NodeKind::Unary(UnaryOp::Neg, operand) => write!(f, "(neg {})", operand),
            NodeKind::Unary(UnaryOp::Not, operand) => write!(f, "(not {})", operand),
            NodeKind::Binary(op, lhs, rhs) => write!(f, "({} {} {})", op.symbol(), lhs, rhs),
            NodeKind::Increment(var, Timing::Before) => write!(f, "(++ {})", var),
            NodeKind::Increment(var, Timing::After) => write!(f, "({} ++)", var),
            NodeKind::Decrement(var, Timing::Before) => write!(f, "(-- {})", var),
            NodeKind::Decrement(var, Timing::After) => write!(f, "({} --)", var),
            NodeKind::Call(func) => write!(f, "(call {})", func),
            NodeKind::PutChar(expr) => write!(f, "(putc {})", expr),
        }
    }
}

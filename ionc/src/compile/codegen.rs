use crate::error::Error;
use crate::grammer::ast::{AssignOp, BinaryOp, Node, NodeKind, Timing, UnaryOp};
use crate::symbols::VarId;
use arch::asm::Line;
use arch::inst::{Inst, Operand};
use arch::reg::{Cond, Reg};
use itertools::chain;

/// One-byte scratch cell used by `putc`
pub const CBUF: &str = "cbuf";

/// Lower a node to instructions. Every expression leaves its value in `rax`.
pub fn compile(node: &Node) -> Result<Vec<Line>, Error> {
    let id = node.id;
    let lines = match &node.kind {
        NodeKind::Block(stmts) => {
            let mut lines = Vec::new();
            for stmt in stmts {
                lines.extend(compile(stmt)?);
            }
            lines
        }

        NodeKind::Integer(text) => vec![mov(Reg::RAX, Operand::Imm(text.clone()))],

        NodeKind::Float(text) => {
            return Err(Error::Unsupported(format!("floating point literal `{}`", text)))
        }

        NodeKind::Access(var) => vec![mov(Reg::RAX, var_mem(*var))],

        NodeKind::Unary(UnaryOp::Neg, operand) => {
            chain!(compile(operand)?, [Line::from(Inst::NEG(Reg::RAX))]).collect()
        }

        NodeKind::Unary(UnaryOp::Not, operand) => chain!(
            compile(operand)?,
            [test_zero()],
            flag(Cond::E),
        )
        .collect(),

        NodeKind::Binary(op, lhs, rhs) => chain!(
            compile(lhs)?,
            [Line::from(Inst::PUSH(Reg::RAX))],
            compile(rhs)?,
            [
                mov(Reg::RBX, Reg::RAX.into()),
                Inst::POP(Reg::RAX).into(),
            ],
            binary(*op),
        )
        .collect(),

        NodeKind::Assign(var, op, value) => chain!(compile(value)?, assign(*var, *op)).collect(),

        NodeKind::Increment(var, timing) => step(Inst::INC(var_mem(*var)), *var, *timing),
        NodeKind::Decrement(var, timing) => step(Inst::DEC(var_mem(*var)), *var, *timing),

        NodeKind::Call(func) => vec![Inst::CALL(func.label()).into()],

        NodeKind::PutChar(expr) => chain!(
            compile(expr)?,
            [
                mov(Operand::mem(CBUF), Reg::AL.into()),
                mov(Reg::RAX, Operand::imm(1)),
                mov(Reg::RDI, Operand::imm(1)),
                mov(Reg::RSI, Operand::Addr(CBUF.into())),
                mov(Reg::RDX, Operand::imm(1)),
                Inst::SYSCALL().into(),
            ],
        )
        .collect(),

        NodeKind::If(cond, then, other) => {
            let other = match other {
                Some(other) => compile(other)?,
                None => vec![],
            };
            chain!(
                compile(cond)?,
                [
                    test_zero(),
                    Inst::JCC(Cond::E, format!("if_{id}_else")).into(),
                ],
                compile(then)?,
                [
                    Inst::JMP(format!("if_{id}_end")).into(),
                    Line::label(format!("if_{id}_else")),
                ],
                other,
                [Line::label(format!("if_{id}_end"))],
            )
            .collect()
        }

        NodeKind::While(cond, body) => chain!(
            [Line::label(format!("while_{id}_condition"))],
            compile(cond)?,
            [
                test_zero(),
                Inst::JCC(Cond::E, format!("while_{id}_end")).into(),
            ],
            compile(body)?,
            [
                Inst::JMP(format!("while_{id}_condition")).into(),
                Line::label(format!("while_{id}_end")),
            ],
        )
        .collect(),

        NodeKind::DoWhile(body, cond) => chain!(
            [Line::label(format!("dowhile_{id}_start"))],
            compile(body)?,
            [Line::label(format!("dowhile_{id}_condition"))],
            compile(cond)?,
            [
                test_zero(),
                Inst::JCC(Cond::NE, format!("dowhile_{id}_start")).into(),
                Line::label(format!("dowhile_{id}_end")),
            ],
        )
        .collect(),

        NodeKind::Switch(disc, cases, default) => switch(id, disc, cases, default.as_deref())?,
    };
    Ok(lines)
}

/// Cases are tested in order. A matching case runs its body and every body after it,
/// down to and including the default block.
fn switch(id: usize, disc: &Node, cases: &[(Node, Node)], default: Option<&Node>) -> Result<Vec<Line>, Error> {
    let disc = compile(disc)?;
    let default_label = format!("switch_{id}_default");
    let mut lines = Vec::new();

    for (idx, (value, body)) in cases.iter().enumerate() {
        let last = idx + 1 == cases.len();
        let next_test = if last {
            default_label.clone()
        } else {
            format!("switch_{id}_case_{}", idx + 1)
        };
        let next_code = if last {
            default_label.clone()
        } else {
            format!("switch_{id}_case_{}_code", idx + 1)
        };

        lines.push(Line::label(format!("switch_{id}_case_{idx}")));
        lines.extend(compile(value)?);
        lines.push(Inst::PUSH(Reg::RAX).into());
        lines.extend(disc.iter().cloned());
        lines.extend([
            Inst::POP(Reg::RBX).into(),
            Inst::CMP(Reg::RAX.into(), Reg::RBX.into()).into(),
            Inst::JCC(Cond::NE, next_test).into(),
            Line::label(format!("switch_{id}_case_{idx}_code")),
        ]);
        lines.extend(compile(body)?);
        lines.push(Inst::JMP(next_code).into());
    }

    lines.push(Line::label(default_label));
    if let Some(default) = default {
        lines.extend(compile(default)?);
    }
    lines.push(Line::label(format!("switch_{id}_end")));
    Ok(lines)
}

/// `rax <- rax op rbx`
fn binary(op: BinaryOp) -> Vec<Line> {
    let rax = || Operand::Reg(Reg::RAX);
    let rbx = || Operand::Reg(Reg::RBX);
    match op {
        BinaryOp::Add => vec![Inst::ADD(rax(), rbx()).into()],
        BinaryOp::Sub => vec![Inst::SUB(rax(), rbx()).into()],
        BinaryOp::Mul => vec![Inst::IMUL(Reg::RAX, rbx()).into()],
        BinaryOp::Eq => compare(Cond::E),
        BinaryOp::Ne => compare(Cond::NE),
        BinaryOp::Lt => compare(Cond::B),
        BinaryOp::Gt => compare(Cond::A),
        BinaryOp::Le => compare(Cond::BE),
        BinaryOp::Ge => compare(Cond::AE),
    }
}

fn compare(cond: Cond) -> Vec<Line> {
    chain!([Line::from(Inst::CMP(Reg::RAX.into(), Reg::RBX.into()))], flag(cond)).collect()
}

/// Materialize a condition flag as 0/1 in `rax`
fn flag(cond: Cond) -> [Line; 2] {
    [
        Inst::SET(cond, Reg::AL).into(),
        Inst::MOVZX(Reg::RAX, Reg::AL).into(),
    ]
}

/// Store `rax` into the variable; the variable's new value is left in `rax`
fn assign(var: VarId, op: AssignOp) -> Vec<Line> {
    let cell = var_mem(var);
    match op {
        AssignOp::Set => vec![mov(cell, Reg::RAX.into())],
        AssignOp::Add => vec![
            Inst::ADD(cell.clone(), Reg::RAX.into()).into(),
            mov(Reg::RAX, cell),
        ],
        AssignOp::Sub => vec![
            Inst::SUB(cell.clone(), Reg::RAX.into()).into(),
            mov(Reg::RAX, cell),
        ],
        AssignOp::Mul => vec![
            Inst::IMUL(Reg::RAX, cell.clone()).into(),
            mov(cell, Reg::RAX.into()),
        ],
    }
}

fn step(inst: Inst, var: VarId, timing: Timing) -> Vec<Line> {
    let load = mov(Reg::RAX, var_mem(var));
    match timing {
        Timing::Before => vec![inst.into(), load],
        Timing::After => vec![load, inst.into()],
    }
}

fn test_zero() -> Line {
    Inst::CMP(Reg::RAX.into(), Operand::imm(0)).into()
}

fn var_mem(var: VarId) -> Operand {
    Operand::mem(var.label())
}

fn mov(dst: impl Into<Operand>, src: Operand) -> Line {
    Inst::MOV(dst.into(), src).into()
}

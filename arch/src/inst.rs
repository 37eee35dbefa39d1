use crate::reg::{Cond, Reg};

use color_print::cformat;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    /// Integer literal kept as written in the source
    Imm(String),
    /// Memory cell addressed by a data label: `[label]`
    Mem(String),
    /// Address of a data label
    Addr(String),
}

impl Operand {
    pub fn imm(val: u64) -> Self {
        Operand::Imm(val.to_string())
    }

    pub fn mem(label: impl Into<String>) -> Self {
        Operand::Mem(label.into())
    }
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(val) => write!(f, "{}", val),
            Operand::Mem(label) => write!(f, "[{}]", label),
            Operand::Addr(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    MOV(Operand, Operand),
    MOVZX(Reg, Reg),

    ADD(Operand, Operand),
    SUB(Operand, Operand),
    IMUL(Reg, Operand),
    NEG(Reg),
    INC(Operand),
    DEC(Operand),

    CMP(Operand, Operand),
    SET(Cond, Reg),

    PUSH(Reg),
    POP(Reg),

    JMP(String),
    JCC(Cond, String),
    CALL(String),
    RET(),
    SYSCALL(),
}

impl Inst {
    pub fn mnemonic(&self) -> String {
        match self {
            Inst::MOV(..) => "mov".into(),
            Inst::MOVZX(..) => "movzx".into(),
            Inst::ADD(..) => "add".into(),
            Inst::SUB(..) => "sub".into(),
            Inst::IMUL(..) => "imul".into(),
            Inst::NEG(..) => "neg".into(),
            Inst::INC(..) => "inc".into(),
            Inst::DEC(..) => "dec".into(),
            Inst::CMP(..) => "cmp".into(),
            Inst::SET(cond, _) => format!("set{}", cond),
            Inst::PUSH(..) => "push".into(),
            Inst::POP(..) => "pop".into(),
            Inst::JMP(..) => "jmp".into(),
            Inst::JCC(cond, _) => format!("j{}", cond),
            Inst::CALL(..) => "call".into(),
            Inst::RET() => "ret".into(),
            Inst::SYSCALL() => "syscall".into(),
        }
    }

    /// Operands as NASM text. Memory operands without a register partner get an explicit size.
    fn operands(&self) -> Vec<String> {
        fn sized(op: &Operand) -> String {
            match op {
                Operand::Mem(_) => format!("qword {}", op),
                _ => op.to_string(),
            }
        }
        match self {
            Inst::MOV(dst, src) | Inst::ADD(dst, src) | Inst::SUB(dst, src) => match (dst, src) {
                (Operand::Mem(_), Operand::Imm(_)) => vec![sized(dst), src.to_string()],
                _ => vec![dst.to_string(), src.to_string()],
            },
            Inst::CMP(lhs, rhs) => match (lhs, rhs) {
                (Operand::Mem(_), Operand::Imm(_)) => vec![sized(lhs), rhs.to_string()],
                _ => vec![lhs.to_string(), rhs.to_string()],
            },
            Inst::MOVZX(rd, rs) => vec![rd.to_string(), rs.to_string()],
            Inst::IMUL(rd, src) => vec![rd.to_string(), src.to_string()],
            Inst::NEG(rd) | Inst::PUSH(rd) | Inst::POP(rd) | Inst::SET(_, rd) => {
                vec![rd.to_string()]
            }
            Inst::INC(op) | Inst::DEC(op) => vec![sized(op)],
            Inst::JMP(label) | Inst::JCC(_, label) | Inst::CALL(label) => vec![label.clone()],
            Inst::RET() | Inst::SYSCALL() => vec![],
        }
    }

    pub fn cformat(&self) -> String {
        let ops = self.operands();
        match self {
            Inst::JMP(_) | Inst::JCC(..) | Inst::CALL(_) => {
                cformat!("<r>{:<8}</><g>{}</>", self.mnemonic(), ops.join(", "))
            }
            _ => cformat!("<r>{:<8}</><b>{}</>", self.mnemonic(), ops.join(", ")),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = self.operands();
        if ops.is_empty() {
            write!(f, "{}", self.mnemonic())
        } else {
            write!(f, "{} {}", self.mnemonic(), ops.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_inst {
        ($($name:ident: $inst:expr => $text:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!($inst.to_string(), $text);
                }
            )*
        }
    }

    test_inst! {
        test_mov_imm: Inst::MOV(Reg::RAX.into(), Operand::imm(42)) => "mov rax, 42",
        test_mov_load: Inst::MOV(Reg::RAX.into(), Operand::mem("var_0")) => "mov rax, [var_0]",
        test_mov_store: Inst::MOV(Operand::mem("var_3"), Reg::RAX.into()) => "mov [var_3], rax",
        test_mov_byte: Inst::MOV(Operand::mem("cbuf"), Reg::AL.into()) => "mov [cbuf], al",
        test_mov_addr: Inst::MOV(Reg::RSI.into(), Operand::Addr("cbuf".into())) => "mov rsi, cbuf",
        test_movzx: Inst::MOVZX(Reg::RAX, Reg::AL) => "movzx rax, al",
        test_add: Inst::ADD(Reg::RAX.into(), Reg::RBX.into()) => "add rax, rbx",
        test_add_mem: Inst::ADD(Operand::mem("var_1"), Reg::RAX.into()) => "add [var_1], rax",
        test_sub: Inst::SUB(Reg::RAX.into(), Reg::RBX.into()) => "sub rax, rbx",
        test_imul: Inst::IMUL(Reg::RAX, Operand::mem("var_0")) => "imul rax, [var_0]",
        test_neg: Inst::NEG(Reg::RAX) => "neg rax",
        test_inc: Inst::INC(Operand::mem("var_2")) => "inc qword [var_2]",
        test_dec: Inst::DEC(Operand::mem("var_2")) => "dec qword [var_2]",
        test_cmp: Inst::CMP(Reg::RAX.into(), Operand::imm(0)) => "cmp rax, 0",
        test_sete: Inst::SET(Cond::E, Reg::AL) => "sete al",
        test_setbe: Inst::SET(Cond::BE, Reg::AL) => "setbe al",
        test_push: Inst::PUSH(Reg::RAX) => "push rax",
        test_pop: Inst::POP(Reg::RBX) => "pop rbx",
        test_jmp: Inst::JMP("while_4_condition".into()) => "jmp while_4_condition",
        test_je: Inst::JCC(Cond::E, "if_2_else".into()) => "je if_2_else",
        test_call: Inst::CALL("function_0".into()) => "call function_0",
        test_ret: Inst::RET() => "ret",
        test_syscall: Inst::SYSCALL() => "syscall",
    }
}

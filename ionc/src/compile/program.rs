use super::codegen::{compile, CBUF};
use crate::error::Error;
use crate::symbols::{Function, Variable};
use arch::asm::{Code, Line, Width};
use arch::inst::{Inst, Operand};
use arch::reg::Reg;

/// Entry function every program must define
pub const ENTRY: &str = "main";

/// Parsed translation unit: all functions and global variables in declaration order.
#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<Function>,
    pub variables: Vec<Variable>,
}

impl Program {
    pub fn new(functions: Vec<Function>, variables: Vec<Variable>) -> Self {
        Program {
            functions,
            variables,
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|func| func.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|var| var.name == name)
    }

    /// Emit the complete NASM unit: storage, functions, then the `_start` stub that calls
    /// `main` and exits with status 0.
    pub fn assemble(&self) -> Result<Code, Error> {
        let entry = self.function(ENTRY).ok_or(Error::MissingEntryPoint)?;

        let mut lines = vec![
            Line::Directive("BITS 64".into()),
            Line::Directive("segment .bss".into()),
            Line::Reserve(CBUF.into(), Width::Byte, 1),
        ];
        for var in &self.variables {
            lines.push(Line::Reserve(var.id.label(), Width::QWord, 1));
        }

        lines.push(Line::Directive("segment .text".into()));
        for func in &self.functions {
            lines.push(Line::Label(func.id.label(), Some(func.name.clone())));
            if let Some(body) = &func.body {
                lines.extend(compile(body)?);
            }
            lines.push(Inst::RET().into());
        }

        lines.extend([
            Line::Directive("global _start".into()),
            Line::label("_start"),
            Inst::CALL(entry.id.label()).into(),
            Line::label("exit"),
            Inst::MOV(Reg::RAX.into(), Operand::imm(60)).into(),
            Inst::MOV(Reg::RDI.into(), Operand::imm(0)).into(),
            Inst::SYSCALL().into(),
        ]);
        Ok(Code(lines))
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "functions:")?;
        for func in &self.functions {
            match &func.body {
                Some(body) => writeln!(f, "  {} {}: {}", func.id, func.name, body)?,
                None => writeln!(f, "  {} {}: -", func.id, func.name)?,
            }
        }
        writeln!(f, "variables:")?;
        for var in &self.variables {
            writeln!(f, "  {} {}: {}", var.id, var.name, var.ty)?;
        }
        Ok(())
    }
}

use crate::error::Error;
use arch::asm::{Code, Line};
use arch::inst::{Inst, Operand};
use arch::reg::Reg;
use indexmap::IndexMap;

/// Entry label of an assembled unit
pub const START: &str = "_start";

const SYS_WRITE: u64 = 1;
const SYS_EXIT: u64 = 60;

pub struct State {
    regs: [u64; Reg::COUNT],
    zf: bool,
    cf: bool,

    // Data memory laid out from `res*` reservations
    data: Vec<u8>,
    symbols: IndexMap<String, usize>,

    // Code memory
    insts: Vec<Inst>,
    labels: IndexMap<String, usize>,
    pc: usize,

    stack: Vec<u64>,
    output: Vec<u8>,
    pending: Vec<u8>,
    exit: Option<u64>,
}

// Loading
impl State {
    pub fn load(code: &Code) -> Result<Self, Error> {
        let mut data = Vec::new();
        let mut symbols = IndexMap::new();
        let mut insts = Vec::new();
        let mut labels = IndexMap::new();

        for line in code.lines() {
            match line {
                Line::Directive(_) => {}
                Line::Reserve(name, width, count) => {
                    symbols.insert(name.clone(), data.len());
                    data.resize(data.len() + width.bytes() * count, 0);
                }
                Line::Label(name, _) => {
                    labels.insert(name.clone(), insts.len());
                }
                Line::Inst(inst) => insts.push(inst.clone()),
            }
        }

        let pc = labels
            .get(START)
            .copied()
            .ok_or_else(|| Error::UnknownLabel(START.to_string()))?;

        Ok(State {
            regs: [0; Reg::COUNT],
            zf: false,
            cf: false,
            data,
            symbols,
            insts,
            labels,
            pc,
            stack: Vec::new(),
            output: Vec::new(),
            pending: Vec::new(),
            exit: None,
        })
    }
}

// Inspection
impl State {
    pub fn get(&self, reg: Reg) -> u64 {
        let val = self.regs[reg.slot()];
        if reg.is_byte() {
            val & 0xFF
        } else {
            val
        }
    }

    pub fn set(&mut self, reg: Reg, val: u64) {
        let slot = &mut self.regs[reg.slot()];
        if reg.is_byte() {
            *slot = (*slot & !0xFF) | (val & 0xFF);
        } else {
            *slot = val;
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn flags(&self) -> (bool, bool) {
        (self.zf, self.cf)
    }

    /// Quadword stored at a data label
    pub fn var(&self, label: &str) -> Option<u64> {
        let addr = *self.symbols.get(label)?;
        self.read_mem(addr as u64, 8).ok()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, usize)> {
        self.symbols.iter().map(|(name, addr)| (name.as_str(), *addr))
    }

    /// Labels attached to the instruction at `pc`
    pub fn labels_at(&self, pc: usize) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |(_, at)| **at == pc)
            .map(|(name, _)| name.as_str())
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Bytes written since the last call
    pub fn take_pending(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    pub fn exit_status(&self) -> Option<u64> {
        self.exit
    }

    pub fn is_terminated(&self) -> bool {
        self.exit.is_some()
    }
}

// Memory access
impl State {
    fn read_mem(&self, addr: u64, size: usize) -> Result<u64, Error> {
        let start = addr as usize;
        let bytes = self
            .data
            .get(start..start + size)
            .ok_or(Error::BadAddress(addr))?;
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn write_mem(&mut self, addr: u64, size: usize, val: u64) -> Result<(), Error> {
        let start = addr as usize;
        let bytes = self
            .data
            .get_mut(start..start + size)
            .ok_or(Error::BadAddress(addr))?;
        bytes.copy_from_slice(&val.to_le_bytes()[..size]);
        Ok(())
    }

    fn address(&self, label: &str) -> Result<u64, Error> {
        self.symbols
            .get(label)
            .map(|addr| *addr as u64)
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }

    fn target(&self, label: &str) -> Result<usize, Error> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }

    /// Operand size in bytes: a byte register on either side makes the access a byte access
    fn width(dst: &Operand, src: &Operand) -> usize {
        match (dst, src) {
            (Operand::Reg(reg), _) | (_, Operand::Reg(reg)) if reg.is_byte() => 1,
            _ => 8,
        }
    }

    fn read(&self, op: &Operand, size: usize) -> Result<u64, Error> {
        match op {
            Operand::Reg(reg) => Ok(self.get(*reg)),
            Operand::Imm(text) => text
                .parse::<u64>()
                .map_err(|_| Error::BadImmediate(text.clone())),
            Operand::Mem(label) => self.read_mem(self.address(label)?, size),
            Operand::Addr(label) => self.address(label),
        }
    }

    fn write(&mut self, op: &Operand, size: usize, val: u64) -> Result<(), Error> {
        match op {
            Operand::Reg(reg) => {
                self.set(*reg, val);
                Ok(())
            }
            Operand::Mem(label) => {
                let addr = self.address(label)?;
                self.write_mem(addr, size, val)
            }
            Operand::Imm(text) | Operand::Addr(text) => Err(Error::BadImmediate(text.clone())),
        }
    }

    fn pop(&mut self, pc: usize) -> Result<u64, Error> {
        self.stack.pop().ok_or(Error::StackUnderflow(pc))
    }
}

// Execution
impl State {
    /// Execute one instruction. Returns the address and instruction that ran.
    pub fn exec(&mut self) -> Result<(usize, Inst), Error> {
        let pc = self.pc;
        let inst = self.insts.get(pc).cloned().ok_or(Error::OutOfCode(pc))?;
        self.pc += 1;

        match &inst {
            Inst::MOV(dst, src) => {
                let size = Self::width(dst, src);
                let val = self.read(src, size)?;
                self.write(dst, size, val)?;
            }
            Inst::MOVZX(rd, rs) => self.set(*rd, self.get(*rs)),
            Inst::ADD(dst, src) => {
                let (a, b) = (self.read(dst, 8)?, self.read(src, 8)?);
                let (val, carry) = a.overflowing_add(b);
                self.update(val, carry);
                self.write(dst, 8, val)?;
            }
            Inst::SUB(dst, src) => {
                let (a, b) = (self.read(dst, 8)?, self.read(src, 8)?);
                let (val, borrow) = a.overflowing_sub(b);
                self.update(val, borrow);
                self.write(dst, 8, val)?;
            }
            Inst::IMUL(rd, src) => {
                let val = self.get(*rd).wrapping_mul(self.read(src, 8)?);
                self.set(*rd, val);
            }
            Inst::NEG(rd) => {
                let a = self.get(*rd);
                let val = a.wrapping_neg();
                self.update(val, a != 0);
                self.set(*rd, val);
            }
            Inst::INC(op) => {
                let val = self.read(op, 8)?.wrapping_add(1);
                self.zf = val == 0;
                self.write(op, 8, val)?;
            }
            Inst::DEC(op) => {
                let val = self.read(op, 8)?.wrapping_sub(1);
                self.zf = val == 0;
                self.write(op, 8, val)?;
            }
            Inst::CMP(lhs, rhs) => {
                let (a, b) = (self.read(lhs, 8)?, self.read(rhs, 8)?);
                let (val, borrow) = a.overflowing_sub(b);
                self.update(val, borrow);
            }
            Inst::SET(cond, rd) => {
                let val = cond.holds(self.zf, self.cf) as u64;
                self.set(*rd, val);
            }
            Inst::PUSH(rs) => self.stack.push(self.get(*rs)),
            Inst::POP(rd) => {
                let val = self.pop(pc)?;
                self.set(*rd, val);
            }
            Inst::JMP(label) => self.pc = self.target(label)?,
            Inst::JCC(cond, label) => {
                if cond.holds(self.zf, self.cf) {
                    self.pc = self.target(label)?;
                }
            }
            Inst::CALL(label) => {
                let target = self.target(label)?;
                self.stack.push(self.pc as u64);
                self.pc = target;
            }
            Inst::RET() => self.pc = self.pop(pc)? as usize,
            Inst::SYSCALL() => self.syscall()?,
        }
        Ok((pc, inst))
    }

    fn update(&mut self, val: u64, carry: bool) {
        self.zf = val == 0;
        self.cf = carry;
    }

    fn syscall(&mut self) -> Result<(), Error> {
        match self.get(Reg::RAX) {
            SYS_WRITE => {
                let (buf, len) = (self.get(Reg::RSI), self.get(Reg::RDX));
                let mut bytes = Vec::with_capacity(len as usize);
                for offset in 0..len {
                    bytes.push(self.read_mem(buf + offset, 1)? as u8);
                }
                self.output.extend(&bytes);
                self.pending.extend(&bytes);
                self.set(Reg::RAX, len);
                Ok(())
            }
            SYS_EXIT => {
                self.exit = Some(self.get(Reg::RDI));
                Ok(())
            }
            other => Err(Error::UnsupportedSyscall(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::asm::Width;
    use arch::reg::Cond;

    fn unit(body: Vec<Line>) -> Code {
        let mut lines = vec![
            Line::Reserve("var_0".into(), Width::QWord, 1),
            Line::label(START),
        ];
        lines.extend(body);
        Code(lines)
    }

    fn run(code: &Code) -> State {
        let mut state = State::load(code).unwrap();
        while !state.is_terminated() {
            state.exec().unwrap();
        }
        state
    }

    fn exit() -> Vec<Line> {
        vec![
            Inst::MOV(Reg::RAX.into(), Operand::imm(60)).into(),
            Inst::SYSCALL().into(),
        ]
    }

    #[test]
    fn byte_register_aliases_rax() {
        let code = unit(vec![Inst::MOV(Reg::RAX.into(), Operand::imm(0x1234)).into()]);
        let mut state = State::load(&code).unwrap();
        state.exec().unwrap();
        assert_eq!(state.get(Reg::AL), 0x34);
        state.set(Reg::AL, 0x1FF);
        assert_eq!(state.get(Reg::RAX), 0x12FF);
    }

    #[test]
    fn unsigned_compare() {
        let mut body = vec![
            Inst::MOV(Reg::RAX.into(), Operand::imm(1)).into(),
            Inst::NEG(Reg::RAX).into(),
            Inst::CMP(Reg::RAX.into(), Operand::imm(5)).into(),
            Inst::SET(Cond::A, Reg::AL).into(),
            Inst::MOVZX(Reg::RBX, Reg::AL).into(),
        ];
        body.extend(exit());
        let state = run(&unit(body));
        assert_eq!(state.get(Reg::RBX), 1);
    }

    #[test]
    fn memory_and_increment() {
        let mut body = vec![
            Inst::MOV(Reg::RAX.into(), Operand::imm(41)).into(),
            Inst::MOV(Operand::mem("var_0"), Reg::RAX.into()).into(),
            Inst::INC(Operand::mem("var_0")).into(),
        ];
        body.extend(exit());
        let state = run(&unit(body));
        assert_eq!(state.var("var_0"), Some(42));
    }

    #[test]
    fn call_and_return() {
        let mut body = vec![
            Inst::CALL("f".into()).into(),
            Inst::MOV(Reg::RDI.into(), Reg::RBX.into()).into(),
        ];
        body.extend(exit());
        body.extend([
            Line::label("f"),
            Inst::MOV(Reg::RBX.into(), Operand::imm(7)).into(),
            Inst::RET().into(),
        ]);
        let state = run(&unit(body));
        assert_eq!(state.exit_status(), Some(7));
    }

    #[test]
    fn stack_underflow() {
        let code = unit(vec![Inst::POP(Reg::RAX).into()]);
        let mut state = State::load(&code).unwrap();
        assert!(matches!(state.exec(), Err(Error::StackUnderflow(0))));
    }

    #[test]
    fn unknown_label() {
        let code = unit(vec![Inst::JMP("nowhere".into()).into()]);
        let mut state = State::load(&code).unwrap();
        assert!(matches!(state.exec(), Err(Error::UnknownLabel(label)) if label == "nowhere"));
    }

    #[test]
    fn missing_start() {
        let code = Code(vec![Inst::RET().into()]);
        assert!(matches!(State::load(&code), Err(Error::UnknownLabel(_))));
    }

    #[test]
    fn unsupported_syscall() {
        let code = unit(vec![
            Inst::MOV(Reg::RAX.into(), Operand::imm(2)).into(),
            Inst::SYSCALL().into(),
        ]);
        let mut state = State::load(&code).unwrap();
        state.exec().unwrap();
        assert!(matches!(state.exec(), Err(Error::UnsupportedSyscall(2))));
    }
}

use arch::inst::Inst;
use arch::reg::Reg;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

use super::Hook;
use crate::error::Error;
use crate::model::State;

/// Prints machine state when execution reaches configured labels.
///
/// ```yaml
/// function_0:
///   regs: [rax, rbx]
///   vars: true
/// while_4_end:
///   vars: true
/// ```
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct List(pub IndexMap<String, Config>);

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub regs: Vec<Reg>,
    pub vars: bool,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, Error> {
        let list = match &file {
            Some(fname) => {
                let file = File::open(fname)?;
                serde_yaml::from_reader(BufReader::new(file))?
            }
            None => List::default(),
        };
        Ok(Self { file, list, all })
    }

    fn get(&self, state: &State, pc: usize) -> Option<&Config> {
        state.labels_at(pc).find_map(|label| self.list.0.get(label))
    }
}

impl Hook for Dump {
    fn init(&mut self, state: State) -> State {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        state
    }
    fn exec(&mut self, time: u64, pc: usize, inst: &Inst, state: State) -> State {
        if let Some(cfg) = self.get(&state, pc) {
            println!("[{:0>6}] {:>5} : {}", time, pc, inst.cformat());
            if cfg.regs.is_empty() {
                self.print_reg(&state);
            } else {
                self.print_some(&state, &cfg.regs);
            }
            if cfg.vars {
                self.print_vars(&state);
            }
        } else if self.all {
            println!("[{:0>6}] {:>5} : {}", time, pc, inst.cformat());
            self.print_reg(&state);
        }
        state
    }
}

impl Dump {
    fn print_reg(&self, state: &State) {
        let (zf, cf) = state.flags();
        println!(" +-----------------------------+-----------------------------+");
        println!(
            " | rax: {:0>16X}       | rbx: {:0>16X}       |",
            state.get(Reg::RAX),
            state.get(Reg::RBX)
        );
        println!(
            " | rcx: {:0>16X}       | rdx: {:0>16X}       |",
            state.get(Reg::RCX),
            state.get(Reg::RDX)
        );
        println!(
            " | rsi: {:0>16X}       | rdi: {:0>16X}       |",
            state.get(Reg::RSI),
            state.get(Reg::RDI)
        );
        println!(
            " |  pc: {:>16}       |  zf: {:<5} cf: {:<5}           |",
            state.pc(),
            zf,
            cf
        );
        println!(" +-----------------------------+-----------------------------+");
    }

    fn print_some(&self, state: &State, regs: &[Reg]) {
        for reg in regs {
            println!(" | {:>3}: {:0>16X}", reg, state.get(*reg));
        }
        println!(" +-----------------------------------------------------------+");
    }

    fn print_vars(&self, state: &State) {
        for (name, addr) in state.symbols() {
            match state.var(name) {
                Some(val) => println!(" | {:0>4X} {:<12} : {:0>16X}", addr, name, val),
                None => println!(" | {:0>4X} {:<12} : -", addr, name),
            }
        }
        println!(" +-----------------------------------------------------------+");
    }
}

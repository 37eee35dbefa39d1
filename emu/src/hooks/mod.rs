pub mod dump;
pub mod serial;

use crate::model::State;
use arch::inst::Inst;

/// Side effects attached to the emulator loop. Hooks are folded over the state after
/// every executed instruction.
pub trait Hook {
    fn init(&mut self, state: State) -> State;
    fn exec(&mut self, time: u64, pc: usize, inst: &Inst, state: State) -> State;
}

pub mod error;
pub mod hooks;
pub mod model;

pub use error::Error;
pub use model::State;

use arch::asm::Code;

/// Run a program without hooks until it exits or `tmax` instructions have been executed.
pub fn run(code: &Code, tmax: u64) -> Result<State, Error> {
    let mut state = State::load(code)?;
    for _ in 0..tmax {
        if state.is_terminated() {
            break;
        }
        state.exec()?;
    }
    Ok(state)
}

use std::io::Write;

use color_print::cprintln;

use super::Hook;
use crate::error::Error;
use crate::model::State;
use arch::inst::Inst;

/// Forwards bytes written by the `write` syscall to stdout, and optionally to a file.
pub struct Serial {
    style: bool,
    write_buf: Option<Box<dyn Write>>,
}

impl Serial {
    pub fn arg(style: bool, write_file: Option<String>) -> Result<Serial, Error> {
        let write_buf = match write_file {
            Some(file) => {
                let file = std::fs::File::create(file)?;
                Some(Box::new(std::io::BufWriter::new(file)) as Box<dyn Write>)
            }
            None => None,
        };
        Ok(Serial { style, write_buf })
    }
}

impl Hook for Serial {
    fn init(&mut self, state: State) -> State {
        println!(" * Serial: fd=1");
        state
    }
    fn exec(&mut self, _time: u64, _pc: usize, _inst: &Inst, mut state: State) -> State {
        let bytes = state.take_pending();
        for &byte in &bytes {
            let c = byte as char;
            match self.style {
                true => cprintln!(" > <r,s>{}</>", c),
                false => print!("{}", c),
            }
        }
        if let Some(buf) = self.write_buf.as_mut() {
            if let Err(e) = buf.write_all(&bytes) {
                eprintln!("Failed to write serial output: {}", e);
                self.write_buf = None;
            }
        }
        state
    }
}

impl Drop for Serial {
    fn drop(&mut self) {
        if let Some(buf) = self.write_buf.as_mut() {
            let _ = buf.flush();
        }
    }
}

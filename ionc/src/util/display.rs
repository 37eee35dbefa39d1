use crate::compile::Program;
use arch::asm::{Code, Line};
use color_print::cprintln;

pub fn print_program(program: &Program) {
    println!("+-[Func]-+------------------------------------------------------------------------");
    for func in &program.functions {
        cprintln!("+--------+ <green>{}</green> : {}", func.name, func.id);
        match &func.body {
            Some(body) => println!("|          {}", body),
            None => println!("|          -"),
        }
    }
    println!("+-[Vars]-+------------------------------------------------------------------------");
    for var in &program.variables {
        cprintln!("| <c>{:<6}</c> | {} : {}", var.id, var.name, var.ty);
    }
    println!("+--------+------------------------------------------------------------------------");
}

pub fn print_code(code: &Code) {
    println!("+-[Code]-+------------------------------------------------------------------------");
    let mut count = 0;
    for line in code.lines() {
        match line {
            Line::Inst(_) => {
                println!("| {:>6} | {}", count, line.cformat());
                count += 1;
            }
            _ => println!("|        | {}", line.cformat()),
        }
    }
    println!("+--------+------------------------------------------------------------------------");
}

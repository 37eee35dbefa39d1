use clap::Parser;
use color_print::cformat;
use indexmap::IndexMap;

use ionemu::hooks::{dump::Dump, serial::Serial, Hook};
use ionemu::State;

#[derive(Parser, Debug)]
#[clap(
    name = "Ion Emulator",
    author = "kanade-k-1228",
    version = "v1.0.0",
    about = "Runs Ion programs on an x86-64 subset model"
)]
struct Args {
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    #[arg(short, long)]
    dump_cfg: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Also write program output to this file
    #[arg(short, long)]
    output: Option<String>,

    /// Highlight each output byte
    #[arg(short, long)]
    style: bool,

    #[arg(default_value = "main.ion")]
    input_file: String,
}

fn main() {
    let args = Args::parse();
    println!("Ion Emulator by kanade-k-1228");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Compile and load
    let source = match std::fs::read_to_string(&args.input_file) {
        Ok(source) => source,
        Err(e) => fail(&format!("Failed to open File: {}: {}", args.input_file, e)),
    };
    let code = match ionc::compile(&args.input_file, &source) {
        Ok(code) => code,
        Err(errors) => {
            let mut sources: IndexMap<String, Vec<String>> = IndexMap::new();
            sources.insert(
                args.input_file.clone(),
                source.lines().map(str::to_string).collect(),
            );
            for e in &errors {
                e.print_diag(&sources);
            }
            fail(&format!("{} compile error(s)", errors.len()));
        }
    };
    let mut state = match State::load(&code) {
        Ok(state) => state,
        Err(e) => fail(&e.to_string()),
    };

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let dump = Dump::arg(args.dump_cfg, args.dump_all).unwrap_or_else(|e| fail(&e.to_string()));
    let serial = Serial::arg(args.style, args.output).unwrap_or_else(|e| fail(&e.to_string()));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(dump), Box::new(serial)];
    // Apply initializations
    state = hooks.iter_mut().fold(state, |state, hook| hook.init(state));

    // ------------------------------------------------------------------------
    // Main loop
    for time in match args.tmax {
        Some(t) => 0_u64..t,
        None => 0_u64..u64::MAX,
    } {
        // Execute instruction
        let (pc, inst) = match state.exec() {
            Ok(executed) => executed,
            Err(e) => fail(&format!("[{:0>6}] {}", time, e)),
        };
        // Execute side effects
        state = hooks
            .iter_mut()
            .fold(state, |state, hook| hook.exec(time, pc, &inst, state));
        if state.is_terminated() {
            break;
        }
    }

    // Exit
    println!();
    println!("=================================================");
    match state.exit_status() {
        Some(status) => println!("exit status: {}", status),
        None => println!("stopped at pc={} (tmax reached)", state.pc()),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", cformat!("<r,s>error</>: {}", msg));
    std::process::exit(1);
}
